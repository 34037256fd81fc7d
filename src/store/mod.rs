//! Record store backed by a single JSON file in a remote repository.
//!
//! Reads return the collection together with the blob id it was read at.
//! Writes are compare-and-swap: the blob id is re-read immediately before the
//! write and sent as the precondition, and a mismatch surfaces as `Conflict`.
//! Nothing is retried.

pub mod codec;
pub mod contents;
mod github;
#[cfg(test)]
pub mod memory;

pub use github::GitHubContents;

use thiserror::Error;

use crate::config::ConfigError;
use crate::models::{CommitInfo, Location, VersionToken};
use crate::validation::{self, ValidationError};
use contents::{ContentsApi, PutFile};

/// Fixed message for every commit written by the store.
pub const COMMIT_MESSAGE: &str = "chore: update locations via Watchlist Manager";

/// Remote response bodies are cut to this many characters in errors.
pub const MAX_ERROR_BODY: usize = 300;

/// Record store failures.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Contents API unreachable: {0}")]
    RemoteUnavailable(String),
    #[error("GitHub {status}: {body}")]
    RemoteRejected { status: u16, body: String },
    #[error("Conflict: file changed since it was read (GitHub {status}: {body})")]
    Conflict { status: u16, body: String },
    #[error("Decode error: {0}")]
    Decode(String),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

pub(crate) fn truncate_body(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY).collect()
}

/// A decoded collection and the version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub rows: Vec<Location>,
    pub version: VersionToken,
}

/// The record collection stored at one path on one branch.
pub struct RecordStore<C> {
    contents: C,
    path: String,
    branch: String,
}

impl<C: ContentsApi> RecordStore<C> {
    pub fn new(contents: C, path: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            contents,
            path: path.into(),
            branch: branch.into(),
        }
    }

    /// Read and decode the current collection.
    pub async fn fetch(&self) -> Result<Snapshot, StoreError> {
        let file = self.contents.get_file(&self.path, &self.branch).await?;
        let text = codec::decode_content(&file.content)?;
        let rows = codec::parse_collection(&text)?;

        tracing::debug!(
            "Fetched {} location(s) from {}@{} at {}",
            rows.len(),
            self.path,
            self.branch,
            file.sha
        );

        Ok(Snapshot {
            rows,
            version: VersionToken(file.sha),
        })
    }

    /// Current version token of the file, without decoding its content.
    pub async fn current_version(&self) -> Result<VersionToken, StoreError> {
        let file = self.contents.get_file(&self.path, &self.branch).await?;
        Ok(VersionToken(file.sha))
    }

    /// Replace the whole collection against a freshly read version token.
    pub async fn commit(&self, rows: &[Location]) -> Result<CommitInfo, StoreError> {
        validation::validate_locations(rows)?;
        let version = self.current_version().await?;
        self.commit_at(rows, &version).await
    }

    /// Replace the whole collection if the file is still at `expected`.
    pub async fn commit_at(
        &self,
        rows: &[Location],
        expected: &VersionToken,
    ) -> Result<CommitInfo, StoreError> {
        validation::validate_locations(rows)?;
        let text = codec::to_canonical_json(rows)?;

        let request = PutFile {
            message: COMMIT_MESSAGE.to_string(),
            content: codec::encode_content(&text),
            sha: expected.0.clone(),
            branch: self.branch.clone(),
        };

        let response = self.contents.put_file(&self.path, &request).await?;

        tracing::info!(
            "Committed {} location(s) to {}@{} as {} (was {})",
            rows.len(),
            self.path,
            self.branch,
            response.commit.sha,
            expected
        );

        Ok(CommitInfo {
            sha: response.commit.sha,
            content_sha: VersionToken(response.content.sha),
            message: response
                .commit
                .message
                .unwrap_or_else(|| COMMIT_MESSAGE.to_string()),
            html_url: response.commit.html_url,
        })
    }
}
