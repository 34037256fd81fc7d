//! Remote contents API abstraction.
//!
//! The record store only needs two calls: read a file at a ref, and replace it
//! given the blob id it was read at. The remote enforces the precondition.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::StoreError;

/// A file as returned by the contents API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Base64 text, possibly wrapped across lines
    #[serde(default)]
    pub content: String,
    /// Blob id of this exact content
    pub sha: String,
}

/// Body of a file replacement request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutFile {
    pub message: String,
    /// Base64 text of the complete new content
    pub content: String,
    /// Blob id the caller expects to replace
    pub sha: String,
    pub branch: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRef {
    pub sha: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRef {
    pub sha: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
}

/// Response of a successful file replacement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutFileResponse {
    pub content: ContentRef,
    pub commit: CommitRef,
}

/// Access to a version-controlled file store.
#[async_trait]
pub trait ContentsApi: Send + Sync {
    /// Read `path` at `git_ref`.
    async fn get_file(&self, path: &str, git_ref: &str) -> Result<RemoteFile, StoreError>;

    /// Replace `path` if its current blob id still equals `request.sha`.
    async fn put_file(&self, path: &str, request: &PutFile) -> Result<PutFileResponse, StoreError>;
}

#[async_trait]
impl<T: ContentsApi + ?Sized> ContentsApi for std::sync::Arc<T> {
    async fn get_file(&self, path: &str, git_ref: &str) -> Result<RemoteFile, StoreError> {
        (**self).get_file(path, git_ref).await
    }

    async fn put_file(&self, path: &str, request: &PutFile) -> Result<PutFileResponse, StoreError> {
        (**self).put_file(path, request).await
    }
}
