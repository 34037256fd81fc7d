//! In-process contents API with compare-and-swap semantics.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::codec;
use super::contents::{CommitRef, ContentRef, ContentsApi, PutFile, PutFileResponse, RemoteFile};
use super::StoreError;
use crate::models::VersionToken;

/// Line width the remote wraps base64 content at.
const BASE64_LINE: usize = 60;

struct Blob {
    text: String,
    sha: String,
}

#[derive(Default)]
struct Files {
    blobs: HashMap<String, Blob>,
    revision: u64,
    commits: Vec<String>,
}

impl Files {
    fn next_id(&mut self, kind: &str) -> String {
        self.revision += 1;
        format!("{}{:036x}", kind, self.revision)
    }
}

#[derive(Default)]
pub struct MemoryContents {
    files: Mutex<Files>,
}

impl MemoryContents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite `path` without a precondition.
    pub fn seed(&self, path: &str, text: &str) -> VersionToken {
        let mut files = self.files.lock().unwrap();
        let sha = files.next_id("blob");
        files.blobs.insert(
            path.to_string(),
            Blob {
                text: text.to_string(),
                sha: sha.clone(),
            },
        );
        VersionToken(sha)
    }

    pub fn text(&self, path: &str) -> Option<String> {
        let files = self.files.lock().unwrap();
        files.blobs.get(path).map(|b| b.text.clone())
    }

    pub fn version(&self, path: &str) -> Option<VersionToken> {
        let files = self.files.lock().unwrap();
        files.blobs.get(path).map(|b| VersionToken(b.sha.clone()))
    }

    pub fn commit_messages(&self) -> Vec<String> {
        self.files.lock().unwrap().commits.clone()
    }
}

fn wrap(encoded: &str) -> String {
    encoded
        .as_bytes()
        .chunks(BASE64_LINE)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl ContentsApi for MemoryContents {
    async fn get_file(&self, path: &str, _git_ref: &str) -> Result<RemoteFile, StoreError> {
        let files = self.files.lock().unwrap();
        let blob = files.blobs.get(path).ok_or_else(|| StoreError::RemoteRejected {
            status: 404,
            body: r#"{"message":"Not Found"}"#.to_string(),
        })?;
        Ok(RemoteFile {
            content: wrap(&codec::encode_content(&blob.text)),
            sha: blob.sha.clone(),
        })
    }

    async fn put_file(&self, path: &str, request: &PutFile) -> Result<PutFileResponse, StoreError> {
        let text = codec::decode_content(&request.content).map_err(|_| StoreError::RemoteRejected {
            status: 422,
            body: r#"{"message":"content is not valid Base64"}"#.to_string(),
        })?;

        let mut files = self.files.lock().unwrap();
        match files.blobs.get(path) {
            Some(blob) if blob.sha == request.sha => {}
            Some(_) => {
                return Err(StoreError::Conflict {
                    status: 409,
                    body: format!(r#"{{"message":"{} does not match {}"}}"#, path, request.sha),
                })
            }
            None => {
                return Err(StoreError::RemoteRejected {
                    status: 404,
                    body: r#"{"message":"Not Found"}"#.to_string(),
                })
            }
        }

        let sha = files.next_id("blob");
        let commit = files.next_id("cmmt");
        files.blobs.insert(
            path.to_string(),
            Blob {
                text,
                sha: sha.clone(),
            },
        );
        files.commits.push(request.message.clone());

        Ok(PutFileResponse {
            content: ContentRef {
                sha,
                html_url: None,
            },
            commit: CommitRef {
                sha: commit,
                message: Some(request.message.clone()),
                html_url: None,
            },
        })
    }
}
