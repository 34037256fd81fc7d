//! GitHub contents API client.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;

use super::contents::{ContentsApi, PutFile, PutFileResponse, RemoteFile};
use super::{truncate_body, StoreError};
use crate::config::GitHubSettings;

const USER_AGENT_VALUE: &str = "watchlist-manager";
const ACCEPT_VALUE: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "x-github-api-version";
const API_VERSION: &str = "2022-11-28";

/// Contents API client bound to one repository.
#[derive(Clone)]
pub struct GitHubContents {
    client: Client,
    settings: GitHubSettings,
}

impl GitHubContents {
    pub fn new(client: Client, settings: GitHubSettings) -> Self {
        Self { client, settings }
    }

    fn contents_url(&self, path: &str) -> Result<Url, StoreError> {
        let mut url = Url::parse(&self.settings.api_url)
            .map_err(|e| StoreError::RemoteUnavailable(format!("invalid API URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::RemoteUnavailable("invalid API URL".to_string()))?
            .pop_if_empty()
            .extend([
                "repos",
                self.settings.owner.as_str(),
                self.settings.repo.as_str(),
                "contents",
            ])
            .extend(path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    fn headers(&self) -> Result<HeaderMap, StoreError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
        headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));
        let auth = HeaderValue::from_str(&format!("Bearer {}", self.settings.token))
            .map_err(|_| StoreError::RemoteUnavailable("token is not a valid header".to_string()))?;
        headers.insert(AUTHORIZATION, auth);
        Ok(headers)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&PutFile>,
    ) -> Result<T, StoreError> {
        tracing::debug!("{} {}", method, url.path());

        let mut request = self
            .client
            .request(method.clone(), url)
            .headers(self.headers()?);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!("Contents API unreachable: {}", e);
            StoreError::RemoteUnavailable(e.to_string())
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| StoreError::RemoteUnavailable(e.to_string()))?;

        if !status.is_success() {
            let body = truncate_body(&text);
            if method == Method::PUT && status == StatusCode::CONFLICT {
                tracing::warn!("Contents API rejected stale sha: {}", body);
                return Err(StoreError::Conflict {
                    status: status.as_u16(),
                    body,
                });
            }
            tracing::warn!("Contents API returned {}: {}", status, body);
            return Err(StoreError::RemoteRejected {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&text)
            .map_err(|e| StoreError::Decode(format!("unexpected contents API response: {}", e)))
    }
}

#[async_trait]
impl ContentsApi for GitHubContents {
    async fn get_file(&self, path: &str, git_ref: &str) -> Result<RemoteFile, StoreError> {
        let mut url = self.contents_url(path)?;
        url.query_pairs_mut().append_pair("ref", git_ref);
        self.send(Method::GET, url, None).await
    }

    async fn put_file(&self, path: &str, request: &PutFile) -> Result<PutFileResponse, StoreError> {
        let url = self.contents_url(path)?;
        self.send(Method::PUT, url, Some(request)).await
    }
}
