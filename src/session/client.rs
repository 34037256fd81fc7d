//! HTTP client for the locations endpoint.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::auth::API_KEY_HEADER;
use crate::errors::ErrorResponse;
use crate::models::{CommitInfo, Location, SaveResponse};
use crate::store::truncate_body;

#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("Service unreachable: {0}")]
    Unavailable(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Request failed ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Invalid data from API: {0}")]
    InvalidResponse(String),
}

/// Reads and replaces the remote collection.
#[async_trait]
pub trait LocationsApi: Send + Sync {
    async fn fetch_locations(&self) -> Result<Vec<Location>, ClientError>;

    async fn save_locations(&self, rows: &[Location]) -> Result<CommitInfo, ClientError>;
}

#[async_trait]
impl<T: LocationsApi + ?Sized> LocationsApi for std::sync::Arc<T> {
    async fn fetch_locations(&self) -> Result<Vec<Location>, ClientError> {
        (**self).fetch_locations().await
    }

    async fn save_locations(&self, rows: &[Location]) -> Result<CommitInfo, ClientError> {
        (**self).save_locations(rows).await
    }
}

/// `LocationsApi` over `/api/locations`.
#[derive(Clone)]
pub struct HttpLocationsApi {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpLocationsApi {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:8080`.
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}/api/locations", base_url.as_ref().trim_end_matches('/')),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }

    async fn read_error(response: reqwest::Response) -> ClientError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&text)
            .map(|body| body.error)
            .unwrap_or_else(|_| truncate_body(&text));

        if status == StatusCode::CONFLICT {
            ClientError::Conflict(message)
        } else {
            ClientError::Api {
                status: status.as_u16(),
                message,
            }
        }
    }
}

#[async_trait]
impl LocationsApi for HttpLocationsApi {
    async fn fetch_locations(&self) -> Result<Vec<Location>, ClientError> {
        let response = self
            .authorize(self.client.get(&self.endpoint))
            .send()
            .await
            .map_err(|e| ClientError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        response
            .json::<Vec<Location>>()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    async fn save_locations(&self, rows: &[Location]) -> Result<CommitInfo, ClientError> {
        let response = self
            .authorize(self.client.put(&self.endpoint))
            .json(rows)
            .send()
            .await
            .map_err(|e| ClientError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let body: SaveResponse = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        Ok(body.commit)
    }
}
