//! Configuration module for the watchlist backend.
//!
//! Everything is read from environment variables (optionally seeded from a `.env` file).
//! Remote repository settings are resolved per request so that a missing variable
//! fails the request instead of the process.

use std::env;
use std::net::SocketAddr;

use thiserror::Error;

pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_FILE_PATH: &str = "locations.json";
pub const DEFAULT_API_URL: &str = "https://api.github.com";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Configuration failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    Missing(&'static str),
    #[error("Invalid WATCHLIST_BIND_ADDR: {0}")]
    InvalidBindAddr(String),
}

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Access token for the remote contents API
    pub github_token: Option<String>,
    /// Repository owner (user or organisation)
    pub github_owner: Option<String>,
    /// Repository name
    pub github_repo: Option<String>,
    /// Branch the record file lives on
    pub github_branch: String,
    /// Path of the record file inside the repository
    pub file_path: String,
    /// Base URL of the contents API
    pub api_url: String,
    /// Static credential callers must present (disabled when unset)
    pub api_key: Option<String>,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable text
    pub log_json: bool,
}

/// Fully resolved remote repository settings.
#[derive(Clone, PartialEq, Eq)]
pub struct GitHubSettings {
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub file_path: String,
    pub api_url: String,
}

impl std::fmt::Debug for GitHubSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubSettings")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("file_path", &self.file_path)
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("github_token", &self.github_token.as_ref().map(|_| "<redacted>"))
            .field("github_owner", &self.github_owner)
            .field("github_repo", &self.github_repo)
            .field("github_branch", &self.github_branch)
            .field("file_path", &self.file_path)
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("log_json", &self.log_json)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let bind_addr = env::var("WATCHLIST_BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr(bind_addr))?;

        Ok(Self {
            github_token: non_empty_var("GITHUB_TOKEN"),
            github_owner: non_empty_var("GITHUB_OWNER"),
            github_repo: non_empty_var("GITHUB_REPO"),
            github_branch: non_empty_var("GITHUB_BRANCH")
                .unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            file_path: non_empty_var("GITHUB_FILE_PATH")
                .unwrap_or_else(|| DEFAULT_FILE_PATH.to_string()),
            api_url: non_empty_var("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            api_key: non_empty_var("WATCHLIST_API_KEY"),
            bind_addr,
            log_level: env::var("WATCHLIST_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_json: env::var("WATCHLIST_LOG_FORMAT")
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }

    /// Resolve the remote repository settings, failing on the first missing variable.
    pub fn github(&self) -> Result<GitHubSettings, ConfigError> {
        let token = self
            .github_token
            .clone()
            .ok_or(ConfigError::Missing("GITHUB_TOKEN"))?;
        let owner = self
            .github_owner
            .clone()
            .ok_or(ConfigError::Missing("GITHUB_OWNER"))?;
        let repo = self
            .github_repo
            .clone()
            .ok_or(ConfigError::Missing("GITHUB_REPO"))?;

        Ok(GitHubSettings {
            token,
            owner,
            repo,
            branch: self.github_branch.clone(),
            file_path: self.file_path.clone(),
            api_url: self.api_url.trim_end_matches('/').to_string(),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
