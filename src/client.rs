use crate::source::SourceSpec;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(#[source] reqwest::Error),
    #[error("rejected with {0}, rate-limited or blocked")]
    SoftRejection(StatusCode),
    #[error("non-success status code: {0}")]
    Http(StatusCode),
    #[error(transparent)]
    Other(reqwest::Error),
}

impl FetchError {
    /// 403 and 429 mean "go away for now" rather than a broken source.
    pub fn is_soft(&self) -> bool {
        matches!(self, Self::SoftRejection(_))
    }
}

impl From<StatusCode> for FetchError {
    fn from(status_code: StatusCode) -> Self {
        match status_code {
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => Self::SoftRejection(status_code),
            _ => Self::Http(status_code),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        // Connect timeouts report both, the timeout is the more useful one
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_connect() {
            Self::Connect(error)
        } else {
            Self::Other(error)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// HTTP session settings, fixed at startup.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub user_agent: String,
    /// `false` accepts any certificate and host name, for hosts without a CA bundle.
    pub tls_verify: bool,
    /// `false` ignores `HTTP(S)_PROXY`/`ALL_PROXY` from the environment.
    pub use_env_proxy: bool,
}

/// One request to one source.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, source: &SourceSpec, ip: &str) -> Result<RawResponse, FetchError>;
}

/// HTTP session used for a single lookup, connections are released on drop.
pub struct SourceClient {
    http: Client,
}

impl SourceClient {
    pub fn open(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .danger_accept_invalid_certs(!config.tls_verify)
            .danger_accept_invalid_hostnames(!config.tls_verify);
        if !config.use_env_proxy {
            builder = builder.no_proxy();
        }
        Ok(Self {
            http: builder.build()?,
        })
    }

    async fn get(&self, source: &SourceSpec, ip: &str) -> Result<RawResponse, FetchError> {
        let url = source.url(ip);
        log::debug!(r#"{}: GET "{}""#, source.name, url);
        let response = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(status.into());
        }
        let body = response.bytes().await?;
        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}

#[async_trait]
impl Fetch for SourceClient {
    async fn fetch(&self, source: &SourceSpec, ip: &str) -> Result<RawResponse, FetchError> {
        let result = self.get(source, ip).await;
        match &result {
            Ok(response) => log::info!(
                "{}: {}, {} bytes",
                source.name,
                response.status,
                response.body.len()
            ),
            Err(err) if err.is_soft() => log::info!("{}: {}, skipping", source.name, err),
            Err(FetchError::Timeout) => log::warn!("{}: timed out", source.name),
            Err(FetchError::Connect(err)) => log::warn!("{}: connection failed: {}", source.name, err),
            Err(FetchError::Http(status)) => log::warn!("{}: HTTP error {}", source.name, status),
            Err(err) => log::warn!("{}: request failed: {}", source.name, err),
        }
        result
    }
}
