//! HTTP client wrapper for connectors
//!
//! Thin layer over reqwest that applies the configured per-request
//! timeout and maps transport failures into connector-level errors.

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use url::Url;

use crate::error::ConnectorError;

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("request failed: {message}")]
    RequestFailed { message: String },
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },
    #[error("timeout")]
    Timeout,
    #[error("rate limited")]
    RateLimited,
    #[error("HTTP status {status}")]
    Status { status: u16 },
}

impl From<HttpError> for ConnectorError {
    fn from(e: HttpError) -> Self {
        // Every transport-level failure is recoverable-empty; the
        // orchestrator falls through to the next source
        ConnectorError::Unreachable {
            message: e.to_string(),
        }
    }
}

pub struct HttpClient {
    client: Client,
    user_agent: String,
}

impl HttpClient {
    pub fn new(user_agent: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            user_agent: user_agent.to_string(),
        }
    }

    /// GET with query parameters and an optional bearer credential.
    /// Returns the response body on any 2xx status.
    pub async fn get(
        &self,
        url: &str,
        params: &[(&str, &str)],
        bearer: Option<&str>,
    ) -> Result<String, HttpError> {
        let url = Url::parse_with_params(url, params).map_err(|_| {
            HttpError::InvalidUrl {
                url: url.to_string(),
            }
        })?;

        let mut request = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent);
        if let Some(token) = bearer {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout
            } else {
                HttpError::RequestFailed {
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();
        if status == 429 {
            return Err(HttpError::RateLimited);
        }
        if !(200..300).contains(&status) {
            return Err(HttpError::Status { status });
        }

        response.text().await.map_err(|e| HttpError::RequestFailed {
            message: e.to_string(),
        })
    }
}
