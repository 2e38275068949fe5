//! Shared reqwest plumbing for outbound calls.
//!
//! Every upstream (catalog, GitHub, webhook) goes through a client built here
//! so they share the User-Agent and the per-request deadline.

use crate::config::AuditConfig;
use crate::AuditError;
use reqwest::{Client, Response, Url};
use std::time::Duration;

/// HTTP response with status and body captured.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    /// HTTP status code.
    pub status: u16,

    /// Raw response body.
    pub body: Vec<u8>,
}

impl UpstreamResponse {
    /// Read status and body from a reqwest response.
    pub async fn from_response(response: Response) -> Result<Self, AuditError> {
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| AuditError::upstream("Failed to read response body", e))?
            .to_vec();

        Ok(Self { status, body })
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Build the reqwest client used for all outbound calls.
pub fn build_http_client(timeout: Duration) -> Result<Client, AuditError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(build_user_agent())
        .build()
        .map_err(|e| AuditError::ConfigError(format!("Failed to build HTTP client: {}", e)))
}

/// Build the HTTP client described by a configuration.
pub fn client_for(config: &AuditConfig) -> Result<Client, AuditError> {
    build_http_client(config.request_timeout)
}

/// Build a User-Agent string.
///
/// Format: `template-audit/<version>`. GitHub rejects requests without one.
pub fn build_user_agent() -> String {
    format!("template-audit/{}", env!("CARGO_PKG_VERSION"))
}

/// Join a base URL and an absolute path without doubling the slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

/// Append path segments to a base URL, percent-encoding each one.
///
/// A segment can never contribute a query or fragment to the result.
pub fn url_with_segments<'a>(
    base: &str,
    segments: impl IntoIterator<Item = &'a str>,
) -> Result<Url, AuditError> {
    let mut url = Url::parse(base)
        .map_err(|e| AuditError::upstream(format!("Invalid upstream URL {}", base), e))?;
    url.path_segments_mut()
        .map_err(|_| AuditError::upstream(format!("Invalid upstream URL {}", base), "URL cannot be a base"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
