//! Typed client for the audit HTTP API.
//!
//! Mirrors what the portal panel does: validate a template either by catalog
//! name or by pasted YAML (never both), and list stored results with filters.

use crate::client::http::{join_url, UpstreamResponse};
use crate::protocol::models::{AuditResult, ValidateByDocumentRequest, ValidateByNameRequest};
use crate::store::results::ResultFilter;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

/// What to validate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationRequest {
    /// Look the template up in the catalog.
    ByName(String),
    /// Validate a YAML document directly.
    ByDocument(String),
}

/// Errors returned by [`TemplateAuditClient`].
#[derive(Debug, Error)]
pub enum ApiClientError {
    /// The request could not be sent or the response not read.
    #[error("Request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("Server returned {status}: {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// The `error` field of the response, or a generic message.
        message: String,
        /// The `details` field of the response, if present.
        details: Option<String>,
    },

    /// The success body did not match the expected shape.
    #[error("Unexpected response body: {0}")]
    Decode(String),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    details: Option<String>,
}

/// Client for a running audit service.
pub struct TemplateAuditClient {
    client: Client,
    base_url: String,
}

impl TemplateAuditClient {
    /// Create a client. `base_url` includes the mount path, e.g.
    /// `http://portal:7007/api/template-audit`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a client on top of an existing reqwest client.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Run a validation and return the stored result.
    pub async fn validate(&self, request: ValidationRequest) -> Result<AuditResult, ApiClientError> {
        let builder = match request {
            ValidationRequest::ByName(name) => self
                .client
                .post(join_url(&self.base_url, "/validate/templateName"))
                .json(&ValidateByNameRequest {
                    template_name: Some(name),
                }),
            ValidationRequest::ByDocument(yaml) => self
                .client
                .post(join_url(&self.base_url, "/validate/yaml"))
                .json(&ValidateByDocumentRequest {
                    yaml_text: Some(yaml),
                }),
        };
        let response = builder
            .send()
            .await
            .map_err(|e| ApiClientError::Transport(e.to_string()))?;
        decode(response).await
    }

    /// List stored results. Empty filter fields are not sent.
    pub async fn results(&self, filter: &ResultFilter) -> Result<Vec<AuditResult>, ApiClientError> {
        let response = self
            .client
            .get(join_url(&self.base_url, "/results"))
            .query(&filter.query_pairs())
            .send()
            .await
            .map_err(|e| ApiClientError::Transport(e.to_string()))?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiClientError> {
    let response = UpstreamResponse::from_response(response)
        .await
        .map_err(|e| ApiClientError::Transport(e.to_string()))?;

    if !response.is_success() {
        let body: Option<ErrorBody> = serde_json::from_slice(&response.body).ok();
        let (message, details) = match body {
            Some(ErrorBody { error, details }) => (
                error.unwrap_or_else(|| "Validation failed".to_string()),
                details,
            ),
            None => ("Validation failed".to_string(), None),
        };
        return Err(ApiClientError::Server {
            status: response.status,
            message,
            details,
        });
    }

    serde_json::from_slice(&response.body).map_err(|e| ApiClientError::Decode(e.to_string()))
}
