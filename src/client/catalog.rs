//! Catalog lookup by template name.

use crate::client::http::UpstreamResponse;
use crate::AuditError;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::debug;

/// Error message used when the catalog cannot be reached or decoded.
pub const CATALOG_FAILURE: &str = "Failed to fetch or parse catalog response";

/// Client for the catalog's `entities/by-name` endpoint.
pub struct CatalogClient {
    client: Client,
    base_url: Option<String>,
    token: Option<String>,
}

impl CatalogClient {
    /// Create a catalog client. A missing base URL is reported per request.
    pub fn new(client: Client, base_url: Option<String>, token: Option<String>) -> Self {
        Self {
            client,
            base_url,
            token,
        }
    }

    /// URL of a template entity. The name is encoded as one path segment.
    pub fn entity_url(&self, template_name: &str) -> Result<Url, AuditError> {
        let base = self.base_url.as_deref().ok_or_else(|| {
            AuditError::ConfigError("templateAudit.backstage.catalogUrl is not configured".to_string())
        })?;
        let mut url = Url::parse(base).map_err(|e| AuditError::upstream(CATALOG_FAILURE, e))?;
        url.path_segments_mut()
            .map_err(|_| AuditError::upstream(CATALOG_FAILURE, "catalog URL cannot be a base"))?
            .pop_if_empty()
            .extend(["entities", "by-name", "template", template_name]);
        Ok(url)
    }

    /// Fetch a template entity.
    ///
    /// # Errors
    /// - `ConfigError` - no catalog URL configured
    /// - `Upstream` - transport failure or a success body that is not JSON
    /// - `TemplateNotFound` - any non-success status
    pub async fn fetch_template(&self, template_name: &str) -> Result<Value, AuditError> {
        let url = self.entity_url(template_name)?;
        debug!(%url, "catalog lookup");

        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        let response = request
            .send()
            .await
            .map_err(|e| AuditError::upstream(CATALOG_FAILURE, e))?;
        let response = UpstreamResponse::from_response(response).await?;

        if !response.is_success() {
            debug!(status = response.status, template_name, "catalog lookup failed");
            return Err(AuditError::TemplateNotFound(template_name.to_string()));
        }

        serde_json::from_slice(&response.body).map_err(|e| AuditError::upstream(CATALOG_FAILURE, e))
    }
}
