//! Template Auditor - the main public API.
//!
//! The `TemplateAuditor` owns everything an audit touches:
//! - Catalog lookups and GitHub checks for templates referenced by name
//! - Direct validation of pasted YAML documents
//! - The in-memory result store and webhook forwarding

use crate::client::catalog::CatalogClient;
use crate::client::github::GithubClient;
use crate::client::http::client_for;
use crate::clock::{Clock, SystemClock};
use crate::config::AuditConfig;
use crate::notify::webhook::WebhookNotifier;
use crate::policy::checks::{audit_status, validate_fields, GithubChecks};
use crate::protocol::github::{parse_github_source, GithubRepo};
use crate::protocol::models::{AuditResult, TemplateDocument};
use crate::store::results::{ResultFilter, ResultStore};
use crate::AuditError;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Main audit service.
///
/// Create one instance at startup and share it (behind `Arc`) with every
/// request handler.
pub struct TemplateAuditor {
    clock: Arc<dyn Clock>,
    catalog: CatalogClient,
    github: GithubClient,
    notifier: WebhookNotifier,
    store: ResultStore,
}

impl TemplateAuditor {
    /// Create an auditor with the given configuration.
    ///
    /// Uses the system clock for result timestamps.
    ///
    /// # Errors
    /// Returns an error if configuration validation or HTTP client creation fails.
    pub fn new(config: AuditConfig) -> Result<Self, AuditError> {
        config.validate()?;
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create an auditor with a custom clock (for testing).
    #[cfg(any(test, feature = "test-seams"))]
    pub fn new_with_clock(config: AuditConfig, clock: Arc<dyn Clock>) -> Result<Self, AuditError> {
        config.validate()?;
        Self::with_clock(config, clock)
    }

    fn with_clock(config: AuditConfig, clock: Arc<dyn Clock>) -> Result<Self, AuditError> {
        let client = client_for(&config)?;

        Ok(Self {
            clock,
            catalog: CatalogClient::new(client.clone(), config.catalog_url, config.catalog_token),
            github: GithubClient::new(client.clone(), config.github_api_url, config.github_tokens),
            notifier: WebhookNotifier::new(client, config.webhook_url),
            store: ResultStore::new(),
        })
    }

    /// Audit a template registered in the catalog.
    ///
    /// 1. Fetch the entity from the catalog
    /// 2. Check description, tags and owner
    /// 3. If the source location is on GitHub, check README.md and the owner account
    /// 4. Store the result and forward it to the webhook
    ///
    /// # Errors
    /// - `MissingField` - no template name given
    /// - `TemplateNotFound` - the catalog answered with a non-success status
    /// - `Upstream` - the catalog could not be reached or decoded
    /// - `ConfigError` - no catalog URL configured
    pub async fn validate_by_name(&self, template_name: Option<&str>) -> Result<AuditResult, AuditError> {
        let template_name = template_name
            .filter(|n| !n.is_empty())
            .ok_or(AuditError::MissingField("templateName"))?;

        let entity = self.catalog.fetch_template(template_name).await?;
        let doc = TemplateDocument::from_value(&entity);
        let validation = validate_fields(&doc);

        let (readme_status, github_owner_status) = match doc.source_location().and_then(parse_github_source) {
            Some(repo) => self.github_checks(&repo).await,
            None => (None, None),
        };

        let status = audit_status(
            &validation,
            GithubChecks::Required {
                readme: readme_status,
                owner: github_owner_status,
            },
        );

        Ok(self.record(AuditResult {
            template_name: Some(template_name.to_string()),
            validation,
            readme_status,
            github_owner_status,
            date: self.clock.now_utc(),
            status,
            owner: doc.owner(),
            payload: entity,
        }))
    }

    /// Audit a template supplied as YAML text.
    ///
    /// GitHub checks are not applicable here and stay `None`.
    ///
    /// # Errors
    /// - `MissingField` - no YAML given
    /// - `Parse` - the text is not valid YAML
    pub async fn validate_by_document(&self, yaml_text: Option<&str>) -> Result<AuditResult, AuditError> {
        let yaml_text = yaml_text
            .filter(|t| !t.is_empty())
            .ok_or(AuditError::MissingField("yamlText"))?;

        let parsed = parse_yaml_document(yaml_text)?;
        let doc = TemplateDocument::from_value(&parsed);
        let validation = validate_fields(&doc);
        let status = audit_status(&validation, GithubChecks::NotApplicable);

        Ok(self.record(AuditResult {
            template_name: doc.name.clone(),
            validation,
            readme_status: None,
            github_owner_status: None,
            date: self.clock.now_utc(),
            status,
            owner: doc.owner(),
            payload: parsed,
        }))
    }

    /// Stored results matching a filter.
    pub fn results(&self, filter: &ResultFilter) -> Vec<AuditResult> {
        self.store.query(filter)
    }

    /// Run both GitHub checks. A check that errors degrades to `None`.
    async fn github_checks(&self, repo: &GithubRepo) -> (Option<bool>, Option<bool>) {
        let readme = match self.github.readme_exists(repo).await {
            Ok(found) => Some(found),
            Err(e) => {
                warn!(org = %repo.org, repo = %repo.repo, error = %e, "README check skipped");
                None
            }
        };
        let owner = match self.github.owner_exists(repo).await {
            Ok(found) => Some(found),
            Err(e) => {
                warn!(org = %repo.org, error = %e, "owner check skipped");
                None
            }
        };
        (readme, owner)
    }

    fn record(&self, result: AuditResult) -> AuditResult {
        self.store.push(result.clone());
        info!(
            template = result.template_name.as_deref().unwrap_or("<unnamed>"),
            status = result.status.as_str(),
            stored = self.store.len(),
            "template audited"
        );
        self.notifier.notify(&result);
        result
    }
}

/// Parse YAML text into a JSON value.
///
/// # Errors
/// `Parse` with the parser's diagnostic (including the position when known).
pub fn parse_yaml_document(text: &str) -> Result<Value, AuditError> {
    serde_yaml::from_str::<Value>(text).map_err(|e| AuditError::Parse(e.to_string()))
}
