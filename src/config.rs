//! Template audit configuration.
//!
//! Configuration is read once at startup from an `app-config.yaml` style
//! document. Only the `templateAudit` section is consulted; everything else in
//! the file is ignored so the service can share a config file with the portal.

use crate::AuditError;
use reqwest::Url;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Default GitHub REST API base URL.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Default listen address (the portal backend's usual port).
pub const DEFAULT_BIND: &str = "0.0.0.0:7007";

/// Default mount point for the HTTP routes.
pub const DEFAULT_BASE_PATH: &str = "/api/template-audit";

/// Default per-request deadline for outbound calls, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Configuration for the template audit service.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// GitHub tokens used in round-robin order.
    pub github_tokens: Vec<String>,

    /// Base URL of the GitHub REST API.
    pub github_api_url: String,

    /// Webhook that receives every audit result (best effort).
    pub webhook_url: Option<String>,

    /// Base URL of the catalog API, e.g. `https://portal/api/catalog`.
    pub catalog_url: Option<String>,

    /// Bearer token presented to the catalog.
    pub catalog_token: Option<String>,

    /// Socket address the binary listens on.
    pub bind: String,

    /// Path prefix the routes are mounted under.
    pub base_path: String,

    /// Deadline applied to every outbound HTTP call.
    pub request_timeout: Duration,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            github_tokens: Vec::new(),
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            webhook_url: None,
            catalog_url: None,
            catalog_token: None,
            bind: DEFAULT_BIND.to_string(),
            base_path: DEFAULT_BASE_PATH.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAppConfig {
    #[serde(default)]
    template_audit: RawTemplateAudit,
}

#[derive(Debug, Default, Deserialize)]
struct RawTemplateAudit {
    #[serde(default)]
    github: RawGithub,
    #[serde(default)]
    webhook: RawWebhook,
    #[serde(default)]
    backstage: RawBackstage,
    #[serde(default)]
    server: RawServer,
    #[serde(default)]
    http: RawHttp,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGithub {
    #[serde(default)]
    tokens: Vec<String>,
    api_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWebhook {
    power_automate_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBackstage {
    catalog_url: Option<String>,
    token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawServer {
    bind: Option<String>,
    base_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawHttp {
    request_timeout_secs: Option<u64>,
}

impl AuditConfig {
    /// Parse configuration from YAML text.
    ///
    /// Missing keys fall back to their defaults. The result is validated.
    pub fn from_yaml_str(text: &str) -> Result<Self, AuditError> {
        // An empty document deserializes as unit, not as an empty mapping.
        let raw: RawAppConfig = if text.trim().is_empty() {
            RawAppConfig::default()
        } else {
            serde_yaml::from_str(text)
                .map_err(|e| AuditError::ConfigError(format!("Failed to parse config: {}", e)))?
        };
        let section = raw.template_audit;
        let defaults = Self::default();

        let config = Self {
            github_tokens: section
                .github
                .tokens
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            github_api_url: section
                .github
                .api_url
                .unwrap_or(defaults.github_api_url),
            webhook_url: non_empty(section.webhook.power_automate_url),
            catalog_url: non_empty(section.backstage.catalog_url),
            catalog_token: non_empty(section.backstage.token),
            bind: section.server.bind.unwrap_or(defaults.bind),
            base_path: section.server.base_path.unwrap_or(defaults.base_path),
            request_timeout: section
                .http
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    ///
    /// A missing file is not an error: the service starts with defaults.
    pub fn load(path: &Path) -> Result<Self, AuditError> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|e| {
            AuditError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&text)
    }

    /// Validate configuration for obvious errors.
    pub fn validate(&self) -> Result<(), AuditError> {
        check_url("templateAudit.github.apiUrl", &self.github_api_url)?;
        if let Some(url) = &self.catalog_url {
            check_url("templateAudit.backstage.catalogUrl", url)?;
        }
        if let Some(url) = &self.webhook_url {
            check_url("templateAudit.webhook.powerAutomateUrl", url)?;
        }
        self.bind.parse::<SocketAddr>().map_err(|e| {
            AuditError::ConfigError(format!(
                "templateAudit.server.bind must be a socket address, got {:?}: {}",
                self.bind, e
            ))
        })?;
        if !self.base_path.is_empty() && !self.base_path.starts_with('/') {
            return Err(AuditError::ConfigError(format!(
                "templateAudit.server.basePath must start with '/', got {:?}",
                self.base_path
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(AuditError::ConfigError(
                "templateAudit.http.requestTimeoutSecs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn check_url(key: &str, value: &str) -> Result<(), AuditError> {
    let url = Url::parse(value)
        .map_err(|e| AuditError::ConfigError(format!("{} is not a valid URL: {}", key, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(AuditError::ConfigError(format!(
            "{} must use http or https, got {}",
            key, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FULL: &str = r#"
app:
  title: Portal
templateAudit:
  github:
    tokens:
      - ghp_one
      - ""
      - ghp_two
  webhook:
    powerAutomateUrl: https://hooks.example.com/audit
  backstage:
    catalogUrl: http://localhost:7007/api/catalog
    token: catalog-secret
  server:
    bind: 127.0.0.1:9000
    basePath: /audit
  http:
    requestTimeoutSecs: 5
"#;

    #[test]
    fn test_full_config() {
        let config = AuditConfig::from_yaml_str(FULL).unwrap();
        assert_eq!(config.github_tokens, vec!["ghp_one", "ghp_two"]);
        assert_eq!(config.github_api_url, DEFAULT_GITHUB_API_URL);
        assert_eq!(
            config.webhook_url.as_deref(),
            Some("https://hooks.example.com/audit")
        );
        assert_eq!(
            config.catalog_url.as_deref(),
            Some("http://localhost:7007/api/catalog")
        );
        assert_eq!(config.catalog_token.as_deref(), Some("catalog-secret"));
        assert_eq!(config.bind, "127.0.0.1:9000");
        assert_eq!(config.base_path, "/audit");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_defaults_without_section() {
        let config = AuditConfig::from_yaml_str("app:\n  title: Portal\n").unwrap();
        assert!(config.github_tokens.is_empty());
        assert!(config.webhook_url.is_none());
        assert!(config.catalog_url.is_none());
        assert_eq!(config.bind, DEFAULT_BIND);
        assert_eq!(config.base_path, DEFAULT_BASE_PATH);
    }

    #[test]
    fn test_empty_document() {
        let config = AuditConfig::from_yaml_str("").unwrap();
        assert_eq!(config.github_api_url, DEFAULT_GITHUB_API_URL);
    }

    #[test]
    fn test_blank_webhook_is_none() {
        let config =
            AuditConfig::from_yaml_str("templateAudit:\n  webhook:\n    powerAutomateUrl: ''\n")
                .unwrap();
        assert!(config.webhook_url.is_none());
    }

    #[test]
    fn test_invalid_catalog_url() {
        let result = AuditConfig::from_yaml_str(
            "templateAudit:\n  backstage:\n    catalogUrl: not a url\n",
        );
        assert!(matches!(result, Err(AuditError::ConfigError(_))));
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let result = AuditConfig::from_yaml_str(
            "templateAudit:\n  webhook:\n    powerAutomateUrl: ftp://example.com/x\n",
        );
        assert!(matches!(result, Err(AuditError::ConfigError(_))));
    }

    #[test]
    fn test_invalid_bind() {
        let result = AuditConfig::from_yaml_str("templateAudit:\n  server:\n    bind: localhost\n");
        assert!(matches!(result, Err(AuditError::ConfigError(_))));
    }

    #[test]
    fn test_base_path_needs_slash() {
        let result =
            AuditConfig::from_yaml_str("templateAudit:\n  server:\n    basePath: audit\n");
        assert!(matches!(result, Err(AuditError::ConfigError(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result =
            AuditConfig::from_yaml_str("templateAudit:\n  http:\n    requestTimeoutSecs: 0\n");
        assert!(matches!(result, Err(AuditError::ConfigError(_))));
    }

    #[test]
    fn test_malformed_yaml() {
        let result = AuditConfig::from_yaml_str("templateAudit: [unclosed");
        assert!(matches!(result, Err(AuditError::ConfigError(_))));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = AuditConfig::load(&temp_dir.path().join("app-config.yaml")).unwrap();
        assert!(config.github_tokens.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app-config.yaml");
        std::fs::write(&path, FULL).unwrap();

        let config = AuditConfig::load(&path).unwrap();
        assert_eq!(config.github_tokens.len(), 2);
    }
}
