//! Template audit error types.

use thiserror::Error;

/// Errors that can occur while auditing templates.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A required request field is missing or empty.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The request body could not be read as JSON.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// The query string could not be read as a results filter.
    #[error("Invalid query string: {0}")]
    InvalidQuery(String),

    /// The catalog did not return the requested template.
    #[error("Template not found in catalog")]
    TemplateNotFound(String),

    /// Network or decoding failure talking to an upstream service.
    #[error("{context}")]
    Upstream {
        /// What was being attempted.
        context: String,
        /// Underlying failure message.
        details: String,
    },

    /// The supplied template document is not valid YAML.
    #[error("Invalid YAML")]
    Parse(String),

    /// No GitHub credentials are configured.
    #[error("No GitHub tokens available")]
    NoCredentials,
}

impl AuditError {
    /// Build an upstream error from a context message and a source error.
    pub fn upstream(context: impl Into<String>, details: impl std::fmt::Display) -> Self {
        Self::Upstream {
            context: context.into(),
            details: details.to_string(),
        }
    }

    /// Diagnostic details to surface next to the error message, if any.
    pub fn details(&self) -> Option<&str> {
        match self {
            Self::Upstream { details, .. } => Some(details),
            Self::Parse(details) => Some(details),
            _ => None,
        }
    }
}
