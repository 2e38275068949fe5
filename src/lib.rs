//! # template-audit
//!
//! **Audit service for software templates registered in a developer portal.**
//!
//! A template is audited either by catalog name or as a pasted YAML document.
//! Each audit checks that `spec.description`, `spec.tags` and `spec.owner` are
//! present; catalog audits additionally check, through the GitHub API, that
//! the source repository has a `README.md` and that its owning org/user exists.
//! Results are kept in memory, queryable over HTTP, and optionally forwarded
//! to a webhook.
//!
//! ## Features
//!
//! - **Token rotation** — GitHub calls rotate through configured tokens on 403/429
//! - **Typed documents** — templates are read through an explicit typed view
//! - **Best-effort webhook** — delivery failures never fail an audit
//! - **Deadlines** — every outbound call has a timeout
//!
//! ## Quickstart
//!
//! ```no_run
//! use template_audit::{AuditConfig, TemplateAuditor};
//!
//! # async fn run() -> Result<(), template_audit::AuditError> {
//! let config = AuditConfig::from_yaml_str(
//!     "templateAudit:\n  backstage:\n    catalogUrl: http://localhost:7007/api/catalog\n",
//! )?;
//! let auditor = TemplateAuditor::new(config)?;
//!
//! let result = auditor
//!     .validate_by_document(Some("spec:\n  description: d\n  owner: o\n  tags: [a]\n"))
//!     .await?;
//! println!("{}", result.status.as_str());
//! # Ok(())
//! # }
//! ```
//!
//! ## HTTP API
//!
//! - `POST /validate/templateName` — `{templateName}`
//! - `POST /validate/yaml` — `{yamlText}`
//! - `GET /results?templateName=&status=&owner=&date=`
//!
//! See [`http::build_router`].

#![deny(missing_docs)]

// Core modules
pub mod clock;
pub mod config;
pub mod errors;

// Protocol layer
pub mod protocol;

// Client layer
pub mod client;

// Rules
pub mod policy;

// Storage and forwarding
pub mod notify;
pub mod store;

// Auditor (main public API)
pub mod manager;

// HTTP surface
pub mod http;

// Re-exports for public API
pub use client::api::{ApiClientError, TemplateAuditClient, ValidationRequest};
pub use clock::{Clock, SystemClock};
pub use config::AuditConfig;
pub use errors::AuditError;
pub use manager::TemplateAuditor;
pub use protocol::models::{AuditResult, AuditStatus, FieldValidation};
pub use store::results::ResultFilter;

#[cfg(any(test, feature = "test-seams"))]
pub use clock::MockClock;
