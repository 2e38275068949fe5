//! Field presence checks and the PASS/FAIL rule.
//!
//! A template passes when:
//! - `spec.description` and `spec.owner` are scalars other than `""`, `0`
//!   and `false`
//! - `spec.tags` is a non-empty list
//! - on the catalog path, both GitHub checks came back `true`
//!
//! A GitHub check that was not run (`None`) counts as a failure.

use crate::protocol::models::{AuditStatus, FieldValidation, Scalar, TemplateDocument};

/// Which GitHub checks apply to an audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GithubChecks {
    /// Document audits never consult GitHub.
    NotApplicable,
    /// Catalog audits require both checks to be `Some(true)`.
    Required {
        /// README.md present.
        readme: Option<bool>,
        /// Org/user exists.
        owner: Option<bool>,
    },
}

/// Compute the three field presence checks.
pub fn validate_fields(doc: &TemplateDocument) -> FieldValidation {
    let Some(spec) = doc.spec.as_ref() else {
        return FieldValidation {
            description: false,
            tags: false,
            owner: false,
        };
    };

    FieldValidation {
        description: spec.description.as_ref().is_some_and(Scalar::is_truthy),
        tags: spec.tags.as_ref().is_some_and(|t| !t.is_empty()),
        owner: spec.owner.as_ref().is_some_and(Scalar::is_truthy),
    }
}

/// Combine field and GitHub checks into a verdict.
pub fn audit_status(validation: &FieldValidation, github: GithubChecks) -> AuditStatus {
    let github_ok = match github {
        GithubChecks::NotApplicable => true,
        GithubChecks::Required { readme, owner } => readme == Some(true) && owner == Some(true),
    };

    if validation.all_present() && github_ok {
        AuditStatus::Pass
    } else {
        AuditStatus::Fail
    }
}
