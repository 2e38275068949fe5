//! Audit records and the typed view of template documents.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Annotation that points at a template's source repository.
pub const SOURCE_LOCATION_ANNOTATION: &str = "backstage.io/source-location";

/// Overall verdict of an audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditStatus {
    /// Every applicable check passed.
    Pass,
    /// At least one applicable check failed or was not determined.
    Fail,
}

impl AuditStatus {
    /// Wire representation (`PASS` / `FAIL`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
        }
    }
}

/// Presence checks on the template's required fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValidation {
    /// `spec.description` is a truthy scalar.
    pub description: bool,
    /// `spec.tags` is a non-empty list.
    pub tags: bool,
    /// `spec.owner` is a truthy scalar.
    pub owner: bool,
}

impl FieldValidation {
    /// Whether all three fields are present.
    pub fn all_present(&self) -> bool {
        self.description && self.tags && self.owner
    }
}

/// The record produced for every validation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResult {
    /// Template name (catalog name, or `metadata.name` of a document).
    pub template_name: Option<String>,

    /// Field presence checks.
    pub validation: FieldValidation,

    /// README.md exists at the repository root; `None` when not checked.
    pub readme_status: Option<bool>,

    /// The GitHub org/user exists; `None` when not checked.
    pub github_owner_status: Option<bool>,

    /// When the audit ran.
    #[serde(with = "iso_millis")]
    pub date: DateTime<Utc>,

    /// Overall verdict.
    pub status: AuditStatus,

    /// `spec.owner` of the template, if it is a string.
    pub owner: Option<String>,

    /// The audited document as received.
    pub payload: Value,
}

impl AuditResult {
    /// The `date` field exactly as it appears on the wire.
    pub fn date_string(&self) -> String {
        format_timestamp(&self.date)
    }
}

/// Format a timestamp as ISO-8601 with millisecond precision and a `Z` suffix.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

mod iso_millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Body of `POST /validate/templateName`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateByNameRequest {
    /// Catalog name of the template.
    #[serde(default)]
    pub template_name: Option<String>,
}

/// Body of `POST /validate/yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateByDocumentRequest {
    /// Raw template YAML.
    #[serde(default)]
    pub yaml_text: Option<String>,
}

/// Typed view of the parts of a template entity the audit looks at.
///
/// Built by explicit extraction from an arbitrary JSON value: anything of the
/// wrong shape is treated as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateDocument {
    /// `metadata.name`.
    pub name: Option<String>,
    /// `spec`, when it is a mapping.
    pub spec: Option<TemplateSpec>,
}

/// A scalar field value as written in the document.
///
/// Mappings and lists are not scalars and are treated as absent.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// A string.
    Text(String),
    /// A number, integer or float.
    Number(Number),
    /// A boolean.
    Bool(bool),
}

impl Scalar {
    /// Extract a scalar; `null`, mappings and lists yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Number(n) => Some(Self::Number(n.clone())),
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Whether the value counts as present: anything but `""`, `0` and `false`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Text(s) => !s.is_empty(),
            Self::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            Self::Bool(b) => *b,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{}", n),
            Self::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// The `spec` section of a template entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateSpec {
    /// `spec.description`, when a scalar.
    pub description: Option<Scalar>,
    /// `spec.tags`, when a list. Non-string items are kept in their JSON form.
    pub tags: Option<Vec<String>>,
    /// `spec.owner`, when a scalar.
    pub owner: Option<Scalar>,
    /// `spec.annotations`, string values only.
    pub annotations: BTreeMap<String, String>,
}

impl TemplateDocument {
    /// Extract the audited fields from a parsed entity or document.
    pub fn from_value(value: &Value) -> Self {
        let name = value
            .get("metadata")
            .and_then(|m| m.get("name"))
            .and_then(Value::as_str)
            .map(String::from);

        let spec = value
            .get("spec")
            .and_then(Value::as_object)
            .map(|spec| TemplateSpec {
                description: spec.get("description").and_then(Scalar::from_value),
                tags: spec.get("tags").and_then(Value::as_array).map(|items| {
                    items
                        .iter()
                        .map(|item| match item {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect()
                }),
                owner: spec.get("owner").and_then(Scalar::from_value),
                annotations: spec
                    .get("annotations")
                    .and_then(Value::as_object)
                    .map(|map| {
                        map.iter()
                            .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                            .collect()
                    })
                    .unwrap_or_default(),
            });

        Self { name, spec }
    }

    /// `spec.owner` as text, if it is a scalar. Numbers and booleans are
    /// rendered in their YAML/JSON form (`1001`, `true`).
    pub fn owner(&self) -> Option<String> {
        self.spec
            .as_ref()
            .and_then(|s| s.owner.as_ref())
            .map(Scalar::to_string)
    }

    /// The source-location annotation, if present.
    pub fn source_location(&self) -> Option<&str> {
        self.spec
            .as_ref()
            .and_then(|s| s.annotations.get(SOURCE_LOCATION_ANNOTATION))
            .map(String::as_str)
    }
}
