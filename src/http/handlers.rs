//! Route handlers and error-to-response mapping.

use crate::http::routes::AppState;
use crate::protocol::models::{AuditResult, ValidateByDocumentRequest, ValidateByNameRequest};
use crate::store::results::ResultFilter;
use crate::AuditError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

impl AuditError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingField(_) | Self::InvalidBody(_) | Self::InvalidQuery(_) | Self::Parse(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::TemplateNotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream { .. } | Self::ConfigError(_) | Self::NoCredentials => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AuditError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, details = self.details().unwrap_or(""), "request failed");
        }
        let body = match self.details() {
            Some(details) => json!({ "error": self.to_string(), "details": details }),
            None => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

/// `POST /validate/templateName`
pub async fn validate_by_name_handler(
    State(state): State<AppState>,
    body: Result<Json<ValidateByNameRequest>, JsonRejection>,
) -> Result<Json<AuditResult>, AuditError> {
    let Json(request) = body.map_err(|e| AuditError::InvalidBody(e.body_text()))?;
    let result = state
        .auditor
        .validate_by_name(request.template_name.as_deref())
        .await?;
    Ok(Json(result))
}

/// `POST /validate/yaml`
pub async fn validate_by_document_handler(
    State(state): State<AppState>,
    body: Result<Json<ValidateByDocumentRequest>, JsonRejection>,
) -> Result<Json<AuditResult>, AuditError> {
    let Json(request) = body.map_err(|e| AuditError::InvalidBody(e.body_text()))?;
    let result = state
        .auditor
        .validate_by_document(request.yaml_text.as_deref())
        .await?;
    Ok(Json(result))
}

/// `GET /results`
pub async fn results_handler(
    State(state): State<AppState>,
    query: Result<Query<ResultFilter>, QueryRejection>,
) -> Result<Json<Vec<AuditResult>>, AuditError> {
    let Query(filter) = query.map_err(|e| AuditError::InvalidQuery(e.body_text()))?;
    Ok(Json(state.auditor.results(&filter)))
}

/// `GET /health`
pub async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
