//! Router construction and request logging.

use crate::http::handlers;
use crate::manager::TemplateAuditor;
use axum::body::Body;
use axum::http::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, Instrument};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// The single auditor created at startup.
    pub auditor: Arc<TemplateAuditor>,
}

impl AppState {
    /// Wrap an auditor for sharing.
    pub fn new(auditor: TemplateAuditor) -> Self {
        Self {
            auditor: Arc::new(auditor),
        }
    }
}

/// Routes relative to the plugin mount point.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route(
            "/validate/templateName",
            post(handlers::validate_by_name_handler),
        )
        .route("/validate/yaml", post(handlers::validate_by_document_handler))
        .route("/results", get(handlers::results_handler))
        .with_state(state)
}

/// Full application: routes mounted under `base_path`, with request logging.
pub fn build_app(state: AppState, base_path: &str) -> Router {
    let router = build_router(state);
    let base_path = base_path.trim_end_matches('/');
    let app = if base_path.is_empty() {
        router
    } else {
        Router::new().nest(base_path, router)
    };
    app.layer(middleware::from_fn(request_logging_middleware))
}

async fn request_logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().to_string();
    let route = request.uri().path().to_string();
    let span = tracing::info_span!("http.request", method = %method, route = %route);

    let started = Instant::now();
    let response = next.run(request).instrument(span.clone()).await;
    span.in_scope(|| {
        info!(
            status = response.status().as_u16(),
            latency_ms = started.elapsed().as_millis() as u64,
            "request completed"
        )
    });
    response
}
