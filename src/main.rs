#![forbid(unsafe_code)]

use std::env;
use std::path::PathBuf;
use template_audit::http::{build_app, AppState};
use template_audit::{AuditConfig, TemplateAuditor};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env_bool("TEMPLATE_AUDIT_LOG_JSON", false) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn config_path() -> PathBuf {
    env::args()
        .nth(1)
        .or_else(|| env::var("TEMPLATE_AUDIT_CONFIG").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("app-config.yaml"))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing();

    let mut config = AuditConfig::load(&config_path()).map_err(|e| e.to_string())?;
    if let Ok(bind) = env::var("TEMPLATE_AUDIT_BIND") {
        config.bind = bind;
    }
    config.validate().map_err(|e| e.to_string())?;

    let bind = config.bind.clone();
    let base_path = config.base_path.clone();
    info!(
        github_tokens = config.github_tokens.len(),
        catalog = config.catalog_url.as_deref().unwrap_or("<unset>"),
        webhook = config.webhook_url.is_some(),
        "configuration loaded"
    );

    let auditor = TemplateAuditor::new(config).map_err(|e| e.to_string())?;
    let app = build_app(AppState::new(auditor), &base_path);

    let listener = TcpListener::bind(&bind)
        .await
        .map_err(|e| format!("failed to bind {}: {}", bind, e))?;
    info!(%bind, base_path = %base_path, "template audit service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| e.to_string())
}
