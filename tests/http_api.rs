//! End-to-end tests: real router on a local port, upstreams on wiremock.

use serde_json::{json, Value};
use std::time::Duration;
use template_audit::http::{build_app, AppState};
use template_audit::{
    ApiClientError, AuditConfig, AuditStatus, ResultFilter, TemplateAuditClient, TemplateAuditor,
    ValidationRequest,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BASE: &str = "/api/template-audit";

const COMPLETE_YAML: &str = "metadata:\n  name: react-app\nspec:\n  description: React starter\n  owner: team-web\n  tags: [react]\n";

async fn serve(config: AuditConfig) -> String {
    let auditor = TemplateAuditor::new(config).expect("auditor");
    let app = build_app(AppState::new(auditor), BASE);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    format!("http://{}{}", addr, BASE)
}

fn upstream_config(upstream: &MockServer, tokens: &[&str]) -> AuditConfig {
    AuditConfig {
        github_tokens: tokens.iter().map(|t| t.to_string()).collect(),
        github_api_url: upstream.uri(),
        catalog_url: Some(format!("{}/api/catalog", upstream.uri())),
        catalog_token: Some("catalog-secret".to_string()),
        ..AuditConfig::default()
    }
}

async fn post_json(url: String, body: Value) -> (u16, Value) {
    let response = reqwest::Client::new()
        .post(url)
        .json(&body)
        .send()
        .await
        .expect("send request");
    let status = response.status().as_u16();
    let body = response.json().await.unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn health_reports_ok() {
    let base = serve(AuditConfig::default()).await;
    let body: Value = reqwest::get(format!("{}/health", base))
        .await
        .expect("health")
        .json()
        .await
        .expect("json");
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn validate_yaml_complete_document_passes() {
    let base = serve(AuditConfig::default()).await;
    let (status, body) = post_json(
        format!("{}/validate/yaml", base),
        json!({ "yamlText": COMPLETE_YAML }),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["status"], "PASS");
    assert_eq!(body["templateName"], "react-app");
    assert_eq!(body["owner"], "team-web");
    assert_eq!(body["readmeStatus"], Value::Null);
    assert_eq!(body["githubOwnerStatus"], Value::Null);
    assert_eq!(body["validation"], json!({ "description": true, "tags": true, "owner": true }));
    assert_eq!(body["payload"]["spec"]["tags"], json!(["react"]));
    assert!(body["date"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn validate_yaml_missing_owner_fails() {
    let base = serve(AuditConfig::default()).await;
    let (status, body) = post_json(
        format!("{}/validate/yaml", base),
        json!({ "yamlText": "spec:\n  description: d\n  tags: [a]\n" }),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["status"], "FAIL");
    assert_eq!(body["validation"]["owner"], false);
    assert_eq!(body["templateName"], Value::Null);
}

#[tokio::test]
async fn validate_yaml_rejects_bad_input() {
    let base = serve(AuditConfig::default()).await;

    let (status, body) = post_json(format!("{}/validate/yaml", base), json!({})).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "yamlText is required");

    let (status, body) = post_json(
        format!("{}/validate/yaml", base),
        json!({ "yamlText": "spec:\n  tags: [unclosed\n" }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Invalid YAML");
    assert!(!body["details"].as_str().unwrap_or("").is_empty());

    let results: Value = reqwest::get(format!("{}/results", base))
        .await
        .expect("results")
        .json()
        .await
        .expect("json");
    assert_eq!(results, json!([]));
}

#[tokio::test]
async fn validate_name_requires_field() {
    let base = serve(AuditConfig::default()).await;
    let (status, body) = post_json(format!("{}/validate/templateName", base), json!({})).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "templateName is required");

    let response = reqwest::Client::new()
        .post(format!("{}/validate/templateName", base))
        .body("not json")
        .send()
        .await
        .expect("send");
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn validate_name_unknown_template_is_404() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/catalog/entities/by-name/template/ghost"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "NotFound" })))
        .mount(&upstream)
        .await;

    let base = serve(upstream_config(&upstream, &["t1"])).await;
    let (status, body) = post_json(
        format!("{}/validate/templateName", base),
        json!({ "templateName": "ghost" }),
    )
    .await;

    assert_eq!(status, 404);
    assert_eq!(body["error"], "Template not found in catalog");
}

#[tokio::test]
async fn validate_name_unreachable_catalog_is_500() {
    let config = AuditConfig {
        catalog_url: Some("http://127.0.0.1:9/api/catalog".to_string()),
        ..AuditConfig::default()
    };
    let base = serve(config).await;
    let (status, body) = post_json(
        format!("{}/validate/templateName", base),
        json!({ "templateName": "react-app" }),
    )
    .await;

    assert_eq!(status, 500);
    assert_eq!(body["error"], "Failed to fetch or parse catalog response");
    assert!(body["details"].is_string());
}

#[tokio::test]
async fn validate_name_runs_github_checks_with_rotation() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/catalog/entities/by-name/template/react-app"))
        .and(header("authorization", "Bearer catalog-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "Template",
            "metadata": { "name": "react-app" },
            "spec": {
                "description": "React starter",
                "owner": "team-web",
                "tags": ["react"],
                "annotations": {
                    "backstage.io/source-location": "url:https://github.com/acme/react-app/tree/main/"
                }
            }
        })))
        .mount(&upstream)
        .await;
    // First token is rate limited on every call, second works.
    Mock::given(method("GET"))
        .and(header("authorization", "token limited"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/react-app/contents/README.md"))
        .and(header("authorization", "token good"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/acme"))
        .and(header("authorization", "token good"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&upstream)
        .await;

    let base = serve(upstream_config(&upstream, &["limited", "good"])).await;
    let client = TemplateAuditClient::new(base);
    let result = client
        .validate(ValidationRequest::ByName("react-app".to_string()))
        .await
        .expect("validate");

    assert_eq!(result.readme_status, Some(true));
    assert_eq!(result.github_owner_status, Some(true));
    assert_eq!(result.status, AuditStatus::Pass);
    assert_eq!(result.owner.as_deref(), Some("team-web"));
}

#[tokio::test]
async fn results_filter_by_status_and_owner() {
    let base = serve(AuditConfig::default()).await;
    let client = TemplateAuditClient::new(base);

    client
        .validate(ValidationRequest::ByDocument(COMPLETE_YAML.to_string()))
        .await
        .expect("first");
    client
        .validate(ValidationRequest::ByDocument(
            "metadata:\n  name: broken\nspec:\n  owner: team-ops\n".to_string(),
        ))
        .await
        .expect("second");

    let all = client.results(&ResultFilter::default()).await.expect("all");
    assert_eq!(all.len(), 2);

    let failed = client
        .results(&ResultFilter {
            status: Some("FAIL".to_string()),
            ..ResultFilter::default()
        })
        .await
        .expect("failed");
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].template_name.as_deref(), Some("broken"));

    let by_owner = client
        .results(&ResultFilter {
            owner: Some("team-web".to_string()),
            ..ResultFilter::default()
        })
        .await
        .expect("by owner");
    assert_eq!(by_owner.len(), 1);

    let today = all[0].date_string()[..10].to_string();
    let by_day = client
        .results(&ResultFilter {
            date: Some(today),
            ..ResultFilter::default()
        })
        .await
        .expect("by day");
    assert!(!by_day.is_empty());
}

#[tokio::test]
async fn results_rejects_repeated_filter_key() {
    let base = serve(AuditConfig::default()).await;
    let response = reqwest::get(format!("{}/results?status=PASS&status=FAIL", base))
        .await
        .expect("results");

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.expect("json error body");
    let message = body["error"].as_str().unwrap_or_default();
    assert!(message.starts_with("Invalid query string"), "{}", message);
}

#[tokio::test]
async fn client_reports_server_errors() {
    let base = serve(AuditConfig::default()).await;
    let client = TemplateAuditClient::new(base);
    let err = client
        .validate(ValidationRequest::ByDocument("a: [".to_string()))
        .await
        .unwrap_err();

    match err {
        ApiClientError::Server {
            status,
            message,
            details,
        } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid YAML");
            assert!(details.is_some());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn webhook_receives_result() {
    let hook = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/flow"))
        .and(body_partial_json(json!({ "templateName": "react-app", "status": "PASS" })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&hook)
        .await;

    let config = AuditConfig {
        webhook_url: Some(format!("{}/flow", hook.uri())),
        ..AuditConfig::default()
    };
    let base = serve(config).await;
    let (status, _) = post_json(
        format!("{}/validate/yaml", base),
        json!({ "yamlText": COMPLETE_YAML }),
    )
    .await;
    assert_eq!(status, 200);

    // Delivery is detached from the request; give it a moment to land.
    for _ in 0..50 {
        if !hook.received_requests().await.unwrap_or_default().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(hook.received_requests().await.unwrap_or_default().len(), 1);
}

#[tokio::test]
async fn failing_webhook_does_not_affect_response() {
    let hook = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&hook)
        .await;

    let config = AuditConfig {
        webhook_url: Some(hook.uri()),
        ..AuditConfig::default()
    };
    let base = serve(config).await;
    let (status, body) = post_json(
        format!("{}/validate/yaml", base),
        json!({ "yamlText": COMPLETE_YAML }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "PASS");
}
