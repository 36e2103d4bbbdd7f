use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, NaiveDateTime, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use invoice_monitor::config::secrets::StaticSecretProvider;
use invoice_monitor::config::{AppConfig, SecretChain};
use invoice_monitor::domain::order::{Order, OrderStatus, OrderStore, StoreConnector};
use invoice_monitor::utils::AppError;
use invoice_monitor::{app, AppState};

const BOT_TOKEN: &str = "123:abc";
const CHAT_ID: &str = "-1001";
const SEND_MESSAGE_PATH: &str = "/bot123:abc/sendMessage";

// ===== Helper Functions =====

/// In-memory order store shared by every acquired connection
#[derive(Clone, Default)]
struct FakeConnector {
    orders: Vec<Order>,
}

#[async_trait]
impl StoreConnector for FakeConnector {
    async fn acquire(&self, _database_url: &str) -> Result<Box<dyn OrderStore>, AppError> {
        Ok(Box::new(self.clone()))
    }
}

#[async_trait]
impl OrderStore for FakeConnector {
    async fn find_unfinished_created_before(
        &self,
        cutoff: NaiveDateTime,
    ) -> Result<Vec<Order>, AppError> {
        Ok(self
            .orders
            .iter()
            .filter(|o| o.is_stuck(cutoff))
            .cloned()
            .collect())
    }

    async fn release(&self) -> Result<(), AppError> {
        Ok(())
    }
}

fn stuck_order() -> Order {
    Order {
        id: 17,
        external_order_id: "SHOP-4411".to_string(),
        status: OrderStatus::Processing,
        created_at: (Utc::now() - Duration::hours(40)).naive_utc(),
        updated_at: None,
        retry_count: 3,
        error_message: Some("Fiscalization timeout".to_string()),
    }
}

struct TestEnv {
    telegram: MockServer,
    worker: MockServer,
}

impl TestEnv {
    async fn start() -> Self {
        Self {
            telegram: MockServer::start().await,
            worker: MockServer::start().await,
        }
    }

    async fn worker_responds(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path("/api/v1/health"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.worker)
            .await;
    }

    fn app_config(&self) -> AppConfig {
        AppConfig {
            telegram_api_base: self.telegram.uri(),
            worker_fallback_url: format!("{}/api/v1", self.worker.uri()),
            source_label: "monitor.test".to_string(),
            ..AppConfig::default()
        }
    }

    fn router(&self, secrets: &[(&str, &str)], orders: Vec<Order>) -> Router {
        let secrets = SecretChain::new(vec![Box::new(StaticSecretProvider::from_pairs(secrets))]);
        app(AppState::new(
            self.app_config(),
            Arc::new(secrets),
            Arc::new(FakeConnector { orders }),
        ))
    }

    fn configured_router(&self, orders: Vec<Order>) -> Router {
        self.router(
            &[
                ("TELEGRAM_BOT_TOKEN", BOT_TOKEN),
                ("TELEGRAM_CHAT_ID", CHAT_ID),
                ("DATABASE_URL", "postgres://monitor@localhost/orders"),
            ],
            orders,
        )
    }
}

async fn parse_response_body(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn response_text(body: Body) -> String {
    let bytes = body.collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn create_json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn push_envelope(event: Value) -> Value {
    json!({
        "message": {
            "data": general_purpose::STANDARD.encode(event.to_string()),
            "messageId": "9001"
        },
        "subscription": "projects/lunette/subscriptions/notifier"
    })
}

// ===== Health Check Tests =====

mod health {
    use super::*;

    #[tokio::test]
    async fn should_report_own_liveness() {
        let env = TestEnv::start().await;
        let app = env.router(&[], vec![]);

        let response = app.oneshot(get("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_response_body(response.into_body()).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "invoicing-monitoring");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn should_echo_request_id_header() {
        let env = TestEnv::start().await;
        let app = env.router(&[], vec![]);
        let request = Request::builder()
            .uri("/health")
            .header("x-request-id", "req-42")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.headers()["x-request-id"], "req-42");
    }
}

// ===== Monitor API Tests =====

mod monitor_api {
    use super::*;

    #[tokio::test]
    async fn should_alert_on_stuck_jobs_and_return_summary() {
        // Arrange
        let env = TestEnv::start().await;
        env.worker_responds(200).await;
        Mock::given(method("POST"))
            .and(path(SEND_MESSAGE_PATH))
            .and(body_partial_json(json!({"chat_id": CHAT_ID, "parse_mode": "HTML"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&env.telegram)
            .await;
        let app = env.configured_router(vec![stuck_order()]);

        // Act
        let response = app.oneshot(get("/monitor?format=json")).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_response_body(response.into_body()).await;
        assert_eq!(body["status"], "completed");
        assert_eq!(body["overall_status"], "issues");
        assert_eq!(body["stuck_jobs_count"], 1);
        assert_eq!(body["stuck_jobs"][0]["external_order_id"], "SHOP-4411");
        assert_eq!(body["worker_healthy"], true);
        assert_eq!(body["alerts_sent"], 1);
        assert_eq!(body["telegram_alert_sent"], true);
    }

    #[tokio::test]
    async fn should_alert_on_unhealthy_worker() {
        // Arrange
        let env = TestEnv::start().await;
        env.worker_responds(503).await;
        Mock::given(method("POST"))
            .and(path(SEND_MESSAGE_PATH))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&env.telegram)
            .await;
        let app = env.configured_router(vec![]);

        // Act
        let response = app.oneshot(get("/monitor?format=json")).await.unwrap();

        // Assert
        let body = parse_response_body(response.into_body()).await;
        assert_eq!(body["worker_healthy"], false);
        assert_eq!(body["worker_status"]["error"], "HTTP 503");
        assert_eq!(body["alerts_sent"], 1);
    }

    #[tokio::test]
    async fn should_return_500_when_database_url_missing() {
        let env = TestEnv::start().await;
        let app = env.router(&[], vec![]);

        let response = app.oneshot(get("/monitor?format=json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = parse_response_body(response.into_body()).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "DATABASE_URL secret not found");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn should_render_dashboard_by_default() {
        // Arrange
        let env = TestEnv::start().await;
        env.worker_responds(200).await;
        let app = env.configured_router(vec![]);

        // Act
        let response = app.oneshot(get("/")).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/html"));
        let page = response_text(response.into_body()).await;
        assert!(page.contains("Invoicing System Monitor"));
        assert!(page.contains("All systems operational"));
    }

    #[tokio::test]
    async fn should_render_error_dashboard_with_500() {
        let env = TestEnv::start().await;
        let app = env.router(&[], vec![]);

        let response = app.oneshot(get("/monitor")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let page = response_text(response.into_body()).await;
        assert!(page.contains("DATABASE_URL secret not found"));
    }
}

// ===== Send Alert API Tests =====

mod send_alert_api {
    use super::*;

    #[tokio::test]
    async fn should_send_test_alert_with_source_label() {
        // Arrange
        let env = TestEnv::start().await;
        Mock::given(method("POST"))
            .and(path(SEND_MESSAGE_PATH))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&env.telegram)
            .await;
        let app = env.configured_router(vec![]);
        let request = Request::builder()
            .method("POST")
            .uri("/send-alert?format=json")
            .body(Body::empty())
            .unwrap();

        // Act
        let response = app.oneshot(request).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_response_body(response.into_body()).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "Test alert sent");

        let requests = env.telegram.received_requests().await.unwrap();
        let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!(sent["text"].as_str().unwrap().contains("🌐 Source: monitor.test"));
    }

    #[tokio::test]
    async fn should_report_failed_when_telegram_rejects() {
        let env = TestEnv::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&env.telegram)
            .await;
        let app = env.configured_router(vec![]);

        let response = app.oneshot(get("/send-alert?format=json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_response_body(response.into_body()).await;
        assert_eq!(body["status"], "failed");
    }

    #[tokio::test]
    async fn should_redirect_to_dashboard_without_format() {
        let env = TestEnv::start().await;
        let app = env.router(&[], vec![]);

        let response = app.oneshot(get("/send-alert")).await.unwrap();

        let page = response_text(response.into_body()).await;
        assert!(page.contains("Failed to send test alert"));
        assert!(page.contains("window.location.href = '/'"));
    }
}

// ===== Notify API Tests =====

mod notify_api {
    use super::*;

    #[tokio::test]
    async fn should_forward_finished_build_as_markdown() {
        // Arrange
        let env = TestEnv::start().await;
        Mock::given(method("POST"))
            .and(path(SEND_MESSAGE_PATH))
            .and(body_partial_json(json!({"parse_mode": "Markdown"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&env.telegram)
            .await;
        let app = env.configured_router(vec![]);
        let envelope = push_envelope(json!({
            "status": "FAILURE",
            "projectId": "lunette",
            "id": "b-77",
            "substitutions": {"REPO_NAME": "invoicing", "BRANCH_NAME": "main"}
        }));

        // Act
        let response = app
            .oneshot(create_json_request("/notify", envelope))
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_response_body(response.into_body()).await;
        assert_eq!(body["outcome"], "sent");
        assert_eq!(body["messageId"], "9001");

        let requests = env.telegram.received_requests().await.unwrap();
        let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!(sent["text"].as_str().unwrap().starts_with("❌ *Build FAILURE*"));
    }

    #[tokio::test]
    async fn should_acknowledge_running_build_without_sending() {
        let env = TestEnv::start().await;
        let app = env.configured_router(vec![]);
        let envelope = push_envelope(json!({"status": "WORKING", "projectId": "p", "id": "b1"}));

        let response = app
            .oneshot(create_json_request("/notify", envelope))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_response_body(response.into_body()).await;
        assert_eq!(body["outcome"], "ignored");
        assert!(env.telegram.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_acknowledge_malformed_payload() {
        let env = TestEnv::start().await;
        let app = env.configured_router(vec![]);
        let envelope = json!({"message": {"data": "%%%"}});

        let response = app
            .oneshot(create_json_request("/notify", envelope))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_response_body(response.into_body()).await;
        assert_eq!(body["outcome"], "failed");
    }

    #[tokio::test]
    async fn should_drop_event_when_telegram_not_configured() {
        let env = TestEnv::start().await;
        let app = env.router(&[], vec![]);

        let response = app
            .oneshot(create_json_request(
                "/notify",
                push_envelope(json!({"invoice_id": "inv-1"})),
            ))
            .await
            .unwrap();

        let body = parse_response_body(response.into_body()).await;
        assert_eq!(body["outcome"], "not_configured");
    }

    #[tokio::test]
    async fn should_return_400_for_invalid_envelope() {
        let env = TestEnv::start().await;
        let app = env.configured_router(vec![]);

        let response = app
            .oneshot(create_json_request("/notify", json!({"subscription": "s"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = parse_response_body(response.into_body()).await;
        assert_eq!(body["isSuccess"], false);
        assert_eq!(body["code"], "COMMON400");
    }
}
