pub mod config;
pub mod domain;
pub mod global;
pub mod monitoring;
pub mod notification;
pub mod shutdown;
pub mod state;
pub mod utils;

pub use state::AppState;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        domain::health::handler::health_check,
        domain::monitor::handler::monitor_handler,
        domain::monitor::handler::send_alert_handler,
        domain::webhook::handler::notify_handler,
    ),
    components(
        schemas(
            domain::health::dto::HealthStatus,
            domain::monitor::dto::MonitorErrorResponse,
            domain::monitor::dto::SendAlertResponse,
            domain::order::OrderStatus,
            domain::webhook::dto::PubSubPushEnvelope,
            domain::webhook::dto::PubSubMessage,
            domain::webhook::dto::NotifyResponse,
            monitoring::MonitoringSummary,
            monitoring::RunStatus,
            monitoring::OverallStatus,
            monitoring::StuckJobReport,
            monitoring::WorkerHealth,
            notification::NotifyOutcome,
            utils::response::ErrorResponse,
        )
    ),
    tags(
        (name = "Health", description = "서비스 상태 API"),
        (name = "Monitoring", description = "인보이스 시스템 모니터링 API"),
        (name = "Notification", description = "빌드/인보이스 이벤트 알림 API")
    )
)]
pub struct ApiDoc;

pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(domain::monitor::monitor_handler))
        .route("/monitor", get(domain::monitor::monitor_handler))
        .route(
            "/send-alert",
            get(domain::monitor::send_alert_handler).post(domain::monitor::send_alert_handler),
        )
        .route("/health", get(domain::health::health_check))
        .route("/notify", post(domain::webhook::notify_handler))
        .layer(middleware::from_fn(
            global::middleware::request_id_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
