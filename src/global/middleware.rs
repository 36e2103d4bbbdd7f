use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::{info, warn, Instrument};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Paths polled by the platform; completed requests are not logged
const QUIET_PATHS: [&str; 1] = ["/health"];

#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// 요청마다 request id span을 생성하고 응답 헤더에 되돌려줍니다.
///
/// Cloud Run이 전달하는 `x-cloud-trace-context`가 있으면 trace id로 기록합니다.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let trace = request
        .headers()
        .get("x-cloud-trace-context")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split('/').next())
        .unwrap_or("")
        .to_string();

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        trace = %trace,
        method = %method,
        uri = %path,
    );

    let start = std::time::Instant::now();

    async move {
        let mut response = next.run(request).await;
        let duration_ms = start.elapsed().as_millis() as u64;
        let status = response.status();

        if status.is_server_error() {
            warn!(duration_ms, status = status.as_u16(), "request failed");
        } else if !QUIET_PATHS.contains(&path.as_str()) {
            info!(duration_ms, status = status.as_u16(), "request completed");
        }

        response.headers_mut().insert(
            REQUEST_ID_HEADER,
            request_id
                .parse()
                .unwrap_or_else(|_| HeaderValue::from_static("unknown")),
        );
        response
    }
    .instrument(span)
    .await
}
