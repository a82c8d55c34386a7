use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::info;

pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let content_length = req
        .headers()
        .get(axum::http::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0);

    let response = next.run(req).await;

    let latency = start.elapsed();
    let status = response.status();

    info!(
        target: "metrics",
        method = %method,
        path = %path,
        status = %status.as_u16(),
        request_bytes = content_length,
        latency_ms = %latency.as_millis(),
        "request_completed"
    );

    response
}
