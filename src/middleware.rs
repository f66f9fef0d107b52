use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{error, info, warn};

/// Logs every request with client address, duration and status.
pub async fn access_log_middleware(request: Request, next: Next) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let client_ip = get_client_ip(request.headers());

    info!("{} {} - IP: {}", method, uri, client_ip);

    let response = next.run(request).await;

    let duration = start_time.elapsed();
    let status = response.status();

    match status.as_u16() {
        400..=499 => warn!(
            "{} {} - IP: {} - Duration: {:?} - Status: {}",
            method, uri, client_ip, duration, status
        ),
        500..=599 => error!(
            "{} {} - IP: {} - Duration: {:?} - Status: {}",
            method, uri, client_ip, duration, status
        ),
        _ => info!(
            "{} {} - IP: {} - Duration: {:?} - Status: {}",
            method, uri, client_ip, duration, status
        ),
    }

    response
}

/// Best-effort client address from proxy headers.
fn get_client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .or_else(|| headers.get("x-real-ip").and_then(|h| h.to_str().ok()))
        .map(|s| s.to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}
