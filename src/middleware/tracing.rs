use axum::{
    extract::{MatchedPath, Request},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{error, info, info_span, Instrument};

/// Request logging middleware: one span per request, carrying a fresh
/// request id, with outcome and latency recorded on completion.
pub async fn observability_middleware(
    matched_path: MatchedPath,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let route = matched_path.as_str().to_string();
    let start_time = Instant::now();

    let span = info_span!(
        "http_request",
        method = %method,
        uri = %uri,
        route = %route,
        request_id = %uuid::Uuid::now_v7(),
    );

    async move {
        let response = next.run(request).await;

        let status_code = response.status().as_u16();
        let latency_ms = start_time.elapsed().as_millis();
        if status_code >= 500 {
            error!(status = status_code, latency_ms, "Request failed");
        } else {
            info!(status = status_code, latency_ms, "Request completed");
        }

        response
    }
    .instrument(span)
    .await
}

/// Best-effort client address, preferring the proxy-set forwarding header.
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_ip_takes_first_forwarded_entry() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.9, 10.0.0.1".parse().unwrap());
        assert_eq!(client_ip(&headers), Some("203.0.113.9".to_string()));
    }

    #[test]
    fn client_ip_is_none_without_header() {
        assert_eq!(client_ip(&HeaderMap::new()), None);
    }
}
