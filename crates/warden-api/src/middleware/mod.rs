//! Middleware stack for the API server
//!
//! Every request gets an `x-request-id`, a tracing span, a 30 s deadline
//! and the configured CORS policy.

use std::time::Duration;

use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, Method, Request, StatusCode},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::{Level, Span};
use warden_common::CorsConfig;

use crate::state::AppState;

/// Header name for request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Upper bound on handling a single request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Wrap the router in the middleware stack.
///
/// Layers run top to bottom on the way in: request id, propagation, trace,
/// timeout, CORS.
pub fn apply_middleware(
    router: Router<AppState>,
    cors_config: &CorsConfig,
    is_production: bool,
) -> Router<AppState> {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
            .layer(PropagateRequestIdLayer::new(request_id))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(request_span)
                    .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                    .on_response(
                        DefaultOnResponse::new()
                            .level(Level::INFO)
                            .latency_unit(LatencyUnit::Millis),
                    ),
            )
            .layer(TimeoutLayer::with_status_code(
                StatusCode::SERVICE_UNAVAILABLE,
                REQUEST_TIMEOUT,
            ))
            .layer(create_cors_layer(cors_config, is_production)),
    )
}

/// Span for one request. Only the path is recorded; query strings and bodies
/// may carry credentials.
fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}

/// Parse configured origins, dropping (and logging) any that are not valid header values
fn parse_origins(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect()
}

/// Create CORS layer from configuration
///
/// Configured origins are always honoured. With none configured, development
/// allows any origin and production allows none.
fn create_cors_layer(config: &CorsConfig, is_production: bool) -> CorsLayer {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            request_id.clone(),
        ])
        .expose_headers([request_id]);

    match (config.allowed_origins.is_empty(), is_production) {
        (false, _) => {
            let origins = parse_origins(&config.allowed_origins);
            tracing::info!(count = origins.len(), "CORS restricted to configured origins");
            layer.allow_origin(AllowOrigin::list(origins))
        }
        (true, true) => {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; browser requests will be refused");
            layer.allow_origin(AllowOrigin::list(Vec::<HeaderValue>::new()))
        }
        (true, false) => {
            tracing::warn!("CORS allows any origin outside production");
            layer.allow_origin(Any)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_skips_invalid() {
        let origins = vec![
            "https://app.example.com".to_string(),
            "bad\norigin".to_string(),
            "http://localhost:3000".to_string(),
        ];

        let parsed = parse_origins(&origins);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0], "https://app.example.com");
        assert_eq!(parsed[1], "http://localhost:3000");
    }

    #[test]
    fn test_request_span_tolerates_missing_id() {
        let request = Request::builder()
            .uri("/api/auth/login?password=leak")
            .body(Body::empty())
            .unwrap();
        // Builds without a request id header
        let _span = request_span(&request);
    }
}
