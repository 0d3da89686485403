use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, HeaderName, Request, Response, StatusCode, Uri},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use donor_match::api::rest::error::from_parts;
use donor_match::api::rest::openapi::openapi_value;
use donor_match::api::rest::problem::ProblemResponse;
use donor_match::DonorMatch;
use serde_json::{json, Value};
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{field::Empty, Span};

const BODY_LIMIT_BYTES: usize = 1024 * 1024;

fn request_id_header() -> HeaderName {
    HeaderName::from_static("x-request-id")
}

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn route_not_found(uri: Uri) -> ProblemResponse {
    from_parts(
        StatusCode::NOT_FOUND,
        "ROUTE_NOT_FOUND",
        "Not found",
        format!("No route for {}", uri.path()),
        uri.path(),
    )
}

/// Full application router: module routes, `/health`, `/openapi.json`
/// and the middleware stack.
pub fn build_router(module: &DonorMatch, timeout_sec: u64) -> Result<Router> {
    let mut router = module.register_rest(Router::new())?;

    // Build once, serve as static JSON
    let doc = Arc::new(openapi_value()?);
    router = router
        .route("/health", get(health_check))
        .route(
            "/openapi.json",
            get({
                let v = doc.clone();
                move || async move {
                    let json = Json((*v).clone());
                    ([(header::CACHE_CONTROL, "no-store")], json).into_response()
                }
            }),
        )
        .fallback(route_not_found);

    // The last layer added is the outermost one, so from the outside in:
    // SetRequestId -> PropagateRequestId -> Trace -> Timeout -> BodyLimit
    router = router.layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES));
    if timeout_sec > 0 {
        router = router.layer(TimeoutLayer::new(Duration::from_secs(timeout_sec)));
    }
    router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(|req: &Request<Body>| {
                let rid = req
                    .headers()
                    .get(request_id_header())
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("n/a");
                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri().path(),
                    version = ?req.version(),
                    request_id = %rid,
                    status = Empty,
                    latency_ms = Empty
                )
            })
            .on_response(|res: &Response<Body>, latency: Duration, span: &Span| {
                span.record("status", res.status().as_u16());
                span.record("latency_ms", u64::try_from(latency.as_millis()).unwrap_or(u64::MAX));
                tracing::debug!("request finished");
            }),
    );
    router = router.layer(PropagateRequestIdLayer::new(request_id_header()));
    router = router.layer(SetRequestIdLayer::new(request_id_header(), MakeRequestUuid));

    Ok(router)
}
