use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Extension, Router,
};

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Mount the donor-match REST routes onto `router`.
pub fn register_routes(router: Router, service: Arc<Service>) -> anyhow::Result<Router> {
    let router = router
        // donors
        .route(
            "/donors",
            post(handlers::register_donor).get(handlers::list_donors),
        )
        .route("/donors/{id}", get(handlers::get_donor))
        .route("/donors/{id}/eligibility", get(handlers::get_eligibility))
        .route("/donors/{id}/availability", put(handlers::set_availability))
        .route(
            "/donors/{id}/availability/toggle",
            post(handlers::toggle_availability),
        )
        .route("/donors/{id}/donations", post(handlers::record_donation))
        // requests
        .route(
            "/requests",
            post(handlers::create_request).get(handlers::list_requests),
        )
        .route("/requests/{id}", get(handlers::get_request))
        .route("/requests/{id}/matches", get(handlers::get_matches))
        .layer(Extension(service));

    tracing::debug!("Donor-match REST routes registered");
    Ok(router)
}
