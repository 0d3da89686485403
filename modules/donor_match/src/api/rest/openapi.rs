use utoipa::OpenApi;

use crate::api::rest::{dto, handlers, problem::Problem};

/// OpenAPI document for the donor-match REST surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Donor Match API",
        description = "Blood donor registry, eligibility and request matching"
    ),
    paths(
        handlers::register_donor,
        handlers::list_donors,
        handlers::get_donor,
        handlers::get_eligibility,
        handlers::toggle_availability,
        handlers::set_availability,
        handlers::record_donation,
        handlers::create_request,
        handlers::list_requests,
        handlers::get_request,
        handlers::get_matches,
    ),
    components(schemas(
        dto::DonorDto,
        dto::RegisterDonorReq,
        dto::DonorListDto,
        dto::SetAvailabilityReq,
        dto::RecordDonationReq,
        dto::EligibilityDto,
        dto::CreateRequestReq,
        dto::BloodRequestDto,
        dto::BloodRequestListDto,
        dto::MatchedDonorDto,
        dto::MatchListDto,
        Problem,
    )),
    tags(
        (name = "donors", description = "Donor registry and donation tracking"),
        (name = "requests", description = "Blood requests and donor matching"),
    )
)]
pub struct ApiDoc;

/// The document as a JSON value, ready to be served.
pub fn openapi_value() -> anyhow::Result<serde_json::Value> {
    Ok(serde_json::to_value(ApiDoc::openapi())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/donors",
            "/donors/{id}",
            "/donors/{id}/eligibility",
            "/donors/{id}/availability",
            "/donors/{id}/availability/toggle",
            "/donors/{id}/donations",
            "/requests",
            "/requests/{id}",
            "/requests/{id}/matches",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn problem_schema_is_published() {
        let value = openapi_value().unwrap();
        assert!(value["components"]["schemas"]["Problem"].is_object());
        assert_eq!(value["info"]["title"], "Donor Match API");
    }
}
