use std::sync::Arc;

use axum::{
    http::{StatusCode, Uri},
    response::Json,
    Extension,
};
use tracing::{error, info};
use uuid::Uuid;

use crate::api::rest::dto::{
    BloodRequestDto, BloodRequestListDto, CreateRequestReq, DonorDto, DonorListDto,
    EligibilityDto, ListDonorsQuery, MatchListDto, RecordDonationReq, RegisterDonorReq,
    SetAvailabilityReq,
};
use crate::api::rest::error::map_domain_error;
use crate::api::rest::extract::{JsonBody, OptionalJsonBody, PathParam, QueryParams};
use crate::api::rest::problem::{Problem, ProblemResponse};
use crate::contract::model::{NewBloodRequest, NewDonor};
use crate::domain::service::Service;

/// Register a new donor
#[utoipa::path(
    post,
    path = "/donors",
    tag = "donors",
    request_body = RegisterDonorReq,
    responses(
        (status = 201, description = "Registered donor", body = DonorDto),
        (status = 400, description = "Bad Request", body = Problem, content_type = "application/problem+json"),
        (status = 409, description = "Contact already registered", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn register_donor(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    JsonBody(req_body): JsonBody<RegisterDonorReq>,
) -> Result<(StatusCode, Json<DonorDto>), ProblemResponse> {
    info!("Registering donor: {} ({})", req_body.name, req_body.blood_group);

    let result = match NewDonor::try_from(req_body) {
        Ok(new_donor) => svc.register_donor(new_donor).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(donor) => Ok((StatusCode::CREATED, Json(DonorDto::from(donor)))),
        Err(e) => {
            error!("Failed to register donor: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// List donors in registration order
#[utoipa::path(
    get,
    path = "/donors",
    tag = "donors",
    params(ListDonorsQuery),
    responses(
        (status = 200, description = "List of donors", body = DonorListDto),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn list_donors(
    Extension(svc): Extension<Arc<Service>>,
    QueryParams(query): QueryParams<ListDonorsQuery>,
    uri: Uri,
) -> Result<Json<DonorListDto>, ProblemResponse> {
    info!("Listing donors with query: {:?}", query);

    match svc.list_donors(query.limit, query.offset).await {
        Ok(donors) => {
            let donors: Vec<DonorDto> = donors.into_iter().map(DonorDto::from).collect();
            Ok(Json(DonorListDto {
                count: donors.len(),
                limit: query
                    .limit
                    .unwrap_or(svc.config().default_page_size)
                    .min(svc.config().max_page_size),
                offset: query.offset.unwrap_or(0),
                donors,
            }))
        }
        Err(e) => {
            error!("Failed to list donors: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Get a specific donor by ID
#[utoipa::path(
    get,
    path = "/donors/{id}",
    tag = "donors",
    params(("id" = Uuid, Path, description = "Donor UUID")),
    responses(
        (status = 200, description = "Donor found", body = DonorDto),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn get_donor(
    Extension(svc): Extension<Arc<Service>>,
    PathParam(id): PathParam<Uuid>,
    uri: Uri,
) -> Result<Json<DonorDto>, ProblemResponse> {
    info!("Getting donor with id: {}", id);

    match svc.get_donor(id).await {
        Ok(donor) => Ok(Json(DonorDto::from(donor))),
        Err(e) => {
            error!("Failed to get donor {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Whether the donor may donate right now
#[utoipa::path(
    get,
    path = "/donors/{id}/eligibility",
    tag = "donors",
    params(("id" = Uuid, Path, description = "Donor UUID")),
    responses(
        (status = 200, description = "Eligibility status", body = EligibilityDto),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn get_eligibility(
    Extension(svc): Extension<Arc<Service>>,
    PathParam(id): PathParam<Uuid>,
    uri: Uri,
) -> Result<Json<EligibilityDto>, ProblemResponse> {
    match svc.eligibility(id).await {
        Ok(status) => Ok(Json(EligibilityDto::for_donor(id, status))),
        Err(e) => {
            error!("Failed to evaluate eligibility for donor {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Flip the donor's availability flag
#[utoipa::path(
    post,
    path = "/donors/{id}/availability/toggle",
    tag = "donors",
    params(("id" = Uuid, Path, description = "Donor UUID")),
    responses(
        (status = 200, description = "Updated donor", body = DonorDto),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn toggle_availability(
    Extension(svc): Extension<Arc<Service>>,
    PathParam(id): PathParam<Uuid>,
    uri: Uri,
) -> Result<Json<DonorDto>, ProblemResponse> {
    info!("Toggling availability for donor {}", id);

    match svc.toggle_availability(id).await {
        Ok(donor) => Ok(Json(DonorDto::from(donor))),
        Err(e) => {
            error!("Failed to toggle availability for donor {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Set the donor's availability flag explicitly
#[utoipa::path(
    put,
    path = "/donors/{id}/availability",
    tag = "donors",
    params(("id" = Uuid, Path, description = "Donor UUID")),
    request_body = SetAvailabilityReq,
    responses(
        (status = 200, description = "Updated donor", body = DonorDto),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn set_availability(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(req_body): JsonBody<SetAvailabilityReq>,
) -> Result<Json<DonorDto>, ProblemResponse> {
    info!("Setting availability for donor {} to {}", id, req_body.available);

    match svc.set_availability(id, req_body.available).await {
        Ok(donor) => Ok(Json(DonorDto::from(donor))),
        Err(e) => {
            error!("Failed to set availability for donor {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Confirm a completed donation
#[utoipa::path(
    post,
    path = "/donors/{id}/donations",
    tag = "donors",
    params(("id" = Uuid, Path, description = "Donor UUID")),
    request_body(content = RecordDonationReq, description = "Optional; an empty body records a donation now"),
    responses(
        (status = 200, description = "Donor after the donation", body = DonorDto),
        (status = 400, description = "Bad Request", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
        (status = 409, description = "Concurrent update", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn record_donation(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    PathParam(id): PathParam<Uuid>,
    OptionalJsonBody(req_body): OptionalJsonBody<RecordDonationReq>,
) -> Result<Json<DonorDto>, ProblemResponse> {
    info!("Recording donation for donor {}", id);

    match svc.record_donation(id, req_body.donated_at).await {
        Ok(donor) => Ok(Json(DonorDto::from(donor))),
        Err(e) => {
            error!("Failed to record donation for donor {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Post a new blood request
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    request_body = CreateRequestReq,
    responses(
        (status = 201, description = "Created request", body = BloodRequestDto),
        (status = 400, description = "Bad Request", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn create_request(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    JsonBody(req_body): JsonBody<CreateRequestReq>,
) -> Result<(StatusCode, Json<BloodRequestDto>), ProblemResponse> {
    info!("Creating blood request: {:?}", req_body);

    let result = match NewBloodRequest::try_from(req_body) {
        Ok(new_request) => svc.create_request(new_request).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(request) => Ok((StatusCode::CREATED, Json(BloodRequestDto::from(request)))),
        Err(e) => {
            error!("Failed to create blood request: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// List blood requests, emergencies first
#[utoipa::path(
    get,
    path = "/requests",
    tag = "requests",
    responses(
        (status = 200, description = "List of requests", body = BloodRequestListDto),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn list_requests(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
) -> Result<Json<BloodRequestListDto>, ProblemResponse> {
    match svc.list_requests().await {
        Ok(requests) => {
            let requests: Vec<BloodRequestDto> =
                requests.into_iter().map(BloodRequestDto::from).collect();
            Ok(Json(BloodRequestListDto {
                total: requests.len(),
                requests,
            }))
        }
        Err(e) => {
            error!("Failed to list blood requests: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    get,
    path = "/requests/{id}",
    tag = "requests",
    params(("id" = Uuid, Path, description = "Request UUID")),
    responses(
        (status = 200, description = "Request found", body = BloodRequestDto),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn get_request(
    Extension(svc): Extension<Arc<Service>>,
    PathParam(id): PathParam<Uuid>,
    uri: Uri,
) -> Result<Json<BloodRequestDto>, ProblemResponse> {
    match svc.get_request(id).await {
        Ok(request) => Ok(Json(BloodRequestDto::from(request))),
        Err(e) => {
            error!("Failed to get blood request {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Eligible, compatible donors for a request; same-location donors first
#[utoipa::path(
    get,
    path = "/requests/{id}/matches",
    tag = "requests",
    params(("id" = Uuid, Path, description = "Request UUID")),
    responses(
        (status = 200, description = "Ranked donor matches", body = MatchListDto),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn get_matches(
    Extension(svc): Extension<Arc<Service>>,
    PathParam(id): PathParam<Uuid>,
    uri: Uri,
) -> Result<Json<MatchListDto>, ProblemResponse> {
    info!("Matching donors for request {}", id);

    match svc.match_request(id).await {
        Ok(set) => Ok(Json(MatchListDto::from(set))),
        Err(e) => {
            error!("Failed to match donors for request {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
