//! Integration-style tests for the donor_match module.
//!
//! Key points:
//! - Each test runs on a fresh in-memory SQLite DB and applies migrations.
//! - Service is wired to the SeaORM repository and a fixed clock.
//! - Local client is tested against the same Service.
//! - REST layer is exercised via an Axum Router registered through real routes.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tower::ServiceExt;
use uuid::Uuid;

use donor_match::{
    api::rest::dto::{BloodRequestDto, DonorDto, EligibilityDto, MatchListDto},
    contract::client::DonorMatchApi,
    contract::error::DonorMatchError,
    contract::model::{BloodGroup, EligibilityStatus, NewBloodRequest, NewDonor, Urgency},
    domain::clock::FixedClock,
    domain::error::DomainError,
    domain::repo::{DonorRepository, DuplicateContact},
    domain::service::{Service, ServiceConfig},
    gateways::local::DonorMatchLocalClient,
    infra::storage::{migrations::Migrator, sea_orm_repo::SeaOrmRepository},
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
}

/// Create a fresh test database for each test (in-memory SQLite) and run migrations.
async fn create_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to test database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

struct Harness {
    service: Arc<Service>,
    clock: Arc<FixedClock>,
    repo: Arc<SeaOrmRepository<DatabaseConnection>>,
}

async fn create_harness() -> Harness {
    let repo = Arc::new(SeaOrmRepository::new(create_test_db().await));
    let clock = Arc::new(FixedClock::new(t0()));
    let service = Arc::new(Service::new(
        repo.clone(),
        repo.clone(),
        clock.clone(),
        ServiceConfig::default(),
    ));
    Harness {
        service,
        clock,
        repo,
    }
}

async fn create_test_router(service: Arc<Service>) -> Router {
    donor_match::api::rest::routes::register_routes(Router::new(), service)
        .expect("Failed to register routes")
}

fn new_donor(name: &str, group: BloodGroup, location: &str, contact: &str) -> NewDonor {
    NewDonor {
        name: name.to_string(),
        blood_group: group,
        location: location.to_string(),
        contact: contact.to_string(),
    }
}

fn new_request(group: BloodGroup, location: &str, urgency: Urgency) -> NewBloodRequest {
    NewBloodRequest {
        blood_group: group,
        location: location.to_string(),
        hospital: "City General".to_string(),
        urgency,
    }
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> Result<T> {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&body)?)
}

#[tokio::test]
async fn test_register_and_match_flow() -> Result<()> {
    let h = create_harness().await;

    let a = h
        .service
        .register_donor(new_donor("A", BloodGroup::ONeg, "X", "100"))
        .await?;
    h.clock.advance(Duration::seconds(1));
    let b = h
        .service
        .register_donor(new_donor("B", BloodGroup::APos, "Y", "200"))
        .await?;
    h.clock.advance(Duration::seconds(1));
    let _c = h
        .service
        .register_donor(new_donor("C", BloodGroup::BPos, "Y", "300"))
        .await?;

    assert!(a.available);
    assert_eq!(a.points, 0);
    assert_eq!(a.last_donation, None);

    let request = h
        .service
        .create_request(new_request(BloodGroup::APos, "Y", Urgency::Normal))
        .await?;
    let set = h.service.match_request(request.id).await?;

    let ids: Vec<Uuid> = set.donors.iter().map(|m| m.donor.id).collect();
    assert_eq!(ids, vec![b.id, a.id]);
    assert!(set.donors[0].same_location);
    assert!(!set.donors[1].same_location);
    Ok(())
}

#[tokio::test]
async fn test_donation_updates_points_and_cooldown() -> Result<()> {
    let h = create_harness().await;
    let donor = h
        .service
        .register_donor(new_donor("A", BloodGroup::ONeg, "X", "100"))
        .await?;

    let updated = h.service.record_donation(donor.id, None).await?;
    assert_eq!(updated.points, 10);
    assert_eq!(updated.last_donation, Some(t0()));

    // Persisted, not just returned
    let stored = h.service.get_donor(donor.id).await?;
    assert_eq!(stored, updated);

    let request = h
        .service
        .create_request(new_request(BloodGroup::AbPos, "X", Urgency::Emergency))
        .await?;
    assert!(h.service.match_request(request.id).await?.donors.is_empty());

    h.clock.advance(Duration::days(89));
    assert_eq!(
        h.service.eligibility(donor.id).await?,
        EligibilityStatus::CoolingDown {
            eligible_from: t0() + Duration::days(90)
        }
    );

    h.clock.advance(Duration::days(1));
    assert_eq!(h.service.eligibility(donor.id).await?, EligibilityStatus::Eligible);
    assert_eq!(h.service.match_request(request.id).await?.donors.len(), 1);

    let again = h.service.record_donation(donor.id, None).await?;
    assert_eq!(again.points, 20);
    Ok(())
}

#[tokio::test]
async fn test_backdated_donation_is_rejected() -> Result<()> {
    let h = create_harness().await;
    let donor = h
        .service
        .register_donor(new_donor("A", BloodGroup::ONeg, "X", "100"))
        .await?;
    h.service.record_donation(donor.id, Some(t0())).await?;

    let err = h
        .service
        .record_donation(donor.id, Some(t0() - Duration::days(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput { .. }));

    // Unchanged
    assert_eq!(h.service.get_donor(donor.id).await?.points, 10);
    Ok(())
}

#[tokio::test]
async fn test_stale_snapshot_does_not_double_award() -> Result<()> {
    let h = create_harness().await;
    let donor = h
        .service
        .register_donor(new_donor("A", BloodGroup::ONeg, "X", "100"))
        .await?;
    let stale = h.service.get_donor(donor.id).await?;

    h.service.record_donation(donor.id, None).await?;

    let mut lost = stale.clone();
    lost.points += 10;
    lost.last_donation = Some(t0());
    let applied = h.repo.compare_and_update_donation(&stale, &lost).await?;
    assert!(!applied);
    assert_eq!(h.service.get_donor(donor.id).await?.points, 10);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_contact_is_rejected() -> Result<()> {
    let h = create_harness().await;
    h.service
        .register_donor(new_donor("A", BloodGroup::ONeg, "X", "555"))
        .await?;

    let err = h
        .service
        .register_donor(new_donor("B", BloodGroup::APos, "Y", " 555 "))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::ContactAlreadyExists { .. }));
    Ok(())
}

#[tokio::test]
async fn test_unique_index_reports_duplicate_contact() -> Result<()> {
    let h = create_harness().await;
    let first = h
        .service
        .register_donor(new_donor("A", BloodGroup::ONeg, "X", "555"))
        .await?;

    // Bypass the service pre-check, as a racing registration would
    let twin = donor_match::contract::model::Donor {
        id: Uuid::new_v4(),
        ..first
    };
    let err = DonorRepository::insert(h.repo.as_ref(), twin).await.unwrap_err();
    assert!(err.is::<DuplicateContact>());
    Ok(())
}

#[tokio::test]
async fn test_availability_toggle_excludes_from_matches() -> Result<()> {
    let h = create_harness().await;
    let donor = h
        .service
        .register_donor(new_donor("A", BloodGroup::ONeg, "X", "100"))
        .await?;
    let request = h
        .service
        .create_request(new_request(BloodGroup::ONeg, "X", Urgency::Normal))
        .await?;

    let off = h.service.toggle_availability(donor.id).await?;
    assert!(!off.available);
    assert_eq!(h.service.eligibility(donor.id).await?, EligibilityStatus::Unavailable);
    assert!(h.service.match_request(request.id).await?.donors.is_empty());

    let on = h.service.set_availability(donor.id, true).await?;
    assert!(on.available);
    assert_eq!(h.service.match_request(request.id).await?.donors.len(), 1);

    let missing = h.service.toggle_availability(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(missing, DomainError::DonorNotFound { .. }));
    Ok(())
}

#[tokio::test]
async fn test_requests_list_emergencies_first() -> Result<()> {
    let h = create_harness().await;

    let old_normal = h
        .service
        .create_request(new_request(BloodGroup::APos, "X", Urgency::Normal))
        .await?;
    h.clock.advance(Duration::minutes(1));
    let emergency = h
        .service
        .create_request(new_request(BloodGroup::ONeg, "X", Urgency::Emergency))
        .await?;
    h.clock.advance(Duration::minutes(1));
    let new_normal = h
        .service
        .create_request(new_request(BloodGroup::BNeg, "Y", Urgency::Normal))
        .await?;

    let ids: Vec<Uuid> = h
        .service
        .list_requests()
        .await?
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec![emergency.id, new_normal.id, old_normal.id]);
    Ok(())
}

#[tokio::test]
async fn test_list_donors_pagination() -> Result<()> {
    let h = create_harness().await;
    for i in 0..5 {
        h.service
            .register_donor(new_donor(&format!("D{i}"), BloodGroup::OPos, "X", &format!("c{i}")))
            .await?;
        h.clock.advance(Duration::seconds(1));
    }

    let page = h.service.list_donors(Some(2), Some(1)).await?;
    let names: Vec<&str> = page.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["D1", "D2"]);
    assert_eq!(h.service.list_donors(None, None).await?.len(), 5);
    Ok(())
}

#[tokio::test]
async fn test_local_client() -> Result<()> {
    let h = create_harness().await;
    let client: Arc<dyn DonorMatchApi> = Arc::new(DonorMatchLocalClient::new(h.service.clone()));

    let donor = client
        .register_donor(new_donor("A", BloodGroup::OPos, "X", "100"))
        .await?;
    let request = client
        .create_request(new_request(BloodGroup::APos, "x ", Urgency::Normal))
        .await?;

    let set = client.find_matches(request.id).await?;
    assert_eq!(set.donors.len(), 1);
    assert!(set.donors[0].same_location);

    let updated = client.record_donation(donor.id, None).await?;
    assert_eq!(updated.points, 10);

    match client.get_donor(Uuid::new_v4()).await {
        Err(DonorMatchError::NotFound { .. }) => {}
        other => panic!("expected NotFound, got {other:?}"),
    }
    match client
        .register_donor(new_donor("B", BloodGroup::APos, "Y", "100"))
        .await
    {
        Err(DonorMatchError::Conflict { .. }) => {}
        other => panic!("expected Conflict, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_rest_register_and_get_donor() -> Result<()> {
    let h = create_harness().await;
    let router = create_test_router(h.service.clone()).await;

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/donors",
            serde_json::json!({
                "name": "Asha",
                "blood_group": "o-",
                "location": "Pune",
                "contact": "9000000001"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: DonorDto = read_json(response).await?;
    assert_eq!(created.blood_group, "O-");
    assert!(created.available);

    let request = Request::builder()
        .uri(format!("/donors/{}", created.id))
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: DonorDto = read_json(response).await?;
    assert_eq!(fetched.id, created.id);
    Ok(())
}

#[tokio::test]
async fn test_rest_invalid_blood_group_is_bad_request() -> Result<()> {
    let h = create_harness().await;
    let router = create_test_router(h.service.clone()).await;

    let response = router
        .oneshot(json_request(
            "POST",
            "/requests",
            serde_json::json!({
                "blood_group": "Q+",
                "location": "Pune",
                "hospital": "City General"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/problem+json"
    );
    let problem: serde_json::Value = read_json(response).await?;
    assert_eq!(problem["code"], "INVALID_INPUT");
    assert_eq!(problem["instance"], "/requests");
    Ok(())
}

#[tokio::test]
async fn test_rest_not_found_problems() -> Result<()> {
    let h = create_harness().await;
    let router = create_test_router(h.service.clone()).await;

    let request = Request::builder()
        .uri(format!("/donors/{}", Uuid::new_v4()))
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let problem: serde_json::Value = read_json(response).await?;
    assert_eq!(problem["code"], "DONORS_NOT_FOUND");

    let request = Request::builder()
        .uri(format!("/requests/{}/matches", Uuid::new_v4()))
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let problem: serde_json::Value = read_json(response).await?;
    assert_eq!(problem["code"], "REQUESTS_NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn test_rest_request_matching_and_donation() -> Result<()> {
    let h = create_harness().await;
    let router = create_test_router(h.service.clone()).await;

    let far = h
        .service
        .register_donor(new_donor("Far", BloodGroup::ONeg, "Delhi", "1"))
        .await?;
    h.clock.advance(Duration::seconds(1));
    let near = h
        .service
        .register_donor(new_donor("Near", BloodGroup::APos, "Pune", "2"))
        .await?;

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/requests",
            serde_json::json!({
                "blood_group": "A+",
                "location": "pune",
                "hospital": "City General",
                "emergency": true
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: BloodRequestDto = read_json(response).await?;
    assert!(created.emergency);
    assert_eq!(created.urgency, "emergency");

    let request = Request::builder()
        .uri(format!("/requests/{}/matches", created.id))
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let matches: MatchListDto = read_json(response).await?;
    assert!(matches.emergency);
    let ids: Vec<Uuid> = matches.donors.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![near.id, far.id]);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/donors/{}/donations", near.id),
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let donor: DonorDto = read_json(response).await?;
    assert_eq!(donor.points, 10);

    let request = Request::builder()
        .uri(format!("/donors/{}/eligibility", near.id))
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    let eligibility: EligibilityDto = read_json(response).await?;
    assert_eq!(eligibility.status, "cooling_down");
    assert_eq!(
        eligibility.eligible_from,
        Some(t0() + Duration::seconds(1) + Duration::days(90))
    );
    Ok(())
}

#[tokio::test]
async fn test_rest_donation_without_body_uses_clock() -> Result<()> {
    let h = create_harness().await;
    let router = create_test_router(h.service.clone()).await;
    let donor = h
        .service
        .register_donor(new_donor("A", BloodGroup::ONeg, "X", "200"))
        .await?;
    h.clock.advance(Duration::hours(2));

    let request = Request::builder()
        .method("POST")
        .uri(format!("/donors/{}/donations", donor.id))
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: DonorDto = read_json(response).await?;
    assert_eq!(updated.points, 10);
    assert_eq!(updated.last_donation, Some(t0() + Duration::hours(2)));
    Ok(())
}

#[tokio::test]
async fn test_rest_malformed_input_is_problem_json() -> Result<()> {
    let h = create_harness().await;
    let router = create_test_router(h.service.clone()).await;

    // Required fields missing
    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/donors",
            serde_json::json!({ "name": "A" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/problem+json"
    );
    let problem: serde_json::Value = read_json(response).await?;
    assert_eq!(problem["code"], "INVALID_INPUT");
    assert_eq!(problem["instance"], "/donors");

    // Not a UUID
    let request = Request::builder()
        .uri("/donors/not-a-uuid")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let problem: serde_json::Value = read_json(response).await?;
    assert_eq!(problem["code"], "INVALID_INPUT");

    // Broken JSON on the optional donation body
    let donor = h
        .service
        .register_donor(new_donor("B", BloodGroup::APos, "X", "201"))
        .await?;
    let request = Request::builder()
        .method("POST")
        .uri(format!("/donors/{}/donations", donor.id))
        .header("content-type", "application/json")
        .body(Body::from("{"))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/problem+json"
    );

    // Bad pagination value
    let request = Request::builder()
        .uri("/donors?limit=lots")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let problem: serde_json::Value = read_json(response).await?;
    assert_eq!(problem["code"], "INVALID_INPUT");

    let request = Request::builder()
        .uri("/donors?limit=5")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    let page: serde_json::Value = read_json(response).await?;
    assert_eq!(page["count"], 1);
    assert!(page.get("total").is_none());
    Ok(())
}

#[tokio::test]
async fn test_rest_availability_endpoints() -> Result<()> {
    let h = create_harness().await;
    let router = create_test_router(h.service.clone()).await;
    let donor = h
        .service
        .register_donor(new_donor("A", BloodGroup::ONeg, "X", "100"))
        .await?;

    let request = Request::builder()
        .method("POST")
        .uri(format!("/donors/{}/availability/toggle", donor.id))
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let toggled: DonorDto = read_json(response).await?;
    assert!(!toggled.available);

    let response = router
        .oneshot(json_request(
            "PUT",
            &format!("/donors/{}/availability", donor.id),
            serde_json::json!({ "available": true }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let restored: DonorDto = read_json(response).await?;
    assert!(restored.available);
    Ok(())
}
