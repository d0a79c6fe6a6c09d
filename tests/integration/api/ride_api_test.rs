//! Rides API integration tests
//!
//! Tests for request shape, status casing and error classification.

use std::time::Duration;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use ridedash::client::{RideApi, SessionStore};
use ridedash::shared::error::ApiError;
use ridedash::shared::ride::{RespondDecision, RideData, RideRequestStatus, RideStatus};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{
    auth_header, central_park, driver_identity, passenger_identity, ride_json, ride_request_json,
    signed_in, times_square, unreachable_client, MockBackend, TEST_TOKEN,
};

#[tokio::test]
async fn test_ride_requests_sends_token_and_parses_statuses() {
    let backend = MockBackend::start_with(signed_in(driver_identity())).await;

    let mut accepted = ride_request_json(8);
    accepted["status"] = json!("accepted");
    Mock::given(method("GET"))
        .and(path("/api/rides/ride-requests/"))
        .and(header("Authorization", auth_header(TEST_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([ride_request_json(7), accepted])))
        .expect(1)
        .mount(&backend.server)
        .await;

    let requests = backend.client.ride_requests().await.unwrap();

    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].id, "7");
    assert_eq!(requests[0].status, RideRequestStatus::Pending);
    assert_eq!(requests[1].status, RideRequestStatus::Accepted);
    assert_eq!(requests[0].pickup_location.address, "Times Square");
}

#[tokio::test]
async fn test_no_authorization_header_without_session() {
    let backend = MockBackend::start().await;

    Mock::given(method("GET"))
        .and(path("/api/rides/ride-requests/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&backend.server)
        .await;

    backend.client.ride_requests().await.unwrap();

    let received = backend.server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(!received[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_find_driver_posts_ride() {
    let backend = MockBackend::start_with(signed_in(passenger_identity())).await;
    let ride = RideData::new("5", times_square(), central_park());

    Mock::given(method("POST"))
        .and(path("/api/rides/match/"))
        .and(body_json(json!({
            "passenger": "5",
            "passenger_id": "5",
            "pickup_location": {"address": "Times Square", "latitude": 40.758, "longitude": -73.9855},
            "destination": {"address": "Central Park", "latitude": 40.7829, "longitude": -73.9654}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(ride_json(77, "ACCEPTED")))
        .expect(1)
        .mount(&backend.server)
        .await;

    let matched = backend.client.find_driver(&ride).await.unwrap();

    assert_eq!(matched.id.as_deref(), Some("77"));
    assert_eq!(matched.status, Some(RideStatus::Accepted));
}

#[tokio::test]
async fn test_respond_sends_uppercase_decision() {
    let backend = MockBackend::start_with(signed_in(driver_identity())).await;

    let mut responded = ride_request_json(7);
    responded["status"] = json!("ACCEPTED");
    Mock::given(method("POST"))
        .and(path("/api/rides/ride-requests/7/respond/"))
        .and(body_json(json!({"status": "ACCEPTED"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(responded))
        .expect(1)
        .mount(&backend.server)
        .await;

    let request = backend
        .client
        .respond_to_ride_request("7", RespondDecision::Accepted)
        .await
        .unwrap();

    assert_eq!(request.status, RideRequestStatus::Accepted);
}

#[tokio::test]
async fn test_cancel_ride_patches_status() {
    let backend = MockBackend::start_with(signed_in(passenger_identity())).await;

    Mock::given(method("PATCH"))
        .and(path("/api/rides/rides/12/"))
        .and(body_json(json!({"status": "cancelled"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(ride_json(12, "cancelled")))
        .expect(1)
        .mount(&backend.server)
        .await;

    let ride = backend.client.cancel_ride("12").await.unwrap();

    assert_eq!(ride.status, Some(RideStatus::Cancelled));
    assert!(!ride.is_cancellable());
}

#[tokio::test]
async fn test_accept_ride_assigns_driver() {
    let backend = MockBackend::start_with(signed_in(driver_identity())).await;

    let mut accepted = ride_json(12, "ACCEPTED");
    accepted["driver"] = json!(9);
    Mock::given(method("PATCH"))
        .and(path("/api/rides/rides/12/"))
        .and(body_json(json!({"driver": "9", "status": "ACCEPTED"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(accepted))
        .expect(1)
        .mount(&backend.server)
        .await;

    let ride = backend.client.accept_ride("12", "9").await.unwrap();

    assert_eq!(ride.driver.as_deref(), Some("9"));
    assert_eq!(ride.status, Some(RideStatus::Accepted));
}

#[tokio::test]
async fn test_ride_history_filters_by_passenger() {
    let backend = MockBackend::start_with(signed_in(passenger_identity())).await;

    Mock::given(method("GET"))
        .and(path("/api/rides/rides/"))
        .and(query_param("passenger", "5"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([ride_json(1, "completed"), ride_json(2, "pending")])),
        )
        .expect(1)
        .mount(&backend.server)
        .await;

    let rides = backend.client.ride_history("5").await.unwrap();

    assert_eq!(rides.len(), 2);
    assert_eq!(rides[0].passenger, "5");
    assert!(!rides[0].is_cancellable());
    assert!(rides[1].is_cancellable());
}

#[tokio::test]
async fn test_available_rides_requests_pending() {
    let backend = MockBackend::start_with(signed_in(driver_identity())).await;

    Mock::given(method("GET"))
        .and(path("/api/rides/rides/"))
        .and(query_param("status", "pending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([ride_json(3, "pending")])))
        .expect(1)
        .mount(&backend.server)
        .await;

    let rides = backend.client.available_rides().await.unwrap();
    assert_eq!(rides.len(), 1);
    assert_eq!(rides[0].status, Some(RideStatus::Pending));
}

#[tokio::test]
async fn test_unauthorized_invalidates_session() {
    let session = signed_in(driver_identity());
    let mut changes = session.subscribe();
    let backend = MockBackend::start_with(session.clone()).await;

    Mock::given(method("GET"))
        .and(path("/api/rides/ride-requests/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid token."})))
        .mount(&backend.server)
        .await;

    let result = backend.client.ride_requests().await;

    assert_matches!(result, Err(ApiError::Unauthorized));
    assert!(!session.is_authenticated());
    assert!(session.token().is_none());
    assert!(changes.has_changed().unwrap());
    assert!(changes.borrow_and_update().is_none());
}

#[tokio::test]
async fn test_late_unauthorized_keeps_newer_session() {
    let session = signed_in(driver_identity());
    let backend = MockBackend::start_with(session.clone()).await;

    Mock::given(method("GET"))
        .and(path("/api/rides/ride-requests/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "Invalid token."}))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&backend.server)
        .await;

    let sign_in_again = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        session.sign_out().unwrap();
        session.sign_in("fresh-token", driver_identity());
    };
    let (result, ()) = tokio::join!(backend.client.ride_requests(), sign_in_again);

    assert_matches!(result, Err(ApiError::Unauthorized));
    assert!(session.is_authenticated());
    assert_eq!(session.token().as_deref(), Some("fresh-token"));
}

#[tokio::test]
async fn test_error_detail_surfaces() {
    let backend = MockBackend::start_with(signed_in(driver_identity())).await;

    Mock::given(method("POST"))
        .and(path("/api/rides/ride-requests/7/respond/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Ride request already handled"})),
        )
        .mount(&backend.server)
        .await;

    let result = backend
        .client
        .respond_to_ride_request("7", RespondDecision::Rejected)
        .await;

    let error = result.unwrap_err();
    assert_eq!(error, ApiError::status(400, "Ride request already handled"));
    assert_eq!(error.status_code(), Some(400));
    // Other statuses leave the session alone
    assert!(backend.session.is_authenticated());
}

#[tokio::test]
async fn test_error_without_body_is_generic() {
    let backend = MockBackend::start().await;

    Mock::given(method("GET"))
        .and(path("/api/rides/rides/4/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&backend.server)
        .await;

    let error = backend.client.ride("4").await.unwrap_err();
    assert_eq!(
        error,
        ApiError::status(500, "Something went wrong. Please try again.")
    );
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let backend = MockBackend::start().await;

    Mock::given(method("GET"))
        .and(path("/api/rides/ride-requests/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&backend.server)
        .await;

    let result = backend.client.ride_requests().await;
    assert_matches!(result, Err(ApiError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let session = SessionStore::in_memory();
    let client = unreachable_client(session.clone());

    let result = client.ride_requests().await;

    assert_matches!(result, Err(ApiError::Network(_)));
    assert_eq!(
        result.unwrap_err().user_message(),
        "Unable to reach the server. Please check your connection."
    );
}

#[tokio::test]
async fn test_profile_roundtrip() {
    let backend = MockBackend::start_with(signed_in(passenger_identity())).await;

    Mock::given(method("GET"))
        .and(path("/api/users/5/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 5,
            "name": "Pat Passenger",
            "email": "pat@example.com",
            "role": "passenger"
        })))
        .mount(&backend.server)
        .await;

    let profile = backend.client.profile("5").await.unwrap();
    assert_eq!(profile.id, "5");
    assert_eq!(profile.role, "passenger");
    assert!(profile.phone.is_none());
}
