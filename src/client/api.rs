//! Rides API Client
//!
//! Typed wrapper over the rides backend. Every operation is a single
//! request/response pair; nothing is retried or batched. The session token is
//! attached as `Authorization: Token <value>` whenever one is present.
//!
//! A 401 invalidates the session that sent the request and surfaces as [`ApiError::Unauthorized`];
//! any other non-2xx response becomes [`ApiError::Status`] with the message
//! taken from the body's `detail` (or `message`) field.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, Request, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::client::config::Config;
use crate::client::session::SessionStore;
use crate::shared::error::ApiError;
use crate::shared::ride::{RespondDecision, RideData, RideRequest, RideStatus};
use crate::shared::user::{
    LoginRequest, LoginResponse, ProfileUpdate, RegisterRequest, Role, UserProfile,
};

const GENERIC_ERROR: &str = "Something went wrong. Please try again.";

/// Ride operations used by the workflows.
#[async_trait]
pub trait RideApi: Send + Sync {
    /// Create a ride
    async fn book_ride(&self, ride: &RideData) -> Result<RideData, ApiError>;
    /// Ask the backend to match the passenger with a driver
    async fn find_driver(&self, ride: &RideData) -> Result<RideData, ApiError>;
    async fn ride_history(&self, passenger_id: &str) -> Result<Vec<RideData>, ApiError>;
    async fn ride(&self, ride_id: &str) -> Result<RideData, ApiError>;
    async fn cancel_ride(&self, ride_id: &str) -> Result<RideData, ApiError>;
    /// Requests addressed to the signed-in driver
    async fn ride_requests(&self) -> Result<Vec<RideRequest>, ApiError>;
    async fn ride_request(&self, request_id: &str) -> Result<RideRequest, ApiError>;
    async fn respond_to_ride_request(
        &self,
        request_id: &str,
        decision: RespondDecision,
    ) -> Result<RideRequest, ApiError>;
    async fn available_rides(&self) -> Result<Vec<RideData>, ApiError>;
    async fn accept_ride(&self, ride_id: &str, driver_id: &str) -> Result<RideData, ApiError>;
    async fn complete_ride(&self, ride_id: &str) -> Result<RideData, ApiError>;
}

/// Authentication endpoints.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError>;
    /// Register; the endpoint depends on the role
    async fn register(&self, role: Role, request: &RegisterRequest) -> Result<(), ApiError>;
}

/// HTTP implementation of [`RideApi`] and [`AuthApi`].
#[derive(Debug, Clone)]
pub struct RideApiClient {
    config: Config,
    session: SessionStore,
    client: Client,
}

impl RideApiClient {
    pub fn new(config: Config, session: SessionStore) -> Self {
        Self {
            config,
            session,
            client: Client::new(),
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub async fn profile(&self, user_id: &str) -> Result<UserProfile, ApiError> {
        self.send(self.request(Method::GET, &format!("/api/users/{}/", user_id)))
            .await
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, ApiError> {
        self.send(
            self.request(Method::PATCH, &format!("/api/users/{}/", user_id))
                .json(update),
        )
        .await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.config.api_url(path);
        tracing::debug!(%method, %url, "api request");
        let builder = self.client.request(method, url);
        match self.session.token() {
            Some(token) => builder.header(AUTHORIZATION, format!("Token {}", token)),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = self.execute(builder).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Send and classify the status, leaving the body unread on success.
    async fn execute(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let request = builder
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let sent_token = sent_token(&request);
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(url = %response.url(), "authentication error from api");
            if let Some(token) = sent_token {
                self.session.invalidate(&token);
            }
            return Err(ApiError::Unauthorized);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);
        tracing::error!(status = status.as_u16(), %message, "api error");
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn patch_ride<B: Serialize + Sync>(&self, ride_id: &str, body: &B) -> Result<RideData, ApiError> {
        self.send(
            self.request(Method::PATCH, &format!("/api/rides/rides/{}/", ride_id))
                .json(body),
        )
        .await
    }
}

/// The session token a request was sent with.
fn sent_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Token "))
        .map(str::to_string)
}

/// `detail`, then `message`, then a generic text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["detail", "message"].iter().find_map(|key| {
                value
                    .get(key)
                    .and_then(|v| v.as_str())
                    .filter(|s| !s.trim().is_empty())
                    .map(str::to_string)
            })
        })
        .unwrap_or_else(|| GENERIC_ERROR.to_string())
}

#[async_trait]
impl RideApi for RideApiClient {
    async fn book_ride(&self, ride: &RideData) -> Result<RideData, ApiError> {
        self.send(self.request(Method::POST, "/api/rides/rides/").json(ride))
            .await
    }

    async fn find_driver(&self, ride: &RideData) -> Result<RideData, ApiError> {
        self.send(self.request(Method::POST, "/api/rides/match/").json(ride))
            .await
    }

    async fn ride_history(&self, passenger_id: &str) -> Result<Vec<RideData>, ApiError> {
        self.send(
            self.request(Method::GET, "/api/rides/rides/")
                .query(&[("passenger", passenger_id)]),
        )
        .await
    }

    async fn ride(&self, ride_id: &str) -> Result<RideData, ApiError> {
        self.send(self.request(Method::GET, &format!("/api/rides/rides/{}/", ride_id)))
            .await
    }

    async fn cancel_ride(&self, ride_id: &str) -> Result<RideData, ApiError> {
        self.patch_ride(ride_id, &json!({ "status": RideStatus::Cancelled }))
            .await
    }

    async fn ride_requests(&self) -> Result<Vec<RideRequest>, ApiError> {
        self.send(self.request(Method::GET, "/api/rides/ride-requests/"))
            .await
    }

    async fn ride_request(&self, request_id: &str) -> Result<RideRequest, ApiError> {
        self.send(self.request(
            Method::GET,
            &format!("/api/rides/ride-requests/{}/", request_id),
        ))
        .await
    }

    async fn respond_to_ride_request(
        &self,
        request_id: &str,
        decision: RespondDecision,
    ) -> Result<RideRequest, ApiError> {
        self.send(
            self.request(
                Method::POST,
                &format!("/api/rides/ride-requests/{}/respond/", request_id),
            )
            .json(&json!({ "status": decision })),
        )
        .await
    }

    async fn available_rides(&self) -> Result<Vec<RideData>, ApiError> {
        self.send(
            self.request(Method::GET, "/api/rides/rides/")
                .query(&[("status", RideStatus::Pending.as_wire())]),
        )
        .await
    }

    async fn accept_ride(&self, ride_id: &str, driver_id: &str) -> Result<RideData, ApiError> {
        self.patch_ride(
            ride_id,
            &json!({ "driver": driver_id, "status": RideStatus::Accepted }),
        )
        .await
    }

    async fn complete_ride(&self, ride_id: &str) -> Result<RideData, ApiError> {
        self.patch_ride(ride_id, &json!({ "status": RideStatus::Completed }))
            .await
    }
}

#[async_trait]
impl AuthApi for RideApiClient {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.send(self.request(Method::POST, "/api/rides/auth/login/").json(request))
            .await
    }

    async fn register(&self, role: Role, request: &RegisterRequest) -> Result<(), ApiError> {
        let path = match role {
            Role::Passenger => "/api/rides/auth/register/",
            Role::Driver => "/api/rides/auth/driver/register/",
        };
        self.execute(self.request(Method::POST, path).json(request))
            .await
            .map(|_| ())
    }
}
