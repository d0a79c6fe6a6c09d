//! Authentication
//!
//! Sign-in and sign-up flows over [`AuthApi`]. Forms are validated locally
//! before any request is made; a successful flow writes the session store.

use std::sync::Arc;

use thiserror::Error;

use crate::client::api::AuthApi;
use crate::client::session::SessionStore;
use crate::shared::error::{ApiError, StorageError, ValidationError};
use crate::shared::user::{LoginRequest, LoginResponse, RegisterRequest, Role, SessionIdentity};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const LOGIN_AFTER_REGISTER_MESSAGE: &str =
    "Registration successful, but login failed. Please sign in manually.";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// The account was created but the automatic login failed
    #[error("login after registration failed: {0}")]
    LoginAfterRegister(ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AuthError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => e.message.clone(),
            Self::Api(ApiError::Unauthorized) => "Invalid username or password".to_string(),
            Self::Api(e) => e.user_message(),
            Self::LoginAfterRegister(_) => LOGIN_AFTER_REGISTER_MESSAGE.to_string(),
            Self::Storage(e) => format!("Could not update the saved session: {}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInForm {
    pub username: String,
    pub password: String,
    pub role: Role,
}

impl SignInForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.username.trim().is_empty() {
            return Err(ValidationError::new("username", "Username is required"));
        }
        validate_password(&self.password)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpForm {
    pub username: String,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub password: String,
    pub password2: String,
    pub role: Role,
}

impl SignUpForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let required = [
            ("username", &self.username, "Username is required"),
            ("email", &self.email, "Email is required"),
            ("firstname", &self.firstname, "First name is required"),
            ("lastname", &self.lastname, "Last name is required"),
        ];
        for (field, value, message) in required {
            if value.trim().is_empty() {
                return Err(ValidationError::new(field, message));
            }
        }
        if !self.email.contains('@') {
            return Err(ValidationError::new("email", "Please enter a valid email address"));
        }
        validate_password(&self.password)?;
        if self.password != self.password2 {
            return Err(ValidationError::new("password2", "Passwords do not match"));
        }
        Ok(())
    }

    fn to_request(&self) -> RegisterRequest {
        RegisterRequest {
            username: self.username.trim().to_string(),
            password: self.password.clone(),
            password2: self.password2.clone(),
            email: self.email.trim().to_string(),
            firstname: self.firstname.trim().to_string(),
            lastname: self.lastname.trim().to_string(),
        }
    }
}

fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::new(
            "password",
            "Password must be at least 6 characters",
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct AuthService {
    api: Arc<dyn AuthApi>,
    session: SessionStore,
}

impl AuthService {
    pub fn new(api: Arc<dyn AuthApi>, session: SessionStore) -> Self {
        Self { api, session }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub async fn sign_in(&self, form: &SignInForm) -> Result<SessionIdentity, AuthError> {
        form.validate()?;
        let username = form.username.trim();
        let response = self.login(username, &form.password).await?;
        Ok(self.start_session(response, username, form.role))
    }

    /// Register under the form's role, then log in with the same credentials.
    pub async fn sign_up(&self, form: &SignUpForm) -> Result<SessionIdentity, AuthError> {
        form.validate()?;
        let request = form.to_request();
        self.api.register(form.role, &request).await?;
        tracing::info!(username = %request.username, role = %form.role, "registered");

        let response = self
            .login(&request.username, &request.password)
            .await
            .map_err(AuthError::LoginAfterRegister)?;
        Ok(self.start_session(response, &request.username, form.role))
    }

    pub fn sign_out(&self) -> Result<(), AuthError> {
        self.session.sign_out()?;
        Ok(())
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.api.login(&request).await
    }

    fn start_session(
        &self,
        response: LoginResponse,
        username: &str,
        role: Role,
    ) -> SessionIdentity {
        let identity = response.identity(username, role);
        self.session.sign_in(response.token, identity.clone());
        identity
    }
}
