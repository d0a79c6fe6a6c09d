//! Authentication test helpers
//!
//! Identities and pre-populated session stores.

use ridedash::client::SessionStore;
use ridedash::shared::user::{Role, SessionIdentity};

pub const TEST_TOKEN: &str = "test-token-123";

pub fn passenger_identity() -> SessionIdentity {
    SessionIdentity {
        id: "5".to_string(),
        name: "Pat Passenger".to_string(),
        email: "pat@example.com".to_string(),
        role: Role::Passenger,
    }
}

pub fn driver_identity() -> SessionIdentity {
    SessionIdentity {
        id: "9".to_string(),
        name: "Dana Driver".to_string(),
        email: "dana@example.com".to_string(),
        role: Role::Driver,
    }
}

/// In-memory session store already signed in as `identity`.
pub fn signed_in(identity: SessionIdentity) -> SessionStore {
    let session = SessionStore::in_memory();
    session.sign_in(TEST_TOKEN, identity);
    session
}

/// Create authorization header value
pub fn auth_header(token: &str) -> String {
    format!("Token {}", token)
}
