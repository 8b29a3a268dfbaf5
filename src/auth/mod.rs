//! Authentication
//!
//! The session provider and the collaborator it authenticates against. Real
//! identity verification is out of scope; [`SimulatedAuthService`] stands in
//! for a backend.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::uuids::TypedUuid;

mod forms;
mod service;
mod session;

pub use forms::*;
pub use service::*;
pub use session::*;

/// Namespace for deriving [`UserId`]s from e-mail addresses.
const USER_NAMESPACE: Uuid = Uuid::from_u128(0x6c75_7865_2d75_7365_7273_2d6e_7331_0001);

/// Stable per-user identifier used to scope persisted data.
pub type UserId = TypedUuid<User>;

impl UserId {
    /// Derive the id for an e-mail address. Case and surrounding whitespace
    /// don't matter.
    #[must_use]
    pub fn for_email(email: &str) -> Self {
        let normalized = email.trim().to_lowercase();

        Self::from_uuid(Uuid::new_v5(&USER_NAMESPACE, normalized.as_bytes()))
    }
}

/// A signed-in member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Display name.
    pub name: String,

    /// E-mail the member signed in with.
    pub email: String,
}

impl User {
    /// Storage namespace for this member's tickets and purchases.
    #[must_use]
    pub fn id(&self) -> UserId {
        UserId::for_email(&self.email)
    }
}

/// Authentication failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Credentials were rejected.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Registration was rejected by the backend.
    #[error("registration rejected: {0}")]
    RegistrationRejected(String),

    /// The backend couldn't be reached.
    #[error("authentication service unavailable: {0}")]
    Unavailable(String),
}
