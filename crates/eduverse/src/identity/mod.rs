//! Session/identity gateway.
//!
//! Handlers never see credentials directly: they go through an
//! [`IdentityGateway`] and receive an [`AuthUser`] for every owner-scoped
//! route. The bundled implementation keeps accounts in the local database.

pub mod extract;
pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::Result;

pub use extract::{bearer_token, AuthUser};
pub use local::LocalIdentityGateway;

/// Who a session belongs to. `user_id` is the owner id of every row they write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Identity {
    #[serde(rename = "id")]
    pub user_id: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthSession {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: Identity,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Credentials {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

#[async_trait]
pub trait IdentityGateway: Send + Sync {
    async fn sign_up(&self, credentials: &Credentials) -> Result<Identity>;

    /// Wrong email or password is `AuthenticationRequired`, never `NotFound`.
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession>;

    /// Unknown or expired tokens resolve to `None`.
    async fn resolve(&self, access_token: &str) -> Result<Option<Identity>>;

    async fn sign_out(&self, access_token: &str) -> Result<()>;
}
