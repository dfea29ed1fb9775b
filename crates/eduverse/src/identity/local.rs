//! Identity gateway over the `users` and `auth_sessions` tables
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::Rng;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use super::{AuthSession, Credentials, Identity, IdentityGateway};
use crate::error::{AppError, Result};
use crate::store::{Database, UserRow};

const PASSWORD_KEY_CONTEXT: &str = "eduverse 2024 account password hashing";

pub struct LocalIdentityGateway {
    db: Arc<Database>,
    session_ttl: Duration,
}

impl LocalIdentityGateway {
    pub fn new(db: Arc<Database>, session_ttl_hours: i64) -> Self {
        Self {
            db,
            session_ttl: Duration::hours(session_ttl_hours.max(1)),
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn new_salt() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn hash_password(password: &str, salt: &str) -> blake3::Hash {
    let key = blake3::derive_key(PASSWORD_KEY_CONTEXT, salt.as_bytes());
    blake3::keyed_hash(&key, password.as_bytes())
}

fn verify_password(password: &str, user: &UserRow) -> bool {
    match blake3::Hash::from_hex(&user.password_hash) {
        // blake3::Hash equality is constant time
        Ok(stored) => hash_password(password, &user.salt) == stored,
        Err(_) => false,
    }
}

fn identity_of(user: &UserRow) -> Identity {
    Identity {
        user_id: user.id.clone(),
        email: user.email.clone(),
    }
}

#[async_trait]
impl IdentityGateway for LocalIdentityGateway {
    async fn sign_up(&self, credentials: &Credentials) -> Result<Identity> {
        credentials.validate()?;
        let email = normalize_email(&credentials.email);
        let salt = new_salt();
        let hash = hash_password(&credentials.password, &salt);

        let user = self.db.users.insert_user(
            &Uuid::new_v4().to_string(),
            &email,
            hash.to_hex().as_str(),
            &salt,
        )?;
        info!("Registered account {}", user.id);
        Ok(identity_of(&user))
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession> {
        let email = normalize_email(&credentials.email);
        let user = self
            .db
            .users
            .find_by_email(&email)?
            .filter(|user| verify_password(&credentials.password, user))
            .ok_or_else(|| AppError::AuthenticationRequired("Invalid login credentials".into()))?;

        let token = Uuid::new_v4().to_string();
        let session = self
            .db
            .users
            .insert_session(&token, &user.id, Utc::now() + self.session_ttl)?;

        let purged = self.db.users.purge_expired_sessions()?;
        if purged > 0 {
            debug!("Purged {} expired session(s)", purged);
        }

        info!("Signed in {}", user.id);
        Ok(AuthSession {
            access_token: session.token,
            expires_at: session.expires_at,
            user: identity_of(&user),
        })
    }

    async fn resolve(&self, access_token: &str) -> Result<Option<Identity>> {
        let Some(session) = self.db.users.find_live_session(access_token)? else {
            return Ok(None);
        };
        Ok(self.db.users.find_by_id(&session.user_id)?.as_ref().map(identity_of))
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        self.db.users.delete_session(access_token)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> LocalIdentityGateway {
        LocalIdentityGateway::new(Arc::new(Database::in_memory().unwrap()), 24)
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in_resolves() {
        let gw = gateway();
        let identity = gw
            .sign_up(&Credentials::new("Asha@Example.com ", "secret1"))
            .await
            .unwrap();
        assert_eq!(identity.email, "asha@example.com");

        let session = gw
            .sign_in(&Credentials::new("asha@example.com", "secret1"))
            .await
            .unwrap();
        assert_eq!(session.user, identity);
        assert!(session.expires_at > Utc::now());

        let resolved = gw.resolve(&session.access_token).await.unwrap();
        assert_eq!(resolved, Some(identity));
    }

    #[tokio::test]
    async fn test_rejects_bad_input_and_duplicates() {
        let gw = gateway();
        for (email, password) in [("not-an-email", "secret1"), ("a@b.co", "short")] {
            let err = gw.sign_up(&Credentials::new(email, password)).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{} accepted", email);
        }

        gw.sign_up(&Credentials::new("a@b.co", "secret1")).await.unwrap();
        let err = gw.sign_up(&Credentials::new("A@B.co", "secret2")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_wrong_password_is_auth_error() {
        let gw = gateway();
        gw.sign_up(&Credentials::new("a@b.co", "secret1")).await.unwrap();

        let err = gw.sign_in(&Credentials::new("a@b.co", "secret2")).await.unwrap_err();
        assert!(matches!(err, AppError::AuthenticationRequired(_)));
        let err = gw.sign_in(&Credentials::new("nobody@b.co", "secret1")).await.unwrap_err();
        assert!(matches!(err, AppError::AuthenticationRequired(_)));
    }

    #[tokio::test]
    async fn test_sign_out_revokes_token() {
        let gw = gateway();
        gw.sign_up(&Credentials::new("a@b.co", "secret1")).await.unwrap();
        let session = gw.sign_in(&Credentials::new("a@b.co", "secret1")).await.unwrap();

        gw.sign_out(&session.access_token).await.unwrap();
        assert!(gw.resolve(&session.access_token).await.unwrap().is_none());
        assert!(gw.resolve("made-up-token").await.unwrap().is_none());
    }

    #[test]
    fn test_same_password_different_salts() {
        let a = hash_password("secret1", &new_salt());
        let b = hash_password("secret1", &new_salt());
        assert_ne!(a, b);
    }
}
