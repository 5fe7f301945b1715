//! Admin authentication.
//!
//! A single shared password guards the admin endpoints. Only its SHA-256
//! digest is kept in memory. Admins may trade the password for a session
//! token that expires after a configurable TTL.

use crate::errors::AppError;
use crate::handlers::AppState;
use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::{header::AUTHORIZATION, request::Parts},
};
use moka::future::Cache;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

type Sha256Digest = [u8; 32];

fn sha256(input: &str) -> Sha256Digest {
    Sha256::digest(input.as_bytes()).into()
}

/// Byte-wise comparison whose running time does not depend on where the
/// inputs differ.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// A freshly issued admin session.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub token: String,
    pub expires_in: u64,
}

/// Checks admin credentials and tracks live session tokens.
#[derive(Clone)]
pub struct AdminGate {
    password_digest: Option<Sha256Digest>,
    // Keyed by token digest so raw tokens are never retained.
    sessions: Cache<String, ()>,
    session_ttl: Duration,
}

impl AdminGate {
    /// `password` is `None` when no admin password is configured, in which
    /// case every check fails.
    pub fn new(password: Option<&str>, session_ttl: Duration) -> Self {
        let sessions = Cache::builder()
            .time_to_live(session_ttl)
            .max_capacity(1_000)
            .build();

        Self {
            password_digest: password.filter(|p| !p.is_empty()).map(sha256),
            sessions,
            session_ttl,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.password_digest.is_some()
    }

    pub fn verify_password(&self, candidate: &str) -> bool {
        match self.password_digest {
            Some(ref expected) => constant_time_eq(expected, &sha256(candidate)),
            None => false,
        }
    }

    /// Exchanges the admin password for a session token.
    pub async fn login(&self, password: &str) -> Result<AdminSession, AppError> {
        if !self.verify_password(password) {
            return Err(AppError::Unauthorized("Invalid admin password".to_string()));
        }

        let token = format!(
            "{}{}",
            Uuid::new_v4().simple(),
            Uuid::new_v4().simple()
        );
        self.sessions.insert(hex::encode(sha256(&token)), ()).await;
        tracing::info!("✓ Admin session issued");

        Ok(AdminSession {
            token,
            expires_in: self.session_ttl.as_secs(),
        })
    }

    pub async fn verify_token(&self, token: &str) -> bool {
        self.is_enabled() && self.sessions.contains_key(&hex::encode(sha256(token)))
    }

    /// Revokes a session token. Returns whether it was live.
    pub async fn logout(&self, token: &str) -> bool {
        self.sessions
            .remove(&hex::encode(sha256(token)))
            .await
            .is_some()
    }
}

#[derive(Debug, Deserialize)]
struct PasswordQuery {
    password: Option<String>,
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Extractor for requests made by an authenticated admin.
///
/// Accepts `Authorization: Bearer <session token>` or a `?password=` query
/// parameter.
#[derive(Debug, Clone)]
pub struct AdminAuth {
    /// The session token used, if the request authenticated with one.
    pub token: Option<String>,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(token) = bearer_token(parts) {
            if state.admin.verify_token(token).await {
                return Ok(AdminAuth {
                    token: Some(token.to_string()),
                });
            }
            return Err(AppError::Unauthorized("Invalid or expired session token".to_string()));
        }

        let password = Query::<PasswordQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(q)| q.password);

        match password {
            Some(ref password) if state.admin.verify_password(password) => {
                Ok(AdminAuth { token: None })
            }
            Some(_) => Err(AppError::Unauthorized("Invalid admin password".to_string())),
            None => Err(AppError::Unauthorized("Missing admin credentials".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> AdminGate {
        AdminGate::new(Some("s3cret"), Duration::from_secs(60))
    }

    #[test]
    fn test_password_check() {
        let gate = gate();
        assert!(gate.verify_password("s3cret"));
        assert!(!gate.verify_password("s3cret "));
        assert!(!gate.verify_password(""));
    }

    #[test]
    fn test_unset_password_rejects_everything() {
        let gate = AdminGate::new(None, Duration::from_secs(60));
        assert!(!gate.is_enabled());
        assert!(!gate.verify_password(""));

        let empty = AdminGate::new(Some(""), Duration::from_secs(60));
        assert!(!empty.verify_password(""));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let gate = gate();
        assert!(gate.login("wrong").await.is_err());

        let session = gate.login("s3cret").await.unwrap();
        assert_eq!(session.expires_in, 60);
        assert_eq!(session.token.len(), 64);
        assert!(gate.verify_token(&session.token).await);
        assert!(!gate.verify_token("forged").await);

        assert!(gate.logout(&session.token).await);
        assert!(!gate.verify_token(&session.token).await);
        assert!(!gate.logout(&session.token).await);
    }
}
