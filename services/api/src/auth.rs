//! Instructor Authentication
//!
//! PIN-gated access to the authoring surface. Sessions are opaque random
//! tokens held in memory with an expiry; restarting the service logs every
//! instructor out, which is acceptable for a single-instructor deployment.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::store::Store;

/// Session lifetime when the instructor asks to be remembered.
const REMEMBER_ME_HOURS: i64 = 24;
/// Default session lifetime.
const SESSION_HOURS: i64 = 2;

/// A valid instructor PIN is exactly four ASCII digits.
pub fn is_valid_pin(pin: &str) -> bool {
    pin.len() == 4 && pin.chars().all(|c| c.is_ascii_digit())
}

pub struct AuthService {
    store: Arc<Store>,
    sessions: Mutex<HashMap<Uuid, DateTime<Utc>>>,
}

impl AuthService {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Checks the PIN and, when correct, opens a session. Returns the token
    /// and its expiry, or `None` for a wrong PIN.
    pub async fn login(&self, pin: &str, remember_me: bool) -> Option<(Uuid, DateTime<Utc>)> {
        if pin != self.store.pin().await {
            return None;
        }

        let hours = if remember_me {
            REMEMBER_ME_HOURS
        } else {
            SESSION_HOURS
        };
        let token = Uuid::new_v4();
        let expires_at = Utc::now() + Duration::hours(hours);

        self.sessions.lock().await.insert(token, expires_at);
        info!(remember_me, "Instructor logged in");
        Some((token, expires_at))
    }

    /// Whether the token refers to a live session. Expired sessions are
    /// removed on the way through.
    pub async fn is_authenticated(&self, token: Uuid) -> bool {
        let mut sessions = self.sessions.lock().await;
        let now = Utc::now();
        sessions.retain(|_, expires_at| *expires_at > now);
        sessions.contains_key(&token)
    }

    pub async fn logout(&self, token: Uuid) {
        self.sessions.lock().await.remove(&token);
    }

    /// Changes the instructor PIN after validating its format.
    pub async fn update_pin(&self, new_pin: &str) -> Result<()> {
        if !is_valid_pin(new_pin) {
            bail!("PIN must be exactly 4 digits");
        }
        self.store.set_pin(new_pin).await?;
        info!("Instructor PIN updated");
        Ok(())
    }

    #[cfg(test)]
    async fn insert_session(&self, token: Uuid, expires_at: DateTime<Utc>) {
        self.sessions.lock().await.insert(token, expires_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn auth_service() -> (tempfile::TempDir, AuthService) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Store::open(dir.path(), "1234").await.unwrap());
        (dir, AuthService::new(store))
    }

    #[test]
    fn test_pin_format() {
        assert!(is_valid_pin("0000"));
        assert!(is_valid_pin("1234"));
        assert!(!is_valid_pin("123"));
        assert!(!is_valid_pin("12345"));
        assert!(!is_valid_pin("12ab"));
        assert!(!is_valid_pin(""));
        assert!(!is_valid_pin("１２３４")); // full-width digits are not ASCII
    }

    #[tokio::test]
    async fn test_login_with_correct_pin() {
        let (_dir, auth) = auth_service().await;

        let (token, expires_at) = auth.login("1234", false).await.unwrap();
        assert!(auth.is_authenticated(token).await);
        assert!(expires_at > Utc::now() + Duration::minutes(90));
        assert!(expires_at <= Utc::now() + Duration::hours(2));
    }

    #[tokio::test]
    async fn test_login_with_wrong_pin_rejected() {
        let (_dir, auth) = auth_service().await;

        assert!(auth.login("9999", false).await.is_none());
    }

    #[tokio::test]
    async fn test_remember_me_extends_expiry() {
        let (_dir, auth) = auth_service().await;

        let (_, short) = auth.login("1234", false).await.unwrap();
        let (_, long) = auth.login("1234", true).await.unwrap();
        assert!(long > short + Duration::hours(20));
    }

    #[tokio::test]
    async fn test_expired_session_is_purged() {
        let (_dir, auth) = auth_service().await;

        let token = Uuid::new_v4();
        auth.insert_session(token, Utc::now() - Duration::minutes(1))
            .await;
        assert!(!auth.is_authenticated(token).await);
        assert!(auth.sessions.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_logout_invalidates_token() {
        let (_dir, auth) = auth_service().await;

        let (token, _) = auth.login("1234", false).await.unwrap();
        auth.logout(token).await;
        assert!(!auth.is_authenticated(token).await);
    }

    #[tokio::test]
    async fn test_update_pin_changes_login() {
        let (_dir, auth) = auth_service().await;

        auth.update_pin("4321").await.unwrap();
        assert!(auth.login("1234", false).await.is_none());
        assert!(auth.login("4321", false).await.is_some());
    }

    #[tokio::test]
    async fn test_update_pin_rejects_bad_format() {
        let (_dir, auth) = auth_service().await;

        assert!(auth.update_pin("abcd").await.is_err());
        // Original PIN still works.
        assert!(auth.login("1234", false).await.is_some());
    }
}
