//! Session
//!
//! Process-wide credential holder. Login initializes it, logout tears it
//! down. Clients keep a handle and read the token on every call, so a logout
//! makes later requests fail fast instead of reusing a stale token.

use super::error::{ApiError, ApiResult};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Signed-in user
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub token: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl AuthUser {
    /// Build a user from a login response body.
    ///
    /// The token may sit at the top level or under `user` / `data`.
    pub fn from_login_response(body: &Value) -> Option<Self> {
        let candidates = [body, &body["user"], &body["data"]];
        let token = candidates
            .iter()
            .find_map(|v| v.get("token").and_then(|t| t.as_str()))
            .filter(|t| !t.is_empty())?;

        let field = |key: &str| {
            candidates
                .iter()
                .find_map(|v| v.get(key).and_then(|s| s.as_str()))
                .unwrap_or_default()
                .to_string()
        };

        Some(Self {
            token: token.to_string(),
            name: field("name"),
            email: field("email"),
            role: field("role"),
        })
    }

    /// User known only by a token (`--token` / `KHAIR_TOKEN`)
    pub fn from_token(token: &str) -> Self {
        Self {
            token: token.to_string(),
            name: String::new(),
            email: String::new(),
            role: String::new(),
        }
    }
}

/// Shared session handle
#[derive(Clone, Default)]
pub struct Session {
    user: Arc<RwLock<Option<AuthUser>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize the session after a successful login
    pub async fn login(&self, user: AuthUser) {
        tracing::info!("session started for {}", user.email);
        *self.user.write().await = Some(user);
    }

    /// Tear the session down
    pub async fn logout(&self) {
        let mut guard = self.user.write().await;
        if guard.take().is_some() {
            tracing::info!("session cleared");
        }
    }

    /// Tear the session down only if it still holds `token`. A rejection
    /// for a token from an earlier sign-in leaves the current one alone.
    pub async fn logout_if(&self, token: &str) -> bool {
        let mut guard = self.user.write().await;
        if guard.as_ref().is_some_and(|u| u.token == token) {
            *guard = None;
            tracing::info!("session cleared");
            return true;
        }
        tracing::debug!("ignoring rejection of a superseded token");
        false
    }

    /// Current bearer token, or `Unauthorized` when signed out
    pub async fn token(&self) -> ApiResult<String> {
        self.user
            .read()
            .await
            .as_ref()
            .map(|u| u.token.clone())
            .ok_or(ApiError::Unauthorized)
    }

    pub async fn user(&self) -> Option<AuthUser> {
        self.user.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.user.read().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_token_requires_login() {
        let session = Session::new();
        assert_eq!(session.token().await, Err(ApiError::Unauthorized));

        session.login(AuthUser::from_token("abc")).await;
        assert_eq!(session.token().await.unwrap(), "abc");

        session.logout().await;
        assert_eq!(session.token().await, Err(ApiError::Unauthorized));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let session = Session::new();
        let handle = session.clone();
        session.login(AuthUser::from_token("t")).await;
        assert!(handle.is_authenticated().await);
        handle.logout().await;
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_logout_if_matches_current_token() {
        let session = Session::new();
        session.login(AuthUser::from_token("old")).await;
        session.logout().await;
        session.login(AuthUser::from_token("new")).await;

        assert!(!session.logout_if("old").await);
        assert_eq!(session.token().await.unwrap(), "new");

        assert!(session.logout_if("new").await);
        assert!(!session.is_authenticated().await);
    }

    #[test]
    fn test_login_response_top_level_token() {
        let body = json!({"_id": "1", "name": "Admin", "email": "a@x.org", "role": "admin", "token": "jwt"});
        let user = AuthUser::from_login_response(&body).unwrap();
        assert_eq!(user.token, "jwt");
        assert_eq!(user.name, "Admin");
        assert_eq!(user.role, "admin");
    }

    #[test]
    fn test_login_response_nested_token() {
        let body = json!({"success": true, "data": {"token": "jwt", "email": "a@x.org"}});
        let user = AuthUser::from_login_response(&body).unwrap();
        assert_eq!(user.token, "jwt");
        assert_eq!(user.email, "a@x.org");
    }

    #[test]
    fn test_login_response_without_token() {
        assert!(AuthUser::from_login_response(&json!({"message": "ok"})).is_none());
        assert!(AuthUser::from_login_response(&json!({"token": ""})).is_none());
    }
}
