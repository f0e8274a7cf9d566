//! API Client
//!
//! Main client for the association REST API, combining the session and the
//! HTTP layer. Cloning is cheap; all clones share one session.

use super::error::{ApiError, ApiResult};
use super::http::ApiHttpClient;
use super::session::Session;
use serde_json::Value;
use url::Url;

/// Default API base when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8888/api";

/// Main API client
#[derive(Clone)]
pub struct ApiClient {
    pub session: Session,
    pub http: ApiHttpClient,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str, session: Session) -> ApiResult<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| ApiError::Network(format!("invalid API url: {}", e)))?;

        Ok(Self {
            session,
            http: ApiHttpClient::new()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =========================================================================
    // URL helpers
    // =========================================================================

    /// Build an API URL for a path like `members/42`
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Build an API URL with query parameters; empty values are skipped
    pub fn url_with_query(&self, path: &str, params: &[(String, String)]) -> String {
        let base = self.url(path);
        let Ok(mut url) = Url::parse(&base) else {
            return base;
        };

        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params.iter().filter(|(_, v)| !v.is_empty()) {
                pairs.append_pair(key, value);
            }
        }

        if url.query() == Some("") {
            url.set_query(None);
        }
        url.to_string()
    }

    // =========================================================================
    // Authenticated calls
    // =========================================================================

    /// Read the token at call time so a logout is honored immediately
    async fn token(&self) -> ApiResult<String> {
        self.session.token().await
    }

    /// A 401 ends the session so the UI routes back to login, unless the
    /// rejected token has already been replaced by a newer sign-in
    async fn observe<T>(&self, token: &str, result: ApiResult<T>) -> ApiResult<T> {
        if let Err(ApiError::Auth(ref reason)) = result {
            tracing::warn!("credential rejected by server: {}", reason);
            self.session.logout_if(token).await;
        }
        result
    }

    pub async fn get(&self, url: &str) -> ApiResult<Value> {
        let token = self.token().await?;
        let result = self.http.get(url, &token).await;
        self.observe(&token, result).await
    }

    pub async fn post(&self, url: &str, body: &Value) -> ApiResult<Value> {
        let token = self.token().await?;
        let result = self.http.post(url, Some(&token), body).await;
        self.observe(&token, result).await
    }

    pub async fn put(&self, url: &str, body: &Value) -> ApiResult<Value> {
        let token = self.token().await?;
        let result = self.http.put(url, &token, body).await;
        self.observe(&token, result).await
    }

    pub async fn delete(&self, url: &str) -> ApiResult<Value> {
        let token = self.token().await?;
        let result = self.http.delete(url, &token).await;
        self.observe(&token, result).await
    }

    pub async fn get_bytes(&self, url: &str) -> ApiResult<Vec<u8>> {
        let token = self.token().await?;
        let result = self.http.get_bytes(url, &token).await;
        self.observe(&token, result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new("http://localhost:8888/api/", Session::new()).unwrap()
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let c = client();
        assert_eq!(c.url("members"), "http://localhost:8888/api/members");
        assert_eq!(c.url("/members/7"), "http://localhost:8888/api/members/7");
    }

    #[test]
    fn test_url_with_query_skips_empty() {
        let c = client();
        let url = c.url_with_query(
            "expenses",
            &[
                ("page".into(), "2".into()),
                ("search".into(), "".into()),
                ("category".into(), "rent".into()),
            ],
        );
        assert_eq!(url, "http://localhost:8888/api/expenses?page=2&category=rent");
    }

    #[test]
    fn test_url_with_query_encodes_values() {
        let c = client();
        let url = c.url_with_query("members", &[("search".into(), "أحمد علي".into())]);
        assert!(url.starts_with("http://localhost:8888/api/members?search="));
        assert!(!url.contains(' '));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(ApiClient::new("not a url", Session::new()).is_err());
    }

    #[tokio::test]
    async fn test_calls_fail_fast_without_session() {
        let c = client();
        let err = c.get(&c.url("members")).await.unwrap_err();
        assert_eq!(err, ApiError::Unauthorized);
    }
}
