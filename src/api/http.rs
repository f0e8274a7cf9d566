//! HTTP utilities for the association REST API

use super::error::{ApiError, ApiResult};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::Value;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.chars().count() > MAX_LOG_BODY_LENGTH {
        let head: String = body.chars().take(MAX_LOG_BODY_LENGTH).collect();
        format!("{}... [truncated, {} bytes total]", head, body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control() && c != ' ', "")
}

/// Pull the server's `message` out of an error body, if it sent one
fn server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let message = value
        .get("message")
        .or_else(|| value.get("error").and_then(|e| e.get("message")))
        .or_else(|| value.get("error"))?
        .as_str()?
        .trim();

    if message.is_empty() {
        None
    } else {
        Some(message.to_string())
    }
}

/// Map a non-2xx response onto the error taxonomy
fn classify_failure(status: StatusCode, body: &str) -> ApiError {
    let message = server_message(body);

    if status == StatusCode::UNAUTHORIZED {
        return ApiError::Auth(message.unwrap_or_else(|| status.to_string()));
    }

    match message {
        Some(message) => ApiError::Validation(message),
        None => ApiError::Network(format!("HTTP {}", status)),
    }
}

/// HTTP client wrapper for REST API calls
#[derive(Clone)]
pub struct ApiHttpClient {
    client: Client,
}

impl ApiHttpClient {
    /// Create a new HTTP client
    pub fn new() -> ApiResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("khair/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    fn request(&self, method: Method, url: &str, token: Option<&str>) -> RequestBuilder {
        let request = self.client.request(method, url);
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request and parse its JSON body (`Null` for empty bodies)
    pub async fn send_json(
        &self,
        method: Method,
        url: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> ApiResult<Value> {
        tracing::debug!("{} {}", method, url);

        let mut request = self.request(method, url, token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&text));
            return Err(classify_failure(status, &text));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text)
            .map_err(|e| ApiError::Network(format!("invalid response body: {}", e)))
    }

    /// Make a GET request
    pub async fn get(&self, url: &str, token: &str) -> ApiResult<Value> {
        self.send_json(Method::GET, url, Some(token), None).await
    }

    /// Make a POST request
    pub async fn post(&self, url: &str, token: Option<&str>, body: &Value) -> ApiResult<Value> {
        self.send_json(Method::POST, url, token, Some(body)).await
    }

    /// Make a PUT request
    pub async fn put(&self, url: &str, token: &str, body: &Value) -> ApiResult<Value> {
        self.send_json(Method::PUT, url, Some(token), Some(body)).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, url: &str, token: &str) -> ApiResult<Value> {
        self.send_json(Method::DELETE, url, Some(token), None).await
    }

    /// Download a binary body (PDF exports)
    pub async fn get_bytes(&self, url: &str, token: &str) -> ApiResult<Vec<u8>> {
        tracing::debug!("GET (binary) {}", url);

        let response = self.request(Method::GET, url, Some(token)).send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&text));
            return Err(classify_failure(status, &text));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_401_is_auth() {
        let err = classify_failure(StatusCode::UNAUTHORIZED, r#"{"message":"token expired"}"#);
        assert_eq!(err, ApiError::Auth("token expired".to_string()));
    }

    #[test]
    fn test_classify_message_is_validation() {
        let err = classify_failure(
            StatusCode::BAD_REQUEST,
            r#"{"success":false,"message":"amount must be positive"}"#,
        );
        assert_eq!(err, ApiError::Validation("amount must be positive".to_string()));
    }

    #[test]
    fn test_classify_without_message_is_network() {
        let err = classify_failure(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        assert!(matches!(err, ApiError::Network(_)));

        let err = classify_failure(StatusCode::BAD_GATEWAY, r#"{"message":"  "}"#);
        assert!(matches!(err, ApiError::Network(_)));
    }

    #[test]
    fn test_nested_error_message() {
        assert_eq!(
            server_message(r#"{"error":{"message":"duplicate nationalId"}}"#).as_deref(),
            Some("duplicate nationalId")
        );
        assert_eq!(
            server_message(r#"{"error":"not found"}"#).as_deref(),
            Some("not found")
        );
    }

    #[test]
    fn test_sanitize_truncates() {
        let body = "x".repeat(500);
        let clean = sanitize_for_log(&body);
        assert!(clean.contains("truncated, 500 bytes total"));
        assert!(sanitize_for_log("a\nb").eq("ab"));
    }
}
