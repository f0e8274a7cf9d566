//! Login / logout

use super::client::ApiClient;
use super::error::{ApiError, ApiResult};
use super::session::AuthUser;
use serde_json::json;

/// Exchange credentials for a bearer token and start the session
pub async fn login(client: &ApiClient, email: &str, password: &str) -> ApiResult<AuthUser> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::Validation(
            "email and password are required".to_string(),
        ));
    }

    let body = json!({ "email": email, "password": password });
    let response = client
        .http
        .post(&client.url("auth/login"), None, &body)
        .await
        .map_err(|e| match e {
            // A 401 here means wrong credentials, not an expired session
            ApiError::Auth(message) => ApiError::Validation(message),
            other => other,
        })?;

    let user = AuthUser::from_login_response(&response)
        .ok_or_else(|| ApiError::Network("login response did not include a token".to_string()))?;

    client.session.login(user.clone()).await;
    Ok(user)
}

/// End the session
pub async fn logout(client: &ApiClient) {
    client.session.logout().await;
}
