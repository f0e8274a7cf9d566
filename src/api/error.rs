//! API error taxonomy
//!
//! Every failure surfaced to a screen is one of these variants. Screens store
//! the rendered message in their `AsyncStatus`; nothing is retried.

use thiserror::Error;

/// Errors returned by the REST layer
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// No credential in the session, the request was never sent
    #[error("not signed in")]
    Unauthorized,

    /// The server rejected the credential (HTTP 401)
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Server-reported field or business rule violation, shown verbatim
    #[error("{0}")]
    Validation(String),

    /// Transport failure or non-2xx response without a structured message
    #[error("request failed: {0}")]
    Network(String),
}

impl ApiError {
    /// True when the user has to sign in again
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Unauthorized | ApiError::Auth(_))
    }

    /// Message to show the user.
    ///
    /// Validation messages come straight from the server. Everything else
    /// collapses to the caller's localized fallback so transport details never
    /// reach the screen.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Validation(message) => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Local form validation failure, raised before any network call
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FormError {
    #[error("{label} is required")]
    Required { field: String, label: String },

    #[error("a submission is already in progress")]
    Busy,

    #[error("no form is open")]
    Closed,
}
