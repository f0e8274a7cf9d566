//! REST API interaction module
//!
//! This module provides the core functionality for talking to the association
//! management API: the credential session, the HTTP layer and error taxonomy,
//! login, and the report endpoints.
//!
//! # Module Structure
//!
//! - [`session`] - Process-wide bearer credential (login/logout lifecycle)
//! - [`client`] - Main API client for making authenticated requests
//! - [`http`] - HTTP utilities and response classification
//! - [`error`] - `ApiError` / `FormError`
//! - [`auth`] - Login
//! - [`reports`] - Report aggregates, dashboard stats and PDF downloads
//!
//! # Example
//!
//! ```ignore
//! use khair::api::{client::ApiClient, session::Session};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = ApiClient::new("http://localhost:8888/api", Session::new())?;
//!     khair::api::auth::login(&client, "admin@example.org", "secret").await?;
//!     let members = client.get(&client.url("members")).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod http;
pub mod reports;
pub mod session;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult, FormError};
pub use session::{AuthUser, Session};
