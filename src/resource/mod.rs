//! Resource abstraction layer
//!
//! This module provides a data-driven CRUD screen. Resource definitions are
//! loaded from JSON files at compile time, so the six association resources
//! share one client, one list state machine and one edit session.
//!
//! # Architecture
//!
//! - [`registry`] - Loads and caches resource definitions from embedded JSON
//! - [`client`] - REST calls for one resource (list/get/create/update/remove/transition)
//! - [`query`] - Pagination, search and filters with last-request-wins
//! - [`edit`] - Modal create/edit form state
//! - [`screen`] - Binds the three above into one screen
//!
//! # Resource Definitions
//!
//! Resources are defined in JSON files under `src/resources/`:
//! - `common.json` - Option sets (status codes, categories) with labels
//! - `members.json` - Members
//! - `finance.json` - Payments and expenses
//! - `fleet.json` - Vehicles, trips and maintenance
//!
//! # Example
//!
//! ```ignore
//! use khair::resource::screen_for;
//!
//! async fn first_page(api: khair::api::ApiClient) {
//!     let mut screen = screen_for(api, "members", Default::default()).unwrap();
//!     screen.refresh_scheduled().await;
//!     println!("{} members", screen.list.total_count());
//! }
//! ```

pub mod client;
pub mod edit;
pub mod query;
mod registry;
pub mod screen;

pub use client::{ResourceClient, Transition};
pub use edit::{EditMode, EditSession, SubmitPlan};
pub use query::{Applied, AsyncStatus, ListQuery, ListResult, ListState, PAGE_SIZE};
pub use registry::*;
pub use screen::{screen_for, Confirmation, ListResponse, LookupResult, Outcome, ResourceScreen, ScreenEvent};
