//! khair - terminal front end for an association management API
//!
//! Members, payments, expenses, vehicles, trips and maintenance are all
//! served by one data-driven CRUD screen (see [`resource`]); the dashboard
//! and reports views sit beside them.

pub mod api;
pub mod app;
pub mod config;
pub mod event;
pub mod i18n;
pub mod resource;
pub mod ui;

/// Version injected at compile time via KHAIR_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("KHAIR_VERSION") {
    Some(v) => v,
    None => "dev",
};
