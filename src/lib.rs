//! dodream AI server.
//!
//! A small HTTP service: a root health check plus the router modules of the
//! subsystems it fronts, composed once at startup into a single dispatch
//! table. Authentication tokens are issued by the Spring backend; this
//! process neither issues nor validates them.
//!
//! # Modules
//!
//! - [`app`]: Application metadata and router composition
//! - [`api`]: Health endpoint and API documentation
//! - [`routers`]: Mounted router modules
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`metrics`]: Request metrics and Prometheus exporter
//! - [`reload`]: Development auto-reload supervisor
//! - [`server`]: Listener and serve loop
//! - [`utils`]: Utility functions

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod metrics;
pub mod reload;
pub mod routers;
pub mod server;
pub mod utils;

pub use app::{build_app, compose, App, AppInfo, Mount, APP_INFO};
pub use config::Config;
pub use error::{Result, ServerError};
