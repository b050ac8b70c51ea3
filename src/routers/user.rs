//! Routes owned by the user subsystem.
//!
//! Users authenticate against the Spring backend, which issues the JWTs
//! these routes are expected to check. No user route is served by this
//! process yet, so the mount answers 404 for everything under its prefix.

use axum::Router;

use crate::app::Mount;

/// Name under which the user router is mounted.
pub const NAME: &str = "user";
/// Path prefix of the user router.
pub const PREFIX: &str = "/user";

/// The user router's bindings.
pub fn router() -> Router {
    Router::new()
}

/// The user router paired with its prefix.
pub fn mount() -> Mount {
    Mount::new(NAME, PREFIX, router())
}
