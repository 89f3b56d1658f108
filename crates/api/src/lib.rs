//! Doorwatch HTTP status surface.
//!
//! Exposes the building blocks (config, state, error handling, routes) so
//! integration tests and the `doorwatch` binary share the same router.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod routes;
pub mod state;
