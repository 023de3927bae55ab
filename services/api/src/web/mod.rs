pub mod auth;
pub mod entries;
pub mod middleware;
pub mod notifications;
pub mod rest;
pub mod state;

// Re-export the pieces the binary needs to build the router.
pub use middleware::require_auth;
pub use rest::{health_handler, ApiDoc};
