pub mod auth;
pub mod courses;
pub mod extract;
pub mod internship;
pub mod middleware;
pub mod pyq;
pub mod rest;
pub mod router;
pub mod state;

// Re-export the router builder and the auth middleware to make them easily
// accessible to the binary and the integration tests.
pub use middleware::require_auth;
pub use router::build_router;
