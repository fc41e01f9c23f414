//! services/api/src/web/router.rs
//!
//! Assembles the HTTP routes. Shared by the `api` binary and the integration tests.

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::adapters::uploads::UPLOADS_ROUTE;
use crate::error::MAX_UPLOAD_BYTES;
use crate::web::middleware::require_auth;
use crate::web::state::AppState;
use crate::web::{auth, courses, internship, pyq, rest};

/// Request body cap for the upload route. Leaves room for the form fields so the
/// file limit itself is reported by the handler.
const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 6 * 1024 * 1024;

pub fn build_router(state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/api", get(rest::health_handler))
        .route("/api/auth/register", post(auth::register_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .route("/api/courses", get(courses::list_courses_handler))
        .route("/api/courses/{id}", get(courses::get_course_handler))
        .route("/api/internship/apply", post(internship::apply_handler))
        .route("/api/internship/all", get(internship::list_applications_handler))
        .route(
            "/api/internship/{id}/status",
            put(internship::update_status_handler),
        )
        .route("/api/pyq", get(pyq::list_papers_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/api/auth/me", get(auth::me_handler))
        .route("/api/courses", post(courses::create_course_handler))
        .route("/api/courses/{id}/enroll", post(courses::enroll_handler))
        .route(
            "/api/pyq",
            post(pyq::upload_paper_handler).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let uploads = ServeDir::new(state.uploads.dir());

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service(UPLOADS_ROUTE, uploads)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
