//! services/api/src/web/rest.rs
//!
//! Contains the response envelope shared by every REST handler, the small
//! request validation helpers, and the master definition for the OpenAPI
//! specification.

use axum::Json;
use serde::Serialize;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::web::{auth, courses, internship, pyq};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        auth::register_handler,
        auth::login_handler,
        auth::me_handler,
        courses::list_courses_handler,
        courses::get_course_handler,
        courses::create_course_handler,
        courses::enroll_handler,
        internship::apply_handler,
        internship::list_applications_handler,
        internship::update_status_handler,
        pyq::list_papers_handler,
        pyq::upload_paper_handler,
    ),
    components(
        schemas(
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::AuthData,
            auth::UserResponse,
            courses::CreateCourseRequest,
            courses::CourseResponse,
            courses::EnrollmentResponse,
            internship::ApplyRequest,
            internship::UpdateStatusRequest,
            internship::ApplicationResponse,
            pyq::PaperResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "ByteGurukul API", description = "Accounts, courses, internship applications and question papers.")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

//=========================================================================================
// Response Envelope
//=========================================================================================

/// The body of every successful response: `{ "success": true, "data": ..., "message"? }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
            message: None,
        })
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            data,
            message: Some(message.into()),
        })
    }
}

//=========================================================================================
// Validation Helpers
//=========================================================================================

/// Names of the fields that are absent or blank.
pub fn missing_fields<'a>(fields: &[(&'a str, Option<&str>)]) -> Vec<&'a str> {
    fields
        .iter()
        .filter(|(_, value)| value.map(str::trim).unwrap_or_default().is_empty())
        .map(|(name, _)| *name)
        .collect()
}

/// Trims an optional value and drops it when nothing is left.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A deliberately loose `local@domain.tld` check.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

//=========================================================================================
// Liveness
//=========================================================================================

pub const HEALTH_MESSAGE: &str = "ByteGurukul Backend is Running!";

/// GET /api - Liveness check
#[utoipa::path(
    get,
    path = "/api",
    responses((status = 200, description = "The service is up", body = String))
)]
pub async fn health_handler() -> &'static str {
    HEALTH_MESSAGE
}
