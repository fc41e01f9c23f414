//! services/api/src/web/courses.rs
//!
//! Course catalog and enrollment endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use bytegurukul_core::domain::{Course, Enrollment, NewCourse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::HttpError;
use crate::web::extract::{ApiJson, ApiPath};
use crate::web::middleware::AuthUser;
use crate::web::rest::ApiResponse;
use crate::web::state::AppState;

const ALREADY_ENROLLED: &str = "You are already enrolled in this course.";

#[derive(Deserialize, ToSchema)]
pub struct CreateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub instructor_id: Uuid,
    pub instructor_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Course> for CourseResponse {
    fn from(course: Course) -> Self {
        Self {
            id: course.id,
            title: course.title,
            description: course.description,
            price: course.price,
            instructor_id: course.instructor_id,
            instructor_name: course.instructor_name,
            created_at: course.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub enrolled_at: DateTime<Utc>,
}

impl From<Enrollment> for EnrollmentResponse {
    fn from(enrollment: Enrollment) -> Self {
        Self {
            id: enrollment.id,
            user_id: enrollment.user_id,
            course_id: enrollment.course_id,
            enrolled_at: enrollment.enrolled_at,
        }
    }
}

/// GET /api/courses - List all courses
#[utoipa::path(
    get,
    path = "/api/courses",
    responses(
        (status = 200, description = "Courses fetched successfully", body = [CourseResponse]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_courses_handler(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<CourseResponse>>>), HttpError> {
    let courses = state.db.list_courses().await?;
    let data = courses.into_iter().map(CourseResponse::from).collect();
    Ok((
        StatusCode::OK,
        ApiResponse::with_message(data, "Courses fetched successfully"),
    ))
}

/// GET /api/courses/{id} - Get a single course
#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course fetched successfully", body = CourseResponse),
        (status = 404, description = "Course not found")
    )
)]
pub async fn get_course_handler(
    State(state): State<Arc<AppState>>,
    ApiPath(course_id): ApiPath<Uuid>,
) -> Result<(StatusCode, Json<ApiResponse<CourseResponse>>), HttpError> {
    let course = state.db.get_course_by_id(course_id).await?;
    Ok((
        StatusCode::OK,
        ApiResponse::with_message(CourseResponse::from(course), "Course fetched successfully"),
    ))
}

/// POST /api/courses - Create a course owned by the caller
#[utoipa::path(
    post,
    path = "/api/courses",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created successfully", body = CourseResponse),
        (status = 400, description = "Missing title or negative price"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_course_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    ApiJson(req): ApiJson<CreateCourseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CourseResponse>>), HttpError> {
    let title = req
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| HttpError::Validation("Course title is required".to_string()))?;
    let price = req.price.unwrap_or(0.0);
    if !price.is_finite() || price < 0.0 {
        return Err(HttpError::Validation(
            "Price must be a non-negative number".to_string(),
        ));
    }

    let course = state
        .db
        .create_course(NewCourse {
            title,
            description: req.description.filter(|d| !d.trim().is_empty()),
            price,
            instructor_id: user_id,
        })
        .await?;
    info!(course_id = %course.id, instructor_id = %user_id, "Course created");

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(CourseResponse::from(course), "Course created successfully"),
    ))
}

/// POST /api/courses/{id}/enroll - Enroll the caller in a course
#[utoipa::path(
    post,
    path = "/api/courses/{id}/enroll",
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 201, description = "Successfully enrolled in the course", body = EnrollmentResponse),
        (status = 400, description = "Already enrolled"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Course not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn enroll_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    ApiPath(course_id): ApiPath<Uuid>,
) -> Result<(StatusCode, Json<ApiResponse<EnrollmentResponse>>), HttpError> {
    // 1. The course must exist
    state.db.get_course_by_id(course_id).await?;

    // 2. Check if already enrolled; the storage uniqueness rule covers racing requests
    if state.db.find_enrollment(user_id, course_id).await?.is_some() {
        return Err(HttpError::Validation(ALREADY_ENROLLED.to_string()));
    }

    // 3. Create the enrollment
    let enrollment = state.db.create_enrollment(user_id, course_id).await?;
    info!(%user_id, %course_id, "User enrolled");

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(
            EnrollmentResponse::from(enrollment),
            "Successfully enrolled in the course.",
        ),
    ))
}
