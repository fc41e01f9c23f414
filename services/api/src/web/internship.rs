//! services/api/src/web/internship.rs
//!
//! Internship application endpoints: public submission and the admin review list.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use bytegurukul_core::domain::{Application, NewApplication};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::HttpError;
use crate::web::extract::{ApiJson, ApiPath};
use crate::web::rest::{is_valid_email, missing_fields, non_empty, ApiResponse};
use crate::web::state::AppState;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub university: Option<String>,
    pub resume_text: Option<String>,
    pub role_id: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub university: Option<String>,
    pub resume_text: Option<String>,
    pub role_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<Application> for ApplicationResponse {
    fn from(app: Application) -> Self {
        Self {
            id: app.id,
            name: app.name,
            email: app.email,
            phone: app.phone,
            university: app.university,
            resume_text: app.resume_text,
            role_id: app.role_id,
            status: app.status,
            created_at: app.created_at,
        }
    }
}

/// POST /api/internship/apply - Submit a new internship application
#[utoipa::path(
    post,
    path = "/api/internship/apply",
    request_body = ApplyRequest,
    responses(
        (status = 201, description = "Application submitted successfully", body = ApplicationResponse),
        (status = 400, description = "Required fields are missing"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn apply_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ApplyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ApplicationResponse>>), HttpError> {
    // Basic validation
    let missing = missing_fields(&[
        ("name", req.name.as_deref()),
        ("email", req.email.as_deref()),
        ("phone", req.phone.as_deref()),
        ("roleId", req.role_id.as_deref()),
    ]);
    if !missing.is_empty() {
        return Err(HttpError::Validation(format!(
            "Please fill in all required fields: {}",
            missing.join(", ")
        )));
    }
    let email = req.email.unwrap_or_default().trim().to_string();
    if !is_valid_email(&email) {
        return Err(HttpError::Validation("Please enter a valid email address".to_string()));
    }

    let application = state
        .db
        .create_application(NewApplication {
            name: req.name.unwrap_or_default().trim().to_string(),
            email,
            phone: req.phone.unwrap_or_default().trim().to_string(),
            university: non_empty(req.university),
            resume_text: non_empty(req.resume_text),
            role_id: req.role_id.unwrap_or_default().trim().to_string(),
        })
        .await?;
    info!(application_id = %application.id, role_id = %application.role_id, "Application submitted");

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(
            ApplicationResponse::from(application),
            "Application submitted successfully!",
        ),
    ))
}

/// GET /api/internship/all - All applications, newest first
#[utoipa::path(
    get,
    path = "/api/internship/all",
    responses(
        (status = 200, description = "Applications, newest first", body = [ApplicationResponse]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_applications_handler(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<ApplicationResponse>>>), HttpError> {
    let applications = state.db.list_applications().await?;
    let data = applications
        .into_iter()
        .map(ApplicationResponse::from)
        .collect();
    Ok((StatusCode::OK, ApiResponse::ok(data)))
}

/// PUT /api/internship/{id}/status - Approve, reject or otherwise re-label an application
#[utoipa::path(
    put,
    path = "/api/internship/{id}/status",
    params(("id" = Uuid, Path, description = "Application id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApplicationResponse),
        (status = 400, description = "Status is missing"),
        (status = 404, description = "Application not found")
    )
)]
pub async fn update_status_handler(
    State(state): State<Arc<AppState>>,
    ApiPath(application_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateStatusRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ApplicationResponse>>), HttpError> {
    let status = non_empty(req.status)
        .ok_or_else(|| HttpError::Validation("Status is required".to_string()))?;

    let application = state
        .db
        .update_application_status(application_id, &status)
        .await?;
    info!(%application_id, status = %application.status, "Application status updated");

    Ok((
        StatusCode::OK,
        ApiResponse::ok(ApplicationResponse::from(application)),
    ))
}
