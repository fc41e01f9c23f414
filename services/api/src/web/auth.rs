//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for registration, login, and the current profile.

use axum::{extract::State, http::StatusCode, Extension, Json};
use bytegurukul_core::domain::{NewUser, Role, User};
use bytegurukul_core::ports::PortError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::HttpError;
use crate::password::{hash_password, verify_password};
use crate::web::extract::ApiJson;
use crate::web::middleware::AuthUser;
use crate::web::rest::{is_valid_email, missing_fields, ApiResponse};
use crate::web::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// `student` (default) or `instructor`; case-insensitive.
    pub role: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// The `data` of a successful register or login.
#[derive(Serialize, ToSchema)]
pub struct AuthData {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    pub token: String,
}

/// A user profile without any credential material.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role.to_string(),
            created_at: user.created_at,
        }
    }
}

fn auth_data(state: &AppState, user: User) -> Result<AuthData, HttpError> {
    let token = state
        .tokens
        .issue(user.id)
        .map_err(|e| HttpError::server("Failed to issue token", e))?;
    Ok(AuthData {
        id: user.id,
        username: user.username,
        email: user.email,
        role: user.role.to_string(),
        token,
    })
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/auth/register - Create a new user account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created; data carries the session token", body = AuthData),
        (status = 400, description = "Missing fields, bad role, or email already registered"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthData>>), HttpError> {
    // 1. Validate the payload
    let missing = missing_fields(&[
        ("username", req.username.as_deref()),
        ("email", req.email.as_deref()),
        ("password", req.password.as_deref()),
    ]);
    if !missing.is_empty() {
        return Err(HttpError::Validation(format!(
            "Please fill in all required fields: {}",
            missing.join(", ")
        )));
    }
    let username = req.username.unwrap_or_default().trim().to_string();
    let email = req.email.unwrap_or_default().trim().to_string();
    let password = req.password.unwrap_or_default();
    if !is_valid_email(&email) {
        return Err(HttpError::Validation("Please enter a valid email address".to_string()));
    }
    let role = match req.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        Some(raw) => raw
            .parse::<Role>()
            .map_err(|e| HttpError::Validation(e.to_string()))?,
        None => Role::Student,
    };
    if role == Role::Admin {
        return Err(HttpError::Validation(
            "Admin accounts cannot be created through registration".to_string(),
        ));
    }

    // 2. Hash the password
    let password_hash = hash_password(&password).map_err(|e| {
        error!("Failed to hash password: {:?}", e);
        HttpError::Server("Failed to hash password".to_string())
    })?;

    // 3. Create user in database
    let user = state
        .db
        .create_user(NewUser {
            username,
            email,
            password_hash,
            role,
        })
        .await?;
    info!(user_id = %user.id, role = %user.role, "User registered");

    // 4. Issue the session token
    let data = auth_data(&state, user)?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(data, "Registration successful"),
    ))
}

/// POST /api/auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful; data carries the session token", body = AuthData),
        (status = 400, description = "Email or password missing"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthData>>), HttpError> {
    let missing = missing_fields(&[
        ("email", req.email.as_deref()),
        ("password", req.password.as_deref()),
    ]);
    if !missing.is_empty() {
        return Err(HttpError::Validation(format!(
            "Please fill in all required fields: {}",
            missing.join(", ")
        )));
    }
    let email = req.email.unwrap_or_default();
    let password = req.password.unwrap_or_default();

    // 1. Get user by email
    let creds = match state.db.get_user_by_email(email.trim()).await {
        Ok(creds) => creds,
        Err(PortError::NotFound(_)) => {
            return Err(HttpError::Unauthorized(INVALID_CREDENTIALS.to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    // 2. Verify password
    let valid = verify_password(&password, &creds.password_hash).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        HttpError::Server("Authentication error".to_string())
    })?;
    if !valid {
        return Err(HttpError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    // 3. Issue the session token
    let data = auth_data(&state, creds.user)?;
    Ok((
        StatusCode::OK,
        ApiResponse::with_message(data, "Login successful"),
    ))
}

/// GET /api/auth/me - Profile of the token's owner
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Profile fetched successfully", body = UserResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), HttpError> {
    let user = state.db.get_user_by_id(user_id).await.map_err(|e| match e {
        PortError::NotFound(_) => HttpError::NotFound("User not found".to_string()),
        other => other.into(),
    })?;
    Ok((
        StatusCode::OK,
        ApiResponse::with_message(UserResponse::from(user), "Profile fetched successfully"),
    ))
}
