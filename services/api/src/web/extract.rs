//! services/api/src/web/extract.rs
//!
//! `Json` and `Path` extractors whose rejections are answered with the same
//! `{ "success": false, "message": ... }` body as every other handler error.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, Path, Request,
    },
    http::request::Parts,
    Json,
};
use tracing::{debug, error};

use crate::error::HttpError;

/// A JSON request body. Missing content type, malformed JSON and mistyped
/// fields are all validation errors.
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                debug!(status = %rejection.status(), "Rejected JSON body: {}", rejection.body_text());
                Err(HttpError::Validation(rejection.body_text()))
            }
        }
    }
}

/// A path parameter. A segment that does not parse names no resource, so it is
/// reported as not found.
pub struct ApiPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    Path<T>: FromRequestParts<S, Rejection = PathRejection>,
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(PathRejection::FailedToDeserializePathParams(e)) => {
                debug!("Unparseable path parameter: {}", e.body_text());
                Err(HttpError::NotFound("Resource not found".to_string()))
            }
            Err(rejection) => {
                error!("Path extraction failed: {}", rejection.body_text());
                Err(HttpError::Server(crate::error::SERVER_ERROR_MESSAGE.to_string()))
            }
        }
    }
}
