//! services/api/src/web/pyq.rs
//!
//! Previous-year question papers: filtered listing and authenticated PDF upload.

use axum::{
    extract::{multipart::MultipartError, Multipart, Query, State},
    http::StatusCode,
    Extension, Json,
};
use bytegurukul_core::domain::{NewQuestionPaper, PaperFilter, PaperType, QuestionPaper};
use bytes::{Bytes, BytesMut};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::adapters::uploads::PDF_FIELD;
use crate::error::{HttpError, MAX_UPLOAD_BYTES};
use crate::web::middleware::AuthUser;
use crate::web::rest::{missing_fields, ApiResponse};
use crate::web::state::AppState;

const PDF_MIME: &str = "application/pdf";

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaperQuery {
    /// Exact year; `All` or empty disables the filter.
    pub year: Option<String>,
    /// Exact semester; `All` or empty disables the filter.
    pub semester: Option<String>,
    /// Case-insensitive substring of the subject or subject code.
    pub search: Option<String>,
}

impl From<PaperQuery> for PaperFilter {
    fn from(query: PaperQuery) -> Self {
        PaperFilter {
            year: query.year,
            semester: query.semester,
            search: query.search,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaperResponse {
    pub id: Uuid,
    pub subject: String,
    pub subject_code: String,
    pub year: String,
    pub semester: String,
    #[serde(rename = "type")]
    pub paper_type: String,
    pub file_url: String,
    pub created_at: DateTime<Utc>,
}

impl From<QuestionPaper> for PaperResponse {
    fn from(paper: QuestionPaper) -> Self {
        Self {
            id: paper.id,
            subject: paper.subject,
            subject_code: paper.subject_code,
            year: paper.year,
            semester: paper.semester,
            paper_type: paper.paper_type.to_string(),
            file_url: paper.file_url,
            created_at: paper.created_at,
        }
    }
}

/// The text fields and the file collected from an upload form.
#[derive(Default)]
struct UploadForm {
    subject: Option<String>,
    subject_code: Option<String>,
    year: Option<String>,
    semester: Option<String>,
    paper_type: Option<String>,
    file: Option<(String, Bytes)>,
}

fn multipart_error(err: MultipartError) -> HttpError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        HttpError::PayloadTooLarge
    } else {
        warn!("Malformed multipart body: {}", err);
        HttpError::Validation(format!("Invalid form data: {}", err.body_text()))
    }
}

async fn read_form(multipart: &mut Multipart) -> Result<UploadForm, HttpError> {
    let mut form = UploadForm::default();

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == PDF_FIELD {
            let is_pdf = field
                .content_type()
                .map(|mime| mime.eq_ignore_ascii_case(PDF_MIME))
                .unwrap_or(false);
            if !is_pdf {
                return Err(HttpError::UnsupportedMediaType);
            }
            let file_name = field.file_name().unwrap_or("paper.pdf").to_string();

            let mut data = BytesMut::new();
            while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
                if data.len() + chunk.len() > MAX_UPLOAD_BYTES {
                    return Err(HttpError::PayloadTooLarge);
                }
                data.extend_from_slice(&chunk);
            }
            form.file = Some((file_name, data.freeze()));
            continue;
        }

        let value = field.text().await.map_err(multipart_error)?;
        match name.as_str() {
            "subject" => form.subject = Some(value),
            "subjectCode" => form.subject_code = Some(value),
            "year" => form.year = Some(value),
            "semester" => form.semester = Some(value),
            "type" => form.paper_type = Some(value),
            _ => {}
        }
    }

    Ok(form)
}

/// GET /api/pyq - List question papers, newest first
#[utoipa::path(
    get,
    path = "/api/pyq",
    params(PaperQuery),
    responses(
        (status = 200, description = "Matching papers, newest first", body = [PaperResponse]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_papers_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PaperQuery>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<PaperResponse>>>), HttpError> {
    let filter = PaperFilter::from(query);
    let papers = state.db.list_question_papers(&filter).await?;
    let data = papers.into_iter().map(PaperResponse::from).collect();
    Ok((StatusCode::OK, ApiResponse::ok(data)))
}

/// POST /api/pyq - Upload a question paper PDF with its metadata
///
/// Accepts multipart/form-data with `subject`, `subjectCode`, `year`, `semester`,
/// an optional `type` and the PDF in `pdfFile` (at most 10 MB).
#[utoipa::path(
    post,
    path = "/api/pyq",
    request_body(content_type = "multipart/form-data", description = "Paper metadata and the PDF in `pdfFile`."),
    responses(
        (status = 201, description = "Paper uploaded successfully", body = PaperResponse),
        (status = 400, description = "Missing fields, not a PDF, or file too large"),
        (status = 401, description = "Missing or invalid token"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_paper_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<PaperResponse>>), HttpError> {
    // 1. Read the form; file constraints are enforced while streaming
    let form = read_form(&mut multipart).await?;
    let (file_name, data) = form
        .file
        .ok_or_else(|| HttpError::Validation("Please upload a PDF file".to_string()))?;

    // 2. Validate metadata before touching the disk
    let missing = missing_fields(&[
        ("subject", form.subject.as_deref()),
        ("subjectCode", form.subject_code.as_deref()),
        ("year", form.year.as_deref()),
        ("semester", form.semester.as_deref()),
    ]);
    if !missing.is_empty() {
        return Err(HttpError::Validation(format!(
            "Please fill in all required fields: {}",
            missing.join(", ")
        )));
    }
    let paper_type = match form.paper_type.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        Some(raw) => raw.parse::<PaperType>().map_err(HttpError::Validation)?,
        None => PaperType::Regular,
    };

    // 3. Store the file, then the record
    let stored = state
        .uploads
        .store(&file_name, data)
        .await
        .map_err(|e| HttpError::server("Failed to store uploaded file", e))?;

    let created = state
        .db
        .create_question_paper(NewQuestionPaper {
            subject: form.subject.unwrap_or_default().trim().to_string(),
            subject_code: form.subject_code.unwrap_or_default().trim().to_string(),
            year: form.year.unwrap_or_default().trim().to_string(),
            semester: form.semester.unwrap_or_default().trim().to_string(),
            paper_type,
            file_url: stored.url.clone(),
        })
        .await;
    let paper = match created {
        Ok(paper) => paper,
        Err(e) => {
            if let Err(io) = state.uploads.discard(&stored).await {
                warn!(file = %stored.file_name, "Failed to discard orphaned upload: {}", io);
            }
            return Err(e.into());
        }
    };
    info!(paper_id = %paper.id, %user_id, file = %stored.file_name, "Question paper uploaded");

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(PaperResponse::from(paper), "Paper uploaded successfully!"),
    ))
}
