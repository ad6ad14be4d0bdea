//! Attachment listing, uploads and deletion

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::JsonRejection,
        Multipart, Path, State,
    },
    routing::{get, post},
    Json, Router,
};
use daisy_common::{normalize_admission_number, Attachment, Category, Error};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::services::{IncomingFile, UploadOutcome};
use crate::{ApiError, ApiResult, AppState};

/// Multipart field names that carry files (the older forms used one per category)
const FILE_FIELDS: &[&str] = &["file", "files", "gallery_file", "result_file", "letter_file"];

#[derive(Debug, Serialize)]
pub struct AttachmentListResponse {
    pub admission_number: String,
    pub category: Category,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    #[serde(flatten)]
    pub outcome: UploadOutcome,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    #[serde(default)]
    pub public_id: String,
    #[serde(rename = "type")]
    pub category: String,
    #[serde(default)]
    pub adm_no: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    /// Whether a local record existed and was removed
    pub removed: bool,
}

/// GET /api/students/:adm_no/:category
pub async fn list_attachments(
    State(state): State<AppState>,
    Path((adm_no, category)): Path<(String, String)>,
) -> ApiResult<Json<AttachmentListResponse>> {
    let category: Category = category.parse()?;
    let student = state
        .roster
        .get(&adm_no)
        .ok_or_else(|| Error::UnknownStudent(normalize_admission_number(&adm_no)))?;

    let attachments = state
        .attachments
        .list(&student.admission_number, category)
        .await?;

    Ok(Json(AttachmentListResponse {
        admission_number: student.admission_number.clone(),
        category,
        attachments,
    }))
}

/// POST /api/students/:adm_no/:category (multipart: file parts + optional `note`)
pub async fn upload_attachments(
    State(state): State<AppState>,
    Path((adm_no, category)): Path<(String, String)>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadResponse>> {
    let category: Category = category.parse()?;
    let mut multipart = multipart?;

    let mut files = Vec::new();
    let mut note: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().map(str::to_string);

        if name == "note" {
            note = Some(field.text().await.map_err(|e| ApiError::BadRequest(e.to_string()))?);
        } else if filename.is_some() || FILE_FIELDS.contains(&name.as_str()) {
            let content = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(e.to_string()))?;
            files.push(IncomingFile::new(filename.unwrap_or_default(), content.to_vec()));
        } else {
            debug!(field = %name, "Ignoring unexpected multipart field");
        }
    }

    let outcome = state
        .uploads
        .submit(&adm_no, category, files, note.as_deref())
        .await?;

    Ok(Json(UploadResponse {
        outcome,
        message: format!("{} accepted, {} rejected", outcome.accepted, outcome.rejected),
    }))
}

/// POST /api/attachments/delete
///
/// **Request:** `{"public_id": "...", "type": "letter", "adm_no": "A100"}`
pub async fn delete_attachment(
    State(state): State<AppState>,
    payload: Result<Json<DeleteRequest>, JsonRejection>,
) -> ApiResult<Json<DeleteResponse>> {
    let Json(payload) = payload?;
    let public_id = payload.public_id.trim();
    if public_id.is_empty() {
        return Err(ApiError::BadRequest("Missing public_id".to_string()));
    }
    let category: Category = payload.category.parse()?;

    // Refuse before touching the host if the record says otherwise
    if let Some(existing) = state.attachments.get(public_id).await? {
        if existing.category != category {
            return Err(ApiError::BadRequest(format!(
                "Attachment {} is a {}, not a {}",
                public_id, existing.category, category
            )));
        }
        let owner = payload.adm_no.as_deref().map(str::trim).filter(|a| !a.is_empty());
        if let Some(adm_no) = owner {
            if existing.admission_number != normalize_admission_number(adm_no) {
                return Err(ApiError::BadRequest(format!(
                    "Attachment {} does not belong to {}",
                    public_id,
                    normalize_admission_number(adm_no)
                )));
            }
        }
    }

    let removed = state.uploads.retract(public_id, category).await?;

    Ok(Json(DeleteResponse {
        success: true,
        removed,
    }))
}

pub fn attachment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/students/:adm_no/:category",
            get(list_attachments).post(upload_attachments),
        )
        .route("/api/attachments/delete", post(delete_attachment))
}
