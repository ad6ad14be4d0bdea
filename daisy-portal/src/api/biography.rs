//! Biography read and edit endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use daisy_common::{normalize_admission_number, Error};
use serde::{Deserialize, Serialize};

use crate::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct UpdateBiographyRequest {
    pub adm_no: String,
    pub biography: String,
}

#[derive(Debug, Serialize)]
pub struct BiographyResponse {
    pub admission_number: String,
    pub biography: String,
}

/// GET /api/biography/:adm_no
///
/// Resolved biography: stored edit, else roster default, else empty.
pub async fn get_biography(
    State(state): State<AppState>,
    Path(adm_no): Path<String>,
) -> ApiResult<Json<BiographyResponse>> {
    let student = state
        .roster
        .get(&adm_no)
        .ok_or_else(|| Error::UnknownStudent(normalize_admission_number(&adm_no)))?;

    Ok(Json(BiographyResponse {
        admission_number: student.admission_number.clone(),
        biography: state.biographies.resolve(student).await?,
    }))
}

/// POST /api/biography
///
/// **Request:** `{"adm_no": "A100", "biography": "Enjoys chess"}`
pub async fn update_biography(
    State(state): State<AppState>,
    payload: Result<Json<UpdateBiographyRequest>, JsonRejection>,
) -> ApiResult<Json<BiographyResponse>> {
    let Json(payload) = payload?;

    state
        .biographies
        .upsert(&state.roster, &payload.adm_no, &payload.biography)
        .await?;

    Ok(Json(BiographyResponse {
        admission_number: normalize_admission_number(&payload.adm_no),
        biography: payload.biography.trim().to_string(),
    }))
}

pub fn biography_routes() -> Router<AppState> {
    Router::new()
        .route("/api/biography", post(update_biography))
        .route("/api/biography/:adm_no", get(get_biography))
}
