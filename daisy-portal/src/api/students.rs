//! Student profile lookup

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use daisy_common::{normalize_admission_number, Error, Student};
use serde::Serialize;

use crate::{ApiResult, AppState};

/// Profile payload: roster snapshot plus the resolved biography
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub student: Student,
    pub biography: String,
}

/// GET /api/students/:adm_no
pub async fn get_profile(
    State(state): State<AppState>,
    Path(adm_no): Path<String>,
) -> ApiResult<Json<ProfileResponse>> {
    let student = state
        .roster
        .get(&adm_no)
        .ok_or_else(|| Error::UnknownStudent(normalize_admission_number(&adm_no)))?;

    let biography = state.biographies.resolve(student).await?;

    Ok(Json(ProfileResponse {
        student: student.clone(),
        biography,
    }))
}

pub fn student_routes() -> Router<AppState> {
    Router::new().route("/api/students/:adm_no", get(get_profile))
}
