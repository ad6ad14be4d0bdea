//! Department directory
//!
//! Departments are identified in URLs by short slugs; the roster stores the
//! display name.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::{ApiError, ApiResult, AppState};

/// Slug → roster department name
pub const DEPARTMENTS: &[(&str, &str)] = &[
    ("germans", "Germans"),
    ("italians", "Italians"),
    ("education", "Education for Generations"),
    ("warmhearted", "Warmhearted Group"),
    ("assisted", "Assisted Group"),
];

pub fn department_name(slug: &str) -> Option<&'static str> {
    let slug = slug.trim().to_lowercase();
    DEPARTMENTS
        .iter()
        .find(|(s, _)| *s == slug)
        .map(|(_, name)| *name)
}

#[derive(Debug, Serialize)]
pub struct DepartmentSummary {
    pub slug: &'static str,
    pub name: &'static str,
    pub students: usize,
}

#[derive(Debug, Serialize)]
pub struct DepartmentMember {
    pub admission_number: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct DepartmentResponse {
    pub slug: String,
    pub name: &'static str,
    pub students: Vec<DepartmentMember>,
}

/// GET /api/departments
pub async fn list_departments(State(state): State<AppState>) -> Json<Vec<DepartmentSummary>> {
    Json(
        DEPARTMENTS
            .iter()
            .map(|&(slug, name)| DepartmentSummary {
                slug,
                name,
                students: state.roster.by_department(name).len(),
            })
            .collect(),
    )
}

/// GET /api/departments/:slug
pub async fn get_department(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<DepartmentResponse>> {
    let name = department_name(&slug)
        .ok_or_else(|| ApiError::NotFound(format!("Department '{}'", slug)))?;

    let students = state
        .roster
        .by_department(name)
        .into_iter()
        .map(|s| DepartmentMember {
            admission_number: s.admission_number.clone(),
            name: s.name.clone(),
        })
        .collect();

    Ok(Json(DepartmentResponse {
        slug: slug.trim().to_lowercase(),
        name,
        students,
    }))
}

pub fn department_routes() -> Router<AppState> {
    Router::new()
        .route("/api/departments", get(list_departments))
        .route("/api/departments/:slug", get(get_department))
}
