use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{Account, SemesterName};
use crate::services::registration::{CourseDef, RegistrationService};
use crate::services::resolver::STAFF;
use crate::AppState;

/// GET /courses/:level/:semester - public reference listing.
pub async fn list(
    State(state): State<AppState>,
    Path((level, semester)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let term: SemesterName = semester
        .parse()
        .map_err(|_| ApiError::bad_request("Unknown semester"))?;
    let courses = RegistrationService::new(state.store.clone())
        .list_courses(&level, term)
        .await?;
    Ok(Json(json!({ "courses": courses })))
}

#[derive(Debug, Deserialize)]
pub struct LoadCoursesRequest {
    pub courses: Vec<CourseDef>,
}

/// POST /courses/load - bulk reference-data load, staff only.
pub async fn load(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
    Json(req): Json<LoadCoursesRequest>,
) -> Result<Json<Value>, ApiError> {
    STAFF.authorize(&account)?;
    let loaded = RegistrationService::new(state.store.clone())
        .load_courses(&req.courses)
        .await?;
    Ok(Json(json!({
        "message": "Courses loaded",
        "loaded": loaded,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSemesterRequest {
    pub name: String,
    pub session: String,
    pub courses: Vec<Uuid>,
}

/// POST /semesters - merge-upsert on the (name, session) pair, staff only.
pub async fn create_semester(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
    Json(req): Json<CreateSemesterRequest>,
) -> Result<Json<Value>, ApiError> {
    STAFF.authorize(&account)?;
    let name: SemesterName = req
        .name
        .parse()
        .map_err(|_| ApiError::bad_request("Unknown semester"))?;

    let semester = RegistrationService::new(state.store.clone())
        .create_semester(name, &req.session, &req.courses)
        .await?;
    Ok(Json(json!({
        "message": "Semester created",
        "semester": semester,
    })))
}
