use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::models::{Account, SemesterName};
use crate::services::registration::RegistrationService;
use crate::services::resolver::Resolver;
use crate::services::results::ResultsService;
use crate::AppState;

/// GET /student/profile
pub async fn profile(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
) -> Result<Json<Value>, ApiError> {
    let student = Resolver::new(state.store.clone()).student(&account).await?;
    Ok(Json(json!({
        "firstName": account.first_name,
        "lastName": account.last_name,
        "email": account.email,
        "profile": student,
    })))
}

/// GET /student/results
pub async fn results(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
) -> Result<Json<Value>, ApiError> {
    let student = Resolver::new(state.store.clone()).student(&account).await?;
    let rows = ResultsService::new(state.store.clone())
        .for_student(student.id)
        .await?;
    Ok(Json(json!({ "results": rows })))
}

/// GET /student/latest-result
pub async fn latest_result(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
) -> Result<Json<Value>, ApiError> {
    let student = Resolver::new(state.store.clone()).student(&account).await?;
    let latest = ResultsService::new(state.store.clone())
        .latest_for_student(student.id)
        .await?;
    Ok(Json(json!({ "results": latest })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCoursesRequest {
    pub session: String,
    pub semester: String,
    pub courses: Vec<String>,
}

/// POST /course/register - register the caller's own courses for one term.
pub async fn register_courses(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
    Json(req): Json<RegisterCoursesRequest>,
) -> Result<Json<Value>, ApiError> {
    let student = Resolver::new(state.store.clone()).student(&account).await?;
    let term: SemesterName = req
        .semester
        .parse()
        .map_err(|_| ApiError::bad_request("Unknown semester"))?;

    let added = RegistrationService::new(state.store.clone())
        .register_courses(&student.reg_no, &req.session, term, &req.courses)
        .await?;

    Ok(Json(json!({
        "message": "Courses registered successfully",
        "courses": added,
    })))
}
