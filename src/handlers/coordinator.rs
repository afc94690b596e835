use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::Account;
use crate::services::credential::CredentialService;
use crate::services::registration::RegistrationService;
use crate::services::resolver::Resolver;
use crate::AppState;

/// GET /coordinator/profile
pub async fn profile(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
) -> Result<Json<Value>, ApiError> {
    let coordinator = Resolver::new(state.store.clone())
        .coordinator(&account)
        .await?;
    Ok(Json(json!({
        "firstName": account.first_name,
        "lastName": account.last_name,
        "email": account.email,
        "profile": coordinator,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// PUT /coordinator/profile - name and email update, token re-issued with
/// the new email.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
    Json(req): Json<ProfileUpdateRequest>,
) -> Result<Json<Value>, ApiError> {
    Resolver::new(state.store.clone())
        .coordinator(&account)
        .await?;
    let (updated, token) = CredentialService::new(state.store.clone())
        .update_identity(&account, &req.first_name, &req.last_name, &req.email)
        .await?;
    Ok(Json(json!({
        "message": "Profile updated",
        "token": token,
        "firstName": updated.first_name,
        "lastName": updated.last_name,
        "email": updated.email,
    })))
}

#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    pub password: String,
}

/// PUT /coordinator/password
pub async fn update_password(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
    Json(req): Json<PasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    Resolver::new(state.store.clone())
        .coordinator(&account)
        .await?;
    let token = CredentialService::new(state.store.clone())
        .update_password(&account, &req.password)
        .await?;
    Ok(Json(json!({
        "message": "Password updated",
        "token": token,
    })))
}

/// GET /coordinator/courses - the managed set, resolved to course records.
pub async fn courses(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
) -> Result<Json<Value>, ApiError> {
    let coordinator = Resolver::new(state.store.clone())
        .coordinator(&account)
        .await?;
    let courses = state.store.find_courses_by_ids(&coordinator.courses).await?;
    Ok(Json(json!({ "courses": courses })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseIdsRequest {
    pub course_ids: Vec<Uuid>,
}

/// POST /coordinator/courses/add
pub async fn add_courses(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
    Json(req): Json<CourseIdsRequest>,
) -> Result<Json<Value>, ApiError> {
    let coordinator = Resolver::new(state.store.clone())
        .coordinator(&account)
        .await?;
    let courses = RegistrationService::new(state.store.clone())
        .add_coordinator_courses(&coordinator, &req.course_ids)
        .await?;
    Ok(Json(json!({
        "message": "Courses added successfully",
        "courses": courses,
    })))
}

/// POST /coordinator/courses/remove
pub async fn remove_courses(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
    Json(req): Json<CourseIdsRequest>,
) -> Result<Json<Value>, ApiError> {
    let coordinator = Resolver::new(state.store.clone())
        .coordinator(&account)
        .await?;
    let courses = RegistrationService::new(state.store.clone())
        .remove_coordinator_courses(&coordinator, &req.course_ids)
        .await?;
    Ok(Json(json!({
        "message": "Courses removed successfully",
        "courses": courses,
    })))
}

/// PUT /coordinator/courses
pub async fn replace_courses(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
    Json(req): Json<CourseIdsRequest>,
) -> Result<Json<Value>, ApiError> {
    let coordinator = Resolver::new(state.store.clone())
        .coordinator(&account)
        .await?;
    let courses = RegistrationService::new(state.store.clone())
        .replace_coordinator_courses(&coordinator, &req.course_ids)
        .await?;
    Ok(Json(json!({
        "message": "Courses updated successfully",
        "courses": courses,
    })))
}
