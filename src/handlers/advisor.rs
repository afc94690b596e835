use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::Account;
use crate::services::credential::CredentialService;
use crate::services::resolver::Resolver;
use crate::services::results::{ResultsService, UploadRow};
use crate::AppState;

/// GET /advisor/profile
pub async fn profile(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
) -> Result<Json<Value>, ApiError> {
    let advisor = Resolver::new(state.store.clone()).advisor(&account).await?;
    Ok(Json(json!({
        "firstName": account.first_name,
        "lastName": account.last_name,
        "email": account.email,
        "profile": advisor,
    })))
}

#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    pub password: String,
}

/// PUT /advisor/password
pub async fn update_password(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
    Json(req): Json<PasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    Resolver::new(state.store.clone()).advisor(&account).await?;
    let token = CredentialService::new(state.store.clone())
        .update_password(&account, &req.password)
        .await?;
    Ok(Json(json!({
        "message": "Password updated",
        "token": token,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResultsRequest {
    pub semester_id: Uuid,
    pub course_id: Uuid,
    pub results: Vec<UploadRow>,
}

/// POST /advisor/upload-results
pub async fn upload_results(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
    Json(req): Json<UploadResultsRequest>,
) -> Result<Json<Value>, ApiError> {
    Resolver::new(state.store.clone()).advisor(&account).await?;
    let count = ResultsService::new(state.store.clone())
        .upload(req.semester_id, req.course_id, &req.results)
        .await?;
    Ok(Json(json!({
        "message": "Results uploaded successfully",
        "count": count,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsQuery {
    pub course_id: Uuid,
    pub semester_id: Uuid,
}

/// GET /advisor/results - the uploaded rows for one (course, semester) pair.
pub async fn results(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
    Query(query): Query<ResultsQuery>,
) -> Result<Json<Value>, ApiError> {
    Resolver::new(state.store.clone()).advisor(&account).await?;
    let rows = ResultsService::new(state.store.clone())
        .filtered(query.course_id, query.semester_id)
        .await?;
    Ok(Json(json!({ "results": rows })))
}
