use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::Account;
use crate::services::messaging::MessagingService;
use crate::services::resolver::{Resolver, ADVISOR_ONLY, PARENT_ONLY};
use crate::AppState;

/// GET /api/messages - the caller's inbox, newest first.
pub async fn inbox(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
) -> Result<Json<Value>, ApiError> {
    let messages = MessagingService::new(state.store.clone())
        .inbox(account.id)
        .await?;
    Ok(Json(json!({ "messages": messages })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentMessageRequest {
    pub student_id: Uuid,
    pub content: String,
}

/// POST /api/messages/student - advisor to one of the students.
pub async fn send_to_student(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
    Json(req): Json<StudentMessageRequest>,
) -> Result<Json<Value>, ApiError> {
    ADVISOR_ONLY.authorize(&account)?;
    let message = MessagingService::new(state.store.clone())
        .send_to_student(account.id, req.student_id, &req.content)
        .await?;
    Ok(Json(json!({
        "message": "Message sent",
        "data": message,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentMessageRequest {
    pub parent_id: Uuid,
    pub content: String,
}

/// POST /api/messages/parent - advisor to a parent.
pub async fn send_to_parent(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
    Json(req): Json<ParentMessageRequest>,
) -> Result<Json<Value>, ApiError> {
    ADVISOR_ONLY.authorize(&account)?;
    let message = MessagingService::new(state.store.clone())
        .send_to_parent(account.id, req.parent_id, &req.content)
        .await?;
    Ok(Json(json!({
        "message": "Message sent",
        "data": message,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisorMessageRequest {
    pub advisor_id: Uuid,
    pub content: String,
}

/// POST /api/messages/advisor - parent to an advisor.
pub async fn send_to_advisor(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
    Json(req): Json<AdvisorMessageRequest>,
) -> Result<Json<Value>, ApiError> {
    PARENT_ONLY.authorize(&account)?;
    let message = MessagingService::new(state.store.clone())
        .send_to_advisor(account.id, req.advisor_id, &req.content)
        .await?;
    Ok(Json(json!({
        "message": "Message sent",
        "data": message,
    })))
}

#[derive(Debug, Deserialize)]
pub struct OwnAdvisorMessageRequest {
    pub content: String,
}

/// POST /api/messages/my-advisor - student to their assigned advisor.
pub async fn send_to_own_advisor(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
    Json(req): Json<OwnAdvisorMessageRequest>,
) -> Result<Json<Value>, ApiError> {
    let student = Resolver::new(state.store.clone()).student(&account).await?;
    let message = MessagingService::new(state.store.clone())
        .send_to_own_advisor(account.id, student.advisor_id, &req.content)
        .await?;
    Ok(Json(json!({
        "message": "Message sent",
        "data": message,
    })))
}
