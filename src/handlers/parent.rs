use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::models::Account;
use crate::services::credential::CredentialService;
use crate::services::parent::ParentService;
use crate::services::resolver::Resolver;
use crate::AppState;

/// GET /parent/profile - parent identity plus resolved children.
pub async fn profile(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
) -> Result<Json<Value>, ApiError> {
    let parent = Resolver::new(state.store.clone()).parent(&account).await?;
    let children = ParentService::new(state.store.clone())
        .children(&parent)
        .await?;
    Ok(Json(json!({
        "firstName": account.first_name,
        "lastName": account.last_name,
        "email": account.email,
        "profile": parent,
        "children": children,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Optional password change, re-hashed alongside the identity update.
    #[serde(default)]
    pub password: Option<String>,
}

/// PUT /parent/profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
    Json(req): Json<ProfileUpdateRequest>,
) -> Result<Json<Value>, ApiError> {
    Resolver::new(state.store.clone()).parent(&account).await?;
    let credentials = CredentialService::new(state.store.clone());

    let (updated, mut token) = credentials
        .update_identity(&account, &req.first_name, &req.last_name, &req.email)
        .await?;
    if let Some(password) = &req.password {
        token = credentials.update_password(&updated, password).await?;
    }

    Ok(Json(json!({
        "message": "Profile updated",
        "token": token,
        "firstName": updated.first_name,
        "lastName": updated.last_name,
        "email": updated.email,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildRequest {
    #[serde(alias = "reg")]
    pub reg_no: String,
}

/// POST /parent/children
pub async fn add_child(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
    Json(req): Json<ChildRequest>,
) -> Result<Json<Value>, ApiError> {
    let parent = Resolver::new(state.store.clone()).parent(&account).await?;
    let child = ParentService::new(state.store.clone())
        .add_child(&parent, &req.reg_no)
        .await?;
    Ok(Json(json!({
        "message": "Child added successfully",
        "child": child,
    })))
}

/// POST /parent/child-results
pub async fn child_results(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
    Json(req): Json<ChildRequest>,
) -> Result<Json<Value>, ApiError> {
    let parent = Resolver::new(state.store.clone()).parent(&account).await?;
    let rows = ParentService::new(state.store.clone())
        .child_results(&parent, &req.reg_no)
        .await?;
    Ok(Json(json!({ "results": rows })))
}

/// POST /parent/child-latest-result
pub async fn child_latest_result(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
    Json(req): Json<ChildRequest>,
) -> Result<Json<Value>, ApiError> {
    let parent = Resolver::new(state.store.clone()).parent(&account).await?;
    let latest = ParentService::new(state.store.clone())
        .child_latest_results(&parent, &req.reg_no)
        .await?;
    Ok(Json(json!({ "results": latest })))
}
