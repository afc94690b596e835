use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::Role;
use crate::services::credential::{CredentialService, RoleFields};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    // Student-only fields
    #[serde(default, alias = "reg")]
    pub reg_no: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub advisor_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn parse_role(segment: &str) -> Result<Role, ApiError> {
    segment
        .parse::<Role>()
        .map_err(|_| ApiError::bad_request("Unknown role"))
}

/// POST /register/:role
pub async fn register(
    State(state): State<AppState>,
    Path(role): Path<String>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<Value>, ApiError> {
    let role = parse_role(&role)?;
    let service = CredentialService::new(state.store.clone());

    let registered = service
        .register(
            role,
            &req.first_name,
            &req.last_name,
            &req.email,
            &req.password,
            RoleFields {
                reg_no: req.reg_no,
                level: req.level,
                advisor_id: req.advisor_id,
            },
        )
        .await?;

    Ok(Json(json!({
        "message": "User registered successfully",
        "token": registered.token,
        "profileId": registered.profile_id,
        "role": role,
    })))
}

/// POST /login/:role
pub async fn login(
    State(state): State<AppState>,
    Path(role): Path<String>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let role = parse_role(&role)?;
    let service = CredentialService::new(state.store.clone());

    let logged_in = service.login(role, &req.email, &req.password).await?;

    Ok(Json(json!({
        "message": "Login successful",
        "token": logged_in.token,
        "profileId": logged_in.profile_id,
        "role": logged_in.role,
    })))
}

/// GET /advisors - public reference listing used by student registration.
pub async fn list_advisors(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let advisors = state.store.list_advisors().await?;

    let mut out = Vec::with_capacity(advisors.len());
    for advisor in advisors {
        let account = state
            .store
            .find_account(advisor.account_id)
            .await?
            .ok_or_else(|| {
                tracing::error!(advisor = %advisor.id, "advisor references missing account");
                ApiError::Internal
            })?;
        out.push(json!({
            "id": advisor.id,
            "name": account.full_name(),
            "level": advisor.level,
        }));
    }
    Ok(Json(json!({ "advisors": out })))
}
