use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::models::{Role, UserSummary};
use crate::services::{Registration, RegistrationRequest, RfidCheckOutcome};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfidCheckRequest {
    pub tag_id: String,
    pub api_key: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwoFaRequest {
    pub entry_attempt_id: String,
    pub totp: String,
}

#[derive(Serialize, Deserialize)]
pub struct TwoFaResponse {
    pub success: bool,
}

/// POST /admin/register
pub async fn register_admin(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegistrationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Registration>), ApiError> {
    register(&state, Role::Admin, payload).await
}

/// POST /user/register
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegistrationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Registration>), ApiError> {
    register(&state, Role::User, payload).await
}

async fn register(
    state: &AppState,
    role: Role,
    payload: Result<Json<RegistrationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Registration>), ApiError> {
    let Json(payload) = payload?;
    let registration = state.access().register(role, payload).await?;
    Ok((StatusCode::CREATED, Json(registration)))
}

/// POST /user/rfid-check
///
/// Called by checkpoint devices; the API key in the body is the credential.
pub async fn rfid_check(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RfidCheckRequest>, JsonRejection>,
) -> Result<Json<RfidCheckOutcome>, ApiError> {
    let Json(payload) = payload?;
    let outcome = state
        .access()
        .rfid_check(&payload.tag_id, &payload.api_key)
        .await?;
    Ok(Json(outcome))
}

/// POST /user/two-fa
pub async fn two_fa(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TwoFaRequest>, JsonRejection>,
) -> Result<Json<TwoFaResponse>, ApiError> {
    let Json(payload) = payload?;
    let success = state
        .access()
        .confirm_two_fa(&payload.entry_attempt_id, &payload.totp)
        .await?;
    Ok(Json(TwoFaResponse { success }))
}

/// GET /users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    Ok(Json(state.access().list_users().await?))
}
