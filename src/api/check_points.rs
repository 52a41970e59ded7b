use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::models::CheckPoint;

#[derive(Deserialize)]
pub struct RegisterCheckPointQuery {
    pub name: Option<String>,
}

/// POST /check-point/register?name=
///
/// The response is the only place the plaintext API key is ever returned.
pub async fn register_check_point(
    State(state): State<Arc<AppState>>,
    query: Result<Query<RegisterCheckPointQuery>, QueryRejection>,
) -> Result<(StatusCode, Json<CheckPoint>), ApiError> {
    let Query(query) = query?;
    let name = query
        .name
        .ok_or_else(|| ApiError::validation("name query parameter is required"))?;

    let check_point = state.access().register_check_point(&name).await?;
    Ok((StatusCode::CREATED, Json(check_point)))
}
