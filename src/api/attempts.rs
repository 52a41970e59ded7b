use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::models::EntryAttempt;

/// GET /attempts
pub async fn list_attempts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<EntryAttempt>>, ApiError> {
    Ok(Json(state.access().list_attempts().await?))
}
