use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use atelier_core::identity::Actor;
use atelier_order::models::ProgressLog;

use crate::error::AppError;
use crate::orders::fetch_accessible_order;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AppendProgressRequest {
    pub status: String,
    pub description: Option<String>,
}

/// POST /v1/admin/orders/{id}/progress
pub async fn append_progress(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<AppendProgressRequest>,
) -> Result<(StatusCode, Json<ProgressLog>), AppError> {
    if req.status.trim().is_empty() {
        return Err(AppError::ValidationError("status must not be empty".to_string()));
    }

    state
        .order_repo
        .get_order(order_id)
        .await
        .map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFoundError(format!("Order not found: {}", order_id)))?;

    let entry = ProgressLog::new(order_id, req.status, req.description);
    state
        .progress_repo
        .append(&entry)
        .await
        .map_err(AppError::from_repo)?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /v1/orders/{id}/progress
pub async fn list_progress(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Vec<ProgressLog>>, AppError> {
    fetch_accessible_order(&state, &actor, order_id).await?;
    let entries = state
        .progress_repo
        .list_for_order(order_id)
        .await
        .map_err(AppError::from_repo)?;
    Ok(Json(entries))
}
