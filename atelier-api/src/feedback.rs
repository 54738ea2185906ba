use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use atelier_core::identity::Actor;
use atelier_order::feedback;
use atelier_order::models::{Complaint, Rating};
use atelier_shared::models::events::ComplaintOpenedEvent;
use atelier_store::events::TOPIC_ORDERS;

use crate::error::AppError;
use crate::orders::fetch_accessible_order;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateComplaintRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateRatingRequest {
    pub rating: i32,
    pub comment: Option<String>,
}

/// POST /v1/orders/{id}/complaints
pub async fn create_complaint(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<CreateComplaintRequest>,
) -> Result<(StatusCode, Json<Complaint>), AppError> {
    feedback::validate_complaint_message(&req.message)
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    fetch_accessible_order(&state, &actor, order_id).await?;

    let complaint = Complaint::new(order_id, actor.user_id, req.message);
    state
        .feedback_repo
        .create_complaint(&complaint)
        .await
        .map_err(AppError::from_repo)?;

    let event = ComplaintOpenedEvent {
        complaint_id: complaint.id,
        order_id,
        customer_id: actor.user_id,
        timestamp: Utc::now().timestamp(),
    };
    if let Ok(payload) = serde_json::to_string(&event) {
        let _ = state
            .events
            .publish(TOPIC_ORDERS, &order_id.to_string(), &payload)
            .await;
    }

    Ok((StatusCode::CREATED, Json(complaint)))
}

/// GET /v1/orders/{id}/complaints
pub async fn list_complaints(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Vec<Complaint>>, AppError> {
    fetch_accessible_order(&state, &actor, order_id).await?;
    let complaints = state
        .feedback_repo
        .list_complaints(order_id)
        .await
        .map_err(AppError::from_repo)?;
    Ok(Json(complaints))
}

/// POST /v1/admin/complaints/{id}/close
pub async fn close_complaint(
    State(state): State<AppState>,
    Path(complaint_id): Path<Uuid>,
) -> Result<Json<Complaint>, AppError> {
    let complaint = state
        .feedback_repo
        .close_complaint(complaint_id)
        .await
        .map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFoundError(format!("Complaint not found: {}", complaint_id)))?;
    Ok(Json(complaint))
}

/// GET /v1/orders/{id}/rating
pub async fn get_rating(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Rating>, AppError> {
    fetch_accessible_order(&state, &actor, order_id).await?;
    let rating = state
        .feedback_repo
        .get_rating(order_id)
        .await
        .map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFoundError(format!("Order has no rating yet: {}", order_id)))?;
    Ok(Json(rating))
}

/// POST /v1/orders/{id}/rating
pub async fn create_rating(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<CreateRatingRequest>,
) -> Result<(StatusCode, Json<Rating>), AppError> {
    feedback::validate_score(req.rating).map_err(|e| AppError::ValidationError(e.to_string()))?;

    fetch_accessible_order(&state, &actor, order_id).await?;

    let rating = Rating::new(order_id, actor.user_id, req.rating, req.comment);
    state
        .feedback_repo
        .create_rating(&rating)
        .await
        .map_err(AppError::from_repo)?;

    Ok((StatusCode::CREATED, Json(rating)))
}
