use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use atelier_catalog::repository::{NewPriceList, PriceListUpdate};
use atelier_catalog::{price_list, PriceList};

use crate::error::AppError;
use crate::state::AppState;

/// GET /v1/price-lists
/// Public pricing page: active packages only.
pub async fn list_price_lists(
    State(state): State<AppState>,
) -> Result<Json<Vec<PriceList>>, AppError> {
    let entries = state
        .catalog_repo
        .list_active()
        .await
        .map_err(AppError::from_repo)?;
    Ok(Json(entries))
}

/// GET /v1/admin/price-lists
pub async fn list_all_price_lists(
    State(state): State<AppState>,
) -> Result<Json<Vec<PriceList>>, AppError> {
    let entries = state
        .catalog_repo
        .list_all()
        .await
        .map_err(AppError::from_repo)?;
    Ok(Json(entries))
}

/// POST /v1/admin/price-lists
pub async fn create_price_list(
    State(state): State<AppState>,
    Json(req): Json<NewPriceList>,
) -> Result<(StatusCode, Json<PriceList>), AppError> {
    price_list::validate_entry(&req.title, req.price)
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let entry = state
        .catalog_repo
        .create(&req)
        .await
        .map_err(AppError::from_repo)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// PUT /v1/admin/price-lists/{id}
pub async fn update_price_list(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<PriceListUpdate>,
) -> Result<Json<PriceList>, AppError> {
    if let Some(title) = &req.title {
        price_list::validate_entry(title, req.price.unwrap_or(0))
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
    }
    if req.price.is_some_and(|price| price < 0) {
        return Err(AppError::ValidationError("price must not be negative".to_string()));
    }

    let entry = state
        .catalog_repo
        .update(id, &req)
        .await
        .map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFoundError(format!("Price list entry not found: {}", id)))?;
    Ok(Json(entry))
}

/// DELETE /v1/admin/price-lists/{id}
/// Soft delete; existing orders keep their price snapshot.
pub async fn delete_price_list(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = state
        .catalog_repo
        .delete(id)
        .await
        .map_err(AppError::from_repo)?;
    if !deleted {
        return Err(AppError::NotFoundError(format!("Price list entry not found: {}", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}
