use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use atelier_core::identity::Actor;
use atelier_order::models::{Order, OrderStatus, Payment};
use atelier_shared::models::events::{OrderCreatedEvent, OrderStatusChangedEvent};
use atelier_store::events::TOPIC_ORDERS;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub price_list_id: Uuid,
    pub notes: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
}

/// Staff-entered order on behalf of a customer.
#[derive(Debug, Deserialize)]
pub struct StaffCreateOrderRequest {
    pub customer_id: Uuid,
    pub price_list_id: Uuid,
    pub notes: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Uuid,
    pub created_by: Option<Uuid>,
    pub price_list_id: Option<Uuid>,
    pub status: OrderStatus,
    pub total_amount: i64,
    pub notes: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            order_number: order.order_number,
            user_id: order.user_id,
            created_by: order.created_by,
            price_list_id: order.price_list_id,
            status: order.status,
            total_amount: order.total_amount,
            notes: order.notes,
            deadline: order.deadline,
            completed_at: order.completed_at,
            created_at: order.created_at,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn place_order(
    state: &AppState,
    customer_id: Uuid,
    created_by: Option<Uuid>,
    price_list_id: Uuid,
    notes: Option<String>,
    deadline: Option<DateTime<Utc>>,
) -> Result<Order, AppError> {
    let package = state
        .catalog_repo
        .get(price_list_id)
        .await
        .map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::ValidationError(format!("unknown price list entry: {}", price_list_id)))?;

    package
        .ensure_orderable()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let order = Order::new(customer_id, created_by, &package, notes, deadline);
    state
        .order_repo
        .create_order(&order)
        .await
        .map_err(AppError::from_repo)?;

    let event = OrderCreatedEvent {
        order_id: order.id,
        order_number: order.order_number.clone(),
        customer_id: order.user_id,
        price_list_id: order.price_list_id,
        total_amount: order.total_amount,
        timestamp: Utc::now().timestamp(),
    };
    if let Ok(payload) = serde_json::to_string(&event) {
        let _ = state
            .events
            .publish(TOPIC_ORDERS, &order.id.to_string(), &payload)
            .await;
    }

    Ok(order)
}

/// POST /v1/orders
pub async fn create_order(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), AppError> {
    let order = place_order(&state, actor.user_id, None, req.price_list_id, req.notes, req.deadline).await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

/// POST /v1/admin/orders
pub async fn create_order_for_customer(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<StaffCreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), AppError> {
    let order = place_order(
        &state,
        req.customer_id,
        Some(actor.user_id),
        req.price_list_id,
        req.notes,
        req.deadline,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

/// GET /v1/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = fetch_accessible_order(&state, &actor, order_id).await?;
    Ok(Json(order.into()))
}

/// GET /v1/orders
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<OrderResponse>>, AppError> {
    let orders = state
        .order_repo
        .list_orders(actor.user_id)
        .await
        .map_err(AppError::from_repo)?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// GET /v1/admin/orders
pub async fn list_all_orders(
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderResponse>>, AppError> {
    let orders = state
        .order_repo
        .list_all_orders()
        .await
        .map_err(AppError::from_repo)?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// POST /v1/orders/{id}/cancel
pub async fn cancel_order(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = fetch_accessible_order(&state, &actor, order_id).await?;
    apply_transition(&state, order, OrderStatus::Cancelled, "CUSTOMER").await
}

/// POST /v1/admin/orders/{id}/status
pub async fn transition_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<TransitionRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state
        .order_repo
        .get_order(order_id)
        .await
        .map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFoundError(format!("Order not found: {}", order_id)))?;
    apply_transition(&state, order, req.status, "STAFF").await
}

/// GET /v1/orders/{id}/payments
pub async fn list_payments(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Vec<Payment>>, AppError> {
    fetch_accessible_order(&state, &actor, order_id).await?;
    let payments = state
        .order_repo
        .list_payments(order_id)
        .await
        .map_err(AppError::from_repo)?;
    Ok(Json(payments))
}

// ============================================================================
// Helpers
// ============================================================================

pub(crate) async fn fetch_accessible_order(
    state: &AppState,
    actor: &Actor,
    order_id: Uuid,
) -> Result<Order, AppError> {
    let order = state
        .order_repo
        .get_order(order_id)
        .await
        .map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFoundError(format!("Order not found: {}", order_id)))?;

    if !actor.may_access_order(order.user_id) {
        return Err(AppError::AuthorizationError("not your order".to_string()));
    }
    Ok(order)
}

async fn apply_transition(
    state: &AppState,
    order: Order,
    to: OrderStatus,
    actor_kind: &str,
) -> Result<Json<OrderResponse>, AppError> {
    let from = order.status;
    let updated = state
        .order_repo
        .transition_order(order.id, to)
        .await
        .map_err(AppError::from_repo)?;

    let event = OrderStatusChangedEvent {
        order_id: updated.id,
        order_number: updated.order_number.clone(),
        from_status: from.as_str().to_string(),
        to_status: updated.status.as_str().to_string(),
        actor: actor_kind.to_string(),
        timestamp: Utc::now().timestamp(),
    };
    if let Ok(payload) = serde_json::to_string(&event) {
        let _ = state
            .events
            .publish(TOPIC_ORDERS, &updated.id.to_string(), &payload)
            .await;
    }

    Ok(Json(updated.into()))
}
