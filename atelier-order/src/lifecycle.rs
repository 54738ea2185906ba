use crate::models::{Order, OrderStatus};
use chrono::{DateTime, Utc};

/// Allowed transitions: pending -> in_progress -> completed, with
/// cancellation from pending or in_progress. completed and cancelled are
/// terminal.
pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::*;
    matches!(
        (from, to),
        (Pending, InProgress) | (InProgress, Completed) | (Pending, Cancelled) | (InProgress, Cancelled)
    )
}

/// Apply a status change to an order, keeping the `completed_at` invariant:
/// set exactly when the order enters `completed`.
pub fn apply_transition(order: &mut Order, to: OrderStatus, now: DateTime<Utc>) -> Result<(), OrderError> {
    if !can_transition(order.status, to) {
        return Err(OrderError::InvalidTransition {
            from: order.status.as_str().to_string(),
            to: to.as_str().to_string(),
        });
    }

    order.status = to;
    order.updated_at = now;
    if to == OrderStatus::Completed {
        order.completed_at = Some(now);
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Order access denied: {0}")]
    AccessDenied(String),
}
