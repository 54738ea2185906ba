use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde_json::Value;

use atelier_core::gateway::GatewayCallback;
use atelier_order::ingest::IngestOutcome;
use atelier_shared::models::events::{OrderStatusChangedEvent, PaymentReceivedEvent};
use atelier_store::events::{TOPIC_ORDERS, TOPIC_PAYMENTS};

use crate::error::AppError;
use crate::state::AppState;

/// POST /v1/webhooks/payments
/// Receive transaction status callbacks from the payment gateway. The body
/// is kept verbatim as payment metadata; the gateway re-sends on non-2xx,
/// so ingestion is idempotent.
pub async fn handle_payment_webhook(
    State(state): State<AppState>,
    Json(raw): Json<Value>,
) -> Result<(StatusCode, Json<IngestOutcome>), AppError> {
    let cb: GatewayCallback = serde_json::from_value(raw.clone())
        .map_err(|e| AppError::ValidationError(format!("malformed gateway callback: {}", e)))?;

    if let Err(e) = cb.verify_signature(&state.gateway.server_key) {
        tracing::warn!(
            transaction_id = %cb.transaction_id,
            order_number = %cb.order_id,
            "Rejected gateway callback: {}", e
        );
        return Err(AppError::SignatureError(e.to_string()));
    }

    let outcome = state
        .order_repo
        .ingest_callback(&cb, &raw)
        .await
        .map_err(AppError::from_repo)?;

    if let IngestOutcome::Applied { order_id, transition, .. } = &outcome {
        tracing::info!(
            transaction_id = %cb.transaction_id,
            order_number = %cb.order_id,
            status = cb.transaction_status.as_str(),
            "Gateway callback applied"
        );

        let event = PaymentReceivedEvent {
            order_id: *order_id,
            transaction_id: cb.transaction_id.clone(),
            transaction_status: cb.transaction_status.as_str().to_string(),
            gross_amount: cb.gross_amount_units().unwrap_or_default(),
            currency: cb.currency.clone().unwrap_or_else(|| "IDR".to_string()),
            timestamp: Utc::now().timestamp(),
        };
        if let Ok(payload) = serde_json::to_string(&event) {
            let _ = state
                .events
                .publish(TOPIC_PAYMENTS, &cb.transaction_id, &payload)
                .await;
        }

        // Settlement is the only webhook-driven transition: pending -> in_progress.
        if let Some(to) = transition {
            let event = OrderStatusChangedEvent {
                order_id: *order_id,
                order_number: cb.order_id.clone(),
                from_status: "pending".to_string(),
                to_status: to.as_str().to_string(),
                actor: "GATEWAY".to_string(),
                timestamp: Utc::now().timestamp(),
            };
            if let Ok(payload) = serde_json::to_string(&event) {
                let _ = state
                    .events
                    .publish(TOPIC_ORDERS, &order_id.to_string(), &payload)
                    .await;
            }
        }
    }

    Ok((StatusCode::OK, Json(outcome)))
}
