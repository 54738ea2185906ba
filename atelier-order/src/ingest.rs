use crate::models::{ingest_success, Order, OrderStatus, Payment};
use atelier_core::gateway::{FraudStatus, GatewayCallback, GatewayError, TransactionStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Why a callback was recorded but not applied.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// `transaction_time` is older than the stored one for this transaction.
    StaleTimestamp,
    /// A non-success status arrived after the payment already settled.
    StatusRegression,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::StaleTimestamp => "stale_timestamp",
            SkipReason::StatusRegression => "status_regression",
        }
    }
}

/// Field updates applied to an existing payment row.
#[derive(Debug, Clone)]
pub struct PaymentPatch {
    pub transaction_status: TransactionStatus,
    pub fraud_status: Option<FraudStatus>,
    pub payment_type: Option<String>,
    pub bank: Option<String>,
    pub va_number: Option<String>,
    pub store: Option<String>,
    pub payment_code: Option<String>,
    pub transaction_time: Option<DateTime<Utc>>,
    pub settlement_time: Option<DateTime<Utc>>,
    pub expiry_time: Option<DateTime<Utc>>,
    pub status_code: Option<String>,
    pub signature_key: Option<String>,
    pub metadata: Value,
}

#[derive(Debug, Clone)]
pub enum PaymentAction {
    /// First callback for this transaction_id.
    Create(Payment),
    /// Status moved forward; update the stored row.
    Update { payment_id: Uuid, patch: PaymentPatch },
    /// Identical replay; refresh metadata and updated_at only.
    Refresh { payment_id: Uuid, metadata: Value },
}

#[derive(Debug, Clone)]
pub enum IngestPlan {
    Skip(SkipReason),
    Apply {
        action: PaymentAction,
        transition: Option<OrderStatus>,
        flag: Option<String>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Result of running an ingest plan against the store, returned to the
/// webhook handler.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum IngestOutcome {
    Applied {
        order_id: Uuid,
        transaction_id: String,
        transition: Option<OrderStatus>,
    },
    Skipped {
        order_id: Uuid,
        transaction_id: String,
        reason: SkipReason,
    },
}

/// Decide how a verified gateway callback changes the payment row and the
/// order, without touching storage. The store executes the plan inside a
/// transaction holding the order row lock.
pub fn plan(
    order: &Order,
    existing: Option<&Payment>,
    cb: &GatewayCallback,
    raw: &Value,
) -> Result<IngestPlan, IngestError> {
    let gross = cb.gross_amount_units()?;

    let mut flag = None;
    if gross != order.total_amount {
        flag = Some(format!(
            "gross_amount {} differs from order total {}",
            gross, order.total_amount
        ));
    }

    let action = match existing {
        Some(stored) => {
            if let (Some(incoming), Some(current)) = (cb.transaction_time_utc(), stored.transaction_time) {
                if incoming < current {
                    return Ok(IngestPlan::Skip(SkipReason::StaleTimestamp));
                }
            }
            if stored.is_settled() && !allowed_after_settlement(cb.transaction_status) {
                return Ok(IngestPlan::Skip(SkipReason::StatusRegression));
            }

            if stored.transaction_status == cb.transaction_status && stored.fraud_status == cb.fraud_status {
                PaymentAction::Refresh {
                    payment_id: stored.id,
                    metadata: raw.clone(),
                }
            } else {
                PaymentAction::Update {
                    payment_id: stored.id,
                    patch: PaymentPatch {
                        transaction_status: cb.transaction_status,
                        fraud_status: cb.fraud_status,
                        payment_type: cb.payment_type.clone().or_else(|| stored.payment_type.clone()),
                        bank: cb.bank_name().or_else(|| stored.bank.clone()),
                        va_number: cb.va_number().or_else(|| stored.va_number.clone()),
                        store: cb.store.clone().or_else(|| stored.store.clone()),
                        payment_code: cb.payment_code.clone().or_else(|| stored.payment_code.clone()),
                        transaction_time: cb.transaction_time_utc().or(stored.transaction_time),
                        settlement_time: cb.settlement_time_utc().or(stored.settlement_time),
                        expiry_time: cb.expiry_time_utc().or(stored.expiry_time),
                        status_code: Some(cb.status_code.clone()),
                        signature_key: Some(cb.signature_key.clone()),
                        metadata: raw.clone(),
                    },
                }
            }
        }
        None => PaymentAction::Create(Payment::from_callback(order.id, cb, raw.clone())?),
    };

    let success = ingest_success(cb.transaction_status, cb.fraud_status);
    let transition = if success && order.status == OrderStatus::Pending {
        Some(OrderStatus::InProgress)
    } else {
        None
    };

    if success && order.status == OrderStatus::Cancelled {
        flag = Some("payment settled for a cancelled order".to_string());
    } else if cb.transaction_status == TransactionStatus::Capture
        && cb.fraud_status == Some(FraudStatus::Challenge)
    {
        flag = Some("capture held for fraud review".to_string());
    }

    Ok(IngestPlan::Apply { action, transition, flag })
}

/// After settlement only the success family and refunds may still land.
fn allowed_after_settlement(status: TransactionStatus) -> bool {
    matches!(
        status,
        TransactionStatus::Settlement
            | TransactionStatus::Capture
            | TransactionStatus::Refund
            | TransactionStatus::PartialRefund
    )
}
