use atelier_catalog::PriceList;
use atelier_core::gateway::{FraudStatus, GatewayCallback, GatewayError, TransactionStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order status in the lifecycle. Stored in the database exactly as
/// serialized here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "in_progress" => Some(OrderStatus::InProgress),
            "completed" => Some(OrderStatus::Completed),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

/// A customer's request for a service package. `total_amount` snapshots the
/// catalog price at creation time; later price-list edits never touch it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Set when a staff member entered the order on the customer's behalf.
    pub created_by: Option<Uuid>,
    pub price_list_id: Option<Uuid>,
    pub order_number: String,
    pub status: OrderStatus,
    pub total_amount: i64,
    pub notes: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        user_id: Uuid,
        created_by: Option<Uuid>,
        package: &PriceList,
        notes: Option<String>,
        deadline: Option<DateTime<Utc>>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            created_by,
            price_list_id: Some(package.id),
            order_number: generate_order_number(),
            status: OrderStatus::Pending,
            total_amount: package.price,
            notes,
            deadline,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// `ORD-` + 32 hex chars from a fresh UUID; globally unique and opaque.
pub fn generate_order_number() -> String {
    format!("ORD-{}", Uuid::new_v4().simple().to_string().to_uppercase())
}

/// One payment attempt against an order, populated from gateway callbacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub transaction_id: String,
    pub payment_type: Option<String>,
    pub transaction_status: TransactionStatus,
    pub fraud_status: Option<FraudStatus>,
    pub bank: Option<String>,
    pub va_number: Option<String>,
    pub store: Option<String>,
    pub payment_code: Option<String>,
    pub gross_amount: i64,
    pub currency: String,
    pub transaction_time: Option<DateTime<Utc>>,
    pub settlement_time: Option<DateTime<Utc>>,
    pub expiry_time: Option<DateTime<Utc>>,
    /// Raw callback payload, kept verbatim for reconciliation.
    pub metadata: serde_json::Value,
    pub status_code: Option<String>,
    pub signature_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Build a new row from the first callback seen for a transaction.
    pub fn from_callback(
        order_id: Uuid,
        cb: &GatewayCallback,
        raw: serde_json::Value,
    ) -> Result<Self, GatewayError> {
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            order_id,
            transaction_id: cb.transaction_id.clone(),
            payment_type: cb.payment_type.clone(),
            transaction_status: cb.transaction_status,
            fraud_status: cb.fraud_status,
            bank: cb.bank_name(),
            va_number: cb.va_number(),
            store: cb.store.clone(),
            payment_code: cb.payment_code.clone(),
            gross_amount: cb.gross_amount_units()?,
            currency: cb.currency.clone().unwrap_or_else(|| "IDR".to_string()),
            transaction_time: cb.transaction_time_utc(),
            settlement_time: cb.settlement_time_utc(),
            expiry_time: cb.expiry_time_utc(),
            metadata: raw,
            status_code: Some(cb.status_code.clone()),
            signature_key: Some(cb.signature_key.clone()),
            created_at: now,
            updated_at: now,
        })
    }

    /// A payment that reached settlement, or capture cleared by fraud
    /// screening. At most one per order under correct operation.
    pub fn is_settled(&self) -> bool {
        ingest_success(self.transaction_status, self.fraud_status)
    }
}

pub(crate) fn ingest_success(status: TransactionStatus, fraud: Option<FraudStatus>) -> bool {
    match status {
        TransactionStatus::Settlement => true,
        TransactionStatus::Capture => matches!(fraud, None | Some(FraudStatus::Accept)),
        _ => false,
    }
}

/// Staff-authored timeline entry attached to an order. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressLog {
    pub id: Uuid,
    pub order_id: Uuid,
    pub status: String,
    pub description: Option<String>,
    pub logged_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ProgressLog {
    pub fn new(order_id: Uuid, status: String, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            order_id,
            status,
            description,
            logged_at: now,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    Open,
    Closed,
}

impl ComplaintStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Open => "open",
            ComplaintStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(ComplaintStatus::Open),
            "closed" => Some(ComplaintStatus::Closed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Complaint {
    pub id: Uuid,
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Complaint {
    pub fn new(order_id: Uuid, user_id: Uuid, message: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            order_id,
            user_id,
            message,
            status: ComplaintStatus::Open,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Customer rating for an order. One per order, enforced at the application
/// level and by a unique index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub id: Uuid,
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Rating {
    pub fn new(order_id: Uuid, user_id: Uuid, rating: i32, comment: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            user_id,
            rating,
            comment,
            created_at: Utc::now(),
        }
    }
}
