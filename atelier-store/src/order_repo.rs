use async_trait::async_trait;
use atelier_core::gateway::{FraudStatus, GatewayCallback, TransactionStatus};
use atelier_order::ingest::{self, IngestOutcome, IngestPlan, PaymentAction};
use atelier_order::lifecycle::{self, OrderError};
use atelier_order::models::{Order, OrderStatus, Payment};
use atelier_order::repository::OrderRepository;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

pub struct StoreOrderRepository {
    pool: PgPool,
}

impl StoreOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const ORDER_COLUMNS: &str =
    "id, user_id, created_by, price_list_id, order_number, status, total_amount, notes, \
     deadline, completed_at, created_at, updated_at";

const PAYMENT_COLUMNS: &str =
    "id, order_id, transaction_id, payment_type, transaction_status, fraud_status, bank, \
     va_number, store, payment_code, gross_amount, currency, transaction_time, \
     settlement_time, expiry_time, metadata, status_code, signature_key, created_at, updated_at";

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    created_by: Option<Uuid>,
    price_list_id: Option<Uuid>,
    order_number: String,
    status: String,
    total_amount: i64,
    notes: Option<String>,
    deadline: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> Result<Order, Box<dyn std::error::Error + Send + Sync>> {
        let status = OrderStatus::parse(&self.status)
            .ok_or_else(|| format!("unknown order status in storage: {}", self.status))?;
        Ok(Order {
            id: self.id,
            user_id: self.user_id,
            created_by: self.created_by,
            price_list_id: self.price_list_id,
            order_number: self.order_number,
            status,
            total_amount: self.total_amount,
            notes: self.notes,
            deadline: self.deadline,
            completed_at: self.completed_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    order_id: Uuid,
    transaction_id: String,
    payment_type: Option<String>,
    transaction_status: String,
    fraud_status: Option<String>,
    bank: Option<String>,
    va_number: Option<String>,
    store: Option<String>,
    payment_code: Option<String>,
    gross_amount: i64,
    currency: String,
    transaction_time: Option<DateTime<Utc>>,
    settlement_time: Option<DateTime<Utc>>,
    expiry_time: Option<DateTime<Utc>>,
    metadata: Option<Value>,
    status_code: Option<String>,
    signature_key: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PaymentRow {
    fn into_payment(self) -> Result<Payment, Box<dyn std::error::Error + Send + Sync>> {
        let transaction_status = TransactionStatus::parse(&self.transaction_status)
            .ok_or_else(|| format!("unknown transaction status in storage: {}", self.transaction_status))?;
        let fraud_status = match self.fraud_status.as_deref() {
            Some(s) => Some(
                FraudStatus::parse(s)
                    .ok_or_else(|| format!("unknown fraud status in storage: {}", s))?,
            ),
            None => None,
        };
        Ok(Payment {
            id: self.id,
            order_id: self.order_id,
            transaction_id: self.transaction_id,
            payment_type: self.payment_type,
            transaction_status,
            fraud_status,
            bank: self.bank,
            va_number: self.va_number,
            store: self.store,
            payment_code: self.payment_code,
            gross_amount: self.gross_amount,
            currency: self.currency,
            transaction_time: self.transaction_time,
            settlement_time: self.settlement_time,
            expiry_time: self.expiry_time,
            metadata: self.metadata.unwrap_or(Value::Null),
            status_code: self.status_code,
            signature_key: self.signature_key,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[async_trait]
impl OrderRepository for StoreOrderRepository {
    async fn create_order(
        &self,
        order: &Order,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            "INSERT INTO orders (id, user_id, created_by, price_list_id, order_number, status, \
             total_amount, notes, deadline, completed_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(order.id)
        .bind(order.user_id)
        .bind(order.created_by)
        .bind(order.price_list_id)
        .bind(&order.order_number)
        .bind(order.status.as_str())
        .bind(order.total_amount)
        .bind(&order.notes)
        .bind(order.deadline)
        .bind(order.completed_at)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(order.id)
    }

    async fn get_order(
        &self,
        id: Uuid,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(OrderRow::into_order).transpose()
    }

    async fn get_order_by_number(
        &self,
        order_number: &str,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_number = $1 AND deleted_at IS NULL"
        ))
        .bind(order_number)
        .fetch_optional(&self.pool)
        .await?;

        row.map(OrderRow::into_order).transpose()
    }

    async fn list_orders(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 AND deleted_at IS NULL \
             ORDER BY created_at DESC"
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_order).collect()
    }

    async fn list_all_orders(
        &self,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE deleted_at IS NULL ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_order).collect()
    }

    async fn transition_order(
        &self,
        id: Uuid,
        to: OrderStatus,
    ) -> Result<Order, Box<dyn std::error::Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes against concurrent webhook ingestion.
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND deleted_at IS NULL FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let mut order = row
            .ok_or_else(|| OrderError::NotFound(id.to_string()))?
            .into_order()?;

        lifecycle::apply_transition(&mut order, to, Utc::now())?;

        sqlx::query("UPDATE orders SET status = $1, completed_at = $2, updated_at = $3 WHERE id = $4")
            .bind(order.status.as_str())
            .bind(order.completed_at)
            .bind(order.updated_at)
            .bind(order.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(order)
    }

    async fn ingest_callback(
        &self,
        cb: &GatewayCallback,
        raw: &Value,
    ) -> Result<IngestOutcome, Box<dyn std::error::Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;

        // Lock the order row first; every state change for this order flows
        // through this lock.
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_number = $1 AND deleted_at IS NULL FOR UPDATE"
        ))
        .bind(&cb.order_id)
        .fetch_optional(&mut *tx)
        .await?;

        let mut order = row
            .ok_or_else(|| OrderError::NotFound(cb.order_id.clone()))?
            .into_order()?;

        let existing = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE transaction_id = $1 AND deleted_at IS NULL"
        ))
        .bind(&cb.transaction_id)
        .fetch_optional(&mut *tx)
        .await?
        .map(PaymentRow::into_payment)
        .transpose()?;

        let plan = ingest::plan(&order, existing.as_ref(), cb, raw)?;

        let (action, transition, flag) = match plan {
            IngestPlan::Skip(reason) => {
                tx.rollback().await?;
                tracing::info!(
                    transaction_id = %cb.transaction_id,
                    order_number = %order.order_number,
                    reason = reason.as_str(),
                    "Gateway callback skipped"
                );
                return Ok(IngestOutcome::Skipped {
                    order_id: order.id,
                    transaction_id: cb.transaction_id.clone(),
                    reason,
                });
            }
            IngestPlan::Apply { action, transition, flag } => (action, transition, flag),
        };

        match &action {
            PaymentAction::Create(payment) => {
                sqlx::query(
                    "INSERT INTO payments (id, order_id, transaction_id, payment_type, \
                     transaction_status, fraud_status, bank, va_number, store, payment_code, \
                     gross_amount, currency, transaction_time, settlement_time, expiry_time, \
                     metadata, status_code, signature_key, created_at, updated_at) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, \
                     $16, $17, $18, $19, $20)",
                )
                .bind(payment.id)
                .bind(payment.order_id)
                .bind(&payment.transaction_id)
                .bind(&payment.payment_type)
                .bind(payment.transaction_status.as_str())
                .bind(payment.fraud_status.map(|f| f.as_str()))
                .bind(&payment.bank)
                .bind(&payment.va_number)
                .bind(&payment.store)
                .bind(&payment.payment_code)
                .bind(payment.gross_amount)
                .bind(&payment.currency)
                .bind(payment.transaction_time)
                .bind(payment.settlement_time)
                .bind(payment.expiry_time)
                .bind(&payment.metadata)
                .bind(&payment.status_code)
                .bind(&payment.signature_key)
                .bind(payment.created_at)
                .bind(payment.updated_at)
                .execute(&mut *tx)
                .await?;
            }
            PaymentAction::Update { payment_id, patch } => {
                sqlx::query(
                    "UPDATE payments SET transaction_status = $1, fraud_status = $2, \
                     payment_type = $3, bank = $4, va_number = $5, store = $6, payment_code = $7, \
                     transaction_time = $8, settlement_time = $9, expiry_time = $10, \
                     status_code = $11, signature_key = $12, metadata = $13, updated_at = NOW() \
                     WHERE id = $14",
                )
                .bind(patch.transaction_status.as_str())
                .bind(patch.fraud_status.map(|f| f.as_str()))
                .bind(&patch.payment_type)
                .bind(&patch.bank)
                .bind(&patch.va_number)
                .bind(&patch.store)
                .bind(&patch.payment_code)
                .bind(patch.transaction_time)
                .bind(patch.settlement_time)
                .bind(patch.expiry_time)
                .bind(&patch.status_code)
                .bind(&patch.signature_key)
                .bind(&patch.metadata)
                .bind(payment_id)
                .execute(&mut *tx)
                .await?;
            }
            PaymentAction::Refresh { payment_id, metadata } => {
                sqlx::query("UPDATE payments SET metadata = $1, updated_at = NOW() WHERE id = $2")
                    .bind(metadata)
                    .bind(payment_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        if let Some(to) = transition {
            lifecycle::apply_transition(&mut order, to, Utc::now())?;
            sqlx::query("UPDATE orders SET status = $1, completed_at = $2, updated_at = $3 WHERE id = $4")
                .bind(order.status.as_str())
                .bind(order.completed_at)
                .bind(order.updated_at)
                .bind(order.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        if let Some(flag) = flag {
            tracing::warn!(
                transaction_id = %cb.transaction_id,
                order_number = %order.order_number,
                "{}", flag
            );
        }

        Ok(IngestOutcome::Applied {
            order_id: order.id,
            transaction_id: cb.transaction_id.clone(),
            transition,
        })
    }

    async fn list_payments(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<Payment>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE order_id = $1 AND deleted_at IS NULL \
             ORDER BY created_at ASC"
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PaymentRow::into_payment).collect()
    }
}
