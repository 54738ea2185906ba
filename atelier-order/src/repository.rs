use async_trait::async_trait;
use atelier_core::gateway::GatewayCallback;
use serde_json::Value;
use uuid::Uuid;

use crate::ingest::IngestOutcome;
use crate::models::{Complaint, Order, OrderStatus, Payment, ProgressLog, Rating};

/// Repository trait for order and payment access. Implementations must make
/// `transition_order` and `ingest_callback` atomic per order (row lock).
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create_order(
        &self,
        order: &Order,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_order(
        &self,
        id: Uuid,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_order_by_number(
        &self,
        order_number: &str,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_orders(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_all_orders(
        &self,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>>;

    /// Validate the transition under the order row lock and apply it.
    /// Fails with `OrderError::InvalidTransition` on a disallowed move.
    async fn transition_order(
        &self,
        id: Uuid,
        to: OrderStatus,
    ) -> Result<Order, Box<dyn std::error::Error + Send + Sync>>;

    /// Run a verified gateway callback through `ingest::plan` and execute
    /// the result in one transaction keyed by the order row.
    async fn ingest_callback(
        &self,
        cb: &GatewayCallback,
        raw: &Value,
    ) -> Result<IngestOutcome, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_payments(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<Payment>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Repository trait for the append-only progress timeline.
#[async_trait]
pub trait ProgressLogRepository: Send + Sync {
    async fn append(
        &self,
        entry: &ProgressLog,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_for_order(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<ProgressLog>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Repository trait for complaints and ratings.
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    async fn create_complaint(
        &self,
        complaint: &Complaint,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_complaints(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<Complaint>, Box<dyn std::error::Error + Send + Sync>>;

    async fn close_complaint(
        &self,
        id: Uuid,
    ) -> Result<Option<Complaint>, Box<dyn std::error::Error + Send + Sync>>;

    /// Fails with `FeedbackError::DuplicateRating` if the order already has
    /// one.
    async fn create_rating(
        &self,
        rating: &Rating,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_rating(
        &self,
        order_id: Uuid,
    ) -> Result<Option<Rating>, Box<dyn std::error::Error + Send + Sync>>;
}
