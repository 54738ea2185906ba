pub mod feedback;
pub mod ingest;
pub mod lifecycle;
pub mod models;
pub mod repository;

pub use ingest::{IngestOutcome, IngestPlan, SkipReason};
pub use lifecycle::OrderError;
pub use models::{Complaint, ComplaintStatus, Order, OrderStatus, Payment, ProgressLog, Rating};
pub use repository::{FeedbackRepository, OrderRepository, ProgressLogRepository};
