use std::sync::Arc;

use atelier_catalog::repository::PriceListRepository;
use atelier_core::repository::SiteRepository;
use atelier_order::repository::{FeedbackRepository, OrderRepository, ProgressLogRepository};
use atelier_store::{EventProducer, RedisClient};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct GatewayConfig {
    /// Server key shared with the payment gateway; signs webhook payloads.
    pub server_key: String,
}

#[derive(Clone)]
pub struct AppState {
    pub order_repo: Arc<dyn OrderRepository>,
    pub catalog_repo: Arc<dyn PriceListRepository>,
    pub progress_repo: Arc<dyn ProgressLogRepository>,
    pub feedback_repo: Arc<dyn FeedbackRepository>,
    pub site_repo: Arc<dyn SiteRepository>,
    pub redis: Arc<RedisClient>,
    pub events: Arc<EventProducer>,
    pub auth: AuthConfig,
    pub gateway: GatewayConfig,
}
