pub mod app_config;
pub mod catalog_repo;
pub mod database;
pub mod events;
pub mod feedback_repo;
pub mod order_repo;
pub mod redis_repo;
pub mod site_repo;

pub use catalog_repo::StorePriceListRepository;
pub use database::DbClient;
pub use events::EventProducer;
pub use feedback_repo::{StoreFeedbackRepository, StoreProgressLogRepository};
pub use order_repo::StoreOrderRepository;
pub use redis_repo::RedisClient;
pub use site_repo::StoreSiteRepository;
