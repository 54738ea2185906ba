use std::net::SocketAddr;
use std::sync::Arc;

use atelier_api::{app, state::{AppState, AuthConfig, GatewayConfig}};
use atelier_store::{
    StoreFeedbackRepository, StoreOrderRepository, StorePriceListRepository,
    StoreProgressLogRepository, StoreSiteRepository,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "atelier_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = atelier_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Atelier API on port {}", config.server.port);

    let db = atelier_store::DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let redis_client = atelier_store::RedisClient::new(&config.redis.url)
        .await
        .expect("Failed to connect to Redis");

    let kafka_producer = atelier_store::EventProducer::new(&config.kafka.brokers)
        .expect("Failed to create Kafka producer");

    let app_state = AppState {
        order_repo: Arc::new(StoreOrderRepository::new(db.pool.clone())),
        catalog_repo: Arc::new(StorePriceListRepository::new(db.pool.clone())),
        progress_repo: Arc::new(StoreProgressLogRepository::new(db.pool.clone())),
        feedback_repo: Arc::new(StoreFeedbackRepository::new(db.pool.clone())),
        site_repo: Arc::new(StoreSiteRepository::new(db.pool.clone())),
        redis: Arc::new(redis_client),
        events: Arc::new(kafka_producer),
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        gateway: GatewayConfig {
            server_key: config.gateway.server_key.clone(),
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
