use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use atelier_api::middleware::Claims;
use atelier_api::state::{AppState, AuthConfig, GatewayConfig};
use atelier_api::app;
use atelier_catalog::repository::{NewPriceList, PriceListRepository, PriceListUpdate};
use atelier_catalog::PriceList;
use atelier_core::gateway::{signature_for, GatewayCallback};
use atelier_core::repository::SiteRepository;
use atelier_order::feedback::FeedbackError;
use atelier_order::ingest::{self, IngestOutcome, IngestPlan, PaymentAction};
use atelier_order::lifecycle::{self, OrderError};
use atelier_order::models::{Complaint, Order, OrderStatus, Payment, ProgressLog, Rating};
use atelier_order::repository::{FeedbackRepository, OrderRepository, ProgressLogRepository};
use atelier_shared::models::site::{ContactMessage, NewContactMessage, Project, TeamMember};
use atelier_shared::pii::Masked;

const JWT_SECRET: &str = "test-secret";
const SERVER_KEY: &str = "test-server-key";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

// ============================================================================
// In-memory repositories
// ============================================================================

#[derive(Default)]
struct InMemoryOrderRepository {
    orders: Mutex<HashMap<Uuid, Order>>,
    payments: Mutex<HashMap<String, Payment>>,
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create_order(&self, order: &Order) -> Result<Uuid, BoxError> {
        self.orders.lock().unwrap().insert(order.id, order.clone());
        Ok(order.id)
    }

    async fn get_order(&self, id: Uuid) -> Result<Option<Order>, BoxError> {
        Ok(self.orders.lock().unwrap().get(&id).cloned())
    }

    async fn get_order_by_number(&self, order_number: &str) -> Result<Option<Order>, BoxError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .values()
            .find(|o| o.order_number == order_number)
            .cloned())
    }

    async fn list_orders(&self, customer_id: Uuid) -> Result<Vec<Order>, BoxError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .values()
            .filter(|o| o.user_id == customer_id)
            .cloned()
            .collect())
    }

    async fn list_all_orders(&self) -> Result<Vec<Order>, BoxError> {
        Ok(self.orders.lock().unwrap().values().cloned().collect())
    }

    async fn transition_order(&self, id: Uuid, to: OrderStatus) -> Result<Order, BoxError> {
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .get_mut(&id)
            .ok_or_else(|| OrderError::NotFound(id.to_string()))?;
        lifecycle::apply_transition(order, to, Utc::now())?;
        Ok(order.clone())
    }

    async fn ingest_callback(
        &self,
        cb: &GatewayCallback,
        raw: &Value,
    ) -> Result<IngestOutcome, BoxError> {
        let mut orders = self.orders.lock().unwrap();
        let mut payments = self.payments.lock().unwrap();

        let order = orders
            .values_mut()
            .find(|o| o.order_number == cb.order_id)
            .ok_or_else(|| OrderError::NotFound(cb.order_id.clone()))?;

        let existing = payments.get(&cb.transaction_id).cloned();
        let plan = ingest::plan(order, existing.as_ref(), cb, raw)?;

        let (action, transition) = match plan {
            IngestPlan::Skip(reason) => {
                return Ok(IngestOutcome::Skipped {
                    order_id: order.id,
                    transaction_id: cb.transaction_id.clone(),
                    reason,
                })
            }
            IngestPlan::Apply { action, transition, .. } => (action, transition),
        };

        match action {
            PaymentAction::Create(payment) => {
                payments.insert(payment.transaction_id.clone(), payment);
            }
            PaymentAction::Update { payment_id, patch } => {
                let stored = payments
                    .values_mut()
                    .find(|p| p.id == payment_id)
                    .expect("update for unknown payment");
                stored.transaction_status = patch.transaction_status;
                stored.fraud_status = patch.fraud_status;
                stored.payment_type = patch.payment_type;
                stored.bank = patch.bank;
                stored.va_number = patch.va_number;
                stored.store = patch.store;
                stored.payment_code = patch.payment_code;
                stored.transaction_time = patch.transaction_time;
                stored.settlement_time = patch.settlement_time;
                stored.expiry_time = patch.expiry_time;
                stored.status_code = patch.status_code;
                stored.signature_key = patch.signature_key;
                stored.metadata = patch.metadata;
                stored.updated_at = Utc::now();
            }
            PaymentAction::Refresh { payment_id, metadata } => {
                let stored = payments
                    .values_mut()
                    .find(|p| p.id == payment_id)
                    .expect("refresh for unknown payment");
                stored.metadata = metadata;
                stored.updated_at = Utc::now();
            }
        }

        if let Some(to) = transition {
            lifecycle::apply_transition(order, to, Utc::now())?;
        }

        Ok(IngestOutcome::Applied {
            order_id: order.id,
            transaction_id: cb.transaction_id.clone(),
            transition,
        })
    }

    async fn list_payments(&self, order_id: Uuid) -> Result<Vec<Payment>, BoxError> {
        Ok(self
            .payments
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.order_id == order_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct InMemoryPriceListRepository {
    entries: Mutex<HashMap<Uuid, PriceList>>,
}

impl InMemoryPriceListRepository {
    fn seed(&self, title: &str, price: i64, is_active: bool) -> PriceList {
        let now = Utc::now();
        let entry = PriceList {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            price,
            category: Some("web".to_string()),
            duration: Some("14 days".to_string()),
            is_active,
            created_at: now,
            updated_at: now,
        };
        self.entries.lock().unwrap().insert(entry.id, entry.clone());
        entry
    }
}

#[async_trait]
impl PriceListRepository for InMemoryPriceListRepository {
    async fn create(&self, entry: &NewPriceList) -> Result<PriceList, BoxError> {
        let now = Utc::now();
        let created = PriceList {
            id: Uuid::new_v4(),
            title: entry.title.clone(),
            description: entry.description.clone(),
            price: entry.price,
            category: entry.category.clone(),
            duration: entry.duration.clone(),
            is_active: entry.is_active,
            created_at: now,
            updated_at: now,
        };
        self.entries.lock().unwrap().insert(created.id, created.clone());
        Ok(created)
    }

    async fn get(&self, id: Uuid) -> Result<Option<PriceList>, BoxError> {
        Ok(self.entries.lock().unwrap().get(&id).cloned())
    }

    async fn list_active(&self) -> Result<Vec<PriceList>, BoxError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.is_active)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<PriceList>, BoxError> {
        Ok(self.entries.lock().unwrap().values().cloned().collect())
    }

    async fn update(&self, id: Uuid, changes: &PriceListUpdate) -> Result<Option<PriceList>, BoxError> {
        let mut entries = self.entries.lock().unwrap();
        let Some(entry) = entries.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = &changes.title {
            entry.title = title.clone();
        }
        if let Some(price) = changes.price {
            entry.price = price;
        }
        if let Some(is_active) = changes.is_active {
            entry.is_active = is_active;
        }
        entry.updated_at = Utc::now();
        Ok(Some(entry.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, BoxError> {
        Ok(self.entries.lock().unwrap().remove(&id).is_some())
    }
}

#[derive(Default)]
struct InMemoryProgressLogRepository {
    entries: Mutex<Vec<ProgressLog>>,
}

#[async_trait]
impl ProgressLogRepository for InMemoryProgressLogRepository {
    async fn append(&self, entry: &ProgressLog) -> Result<Uuid, BoxError> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(entry.id)
    }

    async fn list_for_order(&self, order_id: Uuid) -> Result<Vec<ProgressLog>, BoxError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.order_id == order_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct InMemoryFeedbackRepository {
    complaints: Mutex<HashMap<Uuid, Complaint>>,
    ratings: Mutex<HashMap<Uuid, Rating>>,
}

#[async_trait]
impl FeedbackRepository for InMemoryFeedbackRepository {
    async fn create_complaint(&self, complaint: &Complaint) -> Result<Uuid, BoxError> {
        self.complaints
            .lock()
            .unwrap()
            .insert(complaint.id, complaint.clone());
        Ok(complaint.id)
    }

    async fn list_complaints(&self, order_id: Uuid) -> Result<Vec<Complaint>, BoxError> {
        Ok(self
            .complaints
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn close_complaint(&self, id: Uuid) -> Result<Option<Complaint>, BoxError> {
        let mut complaints = self.complaints.lock().unwrap();
        let Some(complaint) = complaints.get_mut(&id) else {
            return Ok(None);
        };
        atelier_order::feedback::close_complaint(complaint, Utc::now())?;
        Ok(Some(complaint.clone()))
    }

    async fn create_rating(&self, rating: &Rating) -> Result<Uuid, BoxError> {
        let mut ratings = self.ratings.lock().unwrap();
        if ratings.contains_key(&rating.order_id) {
            return Err(Box::new(FeedbackError::DuplicateRating(
                rating.order_id.to_string(),
            )));
        }
        ratings.insert(rating.order_id, rating.clone());
        Ok(rating.id)
    }

    async fn get_rating(&self, order_id: Uuid) -> Result<Option<Rating>, BoxError> {
        Ok(self.ratings.lock().unwrap().get(&order_id).cloned())
    }
}

#[derive(Default)]
struct InMemorySiteRepository {
    contacts: Mutex<Vec<ContactMessage>>,
}

#[async_trait]
impl SiteRepository for InMemorySiteRepository {
    async fn list_projects(&self) -> Result<Vec<Project>, BoxError> {
        Ok(vec![])
    }

    async fn list_team_members(&self) -> Result<Vec<TeamMember>, BoxError> {
        Ok(vec![])
    }

    async fn create_contact_message(&self, message: &NewContactMessage) -> Result<Uuid, BoxError> {
        let id = Uuid::new_v4();
        self.contacts.lock().unwrap().push(ContactMessage {
            id,
            user_id: message.user_id,
            name: message.name.clone(),
            email: Masked(message.email.clone()),
            subject: message.subject.clone(),
            message: message.message.clone(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn list_contact_messages(&self) -> Result<Vec<ContactMessage>, BoxError> {
        Ok(self.contacts.lock().unwrap().clone())
    }
}

// ============================================================================
// Test harness
// ============================================================================

struct TestContext {
    app: axum::Router,
    catalog: Arc<InMemoryPriceListRepository>,
}

async fn test_context() -> TestContext {
    let catalog = Arc::new(InMemoryPriceListRepository::default());

    // Neither client connects eagerly; the rate limiter fails open and
    // event publishing is fire-and-forget.
    let redis = atelier_store::RedisClient::new("redis://127.0.0.1:6399")
        .await
        .expect("redis client");
    let events = atelier_store::EventProducer::new("127.0.0.1:9092").expect("kafka producer");

    let state = AppState {
        order_repo: Arc::new(InMemoryOrderRepository::default()),
        catalog_repo: catalog.clone(),
        progress_repo: Arc::new(InMemoryProgressLogRepository::default()),
        feedback_repo: Arc::new(InMemoryFeedbackRepository::default()),
        site_repo: Arc::new(InMemorySiteRepository::default()),
        redis: Arc::new(redis),
        events: Arc::new(events),
        auth: AuthConfig {
            secret: JWT_SECRET.to_string(),
            expiration: 3600,
        },
        gateway: GatewayConfig {
            server_key: SERVER_KEY.to_string(),
        },
    };

    TestContext { app: app(state), catalog }
}

fn token_for(user_id: Uuid, role: &str) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        email: None,
        role: role.to_string(),
        exp: (Utc::now().timestamp() + 3600) as usize,
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn settlement_payload(order_number: &str, transaction_id: &str, gross: &str, time: &str) -> Value {
    let signature = signature_for(order_number, "200", gross, SERVER_KEY);
    json!({
        "transaction_id": transaction_id,
        "order_id": order_number,
        "status_code": "200",
        "gross_amount": gross,
        "signature_key": signature,
        "transaction_status": "settlement",
        "fraud_status": "accept",
        "payment_type": "bank_transfer",
        "transaction_time": time,
        "settlement_time": time,
        "currency": "IDR",
        "va_numbers": [{"bank": "bca", "va_number": "1234567890"}]
    })
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn order_payment_scenario_end_to_end() {
    let ctx = test_context().await;
    let package = ctx.catalog.seed("Company Profile Website", 5_000_000, true);
    let customer = Uuid::new_v4();
    let token = token_for(customer, "CUSTOMER");

    // Create order: price snapshot, pending.
    let (status, order) = send(
        &ctx.app,
        "POST",
        "/v1/orders",
        Some(&token),
        Some(json!({ "price_list_id": package.id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["total_amount"], 5_000_000);
    let order_id = order["id"].as_str().unwrap().to_string();
    let order_number = order["order_number"].as_str().unwrap().to_string();

    // Settlement webhook moves the order to in_progress.
    let payload = settlement_payload(&order_number, "tx-100", "5000000.00", "2025-11-13 10:00:00");
    let (status, outcome) = send(&ctx.app, "POST", "/v1/webhooks/payments", None, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["result"], "applied");
    assert_eq!(outcome["transition"], "in_progress");

    let (_, order) = send(&ctx.app, "GET", &format!("/v1/orders/{}", order_id), Some(&token), None).await;
    assert_eq!(order["status"], "in_progress");

    // Replaying the identical webhook is idempotent: no new payment row,
    // order unchanged.
    let (status, outcome) = send(&ctx.app, "POST", "/v1/webhooks/payments", None, Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["result"], "applied");
    assert!(outcome["transition"].is_null());

    let (_, payments) = send(
        &ctx.app,
        "GET",
        &format!("/v1/orders/{}/payments", order_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(payments.as_array().unwrap().len(), 1);

    // A later expire callback never regresses a settled payment.
    let signature = signature_for(&order_number, "407", "5000000.00", SERVER_KEY);
    let expire = json!({
        "transaction_id": "tx-100",
        "order_id": order_number,
        "status_code": "407",
        "gross_amount": "5000000.00",
        "signature_key": signature,
        "transaction_status": "expire",
        "transaction_time": "2025-11-13 12:00:00"
    });
    let (status, outcome) = send(&ctx.app, "POST", "/v1/webhooks/payments", None, Some(expire)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["result"], "skipped");
    assert_eq!(outcome["reason"], "status_regression");

    let (_, order) = send(&ctx.app, "GET", &format!("/v1/orders/{}", order_id), Some(&token), None).await;
    assert_eq!(order["status"], "in_progress");
}

#[tokio::test]
async fn webhook_with_bad_signature_is_rejected() {
    let ctx = test_context().await;
    let package = ctx.catalog.seed("Landing Page", 1_500_000, true);
    let token = token_for(Uuid::new_v4(), "CUSTOMER");

    let (_, order) = send(
        &ctx.app,
        "POST",
        "/v1/orders",
        Some(&token),
        Some(json!({ "price_list_id": package.id })),
    )
    .await;
    let order_id = order["id"].as_str().unwrap().to_string();
    let order_number = order["order_number"].as_str().unwrap().to_string();

    let mut payload = settlement_payload(&order_number, "tx-200", "1500000.00", "2025-11-13 10:00:00");
    payload["signature_key"] = json!("0000000000");

    let (status, _) = send(&ctx.app, "POST", "/v1/webhooks/payments", None, Some(payload)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // No state change.
    let (_, order) = send(&ctx.app, "GET", &format!("/v1/orders/{}", order_id), Some(&token), None).await;
    assert_eq!(order["status"], "pending");
    let (_, payments) = send(
        &ctx.app,
        "GET",
        &format!("/v1/orders/{}/payments", order_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(payments.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn order_against_inactive_package_fails() {
    let ctx = test_context().await;
    let package = ctx.catalog.seed("Retired Package", 2_000_000, false);
    let token = token_for(Uuid::new_v4(), "CUSTOMER");

    let (status, body) = send(
        &ctx.app,
        "POST",
        "/v1/orders",
        Some(&token),
        Some(json!({ "price_list_id": package.id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("inactive"));
}

#[tokio::test]
async fn price_snapshot_survives_catalog_edit() {
    let ctx = test_context().await;
    let package = ctx.catalog.seed("Company Profile Website", 5_000_000, true);
    let customer = Uuid::new_v4();
    let token = token_for(customer, "CUSTOMER");
    let staff_token = token_for(Uuid::new_v4(), "STAFF");

    let (_, order) = send(
        &ctx.app,
        "POST",
        "/v1/orders",
        Some(&token),
        Some(json!({ "price_list_id": package.id })),
    )
    .await;
    let order_id = order["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &ctx.app,
        "PUT",
        &format!("/v1/admin/price-lists/{}", package.id),
        Some(&staff_token),
        Some(json!({ "price": 7_500_000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, order) = send(&ctx.app, "GET", &format!("/v1/orders/{}", order_id), Some(&token), None).await;
    assert_eq!(order["total_amount"], 5_000_000);
}

#[tokio::test]
async fn invalid_transitions_are_rejected() {
    let ctx = test_context().await;
    let package = ctx.catalog.seed("Landing Page", 1_500_000, true);
    let customer = Uuid::new_v4();
    let token = token_for(customer, "CUSTOMER");
    let staff_token = token_for(Uuid::new_v4(), "STAFF");

    let (_, order) = send(
        &ctx.app,
        "POST",
        "/v1/orders",
        Some(&token),
        Some(json!({ "price_list_id": package.id })),
    )
    .await;
    let order_id = order["id"].as_str().unwrap().to_string();

    // pending -> completed skips in_progress.
    let (status, _) = send(
        &ctx.app,
        "POST",
        &format!("/v1/admin/orders/{}/status", order_id),
        Some(&staff_token),
        Some(json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Walk the happy path, then verify completed is terminal.
    let (status, _) = send(
        &ctx.app,
        "POST",
        &format!("/v1/admin/orders/{}/status", order_id),
        Some(&staff_token),
        Some(json!({ "status": "in_progress" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &ctx.app,
        "POST",
        &format!("/v1/admin/orders/{}/status", order_id),
        Some(&staff_token),
        Some(json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["completed_at"].is_null());

    let (status, _) = send(
        &ctx.app,
        "POST",
        &format!("/v1/orders/{}/cancel", order_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn customer_can_cancel_pending_order() {
    let ctx = test_context().await;
    let package = ctx.catalog.seed("Landing Page", 1_500_000, true);
    let token = token_for(Uuid::new_v4(), "CUSTOMER");

    let (_, order) = send(
        &ctx.app,
        "POST",
        "/v1/orders",
        Some(&token),
        Some(json!({ "price_list_id": package.id })),
    )
    .await;
    let order_id = order["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &ctx.app,
        "POST",
        &format!("/v1/orders/{}/cancel", order_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");
}

#[tokio::test]
async fn customers_cannot_see_each_others_orders() {
    let ctx = test_context().await;
    let package = ctx.catalog.seed("Landing Page", 1_500_000, true);
    let owner_token = token_for(Uuid::new_v4(), "CUSTOMER");
    let other_token = token_for(Uuid::new_v4(), "CUSTOMER");
    let staff_token = token_for(Uuid::new_v4(), "STAFF");

    let (_, order) = send(
        &ctx.app,
        "POST",
        "/v1/orders",
        Some(&owner_token),
        Some(json!({ "price_list_id": package.id })),
    )
    .await;
    let order_id = order["id"].as_str().unwrap().to_string();

    let (status, _) = send(&ctx.app, "GET", &format!("/v1/orders/{}", order_id), Some(&other_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Staff may see any order.
    let (status, _) = send(&ctx.app, "GET", &format!("/v1/orders/{}", order_id), Some(&staff_token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn staff_routes_reject_customers() {
    let ctx = test_context().await;
    let token = token_for(Uuid::new_v4(), "CUSTOMER");

    let (status, _) = send(&ctx.app, "GET", "/v1/admin/orders", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&ctx.app, "GET", "/v1/admin/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn one_rating_per_order() {
    let ctx = test_context().await;
    let package = ctx.catalog.seed("Landing Page", 1_500_000, true);
    let token = token_for(Uuid::new_v4(), "CUSTOMER");

    let (_, order) = send(
        &ctx.app,
        "POST",
        "/v1/orders",
        Some(&token),
        Some(json!({ "price_list_id": package.id })),
    )
    .await;
    let order_id = order["id"].as_str().unwrap().to_string();

    // Nothing to fetch before the first rating lands.
    let (status, _) = send(
        &ctx.app,
        "GET",
        &format!("/v1/orders/{}/rating", order_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &ctx.app,
        "POST",
        &format!("/v1/orders/{}/rating", order_id),
        Some(&token),
        Some(json!({ "rating": 5, "comment": "great work" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, stored) = send(
        &ctx.app,
        "GET",
        &format!("/v1/orders/{}/rating", order_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["rating"], 5);

    let (status, _) = send(
        &ctx.app,
        "POST",
        &format!("/v1/orders/{}/rating", order_id),
        Some(&token),
        Some(json!({ "rating": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Score bounds are validated before storage.
    let (status, _) = send(
        &ctx.app,
        "POST",
        &format!("/v1/orders/{}/rating", order_id),
        Some(&token),
        Some(json!({ "rating": 6 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn complaint_flow_and_progress_timeline() {
    let ctx = test_context().await;
    let package = ctx.catalog.seed("Landing Page", 1_500_000, true);
    let token = token_for(Uuid::new_v4(), "CUSTOMER");
    let staff_token = token_for(Uuid::new_v4(), "STAFF");

    let (_, order) = send(
        &ctx.app,
        "POST",
        "/v1/orders",
        Some(&token),
        Some(json!({ "price_list_id": package.id })),
    )
    .await;
    let order_id = order["id"].as_str().unwrap().to_string();

    // Staff append progress; customer reads the timeline.
    let (status, _) = send(
        &ctx.app,
        "POST",
        &format!("/v1/admin/orders/{}/progress", order_id),
        Some(&staff_token),
        Some(json!({ "status": "wireframes", "description": "homepage wireframes done" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, entries) = send(
        &ctx.app,
        "GET",
        &format!("/v1/orders/{}/progress", order_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entries.as_array().unwrap().len(), 1);

    // Complaint opens, staff closes it, closing twice conflicts.
    let (status, complaint) = send(
        &ctx.app,
        "POST",
        &format!("/v1/orders/{}/complaints", order_id),
        Some(&token),
        Some(json!({ "message": "logo colors are wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let complaint_id = complaint["id"].as_str().unwrap().to_string();

    let (status, closed) = send(
        &ctx.app,
        "POST",
        &format!("/v1/admin/complaints/{}/close", complaint_id),
        Some(&staff_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(closed["status"], "closed");

    let (status, _) = send(
        &ctx.app,
        "POST",
        &format!("/v1/admin/complaints/{}/close", complaint_id),
        Some(&staff_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn public_pricing_page_lists_active_only() {
    let ctx = test_context().await;
    ctx.catalog.seed("Landing Page", 1_500_000, true);
    ctx.catalog.seed("Retired Package", 900_000, false);

    let (status, body) = send(&ctx.app, "GET", "/v1/price-lists", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["title"], "Landing Page");
}

#[tokio::test]
async fn contact_form_validates_input() {
    let ctx = test_context().await;

    let (status, _) = send(
        &ctx.app,
        "POST",
        "/v1/contact",
        None,
        Some(json!({ "name": "", "email": "person@example.com", "message": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &ctx.app,
        "POST",
        "/v1/contact",
        None,
        Some(json!({ "name": "Person", "email": "not-an-email", "message": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &ctx.app,
        "POST",
        "/v1/contact",
        None,
        Some(json!({ "name": "Person", "email": "person@example.com", "message": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].is_string());
}

#[tokio::test]
async fn staff_can_enter_orders_for_customers() {
    let ctx = test_context().await;
    let package = ctx.catalog.seed("Landing Page", 1_500_000, true);
    let customer = Uuid::new_v4();
    let staff = Uuid::new_v4();
    let staff_token = token_for(staff, "STAFF");
    let customer_token = token_for(customer, "CUSTOMER");

    let (status, order) = send(
        &ctx.app,
        "POST",
        "/v1/admin/orders",
        Some(&staff_token),
        Some(json!({ "customer_id": customer, "price_list_id": package.id, "notes": "phoned in" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["user_id"], json!(customer.to_string()));
    assert_eq!(order["created_by"], json!(staff.to_string()));

    // The customer owns the staff-entered order.
    let (status, orders) = send(&ctx.app, "GET", "/v1/orders", Some(&customer_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders.as_array().unwrap().len(), 1);
}
