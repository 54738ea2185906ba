use axum::{
    extract::State,
    http::Method,
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod catalog;
pub mod error;
pub mod feedback;
pub mod middleware;
pub mod orders;
pub mod progress;
pub mod site;
pub mod state;
pub mod webhooks;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    // Public surface: marketing reads, contact form, gateway callbacks
    // (authenticated by signature, not by JWT).
    let public = Router::new()
        .route("/health", get(site::health))
        .route("/v1/price-lists", get(catalog::list_price_lists))
        .route("/v1/projects", get(site::list_projects))
        .route("/v1/team", get(site::list_team))
        .route("/v1/contact", post(site::submit_contact))
        .route("/v1/webhooks/payments", post(webhooks::handle_payment_webhook));

    let customer = Router::new()
        .route("/v1/orders", post(orders::create_order).get(orders::list_orders))
        .route("/v1/orders/{id}", get(orders::get_order))
        .route("/v1/orders/{id}/cancel", post(orders::cancel_order))
        .route("/v1/orders/{id}/payments", get(orders::list_payments))
        .route("/v1/orders/{id}/progress", get(progress::list_progress))
        .route(
            "/v1/orders/{id}/complaints",
            post(feedback::create_complaint).get(feedback::list_complaints),
        )
        .route(
            "/v1/orders/{id}/rating",
            post(feedback::create_rating).get(feedback::get_rating),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let staff = Router::new()
        .route(
            "/v1/admin/orders",
            post(orders::create_order_for_customer).get(orders::list_all_orders),
        )
        .route("/v1/admin/orders/{id}/status", post(orders::transition_order))
        .route("/v1/admin/orders/{id}/progress", post(progress::append_progress))
        .route("/v1/admin/complaints/{id}/close", post(feedback::close_complaint))
        .route(
            "/v1/admin/price-lists",
            post(catalog::create_price_list).get(catalog::list_all_price_lists),
        )
        .route(
            "/v1/admin/price-lists/{id}",
            put(catalog::update_price_list).delete(catalog::delete_price_list),
        )
        .route("/v1/admin/contact", get(site::list_contact_messages))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::staff_auth_middleware,
        ));

    Router::new()
        .merge(public)
        .merge(customer)
        .merge(staff)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn_with_state(state.clone(), rate_limit_middleware))
        .with_state(state)
}

async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<impl IntoResponse, impl IntoResponse> {
    // Connect info is absent when the router is driven without a socket
    // (tests); skip limiting there.
    let ip = req
        .extensions()
        .get::<axum::extract::ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string());
    let Some(ip) = ip else {
        return Ok(next.run(req).await);
    };
    let key = format!("ratelimit:{}", ip);

    match state.redis.check_rate_limit(&key, 100, 60).await {
        Ok(true) => Ok(next.run(req).await),
        Ok(false) => Err((axum::http::StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded")),
        Err(_) => Ok(next.run(req).await), // Fail open
    }
}
