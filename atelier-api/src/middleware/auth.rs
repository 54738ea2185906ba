use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use atelier_core::identity::{Actor, Role};

use crate::state::AppState;

/// Claims issued by the external identity service.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: Option<String>,
    pub role: String,
    pub exp: usize,
}

fn decode_actor(state: &AppState, req: &Request) -> Result<Actor, StatusCode> {
    // 1. Extract token from Authorization header
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // 2. Decode and validate JWT
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let user_id = Uuid::parse_str(&token_data.claims.sub).map_err(|_| StatusCode::UNAUTHORIZED)?;

    // 3. Map the role claim
    let role = match token_data.claims.role.as_str() {
        "CUSTOMER" => Role::Customer,
        "STAFF" | "ADMIN" => Role::Staff,
        _ => return Err(StatusCode::FORBIDDEN),
    };

    Ok(Actor { user_id, role })
}

/// Any authenticated caller. Ownership checks happen in the handlers via
/// `Actor::may_access_order`.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let actor = decode_actor(&state, &req)?;
    req.extensions_mut().insert(actor);
    Ok(next.run(req).await)
}

/// Staff only.
pub async fn staff_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let actor = decode_actor(&state, &req)?;
    if !actor.is_staff() {
        return Err(StatusCode::FORBIDDEN);
    }
    req.extensions_mut().insert(actor);
    Ok(next.run(req).await)
}
