use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use atelier_shared::models::site::{ContactMessage, NewContactMessage, Project, TeamMember};

use crate::error::AppError;
use crate::state::AppState;

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /v1/projects
/// Published portfolio entries for the marketing site.
pub async fn list_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<Project>>, AppError> {
    let projects = state
        .site_repo
        .list_projects()
        .await
        .map_err(AppError::from_repo)?;
    Ok(Json(projects))
}

/// GET /v1/team
pub async fn list_team(
    State(state): State<AppState>,
) -> Result<Json<Vec<TeamMember>>, AppError> {
    let members = state
        .site_repo
        .list_team_members()
        .await
        .map_err(AppError::from_repo)?;
    Ok(Json(members))
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub id: Uuid,
}

/// POST /v1/contact
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(req): Json<NewContactMessage>,
) -> Result<(StatusCode, Json<ContactResponse>), AppError> {
    if req.name.trim().is_empty() || req.message.trim().is_empty() {
        return Err(AppError::ValidationError("name and message are required".to_string()));
    }
    if !req.email.contains('@') {
        return Err(AppError::ValidationError("invalid email address".to_string()));
    }

    let id = state
        .site_repo
        .create_contact_message(&req)
        .await
        .map_err(AppError::from_repo)?;
    Ok((StatusCode::CREATED, Json(ContactResponse { id })))
}

/// GET /v1/admin/contact
pub async fn list_contact_messages(
    State(state): State<AppState>,
) -> Result<Json<Vec<ContactMessage>>, AppError> {
    let messages = state
        .site_repo
        .list_contact_messages()
        .await
        .map_err(AppError::from_repo)?;
    Ok(Json(messages))
}
