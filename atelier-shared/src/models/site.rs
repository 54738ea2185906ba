use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pii::Masked;

/// Portfolio entry shown on the marketing site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub client: Option<String>,
    pub url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: Uuid,
    pub name: String,
    pub position: Option<String>,
    pub photo: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Inbound inquiry from the contact form, optionally linked to a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub email: Masked<String>,
    pub subject: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewContactMessage {
    pub user_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}
