use async_trait::async_trait;
use atelier_core::repository::SiteRepository;
use atelier_shared::models::site::{ContactMessage, NewContactMessage, Project, TeamMember};
use atelier_shared::pii::Masked;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

pub struct StoreSiteRepository {
    pool: PgPool,
}

impl StoreSiteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    image: Option<String>,
    category: Option<String>,
    client: Option<String>,
    url: Option<String>,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct TeamMemberRow {
    id: Uuid,
    name: String,
    position: Option<String>,
    photo: Option<String>,
    bio: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct ContactMessageRow {
    id: Uuid,
    user_id: Option<Uuid>,
    name: String,
    email: String,
    subject: Option<String>,
    message: String,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl SiteRepository for StoreSiteRepository {
    async fn list_projects(
        &self,
    ) -> Result<Vec<Project>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            "SELECT id, title, description, image, category, client, url, published_at, created_at \
             FROM projects WHERE deleted_at IS NULL AND published_at IS NOT NULL \
             ORDER BY published_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Project {
                id: row.id,
                title: row.title,
                description: row.description,
                image: row.image,
                category: row.category,
                client: row.client,
                url: row.url,
                published_at: row.published_at,
                created_at: row.created_at,
            })
            .collect())
    }

    async fn list_team_members(
        &self,
    ) -> Result<Vec<TeamMember>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, TeamMemberRow>(
            "SELECT id, name, position, photo, bio, created_at \
             FROM team_members WHERE deleted_at IS NULL ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| TeamMember {
                id: row.id,
                name: row.name,
                position: row.position,
                photo: row.photo,
                bio: row.bio,
                created_at: row.created_at,
            })
            .collect())
    }

    async fn create_contact_message(
        &self,
        message: &NewContactMessage,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO contact_messages (id, user_id, name, email, subject, message) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(id)
        .bind(message.user_id)
        .bind(&message.name)
        .bind(&message.email)
        .bind(&message.subject)
        .bind(&message.message)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn list_contact_messages(
        &self,
    ) -> Result<Vec<ContactMessage>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, ContactMessageRow>(
            "SELECT id, user_id, name, email, subject, message, created_at \
             FROM contact_messages WHERE deleted_at IS NULL ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ContactMessage {
                id: row.id,
                user_id: row.user_id,
                name: row.name,
                email: Masked(row.email),
                subject: row.subject,
                message: row.message,
                created_at: row.created_at,
            })
            .collect())
    }
}
