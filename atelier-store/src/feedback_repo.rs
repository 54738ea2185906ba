use async_trait::async_trait;
use atelier_order::feedback::{self, FeedbackError};
use atelier_order::models::{Complaint, ComplaintStatus, ProgressLog, Rating};
use atelier_order::repository::{FeedbackRepository, ProgressLogRepository};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

pub struct StoreProgressLogRepository {
    pool: PgPool,
}

impl StoreProgressLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProgressLogRow {
    id: Uuid,
    order_id: Uuid,
    status: String,
    description: Option<String>,
    logged_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl From<ProgressLogRow> for ProgressLog {
    fn from(row: ProgressLogRow) -> Self {
        ProgressLog {
            id: row.id,
            order_id: row.order_id,
            status: row.status,
            description: row.description,
            logged_at: row.logged_at,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl ProgressLogRepository for StoreProgressLogRepository {
    async fn append(
        &self,
        entry: &ProgressLog,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            "INSERT INTO progress_logs (id, order_id, status, description, logged_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(entry.id)
        .bind(entry.order_id)
        .bind(&entry.status)
        .bind(&entry.description)
        .bind(entry.logged_at)
        .execute(&self.pool)
        .await?;

        Ok(entry.id)
    }

    async fn list_for_order(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<ProgressLog>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, ProgressLogRow>(
            "SELECT id, order_id, status, description, logged_at, created_at \
             FROM progress_logs WHERE order_id = $1 AND deleted_at IS NULL \
             ORDER BY logged_at ASC",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

pub struct StoreFeedbackRepository {
    pool: PgPool,
}

impl StoreFeedbackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ComplaintRow {
    id: Uuid,
    order_id: Uuid,
    user_id: Uuid,
    message: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ComplaintRow {
    fn into_complaint(self) -> Result<Complaint, Box<dyn std::error::Error + Send + Sync>> {
        let status = ComplaintStatus::parse(&self.status)
            .ok_or_else(|| format!("unknown complaint status in storage: {}", self.status))?;
        Ok(Complaint {
            id: self.id,
            order_id: self.order_id,
            user_id: self.user_id,
            message: self.message,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RatingRow {
    id: Uuid,
    order_id: Uuid,
    user_id: Uuid,
    rating: i32,
    comment: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<RatingRow> for Rating {
    fn from(row: RatingRow) -> Self {
        Rating {
            id: row.id,
            order_id: row.order_id,
            user_id: row.user_id,
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl FeedbackRepository for StoreFeedbackRepository {
    async fn create_complaint(
        &self,
        complaint: &Complaint,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            "INSERT INTO complaints (id, order_id, user_id, message, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(complaint.id)
        .bind(complaint.order_id)
        .bind(complaint.user_id)
        .bind(&complaint.message)
        .bind(complaint.status.as_str())
        .bind(complaint.created_at)
        .bind(complaint.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(complaint.id)
    }

    async fn list_complaints(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<Complaint>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, ComplaintRow>(
            "SELECT id, order_id, user_id, message, status, created_at, updated_at \
             FROM complaints WHERE order_id = $1 AND deleted_at IS NULL \
             ORDER BY created_at DESC",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ComplaintRow::into_complaint).collect()
    }

    async fn close_complaint(
        &self,
        id: Uuid,
    ) -> Result<Option<Complaint>, Box<dyn std::error::Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ComplaintRow>(
            "SELECT id, order_id, user_id, message, status, created_at, updated_at \
             FROM complaints WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let mut complaint = match row {
            Some(row) => row.into_complaint()?,
            None => return Ok(None),
        };

        feedback::close_complaint(&mut complaint, Utc::now())?;

        sqlx::query("UPDATE complaints SET status = $1, updated_at = $2 WHERE id = $3")
            .bind(complaint.status.as_str())
            .bind(complaint.updated_at)
            .bind(complaint.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(complaint))
    }

    async fn create_rating(
        &self,
        rating: &Rating,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
        let result = sqlx::query(
            "INSERT INTO ratings (id, order_id, user_id, rating, comment, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(rating.id)
        .bind(rating.order_id)
        .bind(rating.user_id)
        .bind(rating.rating)
        .bind(&rating.comment)
        .bind(rating.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(rating.id),
            // The partial unique index on order_id backs the one-rating rule.
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(Box::new(FeedbackError::DuplicateRating(rating.order_id.to_string())))
            }
            Err(e) => Err(Box::new(e)),
        }
    }

    async fn get_rating(
        &self,
        order_id: Uuid,
    ) -> Result<Option<Rating>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, RatingRow>(
            "SELECT id, order_id, user_id, rating, comment, created_at \
             FROM ratings WHERE order_id = $1 AND deleted_at IS NULL",
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }
}
