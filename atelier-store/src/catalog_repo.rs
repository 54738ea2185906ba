use async_trait::async_trait;
use atelier_catalog::repository::{NewPriceList, PriceListRepository, PriceListUpdate};
use atelier_catalog::PriceList;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

pub struct StorePriceListRepository {
    pool: PgPool,
}

impl StorePriceListRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const PRICE_LIST_COLUMNS: &str =
    "id, title, description, price, category, duration, is_active, created_at, updated_at";

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct PriceListRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    price: i64,
    category: Option<String>,
    duration: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PriceListRow> for PriceList {
    fn from(row: PriceListRow) -> Self {
        PriceList {
            id: row.id,
            title: row.title,
            description: row.description,
            price: row.price,
            category: row.category,
            duration: row.duration,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl PriceListRepository for StorePriceListRepository {
    async fn create(
        &self,
        entry: &NewPriceList,
    ) -> Result<PriceList, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, PriceListRow>(&format!(
            "INSERT INTO price_lists (id, title, description, price, category, duration, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {PRICE_LIST_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&entry.title)
        .bind(&entry.description)
        .bind(entry.price)
        .bind(&entry.category)
        .bind(&entry.duration)
        .bind(entry.is_active)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn get(
        &self,
        id: Uuid,
    ) -> Result<Option<PriceList>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, PriceListRow>(&format!(
            "SELECT {PRICE_LIST_COLUMNS} FROM price_lists WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_active(
        &self,
    ) -> Result<Vec<PriceList>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, PriceListRow>(&format!(
            "SELECT {PRICE_LIST_COLUMNS} FROM price_lists \
             WHERE is_active AND deleted_at IS NULL ORDER BY price ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_all(
        &self,
    ) -> Result<Vec<PriceList>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, PriceListRow>(&format!(
            "SELECT {PRICE_LIST_COLUMNS} FROM price_lists WHERE deleted_at IS NULL \
             ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &PriceListUpdate,
    ) -> Result<Option<PriceList>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, PriceListRow>(&format!(
            "UPDATE price_lists SET \
             title = COALESCE($1, title), \
             description = COALESCE($2, description), \
             price = COALESCE($3, price), \
             category = COALESCE($4, category), \
             duration = COALESCE($5, duration), \
             is_active = COALESCE($6, is_active), \
             updated_at = NOW() \
             WHERE id = $7 AND deleted_at IS NULL \
             RETURNING {PRICE_LIST_COLUMNS}"
        ))
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(changes.price)
        .bind(&changes.category)
        .bind(&changes.duration)
        .bind(changes.is_active)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn delete(
        &self,
        id: Uuid,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let result = sqlx::query(
            "UPDATE price_lists SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
