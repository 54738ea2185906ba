use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use crate::price_list::PriceList;

#[derive(Debug, Clone, Deserialize)]
pub struct NewPriceList {
    pub title: String,
    pub description: Option<String>,
    pub price: i64,
    pub category: Option<String>,
    pub duration: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PriceListUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub category: Option<String>,
    pub duration: Option<String>,
    pub is_active: Option<bool>,
}

/// Repository trait for price-list access.
#[async_trait]
pub trait PriceListRepository: Send + Sync {
    async fn create(
        &self,
        entry: &NewPriceList,
    ) -> Result<PriceList, Box<dyn std::error::Error + Send + Sync>>;

    async fn get(
        &self,
        id: Uuid,
    ) -> Result<Option<PriceList>, Box<dyn std::error::Error + Send + Sync>>;

    /// Active entries only; what the public pricing page shows.
    async fn list_active(
        &self,
    ) -> Result<Vec<PriceList>, Box<dyn std::error::Error + Send + Sync>>;

    /// Every non-deleted entry, for the admin screen.
    async fn list_all(
        &self,
    ) -> Result<Vec<PriceList>, Box<dyn std::error::Error + Send + Sync>>;

    async fn update(
        &self,
        id: Uuid,
        changes: &PriceListUpdate,
    ) -> Result<Option<PriceList>, Box<dyn std::error::Error + Send + Sync>>;

    /// Soft delete; referencing orders keep their snapshot.
    async fn delete(
        &self,
        id: Uuid,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}
