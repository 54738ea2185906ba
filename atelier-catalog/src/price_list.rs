use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A purchasable service package. Prices are whole currency units (IDR has
/// no subunit). Admin edits never rewrite history: orders snapshot the price
/// at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceList {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price: i64,
    pub category: Option<String>,
    pub duration: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PriceList {
    /// An order may only be placed against an active package.
    pub fn ensure_orderable(&self) -> Result<(), PriceListError> {
        if !self.is_active {
            return Err(PriceListError::Inactive(self.id.to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PriceListError {
    #[error("Price list entry not found: {0}")]
    NotFound(String),

    #[error("Price list entry is inactive: {0}")]
    Inactive(String),

    #[error("Price list validation failed: {0}")]
    ValidationFailed(String),
}

/// Field-level validation for admin create/update input.
pub fn validate_entry(title: &str, price: i64) -> Result<(), PriceListError> {
    if title.trim().is_empty() {
        return Err(PriceListError::ValidationFailed("title must not be empty".to_string()));
    }
    if price < 0 {
        return Err(PriceListError::ValidationFailed("price must not be negative".to_string()));
    }
    Ok(())
}
