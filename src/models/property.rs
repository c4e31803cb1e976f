use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Property {
    pub property_id: i64,
    pub customer_id: i64,
    pub label: String,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_utc: DateTime<Utc>,
}

/// Input for creating a property.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProperty {
    #[validate(range(min = 1, message = "customer_id must be a positive integer"))]
    pub customer_id: i64,
    #[validate(length(min = 1, max = 120, message = "label is required"))]
    pub label: String,
    #[validate(length(min = 1, max = 200, message = "address1 is required"))]
    pub address1: String,
    pub address2: Option<String>,
    #[validate(length(min = 1, max = 80, message = "city is required"))]
    pub city: String,
    #[validate(length(min = 2, max = 2, message = "state must be a 2-letter code"))]
    pub state: String,
    #[validate(length(min = 1, max = 12, message = "postal_code is required"))]
    pub postal_code: String,
    pub notes: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}
