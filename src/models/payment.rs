//! Payment model and the acceptance-request DTO.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationErrors};

use super::money::check_amount;

/// A monetary application against one invoice. Created exactly once per
/// successful acceptance call; never mutated or deleted afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub payment_id: i64,
    pub invoice_id: i64,
    pub amount: Decimal,
    pub paid_date: Option<NaiveDate>,
    pub method: Option<String>,
    pub reference: String,
    pub notes: Option<String>,
    pub created_utc: DateTime<Utc>,
}

/// Input for the payment acceptance workflow.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePayment {
    #[validate(range(min = 1, message = "invoice_id must be a positive integer"))]
    pub invoice_id: i64,
    pub amount: Decimal,
    pub paid_date: Option<NaiveDate>,
    #[validate(length(max = 40, message = "method must be at most 40 characters"))]
    pub method: Option<String>,
    #[validate(length(min = 1, max = 80, message = "reference is required"))]
    pub reference: String,
    pub notes: Option<String>,
}

impl CreatePayment {
    /// Derive rules plus the monetary checks (positive, 2-dp scale).
    pub fn validate_payload(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(e) => e,
        };

        check_amount(&mut errors, "amount", self.amount, true);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Query filters for listing payments.
#[derive(Debug, Default, Deserialize)]
pub struct ListPaymentsQuery {
    pub invoice_id: Option<i64>,
}
