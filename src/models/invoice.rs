//! Invoice model and the status decision applied after each accepted payment.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError, ValidationErrors};

use super::money::check_amount;

/// Invoice lifecycle status. `void` is set externally and is terminal for
/// the payment workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Void,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Void => "void",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "sent" => InvoiceStatus::Sent,
            "paid" => InvoiceStatus::Paid,
            "void" => InvoiceStatus::Void,
            _ => InvoiceStatus::Draft,
        }
    }

    pub fn is_valid(s: &str) -> bool {
        matches!(s, "draft" | "sent" | "paid" | "void")
    }
}

/// Status after a payment lands. `already_paid` includes the new payment and
/// is recomputed from the payment rows, never cached. Void invoices are
/// rejected before this point.
pub fn status_after_payment(
    current: InvoiceStatus,
    already_paid: Decimal,
    total: Decimal,
) -> InvoiceStatus {
    if already_paid >= total {
        InvoiceStatus::Paid
    } else if current == InvoiceStatus::Draft {
        InvoiceStatus::Sent
    } else {
        current
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub invoice_id: i64,
    pub customer_id: i64,
    pub property_id: i64,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub issued_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub status: String,
    pub notes: Option<String>,
    pub created_utc: DateTime<Utc>,
}

/// Input for creating an invoice.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvoice {
    #[validate(range(min = 1, message = "customer_id must be a positive integer"))]
    pub customer_id: i64,
    #[validate(range(min = 1, message = "property_id must be a positive integer"))]
    pub property_id: i64,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub issued_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub status: String,
    pub notes: Option<String>,
}

impl CreateInvoice {
    /// Full payload validation: derive rules plus monetary and status checks
    /// the derive macro cannot express.
    pub fn validate_payload(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(e) => e,
        };

        check_amount(&mut errors, "subtotal", self.subtotal, false);
        check_amount(&mut errors, "tax", self.tax, false);
        check_amount(&mut errors, "total", self.total, false);

        if !InvoiceStatus::is_valid(&self.status) {
            let mut err = ValidationError::new("invalid_status");
            err.message = Some("status must be one of draft, sent, paid, void".into());
            errors.add("status", err);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Query filters for listing invoices.
#[derive(Debug, Default, Deserialize)]
pub struct ListInvoicesQuery {
    pub customer_id: Option<i64>,
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn partial_payment_moves_draft_to_sent() {
        let next = status_after_payment(InvoiceStatus::Draft, dec!(10.00), dec!(30.00));
        assert_eq!(next, InvoiceStatus::Sent);
    }

    #[test]
    fn partial_payment_keeps_sent_invoice_sent() {
        let next = status_after_payment(InvoiceStatus::Sent, dec!(10.00), dec!(30.00));
        assert_eq!(next, InvoiceStatus::Sent);
    }

    #[test]
    fn covering_payment_marks_paid_from_sent() {
        let next = status_after_payment(InvoiceStatus::Sent, dec!(30.00), dec!(30.00));
        assert_eq!(next, InvoiceStatus::Paid);
    }

    #[test]
    fn covering_payment_marks_paid_from_draft() {
        let next = status_after_payment(InvoiceStatus::Draft, dec!(45.50), dec!(30.00));
        assert_eq!(next, InvoiceStatus::Paid);
    }

    #[test]
    fn paid_never_reverts_on_further_payment() {
        let next = status_after_payment(InvoiceStatus::Paid, dec!(31.00), dec!(30.00));
        assert_eq!(next, InvoiceStatus::Paid);
    }

    #[test]
    fn repeated_summation_keeps_exact_cents() {
        // 0.10 summed 300 times must cover a 30.00 total exactly.
        let already_paid = (0..300).fold(Decimal::ZERO, |acc, _| acc + dec!(0.10));
        assert_eq!(already_paid, dec!(30.00));
        let next = status_after_payment(InvoiceStatus::Sent, already_paid, dec!(30.00));
        assert_eq!(next, InvoiceStatus::Paid);
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in ["draft", "sent", "paid", "void"] {
            assert!(InvoiceStatus::is_valid(status));
            assert_eq!(InvoiceStatus::from_string(status).as_str(), status);
        }
        assert!(!InvoiceStatus::is_valid("overdue"));
    }

    #[test]
    fn create_invoice_rejects_unknown_status() {
        let input = CreateInvoice {
            customer_id: 1,
            property_id: 1,
            period_start: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
            issued_date: None,
            due_date: None,
            subtotal: dec!(27.00),
            tax: dec!(3.00),
            total: dec!(30.00),
            status: "overdue".to_string(),
            notes: None,
        };
        let errors = input.validate_payload().unwrap_err();
        assert!(errors.field_errors().contains_key("status"));
    }
}
