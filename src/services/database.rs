//! Database service: pooled Postgres access and the payment acceptance
//! transaction.

use std::time::Duration;

use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, instrument};

use crate::config::PaymentPolicy;
use crate::error::AppError;
use crate::models::{
    status_after_payment, CreateCustomer, CreateInvoice, CreatePayment, CreateProperty, Customer,
    Invoice, InvoiceStatus, ListInvoicesQuery, ListPaymentsQuery, Payment, Property,
};

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "billing-api"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Customer Operations
    // -------------------------------------------------------------------------

    /// Create a new customer.
    #[instrument(skip(self, input))]
    pub async fn create_customer(&self, input: &CreateCustomer) -> Result<Customer, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (first_name, last_name, email, phone, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING customer_id, first_name, last_name, email, phone, is_active, created_utc
            "#,
        )
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create customer: {}", e)))?;

        info!(customer_id = customer.customer_id, "Customer created");

        Ok(customer)
    }

    /// Get a customer by ID.
    #[instrument(skip(self), fields(customer_id = customer_id))]
    pub async fn get_customer(&self, customer_id: i64) -> Result<Option<Customer>, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT customer_id, first_name, last_name, email, phone, is_active, created_utc
            FROM customers
            WHERE customer_id = $1
            "#,
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get customer: {}", e)))?;

        Ok(customer)
    }

    /// List customers.
    #[instrument(skip(self))]
    pub async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT customer_id, first_name, last_name, email, phone, is_active, created_utc
            FROM customers
            ORDER BY customer_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list customers: {}", e)))?;

        Ok(customers)
    }

    // -------------------------------------------------------------------------
    // Property Operations
    // -------------------------------------------------------------------------

    /// Create a new property for a customer.
    #[instrument(skip(self, input), fields(customer_id = input.customer_id))]
    pub async fn create_property(&self, input: &CreateProperty) -> Result<Property, AppError> {
        let property = sqlx::query_as::<_, Property>(
            r#"
            INSERT INTO properties (customer_id, label, address1, address2, city, state, postal_code, notes, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING property_id, customer_id, label, address1, address2, city, state, postal_code, notes, is_active, created_utc
            "#,
        )
        .bind(input.customer_id)
        .bind(&input.label)
        .bind(&input.address1)
        .bind(&input.address2)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.postal_code)
        .bind(&input.notes)
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::Conflict(anyhow::anyhow!(
                    "Customer {} does not exist",
                    input.customer_id
                ))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to create property: {}", e)),
        })?;

        info!(property_id = property.property_id, "Property created");

        Ok(property)
    }

    /// Get a property by ID.
    #[instrument(skip(self), fields(property_id = property_id))]
    pub async fn get_property(&self, property_id: i64) -> Result<Option<Property>, AppError> {
        let property = sqlx::query_as::<_, Property>(
            r#"
            SELECT property_id, customer_id, label, address1, address2, city, state, postal_code, notes, is_active, created_utc
            FROM properties
            WHERE property_id = $1
            "#,
        )
        .bind(property_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get property: {}", e)))?;

        Ok(property)
    }

    /// List properties.
    #[instrument(skip(self))]
    pub async fn list_properties(&self) -> Result<Vec<Property>, AppError> {
        let properties = sqlx::query_as::<_, Property>(
            r#"
            SELECT property_id, customer_id, label, address1, address2, city, state, postal_code, notes, is_active, created_utc
            FROM properties
            ORDER BY property_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list properties: {}", e))
        })?;

        Ok(properties)
    }

    // -------------------------------------------------------------------------
    // Invoice Operations
    // -------------------------------------------------------------------------

    /// Create a new invoice.
    #[instrument(skip(self, input), fields(customer_id = input.customer_id))]
    pub async fn create_invoice(&self, input: &CreateInvoice) -> Result<Invoice, AppError> {
        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            INSERT INTO invoices (
                customer_id, property_id, period_start, period_end, issued_date, due_date,
                subtotal, tax, total, status, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING invoice_id, customer_id, property_id, period_start, period_end, issued_date,
                due_date, subtotal, tax, total, status, notes, created_utc
            "#,
        )
        .bind(input.customer_id)
        .bind(input.property_id)
        .bind(input.period_start)
        .bind(input.period_end)
        .bind(input.issued_date)
        .bind(input.due_date)
        .bind(input.subtotal)
        .bind(input.tax)
        .bind(input.total)
        .bind(&input.status)
        .bind(&input.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::Conflict(anyhow::anyhow!("Referenced customer or property does not exist"))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to create invoice: {}", e)),
        })?;

        info!(
            invoice_id = invoice.invoice_id,
            status = %invoice.status,
            "Invoice created"
        );

        Ok(invoice)
    }

    /// Get an invoice by ID.
    #[instrument(skip(self), fields(invoice_id = invoice_id))]
    pub async fn get_invoice(&self, invoice_id: i64) -> Result<Option<Invoice>, AppError> {
        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            SELECT invoice_id, customer_id, property_id, period_start, period_end, issued_date,
                due_date, subtotal, tax, total, status, notes, created_utc
            FROM invoices
            WHERE invoice_id = $1
            "#,
        )
        .bind(invoice_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get invoice: {}", e)))?;

        Ok(invoice)
    }

    /// List invoices, optionally filtered by customer and status.
    #[instrument(skip(self, filter))]
    pub async fn list_invoices(&self, filter: &ListInvoicesQuery) -> Result<Vec<Invoice>, AppError> {
        let invoices = sqlx::query_as::<_, Invoice>(
            r#"
            SELECT invoice_id, customer_id, property_id, period_start, period_end, issued_date,
                due_date, subtotal, tax, total, status, notes, created_utc
            FROM invoices
            WHERE ($1::bigint IS NULL OR customer_id = $1)
              AND ($2::varchar IS NULL OR status = $2)
            ORDER BY invoice_id
            "#,
        )
        .bind(filter.customer_id)
        .bind(&filter.status)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list invoices: {}", e)))?;

        Ok(invoices)
    }

    // -------------------------------------------------------------------------
    // Payment Operations
    // -------------------------------------------------------------------------

    /// Accept a payment against an invoice.
    ///
    /// Runs inside a single transaction: the invoice row is locked, the
    /// payment inserted under the store's uniqueness and FK constraints, the
    /// cumulative paid amount recomputed from the payment rows, and the
    /// invoice status transitioned. Any failure rolls the whole call back.
    #[instrument(skip(self, input), fields(invoice_id = input.invoice_id))]
    pub async fn accept_payment(
        &self,
        input: &CreatePayment,
        policy: PaymentPolicy,
    ) -> Result<Payment, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
            })?;

        // Lock the invoice row so concurrent acceptances against the same
        // invoice serialize on the read-sum-decide sequence.
        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            SELECT invoice_id, customer_id, property_id, period_start, period_end, issued_date,
                due_date, subtotal, tax, total, status, notes, created_utc
            FROM invoices
            WHERE invoice_id = $1
            FOR UPDATE
            "#,
        )
        .bind(input.invoice_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to load invoice: {}", e)))?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice not found")))?;

        if invoice.status == InvoiceStatus::Void.as_str() {
            return Err(AppError::InvalidState(anyhow::anyhow!(
                "Cannot pay a void invoice"
            )));
        }

        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (invoice_id, amount, paid_date, method, reference, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING payment_id, invoice_id, amount, paid_date, method, reference, notes, created_utc
            "#,
        )
        .bind(input.invoice_id)
        .bind(input.amount)
        .bind(input.paid_date)
        .bind(&input.method)
        .bind(&input.reference)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!(
                    "Reference '{}' already used for invoice {}",
                    input.reference,
                    input.invoice_id
                ))
            }
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::Conflict(anyhow::anyhow!(
                    "Invoice {} no longer exists",
                    input.invoice_id
                ))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to insert payment: {}", e)),
        })?;

        // Exact-decimal sum over all payment rows, including the new one.
        // There is no cached running total to keep in sync.
        let already_paid: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM payments
            WHERE invoice_id = $1
            "#,
        )
        .bind(input.invoice_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to sum payments: {}", e))
        })?;

        if !policy.allow_overpayment && already_paid > invoice.total {
            // Dropping the transaction rolls back the inserted payment.
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Payment of {} exceeds invoice total {}",
                input.amount,
                invoice.total
            )));
        }

        let current = InvoiceStatus::from_string(&invoice.status);
        let next = status_after_payment(current, already_paid, invoice.total);
        if next != current {
            sqlx::query(
                r#"
                UPDATE invoices
                SET status = $2
                WHERE invoice_id = $1
                "#,
            )
            .bind(input.invoice_id)
            .bind(next.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to update invoice status: {}", e))
            })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit payment: {}", e))
        })?;

        info!(
            payment_id = payment.payment_id,
            amount = %payment.amount,
            already_paid = %already_paid,
            status = next.as_str(),
            "Payment accepted"
        );

        Ok(payment)
    }

    /// Get a payment by ID.
    #[instrument(skip(self), fields(payment_id = payment_id))]
    pub async fn get_payment(&self, payment_id: i64) -> Result<Option<Payment>, AppError> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            SELECT payment_id, invoice_id, amount, paid_date, method, reference, notes, created_utc
            FROM payments
            WHERE payment_id = $1
            "#,
        )
        .bind(payment_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get payment: {}", e)))?;

        Ok(payment)
    }

    /// List payments, optionally filtered by invoice.
    #[instrument(skip(self, filter))]
    pub async fn list_payments(&self, filter: &ListPaymentsQuery) -> Result<Vec<Payment>, AppError> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT payment_id, invoice_id, amount, paid_date, method, reference, notes, created_utc
            FROM payments
            WHERE ($1::bigint IS NULL OR invoice_id = $1)
            ORDER BY payment_id
            "#,
        )
        .bind(filter.invoice_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list payments: {}", e)))?;

        Ok(payments)
    }
}
