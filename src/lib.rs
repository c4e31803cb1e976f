//! billing-api: back-office billing service for customers, properties,
//! invoices, and payments.
//!
//! The core behavior is the payment acceptance workflow: one transactional
//! operation that validates an incoming payment against invoice state,
//! persists it under store constraints, recomputes the paid total with exact
//! decimal arithmetic, and transitions the invoice status.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod services;

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Settings;
use crate::services::Database;

#[derive(Clone)]
pub struct AppState {
    pub config: Settings,
    pub db: Database,
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/customers",
            post(handlers::customers::create_customer).get(handlers::customers::list_customers),
        )
        .route(
            "/customers/:customer_id",
            get(handlers::customers::get_customer),
        )
        .route(
            "/properties",
            post(handlers::properties::create_property).get(handlers::properties::list_properties),
        )
        .route(
            "/properties/:property_id",
            get(handlers::properties::get_property),
        )
        .route(
            "/invoices",
            post(handlers::invoices::create_invoice).get(handlers::invoices::list_invoices),
        )
        .route("/invoices/:invoice_id", get(handlers::invoices::get_invoice))
        .route(
            "/payments",
            post(handlers::payments::create_payment).get(handlers::payments::list_payments),
        )
        .route("/payments/:payment_id", get(handlers::payments::get_payment));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/api/v1", api)
        .layer(from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
