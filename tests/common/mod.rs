//! Shared harness for integration tests.
//!
//! These tests drive the real router against a live Postgres; set
//! `DATABASE_URL` and run with `cargo test -- --ignored`.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use billing_api::config::{DatabaseSettings, PaymentPolicy, Settings};
use billing_api::services::Database;
use billing_api::{build_router, AppState};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;
use uuid::Uuid;

pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_policy(PaymentPolicy {
            allow_overpayment: false,
        })
        .await
    }

    pub async fn spawn_with_policy(payments: PaymentPolicy) -> Self {
        let url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set for integration tests");

        let db = Database::new(&url, 5, 1)
            .await
            .expect("Failed to connect to Postgres");
        db.run_migrations().await.expect("Failed to run migrations");

        let config = Settings {
            port: 0,
            service_name: "billing-api-test".to_string(),
            log_level: "info".to_string(),
            database: DatabaseSettings {
                url,
                max_connections: 5,
                min_connections: 1,
            },
            payments,
        };

        TestApp {
            router: build_router(AppState { config, db }),
        }
    }

    pub async fn post_json(&self, path: &str, body: Value) -> (StatusCode, HeaderMap, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("Failed to build request");
        self.send(request).await
    }

    pub async fn get(&self, path: &str) -> (StatusCode, HeaderMap, Value) {
        let request = Request::builder()
            .uri(path)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Response body was not JSON")
        };

        (status, headers, body)
    }
}

pub fn has_request_id(headers: &HeaderMap) -> bool {
    headers.contains_key("x-request-id")
}

/// Unique payment reference so reruns never collide on the store constraint.
pub fn unique_ref(prefix: &str) -> String {
    format!("{}-{}", prefix, &Uuid::new_v4().simple().to_string()[..12])
}

pub async fn create_customer(app: &TestApp) -> i64 {
    let (status, _, body) = app
        .post_json(
            "/api/v1/customers",
            json!({ "first_name": "Test", "last_name": unique_ref("User") }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "customer create failed: {body}");
    body["customer_id"].as_i64().expect("customer_id")
}

pub async fn create_property(app: &TestApp, customer_id: i64) -> i64 {
    let (status, _, body) = app
        .post_json(
            "/api/v1/properties",
            json!({
                "customer_id": customer_id,
                "label": "Test Property",
                "address1": "123 Test St",
                "address2": null,
                "city": "Test City",
                "state": "PR",
                "postal_code": "00601",
                "notes": null,
                "is_active": true
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "property create failed: {body}");
    body["property_id"].as_i64().expect("property_id")
}

pub async fn create_invoice(app: &TestApp, status_str: &str, total: &str) -> i64 {
    let customer_id = create_customer(app).await;
    let property_id = create_property(app, customer_id).await;

    let (status, _, body) = app
        .post_json(
            "/api/v1/invoices",
            json!({
                "customer_id": customer_id,
                "property_id": property_id,
                "period_start": "2026-01-01",
                "period_end": "2026-01-31",
                "issued_date": "2026-01-31",
                "due_date": "2026-02-10",
                "subtotal": "27.00",
                "tax": "3.00",
                "total": total,
                "status": status_str,
                "notes": "test invoice"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "invoice create failed: {body}");
    body["invoice_id"].as_i64().expect("invoice_id")
}

pub async fn invoice_status(app: &TestApp, invoice_id: i64) -> String {
    let (status, _, body) = app.get(&format!("/api/v1/invoices/{invoice_id}")).await;
    assert_eq!(status, StatusCode::OK, "invoice fetch failed: {body}");
    body["status"].as_str().expect("status").to_string()
}
