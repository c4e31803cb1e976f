use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::error::AppError;
use crate::middleware::RequestId;
use crate::models::CreateCustomer;
use crate::AppState;

#[axum::debug_handler]
pub async fn create_customer(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    Json(payload): Json<CreateCustomer>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|errors| AppError::RequestValidation { errors, request_id })?;

    let customer = state.db.create_customer(&payload).await?;

    Ok((StatusCode::CREATED, Json(customer)))
}

#[axum::debug_handler]
pub async fn get_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let customer = state
        .db
        .get_customer(customer_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Customer not found")))?;

    Ok(Json(customer))
}

#[axum::debug_handler]
pub async fn list_customers(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let customers = state.db.list_customers().await?;
    Ok(Json(customers))
}
