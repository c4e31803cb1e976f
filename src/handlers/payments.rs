use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::error::AppError;
use crate::middleware::RequestId;
use crate::models::{CreatePayment, ListPaymentsQuery};
use crate::AppState;

/// Accept a payment against an invoice.
///
/// 201 on success; 404 unknown invoice; 400 void invoice; 409 duplicate
/// reference or overpayment under the default policy; 422 malformed input.
#[axum::debug_handler]
pub async fn create_payment(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    Json(payload): Json<CreatePayment>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate_payload()
        .map_err(|errors| AppError::RequestValidation { errors, request_id })?;

    let payment = state
        .db
        .accept_payment(&payload, state.config.payments)
        .await?;

    Ok((StatusCode::CREATED, Json(payment)))
}

#[axum::debug_handler]
pub async fn get_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let payment = state
        .db
        .get_payment(payment_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Payment not found")))?;

    Ok(Json(payment))
}

#[axum::debug_handler]
pub async fn list_payments(
    State(state): State<AppState>,
    Query(filter): Query<ListPaymentsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let payments = state.db.list_payments(&filter).await?;
    Ok(Json(payments))
}
