use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::error::AppError;
use crate::middleware::RequestId;
use crate::models::{CreateInvoice, ListInvoicesQuery};
use crate::AppState;

#[axum::debug_handler]
pub async fn create_invoice(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    Json(payload): Json<CreateInvoice>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate_payload()
        .map_err(|errors| AppError::RequestValidation { errors, request_id })?;

    let invoice = state.db.create_invoice(&payload).await?;

    Ok((StatusCode::CREATED, Json(invoice)))
}

#[axum::debug_handler]
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let invoice = state
        .db
        .get_invoice(invoice_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice not found")))?;

    Ok(Json(invoice))
}

#[axum::debug_handler]
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(filter): Query<ListInvoicesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let invoices = state.db.list_invoices(&filter).await?;
    Ok(Json(invoices))
}
