use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::error::AppError;
use crate::middleware::RequestId;
use crate::models::CreateProperty;
use crate::AppState;

#[axum::debug_handler]
pub async fn create_property(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    Json(payload): Json<CreateProperty>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|errors| AppError::RequestValidation { errors, request_id })?;

    let property = state.db.create_property(&payload).await?;

    Ok((StatusCode::CREATED, Json(property)))
}

#[axum::debug_handler]
pub async fn get_property(
    State(state): State<AppState>,
    Path(property_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let property = state
        .db
        .get_property(property_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Property not found")))?;

    Ok(Json(property))
}

#[axum::debug_handler]
pub async fn list_properties(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let properties = state.db.list_properties().await?;
    Ok(Json(properties))
}
