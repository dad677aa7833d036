use std::sync::Arc;

use agenda_core::{
    models::template::{CopyTemplateDayRequest, PutTemplatesRequest, WeekTemplate},
    services::templates,
};
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{ApiState, middleware::error_handling::AppError};

#[axum::debug_handler]
pub async fn get_templates(
    State(state): State<Arc<ApiState>>,
    Path(professional_id): Path<Uuid>,
) -> Result<Json<WeekTemplate>, AppError> {
    let week = templates::get_week(state.store.as_ref(), professional_id).await?;
    Ok(Json(week))
}

#[axum::debug_handler]
pub async fn put_templates(
    State(state): State<Arc<ApiState>>,
    Path(professional_id): Path<Uuid>,
    Json(payload): Json<PutTemplatesRequest>,
) -> Result<Json<WeekTemplate>, AppError> {
    let week = templates::put_week(state.store.as_ref(), professional_id, payload.days).await?;
    Ok(Json(week))
}

#[axum::debug_handler]
pub async fn copy_template_day(
    State(state): State<Arc<ApiState>>,
    Path(professional_id): Path<Uuid>,
    Json(payload): Json<CopyTemplateDayRequest>,
) -> Result<Json<WeekTemplate>, AppError> {
    let week = templates::copy_day(
        state.store.as_ref(),
        professional_id,
        payload.from_day,
        payload.to_day,
    )
    .await?;
    Ok(Json(week))
}
