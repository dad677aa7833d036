use std::sync::Arc;

use agenda_core::{
    models::{
        appointment::Appointment,
        token::{MoveRequest, RescheduleView},
    },
    services::reschedule,
};
use axum::{
    Json,
    extract::{Path, State},
};

use crate::{ApiState, middleware::error_handling::AppError};

#[axum::debug_handler]
pub async fn resolve(
    State(state): State<Arc<ApiState>>,
    Path(token): Path<String>,
) -> Result<Json<RescheduleView>, AppError> {
    let view = reschedule::resolve(state.store.as_ref(), &state.reschedule, &token, &state.now()).await?;
    Ok(Json(view))
}

#[axum::debug_handler]
pub async fn confirm(
    State(state): State<Arc<ApiState>>,
    Path(token): Path<String>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = reschedule::confirm(state.store.as_ref(), &token, &state.now()).await?;
    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn move_appointment(
    State(state): State<Arc<ApiState>>,
    Path(token): Path<String>,
    Json(payload): Json<MoveRequest>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = reschedule::move_appointment(
        state.store.as_ref(),
        &state.reschedule,
        &token,
        payload,
        &state.now(),
    )
    .await?;
    Ok(Json(appointment))
}
