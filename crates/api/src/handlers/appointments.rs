use std::sync::Arc;

use agenda_core::{
    models::{
        appointment::{
            Appointment, AppointmentPatch, BookingOutcome, CreateAppointmentsRequest,
            ListAppointmentsResponse,
        },
        token::IssueTokenResponse,
    },
    services::{booking, reschedule},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ApiState, handlers::RangeQuery, middleware::error_handling::AppError};

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<ApiState>>,
    Path(professional_id): Path<Uuid>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<ListAppointmentsResponse>, AppError> {
    let appointments = booking::list_appointments(
        state.store.as_ref(),
        professional_id,
        range.from,
        range.to,
        range.include_inactive,
    )
    .await?;
    Ok(Json(ListAppointmentsResponse { appointments }))
}

/// Best-effort batch booking; conflicts come back in `rejected`.
#[axum::debug_handler]
pub async fn create_appointments(
    State(state): State<Arc<ApiState>>,
    Path(professional_id): Path<Uuid>,
    Json(payload): Json<CreateAppointmentsRequest>,
) -> Result<(StatusCode, Json<BookingOutcome>), AppError> {
    let outcome = booking::book(
        state.store.as_ref(),
        professional_id,
        payload.contract_id,
        &payload.slots,
        Utc::now(),
    )
    .await?;

    let status = if outcome.created > 0 {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome)))
}

#[axum::debug_handler]
pub async fn patch_appointment(
    State(state): State<Arc<ApiState>>,
    Path(appointment_id): Path<Uuid>,
    Json(patch): Json<AppointmentPatch>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = booking::edit(state.store.as_ref(), appointment_id, patch, Utc::now()).await?;
    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<ApiState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = booking::cancel(state.store.as_ref(), appointment_id, Utc::now()).await?;
    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn issue_reschedule_token(
    State(state): State<Arc<ApiState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<(StatusCode, Json<IssueTokenResponse>), AppError> {
    let issued = reschedule::issue(
        state.store.as_ref(),
        &state.reschedule,
        appointment_id,
        &state.now(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(issued)))
}
