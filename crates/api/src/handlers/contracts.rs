use std::sync::Arc;

use agenda_core::{
    models::{
        appointment::BookingOutcome,
        contract::{
            ActivateContractRequest, Contract, EndContractRequest, EndContractResponse,
            SignContractResponse, UpsertContractRequest,
        },
    },
    services::contracts,
};
use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ApiState, middleware::error_handling::AppError};

#[axum::debug_handler]
pub async fn upsert_contract(
    State(state): State<Arc<ApiState>>,
    Path(contract_id): Path<Uuid>,
    Json(payload): Json<UpsertContractRequest>,
) -> Result<Json<Contract>, AppError> {
    let contract = contracts::upsert(state.store.as_ref(), contract_id, payload).await?;
    Ok(Json(contract))
}

/// Body is optional; without one the contract's own dates and count apply.
#[axum::debug_handler]
pub async fn activate_contract(
    State(state): State<Arc<ApiState>>,
    Path(contract_id): Path<Uuid>,
    payload: Option<Json<ActivateContractRequest>>,
) -> Result<Json<BookingOutcome>, AppError> {
    let request = payload.map(|Json(request)| request).unwrap_or_default();
    let outcome = contracts::activate(state.store.as_ref(), contract_id, request, Utc::now()).await?;
    Ok(Json(outcome))
}

#[axum::debug_handler]
pub async fn sign_contract(
    State(state): State<Arc<ApiState>>,
    Path(contract_id): Path<Uuid>,
) -> Result<Json<SignContractResponse>, AppError> {
    let signed = contracts::mark_signed(state.store.as_ref(), contract_id, Utc::now()).await?;
    Ok(Json(signed))
}

#[axum::debug_handler]
pub async fn end_contract(
    State(state): State<Arc<ApiState>>,
    Path(contract_id): Path<Uuid>,
    Json(payload): Json<EndContractRequest>,
) -> Result<Json<EndContractResponse>, AppError> {
    let ended = contracts::end(state.store.as_ref(), contract_id, payload.end_date, Utc::now()).await?;
    Ok(Json(ended))
}
