use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

use crate::{
    errors::{AgendaError, AgendaResult},
    models::{
        appointment::{AppointmentStatus, BookingOutcome},
        contract::{
            ActivateContractRequest, Contract, ContractStatus, EndContractResponse,
            SignContractResponse, UpsertContractRequest,
        },
    },
    recurrence,
    services::booking::book_with_status,
    store::AgendaStore,
};

async fn load(store: &dyn AgendaStore, contract_id: Uuid) -> AgendaResult<Contract> {
    store
        .contract(contract_id)
        .await?
        .ok_or_else(|| AgendaError::NotFound(format!("contract {contract_id}")))
}

/// Mirrors a contract owned by the surrounding product.
pub async fn upsert(
    store: &dyn AgendaStore,
    contract_id: Uuid,
    request: UpsertContractRequest,
) -> AgendaResult<Contract> {
    let contract = request.into_contract(contract_id);
    contract.validate()?;
    let saved = store.upsert_contract(&contract).await?;
    info!("Contract synced: id={}, status={}", saved.id, saved.status);
    Ok(saved)
}

/// Expands the contract's weekly rules and books the result. A pending
/// contract gets PRE_SCHEDULED appointments, a signed one SCHEDULED.
pub async fn activate(
    store: &dyn AgendaStore,
    contract_id: Uuid,
    request: ActivateContractRequest,
    now: DateTime<Utc>,
) -> AgendaResult<BookingOutcome> {
    let contract = load(store, contract_id).await?;
    let status = match contract.status {
        ContractStatus::Pending => AppointmentStatus::PreScheduled,
        ContractStatus::Signed => AppointmentStatus::Scheduled,
        ContractStatus::Cancelled => {
            return Err(AgendaError::NotEligible(format!(
                "contract {contract_id} is cancelled"
            )));
        }
    };

    let from = request.from.unwrap_or(contract.start_date);
    let to = request.to.or(contract.end_date);
    let count = request.count.or(contract.num_appointments);
    if to.is_some_and(|to| to < from) {
        return Err(AgendaError::Validation(
            "activation range ends before it starts".to_string(),
        ));
    }

    let requests = recurrence::expand(&contract.schedule_rules, from, to, count);
    info!(
        "Activating contract {}: {} occurrences as {}",
        contract_id,
        requests.len(),
        status
    );
    book_with_status(store, &contract, &requests, status, now).await
}

pub async fn mark_signed(
    store: &dyn AgendaStore,
    contract_id: Uuid,
    now: DateTime<Utc>,
) -> AgendaResult<SignContractResponse> {
    let promoted = store.mark_signed(contract_id, now).await?;
    info!("Contract {} signed, {} appointments promoted", contract_id, promoted);
    Ok(SignContractResponse {
        contract_id,
        promoted,
    })
}

/// Ends a signed contract. `end_date` is the last day of service: every
/// non-terminal appointment after it becomes SERIES_ENDED.
pub async fn end(
    store: &dyn AgendaStore,
    contract_id: Uuid,
    end_date: NaiveDate,
    now: DateTime<Utc>,
) -> AgendaResult<EndContractResponse> {
    let contract = load(store, contract_id).await?;
    if !contract.is_signed() {
        return Err(AgendaError::NotEligible(format!(
            "only signed contracts can be ended, contract {contract_id} is {}",
            contract.status
        )));
    }
    if end_date < contract.start_date {
        return Err(AgendaError::Validation(
            "end date is before the contract start date".to_string(),
        ));
    }

    let ended = store.end_contract(contract_id, end_date, now).await?;
    info!(
        "Contract {} ended on {}: {} appointments marked SERIES_ENDED",
        contract_id,
        end_date,
        ended.len()
    );
    Ok(EndContractResponse {
        contract_id,
        end_date,
        ended,
    })
}
