use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    civil,
    errors::{AgendaError, AgendaResult},
    models::{
        appointment::{
            Appointment, AppointmentPatch, AppointmentStatus, BookingOutcome, NewAppointment,
            RejectedRequest, SlotRequest,
        },
        contract::Contract,
        template::WeekTemplate,
    },
    services::{availability::check_range, templates::get_week},
    store::AgendaStore,
};

pub const CONFLICT_REASON: &str = "Conflict";

/// Resolves where a request lands under the week template, or why it cannot.
fn place(week: &WeekTemplate, request: &SlotRequest) -> Result<NaiveTime, String> {
    let template = week.for_date(request.date);
    let window = template
        .bookable_window()
        .ok_or_else(|| format!("{} is not a working day", request.date))?;
    match template.session_end(request.start) {
        Some(end) if window.contains(request.start, end) => Ok(end),
        _ => Err(format!(
            "a session at {} on {} does not fit the working window",
            request.start.format("%H:%M"),
            request.date
        )),
    }
}

/// Books requests against a signed contract. Structural problems reject the
/// whole batch; individual collisions are reported in `rejected`.
pub async fn book(
    store: &dyn AgendaStore,
    professional_id: Uuid,
    contract_id: Uuid,
    requests: &[SlotRequest],
    now: DateTime<Utc>,
) -> AgendaResult<BookingOutcome> {
    let contract = store
        .contract(contract_id)
        .await?
        .ok_or_else(|| AgendaError::NotFound(format!("contract {contract_id}")))?;
    if !contract.is_signed() {
        return Err(AgendaError::Validation(format!(
            "contract {contract_id} is {}, only signed contracts can be booked",
            contract.status
        )));
    }
    if contract.professional_id != professional_id {
        return Err(AgendaError::Validation(format!(
            "contract {contract_id} belongs to another professional"
        )));
    }
    if requests.is_empty() {
        return Err(AgendaError::Validation("no slots requested".to_string()));
    }

    let week = get_week(store, professional_id).await?;
    let placed = requests
        .iter()
        .map(|request| place(&week, request).map(|end| (*request, end)))
        .collect::<Result<Vec<_>, _>>()
        .map_err(AgendaError::Validation)?;

    insert_each(store, &contract, placed, Vec::new(), AppointmentStatus::Scheduled, now).await
}

/// Books requests for a contract with a given initial status. Requests that do
/// not fit the template are rejected one by one instead of failing the batch.
pub async fn book_with_status(
    store: &dyn AgendaStore,
    contract: &Contract,
    requests: &[SlotRequest],
    status: AppointmentStatus,
    now: DateTime<Utc>,
) -> AgendaResult<BookingOutcome> {
    let week = get_week(store, contract.professional_id).await?;
    let mut placed = Vec::with_capacity(requests.len());
    let mut rejected = Vec::new();
    for request in requests {
        match place(&week, request) {
            Ok(end) => placed.push((*request, end)),
            Err(reason) => rejected.push(RejectedRequest {
                date: request.date,
                start: request.start,
                reason,
            }),
        }
    }
    insert_each(store, contract, placed, rejected, status, now).await
}

async fn insert_each(
    store: &dyn AgendaStore,
    contract: &Contract,
    placed: Vec<(SlotRequest, NaiveTime)>,
    mut rejected: Vec<RejectedRequest>,
    status: AppointmentStatus,
    now: DateTime<Utc>,
) -> AgendaResult<BookingOutcome> {
    let mut appointments = Vec::with_capacity(placed.len());
    for (request, end) in placed {
        let new = NewAppointment {
            professional_id: contract.professional_id,
            patient_id: contract.patient_id,
            contract_id: contract.id,
            date: request.date,
            start: request.start,
            end,
            status,
            notes: None,
        };
        match store.insert_if_free(new, now).await? {
            Some(appointment) => appointments.push(appointment),
            None => {
                debug!(
                    "Slot taken: professional_id={}, date={}, start={}",
                    contract.professional_id, request.date, request.start
                );
                rejected.push(RejectedRequest {
                    date: request.date,
                    start: request.start,
                    reason: CONFLICT_REASON.to_string(),
                });
            }
        }
    }

    info!(
        "Booked {} appointments for contract_id={} ({} rejected)",
        appointments.len(),
        contract.id,
        rejected.len()
    );
    Ok(BookingOutcome {
        created: appointments.len() as u32,
        appointments,
        rejected,
    })
}

/// Applies a manual edit. Moving an appointment re-checks overlap against all
/// other appointments of the professional.
pub async fn edit(
    store: &dyn AgendaStore,
    appointment_id: Uuid,
    patch: AppointmentPatch,
    now: DateTime<Utc>,
) -> AgendaResult<Appointment> {
    let current = store
        .appointment(appointment_id)
        .await?
        .ok_or_else(|| AgendaError::NotFound(format!("appointment {appointment_id}")))?;

    if current.status.is_terminal() && patch.moves_slot() {
        return Err(AgendaError::NotEligible(format!(
            "appointment is {} and can no longer be moved",
            current.status
        )));
    }
    let status = match patch.status {
        Some(next) => {
            current.status.check_manual_transition(next)?;
            next
        }
        None => current.status,
    };

    let date = patch.date.unwrap_or(current.date);
    let start = patch.start.unwrap_or(current.start);
    let end = match patch.end {
        Some(end) => end,
        None if patch.start.is_some() => {
            let minutes = u32::try_from(current.duration_minutes()).unwrap_or(0);
            civil::add_minutes(start, minutes).ok_or_else(|| {
                AgendaError::Validation("appointment would run past midnight".to_string())
            })?
        }
        None => current.end,
    };
    if start >= end {
        return Err(AgendaError::Validation(
            "appointment start must be before its end".to_string(),
        ));
    }

    let updated = Appointment {
        date,
        start,
        end,
        status,
        notes: patch.notes.or_else(|| current.notes.clone()),
        ..current.clone()
    };
    let saved = store
        .update_if_free(&updated, current.status, now)
        .await?
        .ok_or_else(|| overlap_error(&updated))?;

    if saved.status != current.status {
        info!(
            "Appointment {} status {} -> {}",
            saved.id, current.status, saved.status
        );
    }
    Ok(saved)
}

pub async fn cancel(
    store: &dyn AgendaStore,
    appointment_id: Uuid,
    now: DateTime<Utc>,
) -> AgendaResult<Appointment> {
    let patch = AppointmentPatch {
        status: Some(AppointmentStatus::Cancelled),
        ..AppointmentPatch::default()
    };
    edit(store, appointment_id, patch, now).await
}

pub async fn list_appointments(
    store: &dyn AgendaStore,
    professional_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
    include_inactive: bool,
) -> AgendaResult<Vec<Appointment>> {
    check_range(from, to, None)?;
    let mut appointments = store.appointments_between(professional_id, from, to).await?;
    if !include_inactive {
        appointments.retain(|appointment| appointment.status.is_active());
    }
    Ok(appointments)
}

pub(crate) fn overlap_error(appointment: &Appointment) -> AgendaError {
    AgendaError::Conflict(format!(
        "{} {}-{} overlaps another appointment",
        appointment.date,
        appointment.start.format("%H:%M"),
        appointment.end.format("%H:%M")
    ))
}
