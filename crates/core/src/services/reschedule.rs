//! Tokenized self-service confirm/move flow for end clients.

use chrono::{Duration, NaiveDate};
use tracing::info;
use uuid::Uuid;

use crate::{
    civil::Moment,
    errors::{AgendaError, AgendaResult},
    models::{
        appointment::{Appointment, AppointmentStatus},
        slot::Slot,
        token::{IssueTokenResponse, MoveRequest, RescheduleToken, RescheduleView, generate_token},
    },
    services::{booking::overlap_error, templates::get_week},
    slots::{generate_slots, is_offered, slots_between},
    store::AgendaStore,
};

pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 14;
pub const DEFAULT_WINDOW_DAYS: i64 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RescheduleSettings {
    pub token_ttl_days: i64,
    /// Move targets run from tomorrow through tomorrow plus this many days.
    pub window_days: i64,
}

impl Default for RescheduleSettings {
    fn default() -> Self {
        Self {
            token_ttl_days: DEFAULT_TOKEN_TTL_DAYS,
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }
}

impl RescheduleSettings {
    pub fn window(&self, now: &Moment) -> (NaiveDate, NaiveDate) {
        let from = now.tomorrow();
        (from, from + Duration::days(self.window_days.max(0)))
    }
}

fn ensure_reschedulable(appointment: &Appointment, now: &Moment) -> AgendaResult<()> {
    if !appointment.status.is_reschedulable() {
        return Err(AgendaError::NotEligible(format!(
            "appointment is {}",
            appointment.status
        )));
    }
    if !now.is_before(appointment.date, appointment.start) {
        return Err(AgendaError::NotEligible(
            "appointment has already started".to_string(),
        ));
    }
    Ok(())
}

async fn load_appointment(store: &dyn AgendaStore, appointment_id: Uuid) -> AgendaResult<Appointment> {
    store
        .appointment(appointment_id)
        .await?
        .ok_or_else(|| AgendaError::NotFound(format!("appointment {appointment_id}")))
}

/// Looks up a live token and the appointment behind it.
async fn redeem(
    store: &dyn AgendaStore,
    token: &str,
    now: &Moment,
) -> AgendaResult<(RescheduleToken, Appointment)> {
    let stored = store
        .token(token)
        .await?
        .ok_or_else(|| AgendaError::NotFound("reschedule link".to_string()))?;
    if stored.is_expired(now.utc) {
        return Err(AgendaError::Expired(format!(
            "reschedule link expired at {}",
            stored.expires_at
        )));
    }
    let appointment = load_appointment(store, stored.appointment_id).await?;
    Ok((stored, appointment))
}

/// Creates and stores a token without checking eligibility.
pub(crate) async fn mint(
    store: &dyn AgendaStore,
    settings: &RescheduleSettings,
    appointment_id: Uuid,
    now: &Moment,
) -> AgendaResult<RescheduleToken> {
    let token = RescheduleToken {
        token: generate_token(),
        appointment_id,
        issued_at: now.utc,
        expires_at: now.utc + Duration::days(settings.token_ttl_days),
        consumed_at: None,
    };
    store.insert_token(&token).await?;
    Ok(token)
}

pub async fn issue(
    store: &dyn AgendaStore,
    settings: &RescheduleSettings,
    appointment_id: Uuid,
    now: &Moment,
) -> AgendaResult<IssueTokenResponse> {
    let appointment = load_appointment(store, appointment_id).await?;
    ensure_reschedulable(&appointment, now)?;

    let token = mint(store, settings, appointment_id, now).await?;
    info!(
        "Reschedule token issued: appointment_id={}, expires_at={}",
        appointment_id, token.expires_at
    );
    Ok(IssueTokenResponse {
        token: token.token,
        appointment_id,
        expires_at: token.expires_at,
    })
}

pub async fn resolve(
    store: &dyn AgendaStore,
    settings: &RescheduleSettings,
    token: &str,
    now: &Moment,
) -> AgendaResult<RescheduleView> {
    let (stored, appointment) = redeem(store, token, now).await?;
    ensure_reschedulable(&appointment, now)?;

    let can_move = !stored.is_consumed();
    let candidate_slots = if can_move {
        candidates(store, settings, &appointment, now).await?
    } else {
        Vec::new()
    };
    Ok(RescheduleView {
        appointment: (&appointment).into(),
        expires_at: stored.expires_at,
        can_move,
        candidate_slots,
    })
}

async fn candidates(
    store: &dyn AgendaStore,
    settings: &RescheduleSettings,
    appointment: &Appointment,
    now: &Moment,
) -> AgendaResult<Vec<Slot>> {
    let (from, to) = settings.window(now);
    let week = get_week(store, appointment.professional_id).await?;
    let booked = store
        .appointments_between(appointment.professional_id, from, to)
        .await?;
    Ok(slots_between(&week, from, to, &booked, Some(appointment.id)))
}

/// SCHEDULED becomes CONFIRMED; confirming twice is a no-op.
pub async fn confirm(
    store: &dyn AgendaStore,
    token: &str,
    now: &Moment,
) -> AgendaResult<Appointment> {
    let (_, appointment) = redeem(store, token, now).await?;
    match appointment.status {
        AppointmentStatus::Confirmed => return Ok(appointment),
        AppointmentStatus::Scheduled => {}
        other => {
            return Err(AgendaError::NotEligible(format!(
                "only scheduled appointments can be confirmed, this one is {other}"
            )));
        }
    }
    ensure_reschedulable(&appointment, now)?;

    let updated = Appointment {
        status: AppointmentStatus::Confirmed,
        ..appointment
    };
    let saved = store
        .update_if_free(&updated, AppointmentStatus::Scheduled, now.utc)
        .await?
        .ok_or_else(|| overlap_error(&updated))?;
    info!("Appointment {} confirmed by client", saved.id);
    Ok(saved)
}

/// Moves the appointment to an offered slot inside the window. The token is
/// consumed by a successful move.
pub async fn move_appointment(
    store: &dyn AgendaStore,
    settings: &RescheduleSettings,
    token: &str,
    request: MoveRequest,
    now: &Moment,
) -> AgendaResult<Appointment> {
    let (stored, appointment) = redeem(store, token, now).await?;
    if stored.is_consumed() {
        return Err(AgendaError::NotEligible(
            "this link has already been used to move the appointment".to_string(),
        ));
    }
    ensure_reschedulable(&appointment, now)?;

    let (from, to) = settings.window(now);
    if request.date < from || request.date > to {
        return Err(AgendaError::Validation(format!(
            "new date must be between {from} and {to}"
        )));
    }

    let week = get_week(store, appointment.professional_id).await?;
    let template = week.for_date(request.date);
    let on_grid = generate_slots(template, request.date, &[]).any(|slot| slot.start == request.start);
    if !on_grid {
        return Err(AgendaError::Validation(format!(
            "{} {} is not a bookable slot",
            request.date,
            request.start.format("%H:%M")
        )));
    }
    let booked = store
        .appointments_between(appointment.professional_id, request.date, request.date)
        .await?;
    if !is_offered(template, request.date, request.start, &booked, Some(appointment.id)) {
        return Err(AgendaError::Conflict(format!(
            "{} {} is no longer available",
            request.date,
            request.start.format("%H:%M")
        )));
    }
    let end = template.session_end(request.start).ok_or_else(|| {
        AgendaError::Validation("session would run past midnight".to_string())
    })?;

    let previous = (appointment.date, appointment.start);
    let read_status = appointment.status;
    let updated = Appointment {
        date: request.date,
        start: request.start,
        end,
        status: AppointmentStatus::Scheduled,
        ..appointment
    };
    let moved = store
        .move_with_token(token, &updated, read_status, now.utc)
        .await?
        .ok_or_else(|| overlap_error(&updated))?;
    info!(
        "Appointment {} moved by client from {} {} to {} {}",
        moved.id, previous.0, previous.1, moved.date, moved.start
    );
    Ok(moved)
}
