use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    civil::Moment,
    errors::AgendaResult,
    models::{
        appointment::AppointmentStatus,
        reminder::{DispatchSummary, ReminderRequest},
    },
    services::reschedule::{RescheduleSettings, mint},
    store::AgendaStore,
};

/// Transport for reminders. Implementations deliver one request or fail.
#[async_trait]
pub trait ReminderSender: Send + Sync {
    async fn send(&self, reminder: &ReminderRequest) -> eyre::Result<()>;
}

fn wants_reminder(status: AppointmentStatus) -> bool {
    matches!(status, AppointmentStatus::Scheduled | AppointmentStatus::Confirmed)
}

/// Sends one reminder per SCHEDULED or CONFIRMED appointment dated the day
/// after `as_of`. Send failures are logged and counted as skipped; nothing is
/// retried or rolled back. Expired reschedule tokens are purged first.
pub async fn dispatch(
    store: &dyn AgendaStore,
    sender: &dyn ReminderSender,
    settings: &RescheduleSettings,
    as_of: NaiveDate,
    professional_id: Option<Uuid>,
    now: &Moment,
) -> AgendaResult<DispatchSummary> {
    let purged = store.delete_expired_tokens(now.utc).await?;
    if purged > 0 {
        debug!("Purged {} expired reschedule tokens", purged);
    }

    let target = as_of + Duration::days(1);
    let appointments = store.appointments_on(target, professional_id).await?;
    let mut summary = DispatchSummary::default();

    for appointment in appointments.into_iter().filter(|a| wants_reminder(a.status)) {
        let phone = match store.patient_contact(appointment.patient_id).await? {
            Some(contact) => contact.reachable_phone().map(str::to_string),
            None => None,
        };
        let Some(phone) = phone else {
            warn!(
                "No phone on file for patient_id={}, skipping reminder for appointment {}",
                appointment.patient_id, appointment.id
            );
            summary.skipped += 1;
            continue;
        };

        let reschedule_token = match mint(store, settings, appointment.id, now).await {
            Ok(token) => Some(token.token),
            Err(err) => {
                warn!("Could not issue reschedule token for appointment {}: {}", appointment.id, err);
                None
            }
        };
        let reminder = ReminderRequest {
            appointment_id: appointment.id,
            professional_id: appointment.professional_id,
            patient_id: appointment.patient_id,
            phone,
            date: appointment.date,
            start: appointment.start,
            reschedule_token,
        };

        match sender.send(&reminder).await {
            Ok(()) => summary.sent += 1,
            Err(err) => {
                warn!("Reminder for appointment {} failed: {:?}", appointment.id, err);
                summary.skipped += 1;
            }
        }
    }

    info!(
        "Reminder sweep for {}: sent={}, skipped={}",
        target, summary.sent, summary.skipped
    );
    Ok(summary)
}
