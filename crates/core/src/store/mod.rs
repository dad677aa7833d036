//! Persistence seam for the engine.
//!
//! Services only talk to an [`AgendaStore`]. Methods whose names end in
//! `_if_free` or that move appointments must perform their overlap check and
//! their write atomically for the `(professional, date)` pairs involved.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    errors::{AgendaError, AgendaResult},
    models::{
        appointment::{Appointment, AppointmentStatus, NewAppointment},
        contract::Contract,
        reminder::PatientContact,
        template::AvailabilityTemplate,
        token::RescheduleToken,
    },
};

pub use memory::MemoryStore;

/// Fails with `NotEligible` when the stored row no longer has the status the
/// caller based its write on.
pub fn ensure_status_unchanged(
    appointment_id: Uuid,
    stored: AppointmentStatus,
    expected: AppointmentStatus,
) -> AgendaResult<()> {
    if stored != expected {
        return Err(AgendaError::NotEligible(format!(
            "appointment {appointment_id} is now {stored}"
        )));
    }
    Ok(())
}

#[async_trait]
pub trait AgendaStore: Send + Sync {
    /// Stored weekday rows for a professional; missing weekdays are absent.
    async fn templates(&self, professional_id: Uuid) -> AgendaResult<Vec<AvailabilityTemplate>>;

    /// Replaces each given weekday's row, leaving other weekdays untouched.
    async fn replace_templates(
        &self,
        professional_id: Uuid,
        templates: &[AvailabilityTemplate],
    ) -> AgendaResult<()>;

    async fn contract(&self, contract_id: Uuid) -> AgendaResult<Option<Contract>>;

    async fn upsert_contract(&self, contract: &Contract) -> AgendaResult<Contract>;

    /// Marks the contract signed and promotes its PRE_SCHEDULED appointments
    /// to SCHEDULED. Returns how many were promoted. A cancelled contract is
    /// `NotEligible` and left untouched.
    async fn mark_signed(&self, contract_id: Uuid, now: DateTime<Utc>) -> AgendaResult<u64>;

    /// Records `end_date` on the contract and moves its non-terminal
    /// appointments dated after it to SERIES_ENDED. Returns the affected ids.
    async fn end_contract(
        &self,
        contract_id: Uuid,
        end_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> AgendaResult<Vec<Uuid>>;

    async fn appointment(&self, appointment_id: Uuid) -> AgendaResult<Option<Appointment>>;

    /// Every appointment of a professional in `[from, to]`, any status,
    /// ordered by date then start.
    async fn appointments_between(
        &self,
        professional_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AgendaResult<Vec<Appointment>>;

    /// Appointments on one date across all professionals, or one if given.
    async fn appointments_on(
        &self,
        date: NaiveDate,
        professional_id: Option<Uuid>,
    ) -> AgendaResult<Vec<Appointment>>;

    /// Inserts unless an occupying appointment overlaps; `None` on collision.
    async fn insert_if_free(
        &self,
        appointment: NewAppointment,
        now: DateTime<Utc>,
    ) -> AgendaResult<Option<Appointment>>;

    /// Writes `updated` over the stored row with the same id unless it would
    /// overlap another occupying appointment; `None` on collision. The stored
    /// row must still have status `expected`, otherwise `NotEligible`.
    async fn update_if_free(
        &self,
        updated: &Appointment,
        expected: AppointmentStatus,
        now: DateTime<Utc>,
    ) -> AgendaResult<Option<Appointment>>;

    async fn insert_token(&self, token: &RescheduleToken) -> AgendaResult<()>;

    async fn token(&self, token: &str) -> AgendaResult<Option<RescheduleToken>>;

    /// Moves the token's appointment to `updated` and consumes the token in one
    /// step. Fails with `NotEligible` if the token was consumed or the stored
    /// status moved away from `expected` meanwhile; `None` on collision.
    async fn move_with_token(
        &self,
        token: &str,
        updated: &Appointment,
        expected: AppointmentStatus,
        now: DateTime<Utc>,
    ) -> AgendaResult<Option<Appointment>>;

    /// Deletes tokens whose expiry is at or before `now`. Returns how many.
    async fn delete_expired_tokens(&self, now: DateTime<Utc>) -> AgendaResult<u64>;

    async fn patient_contact(&self, patient_id: Uuid) -> AgendaResult<Option<PatientContact>>;

    async fn upsert_patient_contact(&self, contact: &PatientContact) -> AgendaResult<()>;
}
