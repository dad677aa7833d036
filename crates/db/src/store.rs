//! Postgres implementation of [`AgendaStore`].
//!
//! Every write that must not double-book runs in its own transaction and
//! takes a transaction-scoped advisory lock per `(professional, date)` before
//! checking for overlaps.

use agenda_core::{
    errors::{AgendaError, AgendaResult},
    models::{
        appointment::{Appointment, AppointmentStatus, NewAppointment},
        contract::{Contract, ContractStatus},
        reminder::PatientContact,
        template::AvailabilityTemplate,
        token::RescheduleToken,
    },
    store::{AgendaStore, ensure_status_unchanged},
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use eyre::WrapErr;
use sqlx::{PgConnection, Pool, Postgres};
use uuid::Uuid;

use crate::{
    models::into_appointments,
    repositories::{appointments, contacts, contracts, templates, tokens},
};

#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}

/// Locks every day `updated` touches, old and new, in a fixed order.
async fn lock_days(conn: &mut PgConnection, previous: &Appointment, updated: &Appointment) -> eyre::Result<()> {
    let mut days = vec![(previous.professional_id, previous.date), (updated.professional_id, updated.date)];
    days.sort();
    days.dedup();
    for (professional_id, date) in days {
        appointments::lock_day(&mut *conn, professional_id, date).await?;
    }
    Ok(())
}

/// Overlap check plus update; the caller holds the day locks.
async fn write_if_free(
    conn: &mut PgConnection,
    updated: &Appointment,
    now: DateTime<Utc>,
) -> AgendaResult<Option<Appointment>> {
    if updated.status.is_occupying() {
        let clash = appointments::find_overlap(
            &mut *conn,
            updated.professional_id,
            updated.date,
            updated.start,
            updated.end,
            Some(updated.id),
        )
        .await?;
        if clash.is_some() {
            return Ok(None);
        }
    }
    let row = appointments::update_appointment(&mut *conn, updated, now)
        .await?
        .ok_or_else(|| AgendaError::NotFound(format!("appointment {}", updated.id)))?;
    Ok(Some(Appointment::try_from(row)?))
}

/// Row-locks the stored appointment and checks it still has `expected` status.
async fn lock_current(
    conn: &mut PgConnection,
    id: Uuid,
    expected: AppointmentStatus,
) -> AgendaResult<Appointment> {
    let row = appointments::lock_appointment(&mut *conn, id)
        .await?
        .ok_or_else(|| AgendaError::NotFound(format!("appointment {id}")))?;
    let current = Appointment::try_from(row)?;
    ensure_status_unchanged(id, current.status, expected)?;
    Ok(current)
}

#[async_trait]
impl AgendaStore for PgStore {
    async fn templates(&self, professional_id: Uuid) -> AgendaResult<Vec<AvailabilityTemplate>> {
        let rows = templates::list_for_professional(&self.pool, professional_id).await?;
        let templates = rows
            .into_iter()
            .map(AvailabilityTemplate::try_from)
            .collect::<eyre::Result<Vec<_>>>()?;
        Ok(templates)
    }

    async fn replace_templates(
        &self,
        professional_id: Uuid,
        days: &[AvailabilityTemplate],
    ) -> AgendaResult<()> {
        let mut tx = self.pool.begin().await.wrap_err("failed to open transaction")?;
        for template in days {
            templates::upsert(&mut *tx, professional_id, template).await?;
        }
        tx.commit().await.wrap_err("failed to save templates")?;
        Ok(())
    }

    async fn contract(&self, contract_id: Uuid) -> AgendaResult<Option<Contract>> {
        let Some(row) = contracts::get_contract_by_id(&self.pool, contract_id).await? else {
            return Ok(None);
        };
        let rules = contracts::get_schedule_rules(&self.pool, contract_id).await?;
        Ok(Some(row.into_contract(rules)?))
    }

    async fn upsert_contract(&self, contract: &Contract) -> AgendaResult<Contract> {
        let mut tx = self.pool.begin().await.wrap_err("failed to open transaction")?;
        let row = contracts::upsert_contract(&mut *tx, contract).await?;
        contracts::delete_schedule_rules(&mut *tx, contract.id).await?;
        for rule in &contract.schedule_rules {
            contracts::insert_schedule_rule(&mut *tx, contract.id, rule).await?;
        }
        let rules = contracts::get_schedule_rules(&mut *tx, contract.id).await?;
        tx.commit().await.wrap_err("failed to save contract")?;
        Ok(row.into_contract(rules)?)
    }

    async fn mark_signed(&self, contract_id: Uuid, now: DateTime<Utc>) -> AgendaResult<u64> {
        let mut tx = self.pool.begin().await.wrap_err("failed to open transaction")?;
        let locked = contracts::lock_contract(&mut *tx, contract_id)
            .await?
            .ok_or_else(|| AgendaError::NotFound(format!("contract {contract_id}")))?;
        if locked.status.parse::<ContractStatus>()? == ContractStatus::Cancelled {
            return Err(AgendaError::NotEligible(format!("contract {contract_id} is cancelled")));
        }
        contracts::set_status(&mut *tx, contract_id, ContractStatus::Signed).await?;
        let promoted = appointments::promote_pre_scheduled(&mut *tx, contract_id, now).await?;
        tx.commit().await.wrap_err("failed to sign contract")?;
        Ok(promoted)
    }

    async fn end_contract(
        &self,
        contract_id: Uuid,
        end_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> AgendaResult<Vec<Uuid>> {
        let mut tx = self.pool.begin().await.wrap_err("failed to open transaction")?;
        if contracts::lock_contract(&mut *tx, contract_id).await?.is_none() {
            return Err(AgendaError::NotFound(format!("contract {contract_id}")));
        }
        contracts::set_end_date(&mut *tx, contract_id, end_date).await?;
        let ended = appointments::end_series_after(&mut *tx, contract_id, end_date, now).await?;
        tx.commit().await.wrap_err("failed to end contract")?;
        Ok(ended)
    }

    async fn appointment(&self, appointment_id: Uuid) -> AgendaResult<Option<Appointment>> {
        let row = appointments::get_appointment_by_id(&self.pool, appointment_id).await?;
        Ok(row.map(Appointment::try_from).transpose()?)
    }

    async fn appointments_between(
        &self,
        professional_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AgendaResult<Vec<Appointment>> {
        let rows = appointments::list_between(&self.pool, professional_id, from, to).await?;
        Ok(into_appointments(rows)?)
    }

    async fn appointments_on(
        &self,
        date: NaiveDate,
        professional_id: Option<Uuid>,
    ) -> AgendaResult<Vec<Appointment>> {
        let rows = appointments::list_on(&self.pool, date, professional_id).await?;
        Ok(into_appointments(rows)?)
    }

    async fn insert_if_free(
        &self,
        appointment: NewAppointment,
        now: DateTime<Utc>,
    ) -> AgendaResult<Option<Appointment>> {
        let appointment = appointment.into_appointment(Uuid::new_v4(), now);
        let mut tx = self.pool.begin().await.wrap_err("failed to open transaction")?;
        appointments::lock_day(&mut *tx, appointment.professional_id, appointment.date).await?;

        let clash = appointments::find_overlap(
            &mut *tx,
            appointment.professional_id,
            appointment.date,
            appointment.start,
            appointment.end,
            None,
        )
        .await?;
        if clash.is_some() && appointment.status.is_occupying() {
            return Ok(None);
        }

        let row = appointments::insert_appointment(&mut *tx, &appointment).await?;
        tx.commit().await.wrap_err("failed to book appointment")?;
        Ok(Some(Appointment::try_from(row)?))
    }

    async fn update_if_free(
        &self,
        updated: &Appointment,
        expected: AppointmentStatus,
        now: DateTime<Utc>,
    ) -> AgendaResult<Option<Appointment>> {
        let mut tx = self.pool.begin().await.wrap_err("failed to open transaction")?;
        let previous = lock_current(&mut tx, updated.id, expected).await?;
        lock_days(&mut tx, &previous, updated).await?;

        let saved = write_if_free(&mut tx, updated, now).await?;
        if saved.is_some() {
            tx.commit().await.wrap_err("failed to update appointment")?;
        }
        Ok(saved)
    }

    async fn insert_token(&self, token: &RescheduleToken) -> AgendaResult<()> {
        tokens::insert_token(&self.pool, token).await?;
        Ok(())
    }

    async fn token(&self, token: &str) -> AgendaResult<Option<RescheduleToken>> {
        let row = tokens::get_token(&self.pool, token).await?;
        Ok(row.map(RescheduleToken::from))
    }

    async fn move_with_token(
        &self,
        token: &str,
        updated: &Appointment,
        expected: AppointmentStatus,
        now: DateTime<Utc>,
    ) -> AgendaResult<Option<Appointment>> {
        let mut tx = self.pool.begin().await.wrap_err("failed to open transaction")?;
        let stored = tokens::lock_token(&mut *tx, token)
            .await?
            .ok_or_else(|| AgendaError::NotFound("reschedule link".to_string()))?;
        if stored.consumed_at.is_some() {
            return Err(AgendaError::NotEligible(
                "this link has already been used to move the appointment".to_string(),
            ));
        }

        let previous = lock_current(&mut tx, updated.id, expected).await?;
        lock_days(&mut tx, &previous, updated).await?;
        let Some(moved) = write_if_free(&mut tx, updated, now).await? else {
            return Ok(None);
        };
        tokens::consume_token(&mut *tx, token, now).await?;
        tx.commit().await.wrap_err("failed to move appointment")?;
        Ok(Some(moved))
    }

    async fn delete_expired_tokens(&self, now: DateTime<Utc>) -> AgendaResult<u64> {
        Ok(tokens::delete_expired(&self.pool, now).await?)
    }

    async fn patient_contact(&self, patient_id: Uuid) -> AgendaResult<Option<PatientContact>> {
        let row = contacts::get_contact(&self.pool, patient_id).await?;
        Ok(row.map(PatientContact::from))
    }

    async fn upsert_patient_contact(&self, contact: &PatientContact) -> AgendaResult<()> {
        contacts::upsert_contact(&self.pool, contact).await?;
        Ok(())
    }
}
