use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    errors::{AgendaError, AgendaResult},
    models::{
        appointment::{Appointment, AppointmentStatus, NewAppointment, find_collision},
        contract::{Contract, ContractStatus},
        reminder::PatientContact,
        template::AvailabilityTemplate,
        token::RescheduleToken,
    },
    store::{AgendaStore, ensure_status_unchanged},
};

#[derive(Default)]
struct Tables {
    templates: HashMap<(Uuid, u8), AvailabilityTemplate>,
    contracts: HashMap<Uuid, Contract>,
    appointments: HashMap<Uuid, Appointment>,
    tokens: HashMap<String, RescheduleToken>,
    contacts: HashMap<Uuid, PatientContact>,
}

impl Tables {
    fn collides(&self, candidate: &Appointment) -> bool {
        let same_day = self
            .appointments
            .values()
            .filter(|other| other.professional_id == candidate.professional_id);
        candidate.status.is_occupying()
            && find_collision(same_day, candidate.date, candidate.start, candidate.end, Some(candidate.id))
                .is_some()
    }

    fn write_if_free(
        &mut self,
        updated: &Appointment,
        expected: AppointmentStatus,
        now: DateTime<Utc>,
    ) -> AgendaResult<Option<Appointment>> {
        let current = self
            .appointments
            .get(&updated.id)
            .ok_or_else(|| AgendaError::NotFound(format!("appointment {}", updated.id)))?;
        ensure_status_unchanged(updated.id, current.status, expected)?;
        if self.collides(updated) {
            return Ok(None);
        }
        let mut stored = updated.clone();
        stored.updated_at = now;
        self.appointments.insert(stored.id, stored.clone());
        Ok(Some(stored))
    }
}

/// In-process store. One mutex guards every table, so each call is atomic
/// with respect to every other call.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted(mut appointments: Vec<Appointment>) -> Vec<Appointment> {
    appointments.sort_by_key(|appointment| (appointment.date, appointment.start, appointment.created_at));
    appointments
}

#[async_trait]
impl AgendaStore for MemoryStore {
    async fn templates(&self, professional_id: Uuid) -> AgendaResult<Vec<AvailabilityTemplate>> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<_> = tables
            .templates
            .iter()
            .filter(|((owner, _), _)| *owner == professional_id)
            .map(|(_, template)| template.clone())
            .collect();
        rows.sort_by_key(|template| template.weekday);
        Ok(rows)
    }

    async fn replace_templates(
        &self,
        professional_id: Uuid,
        templates: &[AvailabilityTemplate],
    ) -> AgendaResult<()> {
        let mut tables = self.tables.lock().await;
        for template in templates {
            tables
                .templates
                .insert((professional_id, template.weekday), template.clone());
        }
        Ok(())
    }

    async fn contract(&self, contract_id: Uuid) -> AgendaResult<Option<Contract>> {
        Ok(self.tables.lock().await.contracts.get(&contract_id).cloned())
    }

    async fn upsert_contract(&self, contract: &Contract) -> AgendaResult<Contract> {
        let mut tables = self.tables.lock().await;
        tables.contracts.insert(contract.id, contract.clone());
        Ok(contract.clone())
    }

    async fn mark_signed(&self, contract_id: Uuid, now: DateTime<Utc>) -> AgendaResult<u64> {
        let mut tables = self.tables.lock().await;
        let contract = tables
            .contracts
            .get_mut(&contract_id)
            .ok_or_else(|| AgendaError::NotFound(format!("contract {contract_id}")))?;
        if contract.status == ContractStatus::Cancelled {
            return Err(AgendaError::NotEligible(format!("contract {contract_id} is cancelled")));
        }
        contract.status = ContractStatus::Signed;

        let mut promoted = 0;
        for appointment in tables.appointments.values_mut() {
            if appointment.contract_id == contract_id && appointment.status == AppointmentStatus::PreScheduled {
                appointment.status = AppointmentStatus::Scheduled;
                appointment.updated_at = now;
                promoted += 1;
            }
        }
        Ok(promoted)
    }

    async fn end_contract(
        &self,
        contract_id: Uuid,
        end_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> AgendaResult<Vec<Uuid>> {
        let mut tables = self.tables.lock().await;
        let contract = tables
            .contracts
            .get_mut(&contract_id)
            .ok_or_else(|| AgendaError::NotFound(format!("contract {contract_id}")))?;
        contract.end_date = Some(end_date);

        let mut ended = Vec::new();
        for appointment in tables.appointments.values_mut() {
            if appointment.contract_id == contract_id
                && appointment.date > end_date
                && appointment.status.is_active()
            {
                appointment.status = AppointmentStatus::SeriesEnded;
                appointment.updated_at = now;
                ended.push((appointment.date, appointment.start, appointment.id));
            }
        }
        ended.sort();
        Ok(ended.into_iter().map(|(_, _, id)| id).collect())
    }

    async fn appointment(&self, appointment_id: Uuid) -> AgendaResult<Option<Appointment>> {
        Ok(self.tables.lock().await.appointments.get(&appointment_id).cloned())
    }

    async fn appointments_between(
        &self,
        professional_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AgendaResult<Vec<Appointment>> {
        let tables = self.tables.lock().await;
        Ok(sorted(
            tables
                .appointments
                .values()
                .filter(|a| a.professional_id == professional_id && a.date >= from && a.date <= to)
                .cloned()
                .collect(),
        ))
    }

    async fn appointments_on(
        &self,
        date: NaiveDate,
        professional_id: Option<Uuid>,
    ) -> AgendaResult<Vec<Appointment>> {
        let tables = self.tables.lock().await;
        Ok(sorted(
            tables
                .appointments
                .values()
                .filter(|a| a.date == date && professional_id.is_none_or(|id| a.professional_id == id))
                .cloned()
                .collect(),
        ))
    }

    async fn insert_if_free(
        &self,
        appointment: NewAppointment,
        now: DateTime<Utc>,
    ) -> AgendaResult<Option<Appointment>> {
        let mut tables = self.tables.lock().await;
        let appointment = appointment.into_appointment(Uuid::new_v4(), now);
        if tables.collides(&appointment) {
            return Ok(None);
        }
        tables.appointments.insert(appointment.id, appointment.clone());
        Ok(Some(appointment))
    }

    async fn update_if_free(
        &self,
        updated: &Appointment,
        expected: AppointmentStatus,
        now: DateTime<Utc>,
    ) -> AgendaResult<Option<Appointment>> {
        self.tables.lock().await.write_if_free(updated, expected, now)
    }

    async fn insert_token(&self, token: &RescheduleToken) -> AgendaResult<()> {
        let mut tables = self.tables.lock().await;
        tables.tokens.insert(token.token.clone(), token.clone());
        Ok(())
    }

    async fn token(&self, token: &str) -> AgendaResult<Option<RescheduleToken>> {
        Ok(self.tables.lock().await.tokens.get(token).cloned())
    }

    async fn move_with_token(
        &self,
        token: &str,
        updated: &Appointment,
        expected: AppointmentStatus,
        now: DateTime<Utc>,
    ) -> AgendaResult<Option<Appointment>> {
        let mut tables = self.tables.lock().await;
        match tables.tokens.get(token) {
            None => return Err(AgendaError::NotFound("reschedule link".to_string())),
            Some(stored) if stored.is_consumed() => {
                return Err(AgendaError::NotEligible(
                    "this link has already been used to move the appointment".to_string(),
                ));
            }
            Some(_) => {}
        }
        let moved = tables.write_if_free(updated, expected, now)?;
        if moved.is_some() {
            if let Some(stored) = tables.tokens.get_mut(token) {
                stored.consumed_at = Some(now);
            }
        }
        Ok(moved)
    }

    async fn delete_expired_tokens(&self, now: DateTime<Utc>) -> AgendaResult<u64> {
        let mut tables = self.tables.lock().await;
        let before = tables.tokens.len();
        tables.tokens.retain(|_, token| !token.is_expired(now));
        Ok((before - tables.tokens.len()) as u64)
    }

    async fn patient_contact(&self, patient_id: Uuid) -> AgendaResult<Option<PatientContact>> {
        Ok(self.tables.lock().await.contacts.get(&patient_id).cloned())
    }

    async fn upsert_patient_contact(&self, contact: &PatientContact) -> AgendaResult<()> {
        let mut tables = self.tables.lock().await;
        tables.contacts.insert(contact.patient_id, contact.clone());
        Ok(())
    }
}
