use agenda_core::models::{
    appointment::{Appointment, AppointmentStatus},
    contract::{Contract, ContractStatus, ScheduleRule},
    reminder::PatientContact,
    template::{AvailabilityTemplate, TimeRange},
    token::RescheduleToken,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use eyre::{Result, WrapErr, eyre};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

fn range(start: Option<NaiveTime>, end: Option<NaiveTime>) -> Option<TimeRange> {
    match (start, end) {
        (Some(start), Some(end)) => Some(TimeRange::new(start, end)),
        _ => None,
    }
}

fn weekday(raw: i16) -> Result<u8> {
    u8::try_from(raw)
        .ok()
        .filter(|day| *day < 7)
        .ok_or_else(|| eyre!("stored weekday {raw} is out of range"))
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbTemplate {
    pub professional_id: Uuid,
    pub weekday: i16,
    pub enabled: bool,
    pub window_start: Option<NaiveTime>,
    pub window_end: Option<NaiveTime>,
    pub session_minutes: i32,
    pub buffer_minutes: i32,
    pub lunch_start: Option<NaiveTime>,
    pub lunch_end: Option<NaiveTime>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbTemplate> for AvailabilityTemplate {
    type Error = eyre::Report;

    fn try_from(row: DbTemplate) -> Result<Self> {
        Ok(Self {
            weekday: weekday(row.weekday)?,
            enabled: row.enabled,
            window: range(row.window_start, row.window_end),
            session_minutes: u32::try_from(row.session_minutes).wrap_err("negative session length")?,
            buffer_minutes: u32::try_from(row.buffer_minutes).wrap_err("negative buffer length")?,
            lunch: range(row.lunch_start, row.lunch_end),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbContract {
    pub id: Uuid,
    pub professional_id: Uuid,
    pub patient_id: Uuid,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub num_appointments: Option<i32>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbScheduleRule {
    pub contract_id: Uuid,
    pub weekday: i16,
    pub time_of_day: NaiveTime,
}

impl DbContract {
    pub fn into_contract(self, rules: Vec<DbScheduleRule>) -> Result<Contract> {
        let schedule_rules = rules
            .into_iter()
            .map(|rule| {
                Ok(ScheduleRule {
                    weekday: weekday(rule.weekday)?,
                    time: rule.time_of_day,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Contract {
            id: self.id,
            professional_id: self.professional_id,
            patient_id: self.patient_id,
            status: self.status.parse::<ContractStatus>()?,
            start_date: self.start_date,
            end_date: self.end_date,
            num_appointments: self
                .num_appointments
                .map(u32::try_from)
                .transpose()
                .wrap_err("negative appointment count")?,
            schedule_rules,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointment {
    pub id: Uuid,
    pub professional_id: Uuid,
    pub patient_id: Uuid,
    pub contract_id: Uuid,
    pub appointment_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbAppointment> for Appointment {
    type Error = eyre::Report;

    fn try_from(row: DbAppointment) -> Result<Self> {
        Ok(Self {
            id: row.id,
            professional_id: row.professional_id,
            patient_id: row.patient_id,
            contract_id: row.contract_id,
            date: row.appointment_date,
            start: row.start_time,
            end: row.end_time,
            status: row.status.parse::<AppointmentStatus>()?,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub fn into_appointments(rows: Vec<DbAppointment>) -> Result<Vec<Appointment>> {
    rows.into_iter().map(Appointment::try_from).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbRescheduleToken {
    pub token: String,
    pub appointment_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
}

impl From<DbRescheduleToken> for RescheduleToken {
    fn from(row: DbRescheduleToken) -> Self {
        Self {
            token: row.token,
            appointment_id: row.appointment_id,
            issued_at: row.issued_at,
            expires_at: row.expires_at,
            consumed_at: row.consumed_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbPatientContact {
    pub patient_id: Uuid,
    pub phone: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbPatientContact> for PatientContact {
    fn from(row: DbPatientContact) -> Self {
        Self {
            patient_id: row.patient_id,
            phone: row.phone,
        }
    }
}
