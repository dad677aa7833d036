use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rand::{Rng, distributions::Alphanumeric};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    civil::hhmm,
    models::{
        appointment::{Appointment, AppointmentStatus},
        slot::Slot,
    },
};

const TOKEN_LENGTH: usize = 43;

/// Opaque value handed to an unauthenticated client; ~256 bits of entropy.
pub fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RescheduleToken {
    pub token: String,
    pub appointment_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Set once the token has been used to move its appointment.
    pub consumed_at: Option<DateTime<Utc>>,
}

impl RescheduleToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed_at.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueTokenResponse {
    pub token: String,
    pub appointment_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentSummary {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
    pub status: AppointmentStatus,
}

impl From<&Appointment> for AppointmentSummary {
    fn from(appointment: &Appointment) -> Self {
        Self {
            id: appointment.id,
            patient_id: appointment.patient_id,
            date: appointment.date,
            start: appointment.start,
            end: appointment.end,
            status: appointment.status,
        }
    }
}

/// What the holder of a reschedule link sees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleView {
    pub appointment: AppointmentSummary,
    pub expires_at: DateTime<Utc>,
    pub can_move: bool,
    pub candidate_slots: Vec<Slot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
}
