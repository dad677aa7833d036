use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::civil::hhmm;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientContact {
    pub patient_id: Uuid,
    pub phone: Option<String>,
}

impl PatientContact {
    /// Trimmed phone number, if there is one to send to.
    pub fn reachable_phone(&self) -> Option<&str> {
        self.phone
            .as_deref()
            .map(str::trim)
            .filter(|phone| !phone.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertContactRequest {
    pub phone: Option<String>,
}

/// One reminder handed to the notification collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderRequest {
    pub appointment_id: Uuid,
    pub professional_id: Uuid,
    pub patient_id: Uuid,
    pub phone: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    /// Token for the confirm/reschedule link, when one could be issued.
    pub reschedule_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchRequest {
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
    #[serde(default)]
    pub professional_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchSummary {
    pub sent: u32,
    pub skipped: u32,
}
