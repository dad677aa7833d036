use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    civil::{self, hhmm},
    errors::{AgendaError, AgendaResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    PreScheduled,
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    SeriesEnded,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 6] = [
        AppointmentStatus::PreScheduled,
        AppointmentStatus::Scheduled,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
        AppointmentStatus::SeriesEnded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::PreScheduled => "PRE_SCHEDULED",
            AppointmentStatus::Scheduled => "SCHEDULED",
            AppointmentStatus::Confirmed => "CONFIRMED",
            AppointmentStatus::Completed => "COMPLETED",
            AppointmentStatus::Cancelled => "CANCELLED",
            AppointmentStatus::SeriesEnded => "SERIES_ENDED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled | AppointmentStatus::SeriesEnded
        )
    }

    /// Not terminal: still on the agenda and shown in default listings.
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Blocks its interval from being offered or booked again.
    pub fn is_occupying(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled | AppointmentStatus::SeriesEnded)
    }

    pub fn is_reschedulable(&self) -> bool {
        self.is_active()
    }

    /// Manual (operator) status change. Any non-terminal appointment may be set
    /// to any status except `SERIES_ENDED`, which only contract termination
    /// produces. Terminal appointments never change status.
    pub fn check_manual_transition(&self, next: AppointmentStatus) -> AgendaResult<()> {
        if self.is_terminal() {
            if *self == next {
                return Ok(());
            }
            return Err(AgendaError::NotEligible(format!(
                "appointment is {} and can no longer change status",
                self
            )));
        }
        if next == AppointmentStatus::SeriesEnded {
            return Err(AgendaError::Validation(
                "SERIES_ENDED is set only by ending the contract".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = AgendaError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        AppointmentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == raw)
            .ok_or_else(|| AgendaError::Validation(format!("unknown appointment status '{raw}'")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub professional_id: Uuid,
    pub patient_id: Uuid,
    pub contract_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn intersects(&self, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> bool {
        self.date == date && civil::overlaps(self.start, self.end, start, end)
    }

    pub fn duration_minutes(&self) -> i64 {
        civil::minutes_between(self.start, self.end)
    }
}

/// First appointment in `existing` that occupies `[start, end)` on `date`,
/// ignoring `exclude` (the appointment being moved or edited).
pub fn find_collision<'a>(
    existing: impl IntoIterator<Item = &'a Appointment>,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    exclude: Option<Uuid>,
) -> Option<&'a Appointment> {
    existing.into_iter().find(|other| {
        Some(other.id) != exclude && other.status.is_occupying() && other.intersects(date, start, end)
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    pub professional_id: Uuid,
    pub patient_id: Uuid,
    pub contract_id: Uuid,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

impl NewAppointment {
    pub fn into_appointment(self, id: Uuid, now: DateTime<Utc>) -> Appointment {
        Appointment {
            id,
            professional_id: self.professional_id,
            patient_id: self.patient_id,
            contract_id: self.contract_id,
            date: self.date,
            start: self.start,
            end: self.end,
            status: self.status,
            notes: self.notes,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of an appointment; absent fields stay as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentPatch {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default, with = "hhmm::option")]
    pub start: Option<NaiveTime>,
    #[serde(default, with = "hhmm::option")]
    pub end: Option<NaiveTime>,
    #[serde(default)]
    pub status: Option<AppointmentStatus>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl AppointmentPatch {
    pub fn moves_slot(&self) -> bool {
        self.date.is_some() || self.start.is_some() || self.end.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRequest {
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentsRequest {
    pub contract_id: Uuid,
    pub slots: Vec<SlotRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedRequest {
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    pub reason: String,
}

/// Result of a best-effort batch booking: what was created and what was skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingOutcome {
    pub created: u32,
    pub appointments: Vec<Appointment>,
    pub rejected: Vec<RejectedRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListAppointmentsResponse {
    pub appointments: Vec<Appointment>,
}
