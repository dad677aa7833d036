use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    civil::{self, hhmm},
    errors::{AgendaError, AgendaResult},
};

pub const DEFAULT_SESSION_MINUTES: u32 = 50;
pub const DEFAULT_BUFFER_MINUTES: u32 = 10;
pub const DAYS_IN_WEEK: u8 = 7;
/// Upper bound for one session plus its buffer.
pub const MAX_STEP_MINUTES: u32 = 24 * 60;

/// 0 = Sunday .. 6 = Saturday.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl TimeRange {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn is_ordered(&self) -> bool {
        self.start < self.end
    }

    pub fn contains(&self, start: NaiveTime, end: NaiveTime) -> bool {
        self.start <= start && end <= self.end
    }

    pub fn overlaps(&self, start: NaiveTime, end: NaiveTime) -> bool {
        civil::overlaps(self.start, self.end, start, end)
    }
}

/// Working-hours configuration for one professional on one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityTemplate {
    pub weekday: u8,
    pub enabled: bool,
    pub window: Option<TimeRange>,
    #[serde(default = "default_session_minutes")]
    pub session_minutes: u32,
    #[serde(default = "default_buffer_minutes")]
    pub buffer_minutes: u32,
    #[serde(default)]
    pub lunch: Option<TimeRange>,
}

fn default_session_minutes() -> u32 {
    DEFAULT_SESSION_MINUTES
}

fn default_buffer_minutes() -> u32 {
    DEFAULT_BUFFER_MINUTES
}

impl AvailabilityTemplate {
    /// What a weekday looks like before the professional configures it.
    pub fn disabled(weekday: u8) -> Self {
        Self {
            weekday,
            enabled: false,
            window: None,
            session_minutes: DEFAULT_SESSION_MINUTES,
            buffer_minutes: DEFAULT_BUFFER_MINUTES,
            lunch: None,
        }
    }

    pub fn validate(&self) -> AgendaResult<()> {
        let day = self.weekday;
        if day >= DAYS_IN_WEEK {
            return Err(AgendaError::Validation(format!(
                "weekday {day} is out of range (0 = Sunday .. 6 = Saturday)"
            )));
        }
        if self.session_minutes == 0 {
            return Err(AgendaError::Validation(format!(
                "weekday {day}: session duration must be greater than zero"
            )));
        }
        let step = self.session_minutes.checked_add(self.buffer_minutes);
        if step.is_none_or(|step| step > MAX_STEP_MINUTES) {
            return Err(AgendaError::Validation(format!(
                "weekday {day}: session plus buffer must not exceed {MAX_STEP_MINUTES} minutes"
            )));
        }
        if let Some(window) = &self.window {
            if !window.is_ordered() {
                return Err(AgendaError::Validation(format!(
                    "weekday {day}: working window must start before it ends"
                )));
            }
        } else if self.enabled {
            return Err(AgendaError::Validation(format!(
                "weekday {day}: an enabled day needs a working window"
            )));
        }
        if let Some(lunch) = &self.lunch {
            if !lunch.is_ordered() {
                return Err(AgendaError::Validation(format!(
                    "weekday {day}: lunch break must start before it ends"
                )));
            }
            let inside = self
                .window
                .map(|window| window.contains(lunch.start, lunch.end))
                .unwrap_or(false);
            if !inside {
                return Err(AgendaError::Validation(format!(
                    "weekday {day}: lunch break must lie inside the working window"
                )));
            }
        }
        Ok(())
    }

    /// The window to generate slots from, if this day takes bookings at all.
    pub fn bookable_window(&self) -> Option<TimeRange> {
        if self.enabled { self.window } else { None }
    }

    pub fn session_end(&self, start: NaiveTime) -> Option<NaiveTime> {
        civil::add_minutes(start, self.session_minutes)
    }

    pub fn step_minutes(&self) -> u32 {
        self.session_minutes.saturating_add(self.buffer_minutes)
    }

    /// Copy of this template under another weekday.
    pub fn for_weekday(&self, weekday: u8) -> Self {
        Self {
            weekday,
            ..self.clone()
        }
    }
}

/// The seven weekday templates of one professional, indexed by weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekTemplate {
    pub professional_id: Uuid,
    pub days: Vec<AvailabilityTemplate>,
}

impl WeekTemplate {
    /// Builds a full week from stored rows; weekdays without a row are disabled.
    pub fn from_rows(professional_id: Uuid, rows: Vec<AvailabilityTemplate>) -> Self {
        let mut days: Vec<AvailabilityTemplate> =
            (0..DAYS_IN_WEEK).map(AvailabilityTemplate::disabled).collect();
        for row in rows {
            if let Some(slot) = days.get_mut(usize::from(row.weekday)) {
                *slot = row;
            }
        }
        Self {
            professional_id,
            days,
        }
    }

    pub fn day(&self, weekday: u8) -> &AvailabilityTemplate {
        &self.days[usize::from(weekday % DAYS_IN_WEEK)]
    }

    pub fn for_date(&self, date: NaiveDate) -> &AvailabilityTemplate {
        self.day(weekday_index(date))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutTemplatesRequest {
    pub days: Vec<AvailabilityTemplate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyTemplateDayRequest {
    pub from_day: u8,
    pub to_day: u8,
}
