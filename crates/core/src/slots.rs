//! Slot generation from a weekday template.
//!
//! Slots are never stored. For a given date the generator walks the working
//! window in steps of `session + buffer` and yields every session that fits
//! the window, misses the lunch break and misses every occupying appointment.

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::{
    civil::{self, days_between},
    models::{
        appointment::Appointment,
        slot::Slot,
        template::{AvailabilityTemplate, TimeRange, WeekTemplate, weekday_index},
    },
};

/// Lazy slot sequence for one date. Restartable by calling
/// [`generate_slots`] again with the same inputs.
pub struct SlotIter<'a> {
    date: NaiveDate,
    template: &'a AvailabilityTemplate,
    window: Option<TimeRange>,
    cursor: Option<NaiveTime>,
    booked: Vec<&'a Appointment>,
}

impl Iterator for SlotIter<'_> {
    type Item = Slot;

    fn next(&mut self) -> Option<Slot> {
        let window = self.window?;
        loop {
            let start = self.cursor?;
            if start >= window.end {
                self.cursor = None;
                return None;
            }
            self.cursor = civil::add_minutes(start, self.template.step_minutes());

            let end = match self.template.session_end(start) {
                Some(end) if end <= window.end => end,
                // Session runs past the window (or midnight); later ones will too.
                _ => {
                    self.cursor = None;
                    return None;
                }
            };
            if let Some(lunch) = &self.template.lunch {
                if lunch.overlaps(start, end) {
                    continue;
                }
            }
            if self
                .booked
                .iter()
                .any(|appointment| civil::overlaps(appointment.start, appointment.end, start, end))
            {
                continue;
            }
            return Some(Slot {
                date: self.date,
                start,
                end,
            });
        }
    }
}

/// Slots for `date` under `template`. `booked` may hold appointments from any
/// date and any status; only occupying ones on `date` block a slot.
pub fn generate_slots<'a>(
    template: &'a AvailabilityTemplate,
    date: NaiveDate,
    booked: &'a [Appointment],
) -> SlotIter<'a> {
    let window = if template.weekday == weekday_index(date) {
        template.bookable_window()
    } else {
        None
    };
    SlotIter {
        date,
        template,
        window,
        cursor: window.map(|window| window.start),
        booked: booked
            .iter()
            .filter(|appointment| appointment.date == date && appointment.status.is_occupying())
            .collect(),
    }
}

/// Same as [`generate_slots`] but treats `exclude` as free, so an appointment
/// being moved does not block its own candidates.
pub fn generate_slots_excluding<'a>(
    template: &'a AvailabilityTemplate,
    date: NaiveDate,
    booked: &'a [Appointment],
    exclude: Uuid,
) -> SlotIter<'a> {
    let mut slots = generate_slots(template, date, booked);
    slots.booked.retain(|appointment| appointment.id != exclude);
    slots
}

/// Slots for every date in `[from, to]`, reusing one week template and one
/// appointment load for the whole range.
pub fn slots_between(
    week: &WeekTemplate,
    from: NaiveDate,
    to: NaiveDate,
    booked: &[Appointment],
    exclude: Option<Uuid>,
) -> Vec<Slot> {
    days_between(from, to)
        .flat_map(|date| {
            let template = week.for_date(date);
            match exclude {
                Some(id) => generate_slots_excluding(template, date, booked, id).collect::<Vec<_>>(),
                None => generate_slots(template, date, booked).collect(),
            }
        })
        .collect()
}

/// Whether `start` on `date` is one of the generated slots.
pub fn is_offered(
    template: &AvailabilityTemplate,
    date: NaiveDate,
    start: NaiveTime,
    booked: &[Appointment],
    exclude: Option<Uuid>,
) -> bool {
    match exclude {
        Some(id) => generate_slots_excluding(template, date, booked, id).any(|slot| slot.start == start),
        None => generate_slots(template, date, booked).any(|slot| slot.start == start),
    }
}
