//! Operations of the engine, written against [`crate::store::AgendaStore`].

pub mod availability;
pub mod booking;
pub mod contracts;
pub mod reminders;
pub mod reschedule;
pub mod templates;

pub use reminders::ReminderSender;
pub use reschedule::RescheduleSettings;
