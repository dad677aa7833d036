pub mod appointments;
pub mod contracts;
pub mod health;
pub mod patients;
pub mod professionals;
pub mod reminders;
pub mod reschedule;
