#[path = "../test_utils.rs"]
mod test_utils;

mod appointments_test;
mod contracts_test;
mod middleware_test;
mod reminders_test;
mod reschedule_test;
mod templates_test;
