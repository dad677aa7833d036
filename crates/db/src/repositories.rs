pub mod appointments;
pub mod contacts;
pub mod contracts;
pub mod templates;
pub mod tokens;
