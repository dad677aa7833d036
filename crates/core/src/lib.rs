pub mod civil;
pub mod errors;
pub mod models;
pub mod recurrence;
pub mod services;
pub mod slots;
pub mod store;
