pub mod appointment;
pub mod contract;
pub mod reminder;
pub mod slot;
pub mod template;
pub mod token;
