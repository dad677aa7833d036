/// Mapping of domain errors onto HTTP responses
pub mod error_handling;
