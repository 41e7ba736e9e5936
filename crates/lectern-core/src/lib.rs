//! Shared configuration, error types, and calendar helpers for the lectern
//! class-schedule services.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
