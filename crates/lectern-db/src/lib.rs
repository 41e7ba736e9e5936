//! Persistence for class occurrences: schema, typed enums, query composition,
//! and the store seams the schedule service runs against.

pub mod db;
pub mod error;
pub mod model;
