// Pure Diesel query composition for schedule tables.
pub mod occurrence;
