pub mod occurrence;
pub mod reference;
