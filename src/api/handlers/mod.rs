//! HTTP handlers, one module per resource.

pub mod categories;
pub mod health;
pub mod raw_medicines;
pub mod valid_names;
