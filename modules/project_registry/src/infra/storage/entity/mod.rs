//! SeaORM entities for the `Usuario`, `Institucion` and `Proyecto` tables.
//! Rust field names are English; `column_name` keeps the stored schema.

pub mod institution;
pub mod project;
pub mod user;
