//! SeaORM entities for the store tables.

pub mod group;
pub mod user;
