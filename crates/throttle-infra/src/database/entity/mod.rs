//! SeaORM entities.

pub mod client;
