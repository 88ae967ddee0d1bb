//! Terminal presentation of the core evaluation

pub mod instruments;
pub mod returns;
pub mod setup;
pub mod ui;
