//! Core domain types and logic.

pub mod prices;
pub mod signals;
pub mod universe;
pub mod allocation;
pub mod simulation;
pub mod metrics;
pub mod config_validation;
pub mod error;
