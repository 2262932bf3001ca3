//! Core domain types and logic.

pub mod config_validation;
pub mod error;
pub mod market;
pub mod presentation;
pub mod price_table;
pub mod stats;
pub mod universe;
pub mod view;
