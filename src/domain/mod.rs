//! Core domain types and logic.

pub mod sentiment;
pub mod trade;
pub mod classify;
pub mod merge;
pub mod pipeline;
pub mod summary;
pub mod config_validation;
pub mod error;
