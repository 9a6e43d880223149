//! Core types, errors, configuration, and constants

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
