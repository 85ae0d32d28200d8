//! Core primitives: shared types, configuration, errors

pub mod config;
pub mod error;
pub mod types;
