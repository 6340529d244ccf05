//! # CleanCheck Common Library
//!
//! Shared code for the CleanCheck service and its tooling:
//! - Cleaning task rubric catalog
//! - Assessment and inspection models
//! - TOML bootstrap configuration
//! - Common error type

pub mod config;
pub mod error;
pub mod models;
pub mod rubric;

pub use error::{Error, Result};
pub use models::{Assessment, Finding, Inspection, Observation, Quality, Role};
pub use rubric::{RequestedTask, RubricEntry, TaskType};
