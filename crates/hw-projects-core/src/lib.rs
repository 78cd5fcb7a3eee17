//! Core types, configuration, and models for HW project management
//!
//! This crate provides:
//! - Configuration management (`Config`, user settings file, environment overrides)
//! - Data models (`ProjectRecord`, `NewProject`, `EmailOptions`, etc.)
//! - The error taxonomy and the `Outcome` wire shape used at process boundaries
//! - Platform paths and atomic file writes

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod models;
pub mod paths;

// Re-export key types for convenience
pub use config::{Config, DEFAULT_PROJECTS_ROOT, DEFAULT_SERVER_URL, Settings};
pub use error::{Error, ErrorInfo, Outcome, Result};
pub use models::{
    CurrencyTotals, EmailOptions, NewProject, ProjectRecord, ProjectReport, WeekReport,
    is_valid_contract_no, is_valid_po_no, sanitize_customer_name,
};
