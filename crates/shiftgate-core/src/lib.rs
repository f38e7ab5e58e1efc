//! Shiftgate Core - Domain models, error taxonomy, configuration and ports
//!
//! This crate contains the attendance domain types shared by every other
//! shiftgate crate, plus the port traits for time and location sensing.

pub mod config;
pub mod error;
pub mod models;
pub mod ports;

pub use error::{Result, ShiftgateError};
