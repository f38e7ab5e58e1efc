//! Shiftgate Store - Storage ports and adapters
//!
//! This crate defines the storage ports for workers, sites and shifts and
//! provides in-memory and PostgreSQL adapter implementations.

pub mod memory;
pub mod ports;
pub mod postgres;
