//! Core types and trait definitions for the keel compliance tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod alert;
pub mod item;
pub mod jurisdiction;
pub mod report;
pub mod store;
