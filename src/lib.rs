//! Supplyline Engine Library
//!
//! Quantity reconciliation for stock transactions (returns, discards and
//! open-vial movements) and hierarchical allocation drafts for distribution
//! orders. The engine consumes and produces plain records; forms, transport
//! and persistence belong to the caller.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod cache;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod validation;

pub use cache::{DraftSnapshot, DraftStore, InMemoryDraftStore};
pub use config::{EngineConfig, ReturnCountPolicy};
pub use errors::ServiceError;
pub use validation::{validate_line, validate_stock_taking_line, Field, ValidationReport, ViolationKind};
