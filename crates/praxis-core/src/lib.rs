//! Core types and trait definitions for the Praxis clinic store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod account;
pub mod appointment;
pub mod auth;
pub mod clinician;
pub mod dashboard;
pub mod error;
pub mod finance;
pub mod patch;
pub mod patient;
pub mod record;
pub mod store;

pub use error::{Error, Result};
pub use patch::Patch;
