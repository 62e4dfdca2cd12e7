//! Shared test utilities for the apu workspace.
//!
//! This crate provides fixtures used across crate test suites. It is a
//! dev-dependency only and never published.
//!
//! # Modules
//!
//! - [`fixtures`]: resource lines, catalog entries and seeded stores
//! - [`flaky`]: [`FlakyStore`], a memory store with per-operation failure injection

pub mod fixtures;
pub mod flaky;

pub use flaky::FlakyStore;
