//! # Infrastructure Layer
//!
//! Adapters to the outside world: provider integrations and persistence.

pub mod persistence;
pub mod providers;
