//! # Domain Layer
//!
//! Entities, value objects and the rules that govern offer status
//! transitions. Nothing here performs I/O.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use errors::{DomainError, DomainResult};
