//! # Persistence Layer
//!
//! ## Repository Traits (Ports)
//!
//! - [`ApplicationRepository`]: applications with their offers
//! - [`OfferRepository`]: offers
//!
//! ## Implementations
//!
//! - `in_memory`: shared-map implementations for tests and `--in-memory`
//! - `postgres`: `sqlx` implementations

pub mod in_memory;
pub mod postgres;
pub mod traits;

pub use traits::{
    ApplicationRepository, OfferFilter, OfferRepository, RepositoryError, RepositoryResult,
};
