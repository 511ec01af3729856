//! # In-Memory Repositories
//!
//! In-memory implementations for tests and database-less runs.
//!
//! ## Available Repositories
//!
//! - [`InMemoryApplicationRepository`]: application persistence
//! - [`InMemoryOfferRepository`]: offer persistence
//!
//! ## Thread Safety
//!
//! All implementations use `Arc<RwLock<HashMap>>` for thread-safe access.

pub mod application_repository;
pub mod offer_repository;

pub use application_repository::InMemoryApplicationRepository;
pub use offer_repository::InMemoryOfferRepository;
