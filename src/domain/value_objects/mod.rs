//! # Value Objects
//!
//! Immutable types with validation and domain semantics.
//!
//! ## Identity Types
//!
//! - [`ApplicationId`], [`OfferId`]: UUID-based identifiers
//! - [`ProviderId`]: String-based provider identifier
//!
//! ## Domain Enums
//!
//! - [`OfferStatus`]: Offer lifecycle states
//! - [`MaritalStatus`]: Applicant marital status

pub mod enums;
pub mod ids;

pub use enums::{MaritalStatus, OfferStatus, ParseEnumError};
pub use ids::{ApplicationId, OfferId, ProviderId};
