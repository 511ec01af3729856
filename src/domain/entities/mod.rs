//! # Domain Entities
//!
//! - [`Application`]: one applicant's financing request
//! - [`Offer`]: one provider's response to an application

pub mod application;
pub mod offer;

pub use application::{Applicant, Application};
pub use offer::{Offer, OfferTerms, ProviderOffer, Reconciliation};
