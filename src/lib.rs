//! # Financing Aggregator
//!
//! Submits one financing application to several lending providers at once
//! and tracks the offers they return.
//!
//! # Architecture
//!
//! - [`domain`]: applications, offers and the offer status rules
//! - [`infrastructure`]: provider adapters and repositories
//! - [`application`]: fan-out, reconciliation and subscriber notification
//! - [`api`]: REST and WebSocket transport
//!
//! # Flow
//!
//! 1. A client posts an application. It is stored and dispatched to every
//!    provider concurrently; each successful reply becomes a `DRAFT` offer.
//! 2. The reconciliation loop re-polls providers for every non-final offer,
//!    persists status changes and notifies observers.
//! 3. WebSocket observers receive each non-declined update for their
//!    application.

pub mod api;
pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod telemetry;
