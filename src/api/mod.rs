//! # API Layer
//!
//! HTTP and WebSocket transport over the application services.

pub mod rest;
pub mod ws;
