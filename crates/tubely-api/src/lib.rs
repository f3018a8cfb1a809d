//! Tubely API Library
//!
//! HTTP surface for media uploads: thumbnail and video upload flows, cached
//! thumbnail read-back and asset serving. Exposed as a library so integration
//! tests can build the router.

pub mod auth;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;
pub mod utils;
