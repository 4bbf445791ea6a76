//! HTTP liveness endpoint for hosting platforms
//!
//! This crate provides a tiny HTTP server answering `/` and `/health` so a
//! platform health checker can tell the process is up. It runs on its own OS
//! thread, away from the bot's event loop.

mod server;

pub use server::{spawn_background, HealthFlags, LivenessServer};

/// Result type alias for liveness server operations
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
