//! Command handlers for the Telegram bot
//!
//! - `basic`: start and status, answered in any chat
//! - `music`: play and stop, answered in groups only

mod basic;
mod music;

pub use basic::*;
pub use music::*;
