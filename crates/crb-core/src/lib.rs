//! Core domain + application logic for the channel registration bot.
//!
//! This crate is intentionally framework-agnostic. Telegram and the SQLite
//! store live behind ports (traits) implemented in adapter crates.

pub mod broadcast;
pub mod classify;
pub mod config;
pub mod domain;
pub mod errors;
pub mod fanout;
pub mod formatting;
pub mod logging;
pub mod moderation;
pub mod ports;
pub mod registration;
pub mod report;
pub mod roster;
pub mod store;

#[cfg(test)]
pub(crate) mod testsupport;

pub use errors::{Error, Result};
