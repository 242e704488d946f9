//! Core domain + application logic for the HEPIQ login-support bot.
//!
//! This crate is intentionally framework-agnostic. Telegram lives behind the
//! messaging port implemented in the adapter crate.

pub mod callback;
pub mod config;
pub mod desk;
pub mod domain;
pub mod errors;
pub mod intake;
pub mod keyboards;
pub mod logging;
pub mod messaging;
pub mod store;
pub mod texts;
pub mod tickets;

pub use errors::{Error, Result};
