//! Shared error plumbing and time helpers used across all chronicle crates.

pub mod error;
pub mod time;

pub use error::{Error, FromMessage, Result};
