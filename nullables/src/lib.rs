//! Nullable infrastructure for deterministic testing.
//!
//! Everything the governance engine consumes from the outside world (time,
//! the vote token, call targets) is abstracted behind a trait or passed in as
//! a value. This crate provides in-memory implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically (mint, approve, reject a target...)
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests and local runs.

pub mod clock;
pub mod target;
pub mod token;

pub use clock::NullClock;
pub use target::{Invocation, NullTarget};
pub use token::NullToken;
