//! Fundamental types for the quorum governance engine.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! addresses, proposal identifiers, amounts, timestamps and governance parameters.

pub mod address;
pub mod amount;
pub mod hash;
pub mod params;
pub mod time;

pub use address::{Address, AddressError};
pub use amount::Amount;
pub use hash::{ProposalId, ProposalIdError};
pub use params::GovernanceParams;
pub use time::Timestamp;
