//! Interfaces the governance engine requires of its external collaborators.
//!
//! The engine never implements value transfer or action execution itself. It
//! depends only on these traits; the host wires in real implementations and
//! tests use the doubles from `quorum-nullables`.

pub mod error;
pub mod target;
pub mod token;

pub use error::{DispatchError, TransferError};
pub use target::CallTarget;
pub use token::TokenService;
