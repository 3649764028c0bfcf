//! Callable targets for approved proposals.

use crate::error::DispatchError;
use quorum_types::Address;

/// Capability to invoke the action bundled with a proposal.
///
/// The payload is opaque: the engine passes it through unchanged and never
/// inspects it. How `target` is resolved to something executable is entirely
/// up to the implementation.
pub trait CallTarget {
    fn invoke(&mut self, target: &Address, payload: &[u8]) -> Result<(), DispatchError>;
}
