//! Nullable call target that records every invocation.

use quorum_external::{CallTarget, DispatchError};
use quorum_types::Address;
use std::collections::HashSet;

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub target: Address,
    pub payload: Vec<u8>,
}

/// A call target that accepts everything by default and remembers each call.
///
/// Individual targets can be made to reject payloads or appear unreachable,
/// which is how tests model a broken or hostile recipient.
#[derive(Debug, Clone, Default)]
pub struct NullTarget {
    calls: Vec<Invocation>,
    rejecting: HashSet<Address>,
    unreachable: HashSet<Address>,
}

impl NullTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `target` reject every payload.
    pub fn reject(&mut self, target: &Address) {
        self.rejecting.insert(target.clone());
    }

    /// Make `target` unreachable.
    pub fn disconnect(&mut self, target: &Address) {
        self.unreachable.insert(target.clone());
    }

    /// Restore `target` to accepting calls.
    pub fn accept(&mut self, target: &Address) {
        self.rejecting.remove(target);
        self.unreachable.remove(target);
    }

    /// All successful invocations, oldest first.
    pub fn calls(&self) -> &[Invocation] {
        &self.calls
    }

    /// Number of successful invocations of `target`.
    pub fn calls_to(&self, target: &Address) -> usize {
        self.calls.iter().filter(|c| &c.target == target).count()
    }
}

impl CallTarget for NullTarget {
    fn invoke(&mut self, target: &Address, payload: &[u8]) -> Result<(), DispatchError> {
        if self.unreachable.contains(target) {
            return Err(DispatchError::Unreachable(target.clone()));
        }
        if self.rejecting.contains(target) {
            return Err(DispatchError::Rejected {
                target: target.clone(),
                reason: "payload rejected".into(),
            });
        }
        self.calls.push(Invocation {
            target: target.clone(),
            payload: payload.to_vec(),
        });
        Ok(())
    }
}
