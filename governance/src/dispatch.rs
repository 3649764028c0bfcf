//! Hands an approved proposal's payload to its call target.

use crate::error::GovernanceError;
use quorum_external::CallTarget;
use quorum_types::{Address, ProposalId};

/// Wraps the host's [`CallTarget`] and counts successful dispatches.
#[derive(Debug)]
pub struct ExecutionDispatcher<C> {
    target: C,
    dispatched: u64,
}

impl<C: CallTarget> ExecutionDispatcher<C> {
    pub fn new(target: C) -> Self {
        Self {
            target,
            dispatched: 0,
        }
    }

    /// Deliver `payload` to `target` on behalf of proposal `id`.
    ///
    /// The payload is passed through unmodified. Any failure from the target
    /// comes back as `ExecutionFailed`.
    pub fn dispatch(
        &mut self,
        id: ProposalId,
        target: &Address,
        payload: &[u8],
    ) -> Result<(), GovernanceError> {
        self.target
            .invoke(target, payload)
            .map_err(|source| GovernanceError::ExecutionFailed { id, source })?;
        self.dispatched += 1;
        Ok(())
    }

    /// Number of payloads delivered successfully.
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    pub fn target(&self) -> &C {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut C {
        &mut self.target
    }
}
