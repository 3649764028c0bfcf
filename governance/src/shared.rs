//! Serialized access to one engine from many concurrent callers.
//!
//! Every call takes the engine lock for the whole operation, so operations
//! from independent callers are applied one at a time and never observe each
//! other's partial effects.
//!
//! The token service and call target run while the lock is held. They must
//! not call back into the same `SharedGovernance`, or they will deadlock.

use crate::engine::{FinalizeOutcome, GovernanceEngine, ProposalRecord};
use crate::error::GovernanceError;
use quorum_external::{CallTarget, TokenService};
use quorum_types::{Address, Amount, ProposalId, Timestamp};
use std::sync::Arc;
use tokio::sync::Mutex;

/// A cloneable handle to a mutex-guarded [`GovernanceEngine`].
pub struct SharedGovernance<T, C> {
    inner: Arc<Mutex<GovernanceEngine<T, C>>>,
}

impl<T, C> Clone for SharedGovernance<T, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: TokenService, C: CallTarget> SharedGovernance<T, C> {
    pub fn new(engine: GovernanceEngine<T, C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    pub async fn set_minimum_quorum(
        &self,
        caller: &Address,
        value: Amount,
    ) -> Result<(), GovernanceError> {
        self.inner.lock().await.set_minimum_quorum(caller, value)
    }

    pub async fn set_debating_period_duration(
        &self,
        caller: &Address,
        value: u64,
    ) -> Result<(), GovernanceError> {
        self.inner
            .lock()
            .await
            .set_debating_period_duration(caller, value)
    }

    pub async fn deposit(&self, member: &Address, amount: Amount) -> Result<(), GovernanceError> {
        self.inner.lock().await.deposit(member, amount)
    }

    pub async fn withdraw(&self, member: &Address, amount: Amount) -> Result<(), GovernanceError> {
        self.inner.lock().await.withdraw(member, amount)
    }

    pub async fn create_proposal(
        &self,
        caller: &Address,
        target: Address,
        payload: Vec<u8>,
        description: String,
        now: Timestamp,
    ) -> Result<ProposalId, GovernanceError> {
        self.inner
            .lock()
            .await
            .create_proposal(caller, target, payload, description, now)
    }

    pub async fn vote(
        &self,
        caller: &Address,
        id: &ProposalId,
        approve: bool,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        self.inner.lock().await.vote(caller, id, approve, now)
    }

    pub async fn finalize(
        &self,
        id: &ProposalId,
        now: Timestamp,
    ) -> Result<FinalizeOutcome, GovernanceError> {
        self.inner.lock().await.finalize(id, now)
    }

    pub async fn weight_of(&self, member: &Address) -> Amount {
        self.inner.lock().await.weight_of(member)
    }

    pub async fn frozen_weight(&self, member: &Address) -> Amount {
        self.inner.lock().await.frozen_weight(member)
    }

    pub async fn proposal(&self, id: &ProposalId) -> Option<ProposalRecord> {
        self.inner.lock().await.proposal(id)
    }

    /// Run a read-only closure against the engine under the lock.
    pub async fn read<R>(&self, f: impl FnOnce(&GovernanceEngine<T, C>) -> R) -> R {
        f(&*self.inner.lock().await)
    }

    /// Run a closure with mutable access under the lock.
    ///
    /// Used to drive collaborators (mint, approve, reconfigure a target)
    /// atomically with respect to engine operations.
    pub async fn with<R>(&self, f: impl FnOnce(&mut GovernanceEngine<T, C>) -> R) -> R {
        f(&mut *self.inner.lock().await)
    }
}
