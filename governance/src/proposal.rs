//! Proposals and the registry that owns their lifecycle.
//!
//! Proposals live in an append-only arena indexed by a sequence number. The
//! content-derived [`ProposalId`] is the caller-facing key and maps onto that
//! sequence; it doubles as the duplicate-submission check.

use crate::error::{GovernanceError, Role};
use crate::params::ParameterStore;
use quorum_types::{Address, ProposalId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Position of a proposal in the registry arena.
pub type ProposalSeq = u64;

/// Lifecycle state. `Closed` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Open,
    Closed,
}

/// A proposal: an opaque action on `target`, put to a weighted vote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub sequence: ProposalSeq,
    /// Who the payload is dispatched to if the proposal passes.
    pub target: Address,
    /// Opaque instruction for `target`, never interpreted by the engine.
    #[serde(with = "hex::serde")]
    pub payload: Vec<u8>,
    pub description: String,
    pub created_at: Timestamp,
    /// `created_at` plus the debating period in force at creation.
    pub deadline: Timestamp,
    pub status: ProposalStatus,
}

impl Proposal {
    pub fn is_open(&self) -> bool {
        self.status == ProposalStatus::Open
    }

    /// Whether the voting window has passed at `now`.
    pub fn has_expired(&self, now: Timestamp) -> bool {
        now >= self.deadline
    }
}

/// Stores every proposal ever created.
#[derive(Debug, Default)]
pub struct ProposalRegistry {
    proposals: Vec<Proposal>,
    index: HashMap<ProposalId, ProposalSeq>,
}

impl ProposalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an `Open` proposal on behalf of the proposer role.
    ///
    /// The deadline snapshots the current debating period. An id that was
    /// ever issued, open or closed, is rejected as a duplicate.
    pub fn create(
        &mut self,
        params: &ParameterStore,
        caller: &Address,
        target: Address,
        payload: Vec<u8>,
        description: String,
        now: Timestamp,
    ) -> Result<&Proposal, GovernanceError> {
        params.ensure_role(caller, Role::Proposer)?;

        let id = params
            .id_scheme()
            .derive(&target, &description, &payload, now);
        if self.index.contains_key(&id) {
            return Err(GovernanceError::DuplicateProposal(id));
        }
        let deadline = now
            .checked_add(params.debating_period_duration())
            .ok_or(GovernanceError::Overflow("proposal deadline"))?;

        let sequence = self.proposals.len() as ProposalSeq;
        self.proposals.push(Proposal {
            id,
            sequence,
            target,
            payload,
            description,
            created_at: now,
            deadline,
            status: ProposalStatus::Open,
        });
        self.index.insert(id, sequence);
        Ok(&self.proposals[sequence as usize])
    }

    /// Look up a proposal in any state.
    pub fn get(&self, id: &ProposalId) -> Option<&Proposal> {
        self.index.get(id).and_then(|seq| self.by_sequence(*seq))
    }

    /// Look up a proposal only if it is still `Open`.
    pub fn get_open(&self, id: &ProposalId) -> Option<&Proposal> {
        self.get(id).filter(|p| p.is_open())
    }

    pub fn by_sequence(&self, sequence: ProposalSeq) -> Option<&Proposal> {
        self.proposals.get(sequence as usize)
    }

    pub fn sequence_of(&self, id: &ProposalId) -> Option<ProposalSeq> {
        self.index.get(id).copied()
    }

    /// All `Open` proposals in creation order.
    pub fn open(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.iter().filter(|p| p.is_open())
    }

    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }

    /// Mark a proposal `Closed`.
    ///
    /// Finalization checks the status first, so this runs at most once per
    /// proposal; a second call is a bug in the caller.
    pub(crate) fn close(&mut self, sequence: ProposalSeq) {
        if let Some(proposal) = self.proposals.get_mut(sequence as usize) {
            debug_assert!(proposal.is_open(), "proposal {} closed twice", proposal.id);
            proposal.status = ProposalStatus::Closed;
        }
    }
}
