//! Governance engine: composes the parameter store, balance ledger,
//! proposal registry, voting engine and execution dispatcher into one state
//! machine.
//!
//! Every operation either commits completely or returns an error with no
//! state changed. Time is always passed in by the caller; the engine never
//! reads a clock.

use crate::dispatch::ExecutionDispatcher;
use crate::error::GovernanceError;
use crate::ledger::BalanceLedger;
use crate::params::{GovernanceConfig, ParameterStore};
use crate::proposal::{Proposal, ProposalRegistry};
use crate::voting::{Choice, Tally, VotingEngine};
use quorum_external::{CallTarget, TokenService};
use quorum_types::{Address, Amount, ProposalId, Timestamp};
use serde::{Deserialize, Serialize};

/// Result of a successful `finalize`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizeOutcome {
    pub id: ProposalId,
    /// Whether the payload was dispatched to the target.
    pub executed: bool,
    pub quorum_met: bool,
    pub approve_weight: Amount,
    pub reject_weight: Amount,
}

/// A proposal together with its current tally.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalRecord {
    #[serde(flatten)]
    pub proposal: Proposal,
    pub tally: Tally,
}

fn rejected(operation: &'static str, err: &GovernanceError) {
    tracing::debug!(operation, code = err.code(), error = %err, "operation rejected");
}

/// The governance state machine, generic over its two external collaborators.
pub struct GovernanceEngine<T, C> {
    params: ParameterStore,
    ledger: BalanceLedger,
    registry: ProposalRegistry,
    voting: VotingEngine,
    dispatcher: ExecutionDispatcher<C>,
    token: T,
}

impl<T: TokenService, C: CallTarget> GovernanceEngine<T, C> {
    pub fn new(config: GovernanceConfig, token: T, target: C) -> Self {
        Self {
            params: ParameterStore::new(config),
            ledger: BalanceLedger::new(),
            registry: ProposalRegistry::new(),
            voting: VotingEngine::new(),
            dispatcher: ExecutionDispatcher::new(target),
            token,
        }
    }

    // ── Parameters ──────────────────────────────────────────────────────

    pub fn set_minimum_quorum(
        &mut self,
        caller: &Address,
        value: Amount,
    ) -> Result<(), GovernanceError> {
        self.params
            .set_minimum_quorum(caller, value)
            .inspect_err(|e| rejected("set_minimum_quorum", e))?;
        tracing::info!(%caller, minimum_quorum = %value, "minimum quorum updated");
        Ok(())
    }

    pub fn set_debating_period_duration(
        &mut self,
        caller: &Address,
        value: u64,
    ) -> Result<(), GovernanceError> {
        self.params
            .set_debating_period_duration(caller, value)
            .inspect_err(|e| rejected("set_debating_period_duration", e))?;
        tracing::info!(%caller, debating_period_secs = value, "debating period updated");
        Ok(())
    }

    // ── Balances ────────────────────────────────────────────────────────

    /// Pull `amount` vote tokens from `member` into custody as voting weight.
    pub fn deposit(&mut self, member: &Address, amount: Amount) -> Result<(), GovernanceError> {
        let weight = self
            .ledger
            .deposit(&mut self.token, member, amount)
            .inspect_err(|e| rejected("deposit", e))?;
        tracing::info!(%member, %amount, %weight, "deposit accepted");
        Ok(())
    }

    /// Return `amount` of unfrozen weight to `member`.
    pub fn withdraw(&mut self, member: &Address, amount: Amount) -> Result<(), GovernanceError> {
        let frozen = self.voting.frozen_weight(member, &self.ledger);
        let weight = self
            .ledger
            .withdraw(&mut self.token, member, amount, frozen)
            .inspect_err(|e| rejected("withdraw", e))?;
        tracing::info!(%member, %amount, %weight, "withdrawal paid out");
        Ok(())
    }

    // ── Proposals and votes ─────────────────────────────────────────────

    pub fn create_proposal(
        &mut self,
        caller: &Address,
        target: Address,
        payload: Vec<u8>,
        description: String,
        now: Timestamp,
    ) -> Result<ProposalId, GovernanceError> {
        let proposal = self
            .registry
            .create(&self.params, caller, target, payload, description, now)
            .inspect_err(|e| rejected("create_proposal", e))?;
        tracing::info!(
            proposal = %proposal.id,
            sequence = proposal.sequence,
            target = %proposal.target,
            deadline = %proposal.deadline,
            "proposal created"
        );
        Ok(proposal.id)
    }

    /// Cast `caller`'s full current weight for or against proposal `id`.
    pub fn vote(
        &mut self,
        caller: &Address,
        id: &ProposalId,
        approve: bool,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        let weight = self.ledger.weight_of(caller);
        let choice = Choice::from(approve);
        self.registry
            .get_open(id)
            .ok_or(GovernanceError::ProposalNotFound(*id))
            .and_then(|proposal| self.voting.cast(proposal, caller, choice, weight, now))
            .inspect_err(|e| rejected("vote", e))?;
        tracing::info!(proposal = %id, voter = %caller, ?choice, %weight, "vote recorded");
        Ok(())
    }

    /// Close an expired proposal, dispatching its payload if quorum was met.
    ///
    /// Callable by anyone. If the target refuses the payload nothing is
    /// committed, so the proposal stays open with its voters frozen until a
    /// retry succeeds.
    pub fn finalize(
        &mut self,
        id: &ProposalId,
        now: Timestamp,
    ) -> Result<FinalizeOutcome, GovernanceError> {
        self.try_finalize(id, now)
            .inspect_err(|e| match e {
                GovernanceError::ExecutionFailed { .. } => {
                    tracing::warn!(proposal = %id, error = %e, "dispatch failed, proposal stays open")
                }
                _ => rejected("finalize", e),
            })
    }

    fn try_finalize(
        &mut self,
        id: &ProposalId,
        now: Timestamp,
    ) -> Result<FinalizeOutcome, GovernanceError> {
        let sequence = self
            .registry
            .sequence_of(id)
            .ok_or(GovernanceError::ProposalNotFound(*id))?;
        let proposal = self
            .registry
            .by_sequence(sequence)
            .ok_or(GovernanceError::ProposalNotFound(*id))?;
        if !proposal.is_open() {
            return Err(GovernanceError::ProposalAlreadyClosed(*id));
        }
        if !proposal.has_expired(now) {
            return Err(GovernanceError::VotingStillOpen {
                id: *id,
                deadline: proposal.deadline,
            });
        }

        let (approve_weight, reject_weight) = self
            .voting
            .tally(sequence)
            .map_or((Amount::ZERO, Amount::ZERO), |t| (t.approve, t.reject));
        let quorum_met = approve_weight >= self.params.minimum_quorum();
        if quorum_met {
            self.dispatcher
                .dispatch(*id, &proposal.target, &proposal.payload)?;
        }

        let released = self.voting.release(sequence);
        self.registry.close(sequence);
        tracing::info!(
            proposal = %id,
            executed = quorum_met,
            %approve_weight,
            %reject_weight,
            released,
            "proposal finalized"
        );
        Ok(FinalizeOutcome {
            id: *id,
            executed: quorum_met,
            quorum_met,
            approve_weight,
            reject_weight,
        })
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &GovernanceConfig {
        self.params.config()
    }

    pub fn weight_of(&self, member: &Address) -> Amount {
        self.ledger.weight_of(member)
    }

    pub fn frozen_weight(&self, member: &Address) -> Amount {
        self.voting.frozen_weight(member, &self.ledger)
    }

    /// Number of open proposals `member` has an outstanding vote on.
    pub fn outstanding_votes(&self, member: &Address) -> usize {
        self.voting.outstanding_votes(member)
    }

    /// A proposal in any state, with its tally. `None` if never created.
    pub fn proposal(&self, id: &ProposalId) -> Option<ProposalRecord> {
        let proposal = self.registry.get(id)?;
        let tally = self
            .voting
            .tally(proposal.sequence)
            .cloned()
            .unwrap_or_default();
        Some(ProposalRecord {
            proposal: proposal.clone(),
            tally,
        })
    }

    pub fn choice_of(&self, id: &ProposalId, member: &Address) -> Option<Choice> {
        let sequence = self.registry.sequence_of(id)?;
        self.voting.tally(sequence)?.choice_of(member)
    }

    /// Open proposals in creation order.
    pub fn open_proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.registry.open()
    }

    pub fn proposal_count(&self) -> usize {
        self.registry.len()
    }

    pub fn total_deposited(&self) -> Amount {
        self.ledger.total_deposited()
    }

    pub fn member_count(&self) -> usize {
        self.ledger.member_count()
    }

    /// Number of payloads dispatched so far.
    pub fn dispatched(&self) -> u64 {
        self.dispatcher.dispatched()
    }

    pub fn token(&self) -> &T {
        &self.token
    }

    pub fn token_mut(&mut self) -> &mut T {
        &mut self.token
    }

    pub fn target(&self) -> &C {
        self.dispatcher.target()
    }

    pub fn target_mut(&mut self) -> &mut C {
        self.dispatcher.target_mut()
    }
}
