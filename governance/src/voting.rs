//! Weighted voting and the frozen-weight rule.
//!
//! A vote counts the voter's full deposited weight at the moment it is cast.
//! From then until the proposal closes, the voter's whole balance is frozen:
//! any outstanding vote blocks every withdrawal, however many proposals are
//! involved and however much was deposited afterwards.

use crate::error::GovernanceError;
use crate::ledger::BalanceLedger;
use crate::proposal::{Proposal, ProposalSeq};
use quorum_types::{Address, Amount, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A voter's decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    Approve,
    Reject,
}

impl From<bool> for Choice {
    fn from(approve: bool) -> Self {
        if approve {
            Self::Approve
        } else {
            Self::Reject
        }
    }
}

/// Accumulated votes on one proposal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub approve: Amount,
    pub reject: Amount,
    /// Every voter with the choice they recorded. A voter appears at most once.
    pub voters: BTreeMap<Address, Choice>,
}

impl Tally {
    pub fn quorum_met(&self, minimum_quorum: Amount) -> bool {
        self.approve >= minimum_quorum
    }

    pub fn choice_of(&self, voter: &Address) -> Option<Choice> {
        self.voters.get(voter).copied()
    }
}

/// Owns every tally and each member's set of unresolved votes.
#[derive(Debug, Default)]
pub struct VotingEngine {
    tallies: HashMap<ProposalSeq, Tally>,
    outstanding: HashMap<Address, BTreeSet<ProposalSeq>>,
}

impl VotingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Weight of `member` that cannot be withdrawn right now.
    pub fn frozen_weight(&self, member: &Address, ledger: &BalanceLedger) -> Amount {
        if self.outstanding_votes(member) > 0 {
            ledger.weight_of(member)
        } else {
            Amount::ZERO
        }
    }

    /// Number of still-open proposals `member` has voted on.
    pub fn outstanding_votes(&self, member: &Address) -> usize {
        self.outstanding.get(member).map_or(0, BTreeSet::len)
    }

    pub fn tally(&self, sequence: ProposalSeq) -> Option<&Tally> {
        self.tallies.get(&sequence)
    }

    /// Record `voter`'s `choice` with `weight` on an open proposal.
    ///
    /// Checks run in a fixed order: deadline, weight, then double voting.
    pub fn cast(
        &mut self,
        proposal: &Proposal,
        voter: &Address,
        choice: Choice,
        weight: Amount,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        if !proposal.is_open() {
            return Err(GovernanceError::ProposalNotFound(proposal.id));
        }
        if proposal.has_expired(now) {
            return Err(GovernanceError::VotingClosed {
                id: proposal.id,
                deadline: proposal.deadline,
            });
        }
        if weight.is_zero() {
            return Err(GovernanceError::InsufficientWeight(voter.clone()));
        }

        let tally = self.tallies.entry(proposal.sequence).or_default();
        if tally.voters.contains_key(voter) {
            return Err(GovernanceError::DuplicateVote {
                id: proposal.id,
                voter: voter.clone(),
            });
        }
        let side = match choice {
            Choice::Approve => &mut tally.approve,
            Choice::Reject => &mut tally.reject,
        };
        *side = side
            .checked_add(weight)
            .ok_or(GovernanceError::Overflow("vote tally"))?;
        tally.voters.insert(voter.clone(), choice);

        self.outstanding
            .entry(voter.clone())
            .or_default()
            .insert(proposal.sequence);
        Ok(())
    }

    /// Drop `sequence` from every voter's outstanding set.
    ///
    /// The tally itself is kept for queries. Returns how many voters were released.
    pub(crate) fn release(&mut self, sequence: ProposalSeq) -> usize {
        let Some(tally) = self.tallies.get(&sequence) else {
            return 0;
        };
        for voter in tally.voters.keys() {
            if let Some(pending) = self.outstanding.get_mut(voter) {
                pending.remove(&sequence);
                if pending.is_empty() {
                    self.outstanding.remove(voter);
                }
            }
        }
        tally.voters.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposal::ProposalStatus;
    use quorum_types::ProposalId;

    fn proposal(sequence: ProposalSeq, deadline: u64) -> Proposal {
        Proposal {
            id: ProposalId::new([sequence as u8 + 1; 32]),
            sequence,
            target: Address::new("target"),
            payload: vec![],
            description: String::new(),
            created_at: Timestamp::EPOCH,
            deadline: Timestamp::new(deadline),
            status: ProposalStatus::Open,
        }
    }

    #[test]
    fn choice_from_bool() {
        assert_eq!(Choice::from(true), Choice::Approve);
        assert_eq!(Choice::from(false), Choice::Reject);
    }

    #[test]
    fn cast_accumulates_by_side() {
        let mut voting = VotingEngine::new();
        let p = proposal(0, 100);
        voting
            .cast(&p, &Address::new("a"), Choice::Approve, Amount::new(60), Timestamp::new(1))
            .unwrap();
        voting
            .cast(&p, &Address::new("b"), Choice::Reject, Amount::new(30), Timestamp::new(2))
            .unwrap();
        let tally = voting.tally(0).unwrap();
        assert_eq!(tally.approve, Amount::new(60));
        assert_eq!(tally.reject, Amount::new(30));
        assert!(tally.quorum_met(Amount::new(60)));
        assert!(!tally.quorum_met(Amount::new(61)));
    }

    #[test]
    fn deadline_is_exclusive() {
        let mut voting = VotingEngine::new();
        let p = proposal(0, 100);
        let err = voting
            .cast(&p, &Address::new("a"), Choice::Approve, Amount::new(1), Timestamp::new(100))
            .unwrap_err();
        assert!(matches!(err, GovernanceError::VotingClosed { .. }));
        assert!(voting.tally(0).is_none());
    }

    #[test]
    fn zero_weight_rejected_before_duplicate_check() {
        let mut voting = VotingEngine::new();
        let p = proposal(0, 100);
        let a = Address::new("a");
        assert_eq!(
            voting.cast(&p, &a, Choice::Approve, Amount::ZERO, Timestamp::new(1)),
            Err(GovernanceError::InsufficientWeight(a.clone()))
        );
        assert_eq!(voting.outstanding_votes(&a), 0);
    }

    #[test]
    fn double_vote_rejected_even_with_other_choice() {
        let mut voting = VotingEngine::new();
        let p = proposal(0, 100);
        let a = Address::new("a");
        voting
            .cast(&p, &a, Choice::Approve, Amount::new(5), Timestamp::new(1))
            .unwrap();
        let err = voting
            .cast(&p, &a, Choice::Reject, Amount::new(5), Timestamp::new(2))
            .unwrap_err();
        assert!(matches!(err, GovernanceError::DuplicateVote { .. }));
        let tally = voting.tally(0).unwrap();
        assert_eq!(tally.reject, Amount::ZERO);
        assert_eq!(tally.choice_of(&a), Some(Choice::Approve));
    }

    #[test]
    fn release_unfreezes_only_that_proposal() {
        let mut voting = VotingEngine::new();
        let a = Address::new("a");
        let first = proposal(0, 100);
        let second = proposal(1, 100);
        voting
            .cast(&first, &a, Choice::Approve, Amount::new(5), Timestamp::new(1))
            .unwrap();
        voting
            .cast(&second, &a, Choice::Reject, Amount::new(5), Timestamp::new(1))
            .unwrap();
        assert_eq!(voting.outstanding_votes(&a), 2);

        assert_eq!(voting.release(0), 1);
        assert_eq!(voting.outstanding_votes(&a), 1);
        assert_eq!(voting.release(1), 1);
        assert_eq!(voting.outstanding_votes(&a), 0);
        assert!(voting.tally(0).is_some());
    }

    #[test]
    fn release_without_votes_is_noop() {
        let mut voting = VotingEngine::new();
        assert_eq!(voting.release(7), 0);
    }
}
