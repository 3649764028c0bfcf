//! Balance ledger: deposited voting weight per member.
//!
//! Weight is backed 1:1 by vote tokens held in the engine's custody. The
//! ledger never decides what is frozen; callers pass the frozen amount in.

use crate::error::GovernanceError;
use quorum_external::TokenService;
use quorum_types::{Address, Amount};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A member's ledger record, created on first deposit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub deposited: Amount,
}

/// Tracks each member's deposited weight.
#[derive(Debug, Default)]
pub struct BalanceLedger {
    members: HashMap<Address, Member>,
    total: Amount,
}

impl BalanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current voting weight of `member` (zero if it never deposited).
    pub fn weight_of(&self, member: &Address) -> Amount {
        self.members
            .get(member)
            .map(|m| m.deposited)
            .unwrap_or_default()
    }

    pub fn member(&self, member: &Address) -> Option<&Member> {
        self.members.get(member)
    }

    /// Sum of all deposited weight (equals the custody balance).
    pub fn total_deposited(&self) -> Amount {
        self.total
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Pull `amount` from `member` through the vote token and credit it as weight.
    ///
    /// Returns the member's new weight.
    pub fn deposit<T: TokenService>(
        &mut self,
        token: &mut T,
        member: &Address,
        amount: Amount,
    ) -> Result<Amount, GovernanceError> {
        let weight = self
            .weight_of(member)
            .checked_add(amount)
            .ok_or(GovernanceError::Overflow("member weight"))?;
        let total = self
            .total
            .checked_add(amount)
            .ok_or(GovernanceError::Overflow("total deposits"))?;

        token
            .transfer_in(member, amount)
            .map_err(|source| GovernanceError::TransferUnauthorized {
                member: member.clone(),
                amount,
                source,
            })?;

        self.members.entry(member.clone()).or_default().deposited = weight;
        self.total = total;
        Ok(weight)
    }

    /// Return `amount` of unfrozen weight to `member` through the vote token.
    ///
    /// The debit is applied only after the token confirms the payout, so a
    /// failing transfer leaves the ledger untouched. Returns the new weight.
    pub fn withdraw<T: TokenService>(
        &mut self,
        token: &mut T,
        member: &Address,
        amount: Amount,
        frozen: Amount,
    ) -> Result<Amount, GovernanceError> {
        let deposited = self.weight_of(member);
        if amount.is_zero() || amount > deposited {
            return Err(GovernanceError::InvalidAmount {
                requested: amount,
                deposited,
            });
        }
        let withdrawable = deposited.saturating_sub(frozen);
        if amount > withdrawable {
            return Err(GovernanceError::BalanceFrozen {
                requested: amount,
                withdrawable,
            });
        }

        token
            .transfer_out(member, amount)
            .map_err(|source| GovernanceError::TransferFailed {
                member: member.clone(),
                amount,
                source,
            })?;

        let remaining = deposited.saturating_sub(amount);
        if let Some(record) = self.members.get_mut(member) {
            record.deposited = remaining;
        }
        self.total = self.total.saturating_sub(amount);
        Ok(remaining)
    }
}
