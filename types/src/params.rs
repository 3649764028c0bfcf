//! Governance parameters tunable by the admin role.

use crate::amount::Amount;
use serde::{Deserialize, Serialize};

/// The two mutable governance parameters.
///
/// Both values are always positive; the parameter store rejects zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceParams {
    /// Total approve weight a proposal needs to pass.
    pub minimum_quorum: Amount,

    /// Length of the voting window. Snapshotted into each proposal at creation,
    /// so later changes never move an existing deadline.
    pub debating_period_secs: u64,
}

impl GovernanceParams {
    pub fn new(minimum_quorum: Amount, debating_period_secs: u64) -> Self {
        Self {
            minimum_quorum,
            debating_period_secs,
        }
    }
}

/// Defaults match the reference deployment: quorum of 10 weight units and a
/// 60 000 second debating period.
impl Default for GovernanceParams {
    fn default() -> Self {
        Self {
            minimum_quorum: Amount::new(10),
            debating_period_secs: 60_000,
        }
    }
}
