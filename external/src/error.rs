use quorum_types::{Address, Amount};
use thiserror::Error;

/// Failure reported by the fungible token service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("insufficient allowance: need {needed}, allowed {allowed}")]
    InsufficientAllowance { needed: Amount, allowed: Amount },

    #[error("insufficient balance: need {needed}, available {available}")]
    InsufficientBalance { needed: Amount, available: Amount },

    #[error("transfer rejected: {0}")]
    Rejected(String),
}

/// Failure reported when invoking a call target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("target {target} rejected the payload: {reason}")]
    Rejected { target: Address, reason: String },

    #[error("target {0} is unreachable")]
    Unreachable(Address),
}
