use quorum_external::{DispatchError, TransferError};
use quorum_types::{Address, Amount, ProposalId, Timestamp};
use std::fmt;
use thiserror::Error;

/// A privileged role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// May create proposals.
    Proposer,
    /// May change quorum and debating period.
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Proposer => write!(f, "proposer"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

/// Every way a governance operation can be rejected.
///
/// A rejected operation never changes state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GovernanceError {
    #[error("{caller} is not the {role}")]
    Unauthorized { caller: Address, role: Role },

    #[error("{name} must be greater than zero")]
    InvalidParameter { name: &'static str },

    #[error("invalid amount {requested}: deposited weight is {deposited}")]
    InvalidAmount { requested: Amount, deposited: Amount },

    #[error("balance frozen: requested {requested}, withdrawable {withdrawable}")]
    BalanceFrozen {
        requested: Amount,
        withdrawable: Amount,
    },

    #[error("vote token refused to take {amount} from {member}: {source}")]
    TransferUnauthorized {
        member: Address,
        amount: Amount,
        source: TransferError,
    },

    #[error("vote token failed to return {amount} to {member}: {source}")]
    TransferFailed {
        member: Address,
        amount: Amount,
        source: TransferError,
    },

    #[error("proposal {0} already exists")]
    DuplicateProposal(ProposalId),

    #[error("proposal {0} not found")]
    ProposalNotFound(ProposalId),

    #[error("voting on proposal {id} closed at {deadline}")]
    VotingClosed { id: ProposalId, deadline: Timestamp },

    #[error("{0} has no voting weight")]
    InsufficientWeight(Address),

    #[error("{voter} already voted on proposal {id}")]
    DuplicateVote { id: ProposalId, voter: Address },

    #[error("proposal {0} is already closed")]
    ProposalAlreadyClosed(ProposalId),

    #[error("voting on proposal {id} is open until {deadline}")]
    VotingStillOpen { id: ProposalId, deadline: Timestamp },

    #[error("executing proposal {id} failed: {source}")]
    ExecutionFailed { id: ProposalId, source: DispatchError },

    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),
}

/// Coarse classification of [`GovernanceError`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller lacks the required role.
    Authorization,
    /// Malformed input, or a reference to something that does not exist.
    Validation,
    /// Would violate a uniqueness invariant.
    Conflict,
    /// Outside the operation's valid time window.
    Timing,
    /// Insufficient economic standing.
    Resource,
    /// The vote token or a call target failed. Retry after intervening out of band.
    ExternalCollaborator,
    /// A value would exceed its representable range.
    Arithmetic,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authorization => "authorization",
            Self::Validation => "validation",
            Self::Conflict => "conflict",
            Self::Timing => "timing",
            Self::Resource => "resource",
            Self::ExternalCollaborator => "external_collaborator",
            Self::Arithmetic => "arithmetic",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl GovernanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Authorization,
            Self::InvalidParameter { .. }
            | Self::InvalidAmount { .. }
            | Self::ProposalNotFound(_) => ErrorKind::Validation,
            Self::DuplicateProposal(_)
            | Self::DuplicateVote { .. }
            | Self::ProposalAlreadyClosed(_) => ErrorKind::Conflict,
            Self::VotingClosed { .. } | Self::VotingStillOpen { .. } => ErrorKind::Timing,
            Self::BalanceFrozen { .. }
            | Self::InsufficientWeight(_)
            | Self::TransferUnauthorized { .. } => ErrorKind::Resource,
            Self::TransferFailed { .. } | Self::ExecutionFailed { .. } => {
                ErrorKind::ExternalCollaborator
            }
            Self::Overflow(_) => ErrorKind::Arithmetic,
        }
    }

    /// Stable snake_case name of the variant, used in logs and script output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "unauthorized",
            Self::InvalidParameter { .. } => "invalid_parameter",
            Self::InvalidAmount { .. } => "invalid_amount",
            Self::BalanceFrozen { .. } => "balance_frozen",
            Self::TransferUnauthorized { .. } => "transfer_unauthorized",
            Self::TransferFailed { .. } => "transfer_failed",
            Self::DuplicateProposal(_) => "duplicate_proposal",
            Self::ProposalNotFound(_) => "proposal_not_found",
            Self::VotingClosed { .. } => "voting_closed",
            Self::InsufficientWeight(_) => "insufficient_weight",
            Self::DuplicateVote { .. } => "duplicate_vote",
            Self::ProposalAlreadyClosed(_) => "proposal_already_closed",
            Self::VotingStillOpen { .. } => "voting_still_open",
            Self::ExecutionFailed { .. } => "execution_failed",
            Self::Overflow(_) => "overflow",
        }
    }
}
