//! Token-weighted governance.
//!
//! Members deposit vote tokens to gain voting weight, a designated proposer
//! submits proposals carrying an opaque action for some target, members vote
//! with their full weight, and once the debating period ends anyone may
//! finalize: if approve weight reached the quorum the action is dispatched.
//!
//! Key rule: a member's whole balance is frozen while any vote they cast is
//! still unresolved.
//!
//! [`GovernanceEngine`] is the single-threaded state machine;
//! [`SharedGovernance`] serializes access to it from concurrent callers.

pub mod dispatch;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod params;
pub mod proposal;
pub mod settings;
pub mod shared;
pub mod voting;

pub use dispatch::ExecutionDispatcher;
pub use engine::{FinalizeOutcome, GovernanceEngine, ProposalRecord};
pub use error::{ErrorKind, GovernanceError, Role};
pub use ledger::{BalanceLedger, Member};
pub use params::{GovernanceConfig, IdScheme, ParameterStore};
pub use proposal::{Proposal, ProposalRegistry, ProposalSeq, ProposalStatus};
pub use settings::{GovernanceSettings, SettingsError};
pub use shared::SharedGovernance;
pub use voting::{Choice, Tally, VotingEngine};
