//! Scripted operation runner.
//!
//! A script is a TOML file with a list of `[[step]]` tables replayed against
//! an engine backed by in-memory collaborators. Each step prints one JSON
//! line describing what happened.
//!
//! ```toml
//! start_time = 0
//!
//! [[step]]
//! op = "deposit"
//! member = "alice"
//! amount = 100
//! expect = "ok"
//! ```

use quorum_governance::{
    ErrorKind, FinalizeOutcome, GovernanceConfig, GovernanceEngine, GovernanceError,
    SharedGovernance,
};
use quorum_external::TransferError;
use quorum_nullables::{NullClock, NullTarget, NullToken};
use quorum_types::{Address, Amount, ProposalId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Script {
    /// Clock value before the first step.
    #[serde(default)]
    pub start_time: u64,

    /// Account the in-memory vote token uses as the engine's custody.
    #[serde(default = "default_custody")]
    pub custody: Address,

    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

fn default_custody() -> Address {
    Address::new("quorum-custody")
}

impl Script {
    pub fn from_toml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

#[derive(Debug, Deserialize)]
pub struct Step {
    #[serde(flatten)]
    pub action: Action,

    /// `"ok"`, an error code such as `"balance_frozen"`, or an error kind
    /// such as `"timing"`. Steps without one are never counted as mismatches.
    #[serde(default)]
    pub expect: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Action {
    Mint {
        member: Address,
        amount: u64,
    },
    Approve {
        member: Address,
        amount: u64,
    },
    Deposit {
        member: Address,
        amount: u64,
    },
    Withdraw {
        member: Address,
        amount: u64,
    },
    AddProposal {
        caller: Address,
        target: Address,
        description: String,
        #[serde(default, with = "hex::serde")]
        payload: Vec<u8>,
        /// Name later steps can use instead of the proposal id.
        #[serde(default)]
        label: Option<String>,
    },
    Vote {
        voter: Address,
        proposal: String,
        approve: bool,
    },
    Finish {
        proposal: String,
    },
    SetQuorum {
        caller: Address,
        value: u64,
    },
    SetDuration {
        caller: Address,
        value: u64,
    },
    Advance {
        secs: u64,
    },
    RejectTarget {
        target: Address,
    },
    AcceptTarget {
        target: Address,
    },
    Weight {
        member: Address,
    },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mint { .. } => "mint",
            Self::Approve { .. } => "approve",
            Self::Deposit { .. } => "deposit",
            Self::Withdraw { .. } => "withdraw",
            Self::AddProposal { .. } => "add-proposal",
            Self::Vote { .. } => "vote",
            Self::Finish { .. } => "finish",
            Self::SetQuorum { .. } => "set-quorum",
            Self::SetDuration { .. } => "set-duration",
            Self::Advance { .. } => "advance",
            Self::RejectTarget { .. } => "reject-target",
            Self::AcceptTarget { .. } => "accept-target",
            Self::Weight { .. } => "weight",
        }
    }
}

/// What a successful step produced.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum StepResult {
    Balance {
        member: Address,
        balance: Amount,
    },
    Allowance {
        member: Address,
        allowance: Amount,
    },
    Weight {
        member: Address,
        weight: Amount,
        frozen: Amount,
    },
    Proposal {
        id: ProposalId,
        deadline: Timestamp,
    },
    Finalized(FinalizeOutcome),
    Clock {
        now: Timestamp,
    },
}

/// Why a step failed.
#[derive(Debug, Serialize)]
pub struct Failure {
    pub code: &'static str,
    pub kind: &'static str,
    pub message: String,
}

impl From<GovernanceError> for Failure {
    fn from(err: GovernanceError) -> Self {
        Self {
            code: err.code(),
            kind: err.kind().as_str(),
            message: err.to_string(),
        }
    }
}

/// One output line.
#[derive(Debug, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub op: &'static str,
    pub time: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<StepResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Failure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expect: Option<String>,
    pub matched: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub steps: usize,
    pub mismatches: usize,
    pub elapsed_secs: u64,
}

fn expectation_met(expect: Option<&str>, outcome: &Result<Option<StepResult>, Failure>) -> bool {
    match (expect, outcome) {
        (None, _) => true,
        (Some("ok"), Ok(_)) => true,
        (Some(_), Ok(_)) | (Some("ok"), Err(_)) => false,
        (Some(wanted), Err(failure)) => failure.code == wanted || failure.kind == wanted,
    }
}

/// Replays script steps against a serialized engine.
pub struct Runner {
    governance: SharedGovernance<NullToken, NullTarget>,
    clock: NullClock,
    start: u64,
    labels: HashMap<String, ProposalId>,
}

impl Runner {
    pub fn new(config: GovernanceConfig, start_time: u64, custody: Address) -> Self {
        let engine = GovernanceEngine::new(config, NullToken::new(custody), NullTarget::new());
        Self {
            governance: SharedGovernance::new(engine),
            clock: NullClock::new(start_time),
            start: start_time,
            labels: HashMap::new(),
        }
    }

    /// Run every step, writing one JSON line per step to `out`.
    pub async fn run(&mut self, steps: &[Step], out: &mut impl Write) -> anyhow::Result<Summary> {
        let mut mismatches = 0;
        for (index, step) in steps.iter().enumerate() {
            let outcome = self.apply(&step.action).await;
            let matched = expectation_met(step.expect.as_deref(), &outcome);
            if !matched {
                mismatches += 1;
                tracing::warn!(step = index, op = step.action.name(), "step did not match expectation");
            }
            let (result, error) = match outcome {
                Ok(result) => (result, None),
                Err(failure) => (None, Some(failure)),
            };
            let report = StepReport {
                step: index,
                op: step.action.name(),
                time: self.clock.now(),
                result,
                error,
                expect: step.expect.clone(),
                matched,
            };
            serde_json::to_writer(&mut *out, &report)?;
            writeln!(out)?;
        }
        Ok(Summary {
            steps: steps.len(),
            mismatches,
            elapsed_secs: Timestamp::new(self.start).elapsed_since(self.clock.now()),
        })
    }

    fn resolve(&self, reference: &str) -> Result<ProposalId, Failure> {
        if let Some(id) = self.labels.get(reference) {
            return Ok(*id);
        }
        reference.parse().map_err(|e| Failure {
            code: "unknown_proposal",
            kind: ErrorKind::Validation.as_str(),
            message: format!("{reference} is neither a label nor a proposal id: {e}"),
        })
    }

    async fn weight(&self, member: &Address) -> StepResult {
        StepResult::Weight {
            member: member.clone(),
            weight: self.governance.weight_of(member).await,
            frozen: self.governance.frozen_weight(member).await,
        }
    }

    async fn apply(&mut self, action: &Action) -> Result<Option<StepResult>, Failure> {
        let now = self.clock.now();
        let result = match action {
            Action::Mint { member, amount } => {
                let amount = Amount::from(u128::from(*amount));
                let balance = self
                    .governance
                    .with(|engine| -> Result<Amount, TransferError> {
                        engine.token_mut().mint(member, amount)?;
                        Ok(engine.token().balance_of(member))
                    })
                    .await
                    .map_err(|e| Failure {
                        code: "mint_rejected",
                        kind: ErrorKind::ExternalCollaborator.as_str(),
                        message: e.to_string(),
                    })?;
                StepResult::Balance {
                    member: member.clone(),
                    balance,
                }
            }
            Action::Approve { member, amount } => {
                let amount = Amount::from(u128::from(*amount));
                let allowance = self
                    .governance
                    .with(|engine| {
                        engine.token_mut().approve(member, amount);
                        engine.token().allowance(member)
                    })
                    .await;
                StepResult::Allowance {
                    member: member.clone(),
                    allowance,
                }
            }
            Action::Deposit { member, amount } => {
                self.governance
                    .deposit(member, Amount::from(u128::from(*amount)))
                    .await?;
                self.weight(member).await
            }
            Action::Withdraw { member, amount } => {
                self.governance
                    .withdraw(member, Amount::from(u128::from(*amount)))
                    .await?;
                self.weight(member).await
            }
            Action::AddProposal {
                caller,
                target,
                description,
                payload,
                label,
            } => {
                let id = self
                    .governance
                    .create_proposal(
                        caller,
                        target.clone(),
                        payload.clone(),
                        description.clone(),
                        now,
                    )
                    .await?;
                if let Some(label) = label {
                    self.labels.insert(label.clone(), id);
                }
                let deadline = self
                    .governance
                    .proposal(&id)
                    .await
                    .map_or(now, |record| record.proposal.deadline);
                StepResult::Proposal { id, deadline }
            }
            Action::Vote {
                voter,
                proposal,
                approve,
            } => {
                let id = self.resolve(proposal)?;
                self.governance.vote(voter, &id, *approve, now).await?;
                self.weight(voter).await
            }
            Action::Finish { proposal } => {
                let id = self.resolve(proposal)?;
                StepResult::Finalized(self.governance.finalize(&id, now).await?)
            }
            Action::SetQuorum { caller, value } => {
                self.governance
                    .set_minimum_quorum(caller, Amount::from(u128::from(*value)))
                    .await?;
                return Ok(None);
            }
            Action::SetDuration { caller, value } => {
                self.governance
                    .set_debating_period_duration(caller, *value)
                    .await?;
                return Ok(None);
            }
            Action::Advance { secs } => {
                self.clock.advance(*secs);
                StepResult::Clock {
                    now: self.clock.now(),
                }
            }
            Action::RejectTarget { target } => {
                self.governance
                    .with(|engine| engine.target_mut().reject(target))
                    .await;
                return Ok(None);
            }
            Action::AcceptTarget { target } => {
                self.governance
                    .with(|engine| engine.target_mut().accept(target))
                    .await;
                return Ok(None);
            }
            Action::Weight { member } => self.weight(member).await,
        };
        Ok(Some(result))
    }
}
