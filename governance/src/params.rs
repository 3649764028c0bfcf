//! Governance configuration and the admin-gated parameter store.

use crate::error::{GovernanceError, Role};
use quorum_crypto::derive_proposal_id;
use quorum_types::{Address, Amount, GovernanceParams, ProposalId, Timestamp};
use serde::{Deserialize, Serialize};

/// How proposal identifiers are derived from proposal content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdScheme {
    /// Hash of target, description, payload and creation time. Identical
    /// content is only a duplicate when submitted at the same instant.
    #[default]
    Timestamped,
    /// Hash of target, description and payload. Identical content is always
    /// a duplicate, no matter when it is resubmitted.
    ContentOnly,
}

impl IdScheme {
    pub fn derive(
        &self,
        target: &Address,
        description: &str,
        payload: &[u8],
        now: Timestamp,
    ) -> ProposalId {
        let created_at = match self {
            Self::Timestamped => Some(now),
            Self::ContentOnly => None,
        };
        derive_proposal_id(target, description, payload, created_at)
    }
}

/// Everything an engine instance needs to know about its own governance.
///
/// Held by value inside each engine, so independent engines can coexist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// The only identity allowed to create proposals.
    pub proposer: Address,
    /// The only identity allowed to change `params`.
    pub admin: Address,
    /// Address of the vote token backing deposits.
    pub vote_token: Address,
    pub params: GovernanceParams,
    #[serde(default)]
    pub id_scheme: IdScheme,
}

impl GovernanceConfig {
    /// Build a configuration, rejecting a zero quorum or debating period.
    pub fn new(
        proposer: Address,
        admin: Address,
        vote_token: Address,
        params: GovernanceParams,
    ) -> Result<Self, GovernanceError> {
        validate_quorum(params.minimum_quorum)?;
        validate_duration(params.debating_period_secs)?;
        Ok(Self {
            proposer,
            admin,
            vote_token,
            params,
            id_scheme: IdScheme::default(),
        })
    }

    pub fn with_id_scheme(mut self, id_scheme: IdScheme) -> Self {
        self.id_scheme = id_scheme;
        self
    }
}

fn validate_quorum(value: Amount) -> Result<(), GovernanceError> {
    if value.is_zero() {
        return Err(GovernanceError::InvalidParameter {
            name: "minimum quorum",
        });
    }
    Ok(())
}

fn validate_duration(value: u64) -> Result<(), GovernanceError> {
    if value == 0 {
        return Err(GovernanceError::InvalidParameter {
            name: "debating period duration",
        });
    }
    Ok(())
}

/// Owns the [`GovernanceConfig`] and guards every change to it.
#[derive(Clone, Debug)]
pub struct ParameterStore {
    config: GovernanceConfig,
}

impl ParameterStore {
    pub fn new(config: GovernanceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GovernanceConfig {
        &self.config
    }

    pub fn minimum_quorum(&self) -> Amount {
        self.config.params.minimum_quorum
    }

    pub fn debating_period_duration(&self) -> u64 {
        self.config.params.debating_period_secs
    }

    pub fn proposer(&self) -> &Address {
        &self.config.proposer
    }

    pub fn admin(&self) -> &Address {
        &self.config.admin
    }

    pub fn id_scheme(&self) -> IdScheme {
        self.config.id_scheme
    }

    /// Set the approve weight a proposal needs to pass.
    ///
    /// A zero value is rejected before the caller is looked at, so it fails
    /// with `InvalidParameter` whoever sends it.
    pub fn set_minimum_quorum(
        &mut self,
        caller: &Address,
        value: Amount,
    ) -> Result<(), GovernanceError> {
        validate_quorum(value)?;
        self.ensure_role(caller, Role::Admin)?;
        self.config.params.minimum_quorum = value;
        Ok(())
    }

    /// Set the voting window length for proposals created from now on.
    pub fn set_debating_period_duration(
        &mut self,
        caller: &Address,
        value: u64,
    ) -> Result<(), GovernanceError> {
        validate_duration(value)?;
        self.ensure_role(caller, Role::Admin)?;
        self.config.params.debating_period_secs = value;
        Ok(())
    }

    /// Fail with `Unauthorized` unless `caller` holds `role`.
    pub fn ensure_role(&self, caller: &Address, role: Role) -> Result<(), GovernanceError> {
        let holder = match role {
            Role::Proposer => &self.config.proposer,
            Role::Admin => &self.config.admin,
        };
        if caller != holder {
            return Err(GovernanceError::Unauthorized {
                caller: caller.clone(),
                role,
            });
        }
        Ok(())
    }
}
