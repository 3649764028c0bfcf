//! Governance deployment settings with TOML file support.

use crate::params::{GovernanceConfig, IdScheme};
use quorum_types::{Address, Amount, GovernanceParams};
use quorum_utils::LogFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Everything needed to stand up a governance engine.
///
/// Loaded from TOML via [`GovernanceSettings::from_toml_file`]. Only the
/// three addresses are required; the rest falls back to the reference
/// deployment values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceSettings {
    /// Identity allowed to create proposals (the chairperson).
    pub proposer: Address,

    /// Identity allowed to change quorum and debating period.
    pub admin: Address,

    /// Address of the vote token.
    pub vote_token: Address,

    /// Approve weight a proposal needs to pass.
    #[serde(default = "default_minimum_quorum")]
    pub minimum_quorum: u64,

    /// Voting window length in seconds.
    #[serde(default = "default_debating_period_secs")]
    pub debating_period_secs: u64,

    #[serde(default)]
    pub id_scheme: IdScheme,

    /// `"error"`, `"warn"`, `"info"`, `"debug"` or `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_minimum_quorum() -> u64 {
    10
}

fn default_debating_period_secs() -> u64 {
    60_000
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl GovernanceSettings {
    /// Settings with the given roles and default parameters.
    pub fn new(proposer: Address, admin: Address, vote_token: Address) -> Self {
        Self {
            proposer,
            admin,
            vote_token,
            minimum_quorum: default_minimum_quorum(),
            debating_period_secs: default_debating_period_secs(),
            id_scheme: IdScheme::default(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }

    /// Load settings from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse settings from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject a zero quorum or debating period.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.minimum_quorum == 0 {
            return Err(SettingsError::Invalid(
                "minimum_quorum must be greater than zero".into(),
            ));
        }
        if self.debating_period_secs == 0 {
            return Err(SettingsError::Invalid(
                "debating_period_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Validate and build the runtime configuration.
    pub fn into_config(self) -> Result<GovernanceConfig, SettingsError> {
        self.validate()?;
        let params = GovernanceParams::new(
            Amount::new(u128::from(self.minimum_quorum)),
            self.debating_period_secs,
        );
        let config = GovernanceConfig::new(self.proposer, self.admin, self.vote_token, params)
            .map_err(|e| SettingsError::Invalid(e.to_string()))?;
        Ok(config.with_id_scheme(self.id_scheme))
    }
}
