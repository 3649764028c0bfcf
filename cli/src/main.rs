//! quorum: command line front end for the governance engine.

mod script;

use anyhow::Context;
use clap::Parser;
use quorum_governance::{GovernanceSettings, IdScheme};
use quorum_types::{Address, Timestamp};
use quorum_utils::{format_duration, init_tracing, LogFormat};
use script::{Runner, Script};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quorum", about = "Token-weighted governance engine tools")]
struct Cli {
    /// Log level: "trace", "debug", "info", "warn", "error".
    /// Overrides the settings file when given.
    #[arg(long, env = "QUORUM_LOG_LEVEL")]
    log_level: Option<String>,

    /// Emit logs as JSON lines instead of human-readable text.
    #[arg(long, env = "QUORUM_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Print the id a proposal with this content would receive.
    #[command(name = "proposal-id")]
    ProposalId {
        /// Address the payload is dispatched to.
        #[arg(long)]
        target: String,

        #[arg(long)]
        description: String,

        /// Payload as hex, with or without a 0x prefix.
        #[arg(long, default_value = "")]
        payload: String,

        /// Creation time. Without it the content-only scheme is used.
        #[arg(long)]
        timestamp: Option<u64>,
    },

    /// Replay a script of operations against an in-memory engine.
    Run {
        /// Governance settings (TOML).
        #[arg(long, env = "QUORUM_CONFIG")]
        config: PathBuf,

        /// Operation script (TOML).
        #[arg(long)]
        script: PathBuf,
    },
}

fn log_format(json: bool, fallback: LogFormat) -> LogFormat {
    if json {
        LogFormat::Json
    } else {
        fallback
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::ProposalId {
            target,
            description,
            payload,
            timestamp,
        } => {
            init_tracing(
                cli.log_level.as_deref().unwrap_or("warn"),
                log_format(cli.log_json, LogFormat::Human),
            );
            let target = Address::parse(target).context("invalid --target")?;
            let payload = hex::decode(payload.strip_prefix("0x").unwrap_or(&payload))
                .context("--payload is not valid hex")?;
            let (scheme, now) = match timestamp {
                Some(secs) => (IdScheme::Timestamped, Timestamp::new(secs)),
                None => (IdScheme::ContentOnly, Timestamp::EPOCH),
            };
            println!("{}", scheme.derive(&target, &description, &payload, now));
        }
        Command::Run { config, script } => {
            let settings = GovernanceSettings::from_toml_file(&config)
                .with_context(|| format!("loading settings from {}", config.display()))?;
            init_tracing(
                cli.log_level.as_deref().unwrap_or(&settings.log_level),
                log_format(cli.log_json, settings.log_format),
            );
            let config = settings.into_config().context("invalid settings")?;
            tracing::info!(
                proposer = %config.proposer,
                admin = %config.admin,
                minimum_quorum = %config.params.minimum_quorum,
                debating_period = %format_duration(config.params.debating_period_secs),
                "governance configured"
            );

            let script = Script::from_toml_file(&script)
                .with_context(|| format!("loading script from {}", script.display()))?;
            let mut runner = Runner::new(config, script.start_time, script.custody.clone());
            let mut stdout = std::io::stdout().lock();
            let summary = runner.run(&script.steps, &mut stdout).await?;
            tracing::info!(
                steps = summary.steps,
                mismatches = summary.mismatches,
                elapsed = %format_duration(summary.elapsed_secs),
                "script finished"
            );
            if summary.mismatches > 0 {
                anyhow::bail!(
                    "{} of {} steps did not match their expectation",
                    summary.mismatches,
                    summary.steps
                );
            }
        }
    }
    Ok(())
}
