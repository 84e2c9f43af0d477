//! gatectl: command-line access to a file-backed issuance gate.
//!
//! Usage:
//!   gatectl --state gate.json init --config gate.toml
//!   gatectl --state gate.json check-issue --outstanding 900 --quantity 100 --caller 0x… --direct
//!   gatectl --state gate.json set-callers --as 0xOWNER --callers 0xA,0xB --statuses true,false
//!   gatectl scenarios

mod scenarios;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use supplygate_audit::InMemoryEventLog;
use supplygate_config::{open_gate, GateConfig};
use supplygate_contracts::{
    error::GateResult,
    identity::Address,
    quantity::{parse_quantity, Quantity},
    request::{CallContext, IssuanceRequest},
};
use supplygate_core::CallerAuthorizationGate;
use supplygate_store::FileStore;

// ── CLI definition ────────────────────────────────────────────────────────────

/// Supply-cap and caller-authorization gate for share issuance.
#[derive(Parser)]
#[command(name = "gatectl", about = "Administer and query a supplygate issuance gate")]
struct Cli {
    /// JSON file holding the gate's persisted state.
    #[arg(long, global = true, default_value = "gate-state.json")]
    state: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the gate from a TOML config (no-op if the state file exists).
    Init {
        #[arg(long)]
        config: PathBuf,
    },
    /// Print the current snapshot as JSON.
    Show,
    /// Run the pre-issue check.
    CheckIssue {
        #[arg(long, value_parser = parse_quantity)]
        outstanding: Quantity,
        #[arg(long, value_parser = parse_quantity)]
        quantity: Quantity,
        #[arg(long)]
        caller: Address,
        /// The caller originated the request with no intermediary.
        #[arg(long)]
        direct: bool,
    },
    /// Run the pre-redeem check.
    CheckRedeem {
        #[arg(long)]
        caller: Address,
        #[arg(long)]
        direct: bool,
    },
    /// Change the supply cap.
    SetCapacity {
        #[arg(long = "as", value_name = "OWNER")]
        actor: Address,
        #[arg(long, value_parser = parse_quantity)]
        capacity: Quantity,
    },
    /// Set allow-list status for several callers at once.
    SetCallers {
        #[arg(long = "as", value_name = "OWNER")]
        actor: Address,
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        callers: Vec<Address>,
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        statuses: Vec<bool>,
    },
    /// Turn open access on or off.
    SetOpenAccess {
        #[arg(long = "as", value_name = "OWNER")]
        actor: Address,
        #[arg(long, action = ArgAction::Set)]
        enabled: bool,
    },
    /// Hand the gate to a new owner.
    TransferOwnership {
        #[arg(long = "as", value_name = "OWNER")]
        actor: Address,
        #[arg(long)]
        new_owner: Address,
    },
    /// Run the built-in walkthrough against an in-memory gate.
    Scenarios,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    // RUST_LOG=debug for per-check logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    if let Command::Scenarios = cli.command {
        return match scenarios::run_all() {
            Ok(0) => {
                println!("All scenarios behaved as expected.");
                ExitCode::SUCCESS
            }
            Ok(n) => {
                eprintln!("{} scenario step(s) did not match expectations", n);
                ExitCode::FAILURE
            }
            Err(e) => {
                eprintln!("error: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let log = InMemoryEventLog::new();
    let result = run(&cli, &log);

    // Whatever was committed before a failure is still worth showing.
    print_events(&log);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, log: &InMemoryEventLog) -> GateResult<()> {
    debug!(state = %cli.state.display(), "opening gate state");
    let store = Box::new(FileStore::new(&cli.state));
    let sink = Box::new(log.clone());

    if let Command::Init { config } = &cli.command {
        let config = GateConfig::from_file(config)?;
        let gate = open_gate(&config, store, sink)?;
        println!("gate {} ready at {}", gate.gate_id(), cli.state.display());
        return Ok(());
    }

    let gate = CallerAuthorizationGate::restore(store, sink)?;

    match &cli.command {
        Command::Show => {
            let snapshot = gate.snapshot()?;
            println!(
                "{}",
                serde_json::to_string_pretty(&snapshot).unwrap_or_else(|e| e.to_string())
            );
        }
        Command::CheckIssue {
            outstanding,
            quantity,
            caller,
            direct,
        } => {
            gate.check_issuance(&IssuanceRequest {
                outstanding: *outstanding,
                quantity: *quantity,
                context: CallContext {
                    caller: *caller,
                    direct: *direct,
                },
            })?;
            println!("issuance permitted");
        }
        Command::CheckRedeem { caller, direct } => {
            gate.check_redemption(&CallContext {
                caller: *caller,
                direct: *direct,
            })?;
            println!("redemption permitted");
        }
        Command::SetCapacity { actor, capacity } => gate.set_capacity(actor, *capacity)?,
        Command::SetCallers {
            actor,
            callers,
            statuses,
        } => gate.set_caller_statuses(actor, callers, statuses)?,
        Command::SetOpenAccess { actor, enabled } => gate.set_open_access(actor, *enabled)?,
        Command::TransferOwnership { actor, new_owner } => {
            gate.transfer_ownership(actor, *new_owner)?
        }
        Command::Init { .. } | Command::Scenarios => {}
    }

    Ok(())
}

/// One JSON object per line, in publish order.
fn print_events(log: &InMemoryEventLog) {
    let Ok(exported) = log.export_log() else {
        return;
    };
    for entry in &exported.events {
        match serde_json::to_string(&entry.record) {
            Ok(line) => println!("{}", line),
            Err(e) => eprintln!("failed to render event: {}", e),
        }
    }
}
