//! rangerctl: converge declared Apache Ranger policies against Ranger Admin.
//!
//! Works on a JSON state document holding the declared policies and the ids
//! of the remote policies they manage.
//!
//! Usage:
//!   rangerctl --config gateway.toml apply
//!   rangerctl --config gateway.toml refresh
//!   rangerctl --config gateway.toml import 42
//!   rangerctl --config gateway.toml show --service hive_prod --name sales-read

mod commands;
mod state;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ranger_contracts::error::{RangerError, RangerResult};
use ranger_gateway::{GatewayConfig, HttpPolicyGateway};
use ranger_reconcile::Reconciler;

use crate::state::StateDocument;

// ── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "rangerctl",
    about = "Apply declared Ranger policies against Ranger Admin",
    long_about = "Reads declared Ranger policies from a JSON state document, converges the\n\
                  remote policies onto them through the Ranger Admin public v2 API, and\n\
                  records the resulting ids back into the document."
)]
struct Cli {
    /// Gateway configuration (TOML: endpoint, username, password, ...).
    #[arg(long, global = true, default_value = "gateway.toml")]
    config: PathBuf,

    /// Declared-state document.
    #[arg(long, global = true, default_value = "rangerctl.state.json")]
    state: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create, update or replace remote policies to match the document.
    Apply,
    /// Refresh tracked policies from the remote service.
    Refresh,
    /// Delete every tracked remote policy.
    Destroy,
    /// Start tracking an existing remote policy.
    Import {
        /// Remote policy id.
        id: String,
    },
    /// Print one remote policy as declared JSON.
    Show {
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        service: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug for request-level output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("rangerctl: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> RangerResult<()> {
    let config = GatewayConfig::from_file(&cli.config)?;
    let reconciler = Reconciler::new(Box::new(HttpPolicyGateway::from_config(&config)?));

    match cli.command {
        Command::Apply => with_document(&cli.state, |doc| {
            for converged in commands::apply(&reconciler, doc)? {
                println!(
                    "{:<8} {} (id {})",
                    converged.change,
                    converged.state.name,
                    converged.state.id.as_deref().unwrap_or("-")
                );
            }
            Ok(())
        }),
        Command::Refresh => with_document(&cli.state, |doc| {
            let dropped = commands::refresh(&reconciler, doc)?;
            println!("refreshed {} policies, {dropped} removed", doc.policies.len());
            Ok(())
        }),
        Command::Destroy => with_document(&cli.state, |doc| {
            let deleted = commands::destroy(&reconciler, doc)?;
            println!("deleted {deleted} policies");
            Ok(())
        }),
        Command::Import { id } => with_document(&cli.state, |doc| {
            let policy = commands::import(&reconciler, doc, &id)?;
            println!("imported {} from service {}", policy.name, policy.service);
            Ok(())
        }),
        Command::Show { id, service, name } => {
            let policy =
                commands::show(&reconciler, id.as_deref(), service.as_deref(), name.as_deref())?;
            let json = serde_json::to_string_pretty(&policy).map_err(|e| RangerError::ConfigError {
                reason: format!("failed to encode policy: {e}"),
            })?;
            println!("{json}");
            Ok(())
        }
    }
}

/// Load the document, run `op`, and save whatever progress it made.
fn with_document(
    path: &Path,
    op: impl FnOnce(&mut StateDocument) -> RangerResult<()>,
) -> RangerResult<()> {
    let mut doc = StateDocument::load(path)?;
    let result = op(&mut doc);
    doc.save(path)?;
    result
}
