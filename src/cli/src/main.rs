//! OrderDesk operator CLI
//!
//! Answers permission and order-transition questions against a seed:
//! - effective permissions for a role plus per-user overrides
//! - legal next statuses per role
//! - capability summaries as served to UIs

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use orderdesk_shield::{Actor, InMemoryOverrideStore, Role, Shield};
use orderdesk_workflow::{OrderStatus, TransitionGuard};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

mod commands;
mod config;

use commands::Overrides;
use config::CliConfig;

/// OrderDesk permission and workflow CLI
#[derive(Parser)]
#[command(name = "orderdesk")]
#[command(about = "Inspect OrderDesk permissions and order transitions")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "ORDERDESK_CONFIG")]
    config: Option<PathBuf>,

    /// Seed file (overrides config)
    #[arg(long, env = "ORDERDESK_SEED")]
    seed: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct ActorArgs {
    /// User id
    #[arg(short, long, default_value = "cli")]
    user: String,

    /// Role the user acts under
    #[arg(short, long)]
    role: Role,

    /// Grant a permission to this user, overriding the role
    #[arg(long)]
    grant: Vec<String>,

    /// Revoke a permission from this user, overriding the role
    #[arg(long)]
    revoke: Vec<String>,
}

impl ActorArgs {
    fn split(self) -> (Actor, Overrides) {
        (
            Actor::new(self.user, self.role),
            Overrides {
                grant: self.grant,
                revoke: self.revoke,
            },
        )
    }
}

#[derive(Subcommand)]
enum Command {
    /// Check a single permission
    Can {
        #[command(flatten)]
        actor: ActorArgs,

        /// Permission name, e.g. order:create
        permission: String,
    },

    /// List effective permissions
    Effective {
        #[command(flatten)]
        actor: ActorArgs,
    },

    /// List the catalog, or one role's defaults
    Permissions {
        #[arg(short, long)]
        role: Option<Role>,
    },

    /// List status changes a role may perform
    Transitions {
        #[arg(short, long)]
        role: Role,

        /// Only show moves out of this status
        #[arg(long)]
        from: Option<OrderStatus>,
    },

    /// Show the capability summary for an actor
    Capabilities {
        #[command(flatten)]
        actor: ActorArgs,
    },

    /// Walk a new order through a sequence of statuses
    Simulate {
        #[arg(short, long, default_value = "cli")]
        user: String,

        #[arg(short, long)]
        role: Role,

        /// Statuses to move through, in order
        #[arg(required = true)]
        path: Vec<OrderStatus>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = CliConfig::load_or_default(cli.config.as_deref())?;
    if cli.seed.is_some() {
        config.seed_path = cli.seed;
    }
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    debug!(?config, "configuration loaded");

    let seed = config.seed()?;
    let shield = Shield::new(config.shield.clone(), &seed, Arc::new(InMemoryOverrideStore::new()))
        .context("Failed to build permission resolver")?;
    let guard = TransitionGuard::default();
    info!(permissions = shield.permissions().len(), "resolver ready");

    let output = match cli.command {
        Command::Can { actor, permission } => {
            let (actor, overrides) = actor.split();
            commands::can(&shield, &actor, &overrides, &permission)?
        }
        Command::Effective { actor } => {
            let (actor, overrides) = actor.split();
            commands::effective(&shield, &actor, &overrides)?
        }
        Command::Permissions { role } => commands::permissions(&shield, role)?,
        Command::Transitions { role, from } => commands::transitions(&guard, role, from)?,
        Command::Capabilities { actor } => {
            let (actor, overrides) = actor.split();
            commands::capabilities(&shield, &guard, &actor, &overrides)?
        }
        Command::Simulate { user, role, path } => {
            commands::simulate(&guard, &Actor::new(user, role), &path)?
        }
    };

    println!("{}", output);
    Ok(())
}
