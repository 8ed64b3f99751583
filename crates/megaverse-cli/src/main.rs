//! Megaverse CLI - reconcile the remote Megaverse grid with its goal
//!
//! Usage:
//!   megaverse                         Interactive command loop
//!   megaverse validate                Compare the remote grid with the goal
//!   megaverse create-goal             Reset, then place every goal object
//!   megaverse reset                   Delete every remote object
//!   megaverse add <token> <row> <col> Place one object
//!   megaverse init                    Write a default megaverse.toml

mod command;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use command::{dispatch, Command, Flow, AVAILABLE};
use megaverse_client::{HttpExecutor, ReqwestExecutor};
use megaverse_core::config::CONFIG_FILE_NAME;
use megaverse_core::{MegaverseConfig, ObjectKind, Position};
use megaverse_engine::Megaverse;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "megaverse")]
#[command(author, version, about = "Reconcile the Megaverse grid with its goal")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ./megaverse.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Candidate id (overrides CROSSMINT_CANDIDATE_ID)
    #[arg(long, global = true)]
    candidate_id: Option<String>,

    /// API base URL (overrides MEGAVERSE_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive command loop (default)
    Repl,

    /// Compare the remote grid with the goal
    Validate,

    /// Delete every object on the remote grid
    Reset,

    /// Reset the remote grid, then place every goal object
    CreateGoal,

    /// Place one object from a goal token
    Add {
        /// Goal token, e.g. POLYANET, BLUE_SOLOON, UP_COMETH
        token: String,
        row: usize,
        column: usize,
    },

    /// Remove one object
    Remove {
        /// Object name: POLYANET, SOLOON or COMETH
        name: ObjectKind,
        row: usize,
        column: usize,
    },

    /// Print the remote grid
    Show,

    /// Print the goal grid
    Goal,

    /// Write a default config file
    Init {
        /// Target path (defaults to ./megaverse.toml)
        #[arg(default_value = CONFIG_FILE_NAME)]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    let command = cli.command.unwrap_or(Commands::Repl);

    if let Commands::Init { path } = &command {
        MegaverseConfig::write_default(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    let config_path = cli
        .config
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
    let mut config = MegaverseConfig::load(&config_path)?;
    if let Some(candidate_id) = cli.candidate_id {
        config.candidate_id = Some(candidate_id);
    }
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }

    let megaverse = Megaverse::from_config(ReqwestExecutor::new(), &config)
        .context("Invalid Megaverse configuration")?;

    megaverse
        .initialize()
        .await
        .context("Megaverse initialization failed")?;
    info!("Megaverse initialized!");

    match command {
        Commands::Repl => run_repl(&megaverse).await,
        Commands::Validate => {
            if !megaverse.validate().await? {
                bail!("Megaverse state does not match the goal state");
            }
            println!("[Success] Megaverse state matches the goal state!");
            Ok(())
        }
        Commands::Reset => run_once(&megaverse, Command::Reset).await,
        Commands::CreateGoal => run_once(&megaverse, Command::CreateGoal).await,
        Commands::Add { token, row, column } => {
            let command = Command::Add {
                token: token.to_uppercase(),
                position: Position::new(row, column),
            };
            run_once(&megaverse, command).await
        }
        Commands::Remove { name, row, column } => {
            let command = Command::Remove {
                kind: name,
                position: Position::new(row, column),
            };
            run_once(&megaverse, command).await
        }
        Commands::Show => run_once(&megaverse, Command::Show).await,
        Commands::Goal => run_once(&megaverse, Command::Goal).await,
        Commands::Init { .. } => Ok(()),
    }
}

async fn run_once<E: HttpExecutor>(megaverse: &Megaverse<E>, command: Command) -> Result<()> {
    dispatch(megaverse, command).await?;
    Ok(())
}

/// Read commands from stdin, one line at a time, until `exit` or EOF
async fn run_repl<E: HttpExecutor>(megaverse: &Megaverse<E>) -> Result<()> {
    println!("Begin Megaverse. Available commands: {}", AVAILABLE);
    println!("Waiting for your command...");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                eprintln!("{}", message);
                continue;
            }
        };

        match dispatch(megaverse, command).await {
            Ok(Flow::Exit) => return Ok(()),
            Ok(Flow::Continue) => {}
            Err(e) => error!("{:#}", e),
        }
    }

    Ok(())
}
