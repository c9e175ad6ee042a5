//! block-tool
//!
//! Decode, check and convert blocks given as raw wire hex.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use block_core::storage::{BlockStore, DbRegistry};
use block_core::{Block, BlockValidator, Config, Network};

#[derive(Parser, Debug)]
#[command(name = "block-tool")]
#[command(about = "Inspect, validate and convert blocks")]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Network the block belongs to (overrides the config file)
    #[arg(short, long)]
    network: Option<Network>,

    /// Height of the block in the chain, when known
    #[arg(long, default_value_t = -1, allow_hyphen_values = true)]
    height: i32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a summary with reward and fee
    Inspect { file: PathBuf },
    /// Run the consensus checks
    Verify { file: PathBuf },
    /// Print the JSON encoding
    Json { file: PathBuf },
    /// Print the compact storage encoding
    Compact { file: PathBuf },
    /// Store the block in the node's block database
    Store { file: PathBuf },
}

impl Command {
    fn file(&self) -> &PathBuf {
        match self {
            Command::Inspect { file }
            | Command::Verify { file }
            | Command::Json { file }
            | Command::Compact { file }
            | Command::Store { file } => file,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    match run(Args::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(network) = args.network {
        config.network = network;
    }

    let hex = std::fs::read_to_string(args.command.file())?;
    let block = Block::from_raw_hex(&hex)?
        .with_network(config.network)
        .with_height(args.height);

    match &args.command {
        Command::Inspect { .. } => {
            println!("{}", serde_json::to_string_pretty(&block.inspect())?);
        }
        Command::Verify { .. } => {
            let validator = BlockValidator::for_network(config.network);
            if let Err(reason) = validator.verify(&block) {
                println!("{} invalid: {}", block.rhash(), reason);
                return Ok(ExitCode::FAILURE);
            }
            println!("{} valid", block.rhash());
        }
        Command::Json { .. } => {
            println!("{}", serde_json::to_string_pretty(&block.to_json())?);
        }
        Command::Compact { .. } => {
            println!("{}", serde_json::to_string_pretty(&block.to_compact())?);
        }
        Command::Store { .. } => {
            let registry = DbRegistry::new(&config);
            let store = BlockStore::new(registry.open("chain")?);
            store.put_block(&block)?;
            registry.close("chain")?;
            println!("stored {}", block.rhash());
        }
    }

    Ok(ExitCode::SUCCESS)
}
