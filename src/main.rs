use chrono::DateTime;
use clap::{Parser, Subcommand};
use ledger_block::clock::{Clock, FixedClock, SystemClock};
use ledger_block::{wire, Block, Payload};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "ledger-block",
    version,
    about = "Create and check hash-linked supplier ledger blocks"
)]
struct Cli {
    /// Log filter when LEDGER_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the genesis block
    Genesis {
        /// Unix timestamp to use instead of the current time
        #[arg(long)]
        timestamp: Option<i64>,
        /// Write the block here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Create a block linked to a predecessor
    New {
        /// Fingerprint of the previous block
        #[arg(long)]
        prev: String,
        /// Height of the new block
        #[arg(long)]
        index: u64,
        /// Supplier INN
        #[arg(long)]
        inn: String,
        /// Company name
        #[arg(long)]
        name: String,
        /// Event tag (REGISTER, CONTRACT_FAIL, RATING_UPDATE, ...)
        #[arg(long)]
        action: String,
        /// Rating adjustment
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        rating: f64,
        #[arg(long, default_value = "")]
        details: String,
        #[arg(long)]
        timestamp: Option<i64>,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Check a block file's fingerprint
    Verify { file: PathBuf },
    /// Print the fingerprint recomputed from a block file's fields
    Fingerprint { file: PathBuf },
    /// Show a block file in readable form
    Show { file: PathBuf },
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env("LEDGER_LOG")
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Genesis { timestamp, out } => cmd_genesis(timestamp, out.as_deref()),
        Commands::New {
            prev,
            index,
            inn,
            name,
            action,
            rating,
            details,
            timestamp,
            out,
        } => {
            let data = Payload::new(inn, name, action, rating, details);
            cmd_new(data, prev, index, timestamp, out.as_deref())
        }
        Commands::Verify { file } => cmd_verify(&file),
        Commands::Fingerprint { file } => cmd_fingerprint(&file),
        Commands::Show { file } => cmd_show(&file),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn clock_for(timestamp: Option<i64>) -> FixedClock {
    FixedClock(timestamp.unwrap_or_else(|| SystemClock.now()))
}

fn emit(block: &Block, out: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match out {
        Some(path) => {
            wire::save_block(path, block)?;
            info!(path = %path.display(), "wrote block {}", block.index);
            println!("{}", block.hash);
        }
        None => wire::write_block(std::io::stdout().lock(), block)?,
    }
    Ok(())
}

fn cmd_genesis(
    timestamp: Option<i64>,
    out: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let clock = clock_for(timestamp);
    let block = Block::genesis_with_clock(&clock);
    emit(&block, out)
}

fn cmd_new(
    data: Payload,
    prev: String,
    index: u64,
    timestamp: Option<i64>,
    out: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let clock = clock_for(timestamp);
    let block = Block::new_with_clock(data, prev, index, &clock);
    emit(&block, out)
}

fn cmd_verify(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let block = wire::load_block(path)?;
    println!("ok {}", block.hash);
    Ok(())
}

fn cmd_fingerprint(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    let block = wire::from_json(&text)?;
    println!("{}", block.calculate_hash());
    Ok(())
}

fn cmd_show(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    let block = wire::from_json(&text)?;
    let created = DateTime::from_timestamp(block.timestamp, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| block.timestamp.to_string());
    let status = if block.verify() { "intact" } else { "TAMPERED" };
    let genesis = if block.is_genesis() { " (genesis)" } else { "" };

    println!("block   #{}{}", block.index, genesis);
    println!("created {}", created);
    println!("prev    {}", block.prev_hash);
    println!("hash    {} [{}]", block.hash, status);
    println!("inn     {}", block.data.subject_id);
    println!("company {}", block.data.subject_name);
    println!("action  {}", block.data.action);
    println!("rating  {:+}", block.data.rating_delta);
    if !block.data.details.is_empty() {
        println!("details {}", block.data.details);
    }
    Ok(())
}
