//! Kindred CLI - Command line interface for the genealogy engine

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod output;

use commands::{attach, relationship, tree};
use kindred_engine::TreeEngine;
use kindred_storage::RedbStorage;

#[derive(Parser)]
#[command(name = "kindred")]
#[command(author, version, about = "Genealogy graph engine: kinship and cross-tree matching")]
pub struct Cli {
    /// Data directory
    #[arg(short, long, global = true)]
    pub data_dir: Option<String>,

    /// Output format: table, json
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,

    /// Use fuzzy identity matching for cross-tree scans
    #[arg(long, global = true)]
    pub fuzzy: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Get the data directory path
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::data_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("kindred")
            })
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage family trees
    Tree(tree::TreeArgs),
    /// Attach a child or parent to a node
    Attach(attach::AttachArgs),
    /// Classify the relationship between two nodes
    Relationship(relationship::RelationshipArgs),
}

/// Application context with the engine over a redb store
pub struct AppContext {
    pub storage: Arc<RedbStorage>,
    pub engine: TreeEngine,
}

impl AppContext {
    pub async fn new(cli: &Cli) -> anyhow::Result<Self> {
        let data_dir = cli.data_dir();
        std::fs::create_dir_all(&data_dir)?;

        let db_path = data_dir.join("kindred.redb");
        tracing::debug!("Using database at: {:?}", db_path);

        let storage = Arc::new(RedbStorage::open(&db_path)?);
        let mut engine = TreeEngine::new(storage.clone());
        if cli.fuzzy {
            engine = engine.with_matcher(Arc::new(kindred_match::FuzzyMatcher::new()));
        }

        Ok(Self { storage, engine })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting kindred CLI");

    let ctx = AppContext::new(&cli).await?;

    match &cli.command {
        Commands::Tree(args) => tree::run(args, &cli, &ctx).await?,
        Commands::Attach(args) => attach::run(args, &cli, &ctx).await?,
        Commands::Relationship(args) => relationship::run(args, &cli, &ctx).await?,
    }

    Ok(())
}
