//! colpali: ColPali document store backed by Pinecone
//!
//! Embeds text documents, writes them to a Pinecone index, and runs
//! similarity searches against it. With no subcommand the end-to-end
//! demonstration runs.

mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use colpali_store::{
    DEFAULT_TOP_K, DemoReport, Document, IndexStats, Metadata, MetadataValue, PineconeProvider,
    RandomEmbedder, SearchResult, VectorDbError, VectorStore, run_demo,
};
use config::{COLPALI_DIR, CONFIG_FILE, Config};

/// ColPali document store backed by Pinecone
#[derive(Parser)]
#[command(name = "colpali")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (default: search for .colpali/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pinecone API key (or use PINECONE_API_KEY env var)
    #[arg(long, global = true, env = "PINECONE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Index name (or use PINECONE_INDEX env var)
    #[arg(long, global = true, env = "PINECONE_INDEX")]
    index: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Store sample documents, search them, and print index statistics
    Demo,

    /// Embed and store a single document
    Store {
        /// Document id
        #[arg(long)]
        id: String,

        /// Document text
        #[arg(long)]
        text: String,

        /// Metadata entry as key=value (repeatable)
        #[arg(long = "meta", value_parser = parse_key_value)]
        meta: Vec<(String, MetadataValue)>,
    },

    /// Search stored documents by text
    Search {
        /// Query text
        query: String,

        /// Maximum number of results
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
    },

    /// Delete a document by id
    Delete {
        /// Document id
        id: String,
    },

    /// Print index statistics
    Stats,

    /// Write a default .colpali/config.toml
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Parse a `key=value` pair.
///
/// Values that read as booleans or finite numbers are stored as such;
/// everything else is a string.
fn parse_key_value(s: &str) -> std::result::Result<(String, MetadataValue), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }

    let value = if let Ok(b) = value.parse::<bool>() {
        MetadataValue::Bool(b)
    } else if let Some(n) = value.parse::<f64>().ok().filter(|n| n.is_finite()) {
        MetadataValue::Number(n)
    } else {
        MetadataValue::String(value.to_string())
    };

    Ok((key.to_string(), value))
}

/// Initialize logging to stderr.
///
/// `--verbose` forces debug; otherwise RUST_LOG applies, defaulting to info.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Load config from an explicit path, or discover it, or fall back to defaults.
fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        let config = Config::from_file(path)?;
        info!("Loaded config from {}", path.display());
        return Ok(config);
    }

    match Config::find_and_load()? {
        Some((config, path)) => {
            info!("Loaded config from {}", path.display());
            Ok(config)
        }
        None => Ok(Config::default()),
    }
}

/// Write a default config file.
fn init_config(target: Option<&Path>, force: bool) -> Result<PathBuf> {
    let path = match target {
        Some(p) => p.to_path_buf(),
        None => std::env::current_dir()?.join(COLPALI_DIR).join(CONFIG_FILE),
    };

    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    std::fs::write(&path, Config::default_toml()?)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}

/// Resolve the API key and index name, rejecting blank values.
fn resolve_connection(cli: &Cli, config: &Config) -> Result<(String, String)> {
    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            tracing::error!("Invalid config: {}", e);
        }
        anyhow::bail!("Configuration has {} error(s)", errors.len());
    }

    let api_key = config.resolve_api_key(cli.api_key.clone()).ok_or_else(|| {
        VectorDbError::Configuration("PINECONE_API_KEY environment variable is required".into())
    })?;

    let index_name = config.resolve_index(cli.index.clone());
    if index_name.trim().is_empty() {
        return Err(VectorDbError::Configuration("Index name must not be empty".into()).into());
    }

    Ok((api_key, index_name))
}

/// Load config, then build and initialize a store from the resolved settings.
async fn connect(cli: &Cli) -> Result<(Config, VectorStore)> {
    let config = load_config(cli.config.as_deref())?;
    let (api_key, index_name) = resolve_connection(cli, &config)?;

    let provider = PineconeProvider::new(config.pinecone_config(api_key))?;
    let embedder = Arc::new(RandomEmbedder::with_dimension(config.embedding.dimension));

    let mut store =
        VectorStore::new(Arc::new(provider), Some(&index_name)).with_embedder(embedder);
    store.initialize().await?;

    Ok((config, store))
}

fn print_results(results: &[SearchResult]) {
    if results.is_empty() {
        println!("No results found.");
        return;
    }

    for (rank, result) in results.iter().enumerate() {
        println!("{}. {} (score: {:.4})", rank + 1, result.id, result.score);
        if let Some(text) = result.field("text") {
            println!("   Text: {}", text);
        }
        if let Some(category) = result.field("category") {
            println!("   Category: {}", category);
        }
    }
}

fn print_stats(stats: &IndexStats) -> Result<()> {
    println!("Index statistics:");
    println!("{}", serde_json::to_string_pretty(stats)?);
    Ok(())
}

fn print_demo(report: &DemoReport) -> Result<()> {
    println!("Stored documents: {}", report.stored_ids.join(", "));
    println!();
    println!("Search results for: \"{}\"", report.query);
    print_results(&report.results);
    println!();
    print_stats(&report.stats)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before clap reads env-backed flags
    dotenv::dotenv().ok();

    let mut cli = Cli::parse();
    init_logging(cli.verbose);

    let command = cli.command.take().unwrap_or(Commands::Demo);

    match command {
        Commands::Init { force } => {
            let path = init_config(cli.config.as_deref(), force)?;
            println!("Wrote {}", path.display());
            println!("Set PINECONE_API_KEY or add api_key under [pinecone] to connect.");
        }
        Commands::Demo => {
            let (config, store) = connect(&cli).await?;
            info!("Starting ColPali vector store demo");
            let report = run_demo(&store, &config.demo_options()).await?;
            print_demo(&report)?;
        }
        Commands::Store { id, text, meta } => {
            let (_, store) = connect(&cli).await?;
            let mut doc = Document::new(id.as_str(), text);
            if !meta.is_empty() {
                doc = doc.with_metadata(meta.into_iter().collect::<Metadata>());
            }
            store.store_document(&doc).await?;
            println!("Stored {}", id);
        }
        Commands::Search { query, top_k } => {
            let (_, store) = connect(&cli).await?;
            let results = store.search_documents(&query, Some(top_k)).await?;
            print_results(&results);
        }
        Commands::Delete { id } => {
            let (_, store) = connect(&cli).await?;
            store.delete_document(&id).await?;
            println!("Deleted {}", id);
        }
        Commands::Stats => {
            let (_, store) = connect(&cli).await?;
            let stats = store.get_index_stats().await?;
            print_stats(&stats)?;
        }
    }

    Ok(())
}
