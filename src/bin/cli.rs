//! CLI binary for aidb.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use aidb::api::{ApiServer, HttpObjectStore};
use aidb::http::build_client;
use aidb::ingest::{self, IngestReport};
use aidb::AidbConfig;
use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// aidb: build and serve an AI model catalog.
#[derive(Parser)]
#[command(name = "aidb", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Fetch the upstream feed and write the catalog to OUTPUT_DIR.
    Ingest {
        output_dir: PathBuf,
        /// Override the upstream feed URL.
        #[arg(long)]
        feed_url: Option<String>,
    },

    /// Scrape the Ollama library into OUTPUT_DIR.
    Ollama {
        output_dir: PathBuf,
        /// Override the Ollama site base URL.
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Combine the model files directly inside DIR into DIR/models.json.
    Combine { dir: PathBuf },

    /// Check every model file and the index under DIR.
    Verify { dir: PathBuf },

    /// Serve the edge API over an HTTP object store.
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        /// Base URL of the object store holding the catalog.
        #[arg(long)]
        storage_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays clean for reports.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("aidb=info,aidb_search=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => AidbConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AidbConfig::default(),
    };

    match cli.command {
        Command::Ingest {
            output_dir,
            feed_url,
        } => {
            if let Some(url) = feed_url {
                config.ingest.feed_url = url;
            }
            config.validate()?;
            let report = ingest::run_ingest(&config.ingest, &output_dir)
                .await
                .context("ingestion failed")?;
            print_report(&report);
            Ok(())
        }
        Command::Ollama {
            output_dir,
            base_url,
        } => {
            if let Some(url) = base_url {
                config.ingest.ollama_base_url = url;
            }
            config.validate()?;
            let report = ingest::run_ollama(&config.ingest, &output_dir)
                .await
                .context("ollama scrape failed")?;
            print_report(&report);
            Ok(())
        }
        Command::Combine { dir } => {
            let report = ingest::combine_directory(&dir)?;
            println!(
                "Combined {} records into {} ({} skipped)",
                report.combined,
                report.index_path.display(),
                report.skipped.len()
            );
            Ok(())
        }
        Command::Verify { dir } => run_verify(&dir),
        Command::Serve {
            host,
            port,
            storage_url,
        } => {
            if let Some(host) = host {
                config.api.host = host;
            }
            if let Some(port) = port {
                config.api.port = port;
            }
            if let Some(url) = storage_url {
                config.api.storage_url = url;
            }
            config.validate()?;
            run_serve(&config).await
        }
    }
}

fn print_report(report: &IngestReport) {
    println!(
        "Wrote {} records, index at {}",
        report.written,
        report.index_path.display()
    );
    if !report.failures.is_empty() {
        println!("Skipped {} records:", report.failures.len());
        for failure in &report.failures {
            println!("  {failure}");
        }
    }
}

fn run_verify(dir: &Path) -> anyhow::Result<()> {
    let report = ingest::verify_catalog(dir)?;
    println!("Valid model files:    {}", report.catalog.records.len());
    println!("Rejected model files: {}", report.catalog.rejected.len());
    for rejected in &report.catalog.rejected {
        println!("  {rejected}");
    }
    match report.index_len {
        Some(n) => println!(
            "Index entries:        {n} ({})",
            if report.index_sorted { "sorted" } else { "NOT sorted" }
        ),
        None => println!("Index entries:        missing"),
    }
    if !report.passed() {
        bail!("catalog at {} failed verification", dir.display());
    }
    Ok(())
}

async fn run_serve(config: &AidbConfig) -> anyhow::Result<()> {
    let client = build_client(config.api.storage_timeout_seconds, config.ingest.user_agent.as_deref())?;
    let store = HttpObjectStore::new(client, &config.api.storage_url)?;
    let mut server = ApiServer::start(Arc::new(store), &config.api).await?;
    println!("Serving on http://{}", server.addr());

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("received Ctrl+C, shutting down...");
        }
        () = server.wait() => {
            bail!("edge API server stopped unexpectedly");
        }
    }
    // Dropping the server aborts its task.
    drop(server);
    Ok(())
}
