//! QueryGate - Corporate Query Gatekeeper
//!
//! Screens employee questions for corporate relevance and authorizes them
//! against the requester's department.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use querygate::{
    api::build_app,
    classifier::HttpZeroShotClassifier,
    config::QueryGateConfig,
    department::{DepartmentExtractor, SynonymTable},
    directory::{CsvDirectory, RequesterId},
    pipeline::{Gatekeeper, GatekeeperState},
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "querygate")]
#[command(author = "A3S Lab Team")]
#[command(version)]
#[command(about = "Corporate query gatekeeper with department-aware authorization")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "QUERYGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Decide a single query and print the decision record
    Decide {
        /// Requester ID
        #[arg(short, long)]
        user: String,

        /// Query text
        query: String,
    },

    /// Print the department a query targets
    Extract {
        /// Query text
        query: String,
    },

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("querygate={},tower_http=debug", log_level).into());
    if cli.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // Load configuration
    let config = if let Some(config_path) = cli.config {
        QueryGateConfig::load(&config_path)
            .with_context(|| format!("Failed to load config {}", config_path.display()))?
    } else {
        QueryGateConfig::default()
    };

    match cli.command {
        Commands::Serve { host, port } => {
            serve(config, host, port).await?;
        }
        Commands::Decide { user, query } => {
            decide(&config, &user, &query).await?;
        }
        Commands::Extract { query } => {
            extract(&query)?;
        }
        Commands::Config { default } => {
            show_config(if default { None } else { Some(&config) })?;
        }
    }

    Ok(())
}

fn build_gatekeeper(config: &QueryGateConfig) -> Result<Gatekeeper> {
    let classifier = HttpZeroShotClassifier::from_config(&config.classifier)?;
    let directory = CsvDirectory::load(&config.directory.path)?;
    Ok(Gatekeeper::new(
        Arc::new(classifier),
        Arc::new(directory),
        config,
    )?)
}

async fn serve(config: QueryGateConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    tracing::info!("Starting QueryGate");

    let gatekeeper = build_gatekeeper(&config)?;
    let app = build_app(
        GatekeeperState {
            gatekeeper: Arc::new(gatekeeper),
        },
        &config.server.cors_origins,
    );

    let host = host.unwrap_or(config.server.host);
    let port = port.unwrap_or(config.server.port);
    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;

    tracing::info!("QueryGate listening on {}:{}. Press Ctrl+C to stop.", host, port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        })
        .await?;

    Ok(())
}

async fn decide(config: &QueryGateConfig, user: &str, query: &str) -> Result<()> {
    let gatekeeper = build_gatekeeper(config)?;
    let record = gatekeeper.decide(RequesterId::new(user), query).await;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn extract(query: &str) -> Result<()> {
    let extractor = DepartmentExtractor::new(SynonymTable::standard())?;
    match extractor.extract(query) {
        Some(scope) => println!("{}", scope),
        None => println!("(no department)"),
    }
    Ok(())
}

fn show_config(config: Option<&QueryGateConfig>) -> Result<()> {
    let config = config.cloned().unwrap_or_default();
    let toml = toml::to_string_pretty(&config)?;
    println!("{}", toml);
    Ok(())
}
