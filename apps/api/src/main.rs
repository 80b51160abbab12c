use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ats_scan::config::Config;
use ats_scan::routes::build_router;
use ats_scan::scoring::{scorer_from_config, worker, ScoringService};
use ats_scan::state::AppState;

#[derive(Parser)]
#[command(name = "ats-scan", version, about = "Resume vs. job description compatibility scanner")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Score one request read from stdin and write the reply to stdout
    Worker,
    /// Score two plain-text files and print the report as JSON
    Score {
        /// Resume text file
        #[arg(long)]
        candidate: PathBuf,
        /// Job description text file
        #[arg(long)]
        target: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first; invalid values abort start-up
    let config = Config::from_env()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            init_tracing(&config, false);
            serve(config).await
        }
        Command::Worker => {
            // stdout belongs to the protocol
            init_tracing(&config, true);
            let service = ScoringService::from_config(&config)?;
            worker::run_worker(&service, tokio::io::stdin(), tokio::io::stdout())
                .await
                .context("Worker I/O failed")
        }
        Command::Score { candidate, target } => {
            init_tracing(&config, true);
            score_files(&config, &candidate, &target)
        }
    }
}

/// Structured logging. `to_stderr` keeps stdout clean for worker and CLI output.
fn init_tracing(config: &Config, to_stderr: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if to_stderr {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn serve(config: Config) -> Result<()> {
    info!("Starting ATS scan API v{}", env!("CARGO_PKG_VERSION"));

    let service = ScoringService::from_config(&config)?;
    let scorer = scorer_from_config(&config, service);
    info!(
        "Scorer initialized (backend: {}, curve: {:?})",
        scorer.backend().as_str(),
        config.score_curve
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    let state = AppState { config, scorer };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()), // TODO: restrict CORS to the editor origin once it is configurable
    );

    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn score_files(config: &Config, candidate: &Path, target: &Path) -> Result<()> {
    let candidate_text = std::fs::read_to_string(candidate)
        .with_context(|| format!("Failed to read {}", candidate.display()))?;
    let target_text = std::fs::read_to_string(target)
        .with_context(|| format!("Failed to read {}", target.display()))?;

    let service = ScoringService::from_config(config)?;
    let report = service.report(&candidate_text, &target_text)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
