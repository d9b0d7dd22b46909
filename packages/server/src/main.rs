// CLI entry point: one of three independent run modes is selected at
// startup (batch ingest, file upload, or the query server).

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scheme_scraper::store::{MemorySchemeStore, PostgresSchemeStore, SchemeStore};
use scheme_scraper::types::{LoanType, SchemeRecord, WireScheme};
use scheme_scraper::{read_targets_file, HttpFetcher, ScrapeSession, Taxonomy};
use server_core::{build_app, AppState, Config, SubprocessInvoker};

#[derive(Parser)]
#[command(name = "sahayak", about = "Loan scheme scraper and query service")]
struct Cli {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Scrape the target URL list and upsert schemes into the store
    Ingest {
        /// Target list file; defaults to TARGETS_FILE from the environment
        #[arg(long)]
        targets: Option<PathBuf>,
        /// Restrict the batch to these loan categories
        #[arg(long)]
        category: Vec<String>,
    },
    /// Upsert schemes from a JSON file without fetching anything
    Upload {
        #[arg(long)]
        file: PathBuf,
    },
    /// Start the on-demand query HTTP server
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,scheme_scraper=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    let store = build_store(&config).await?;

    match cli.mode {
        Mode::Ingest { targets, category } => {
            run_ingest(&config, store.as_ref(), targets, category).await
        }
        Mode::Upload { file } => run_upload(store.as_ref(), &file).await,
        Mode::Serve => run_server(&config, store).await,
    }
}

/// One store handle per process, injected into whichever mode runs.
async fn build_store(config: &Config) -> Result<Arc<dyn SchemeStore>> {
    match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .context("Failed to connect to database")?;

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run migrations")?;
            tracing::info!("Database connected, migrations complete");

            Ok(Arc::new(PostgresSchemeStore::new(pool)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store (nothing will persist)");
            Ok(Arc::new(MemorySchemeStore::new()))
        }
    }
}

fn load_taxonomy(config: &Config) -> Result<Taxonomy> {
    match &config.taxonomy_file {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read taxonomy file {}", path))?;
            Taxonomy::from_json(&json).context("Failed to parse taxonomy file")
        }
        None => Ok(Taxonomy::default()),
    }
}

async fn run_ingest(
    config: &Config,
    store: &dyn SchemeStore,
    targets: Option<PathBuf>,
    category: Vec<String>,
) -> Result<()> {
    let taxonomy = load_taxonomy(config)?;
    let fetcher = HttpFetcher::new().context("Failed to build HTTP fetcher")?;

    let mut filter = HashSet::new();
    for name in &category {
        let loan_type = name
            .parse::<LoanType>()
            .with_context(|| format!("Unknown loan category: {}", name))?;
        filter.insert(loan_type);
    }

    let path = targets.unwrap_or_else(|| PathBuf::from(&config.targets_file));
    let targets =
        read_targets_file(&path, &filter).context("Failed to read targets file")?;

    let session = ScrapeSession::new(&fetcher, store, &taxonomy);
    let stats = session.run(&targets).await;

    tracing::info!(
        attempted = stats.attempted,
        stored = stats.stored,
        failed = stats.failed,
        "Ingest finished"
    );
    Ok(())
}

async fn run_upload(store: &dyn SchemeStore, file: &PathBuf) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read upload file {}", file.display()))?;

    let records = parse_upload(&json)?;
    tracing::info!(count = records.len(), "Uploading schemes from file");

    let mut stored = 0usize;
    for record in &records {
        match store.upsert(record).await {
            Ok(()) => stored += 1,
            Err(e) => tracing::warn!(id = %record.id, error = %e, "Skipping record: store write failed"),
        }
    }

    tracing::info!(stored = stored, total = records.len(), "Upload finished");
    Ok(())
}

/// Accept both the canonical record shape and the wire shape the
/// scrape process emits; wire rows with unknown categories are skipped.
fn parse_upload(json: &str) -> Result<Vec<SchemeRecord>> {
    if let Ok(records) = serde_json::from_str::<Vec<SchemeRecord>>(json) {
        return Ok(records);
    }

    let wire: Vec<WireScheme> =
        serde_json::from_str(json).context("Upload file is neither records nor wire schemes")?;

    Ok(wire
        .into_iter()
        .filter_map(|w| match w.into_record() {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping wire row");
                None
            }
        })
        .collect())
}

async fn run_server(config: &Config, store: Arc<dyn SchemeStore>) -> Result<()> {
    let invoker = Arc::new(SubprocessInvoker::new(
        &config.scrape_command,
        Duration::from_secs(config.scrape_timeout_secs),
    ));

    let app = build_app(AppState { store, invoker });

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Query endpoint: http://localhost:{}/api/scrape?q=...", config.port);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
