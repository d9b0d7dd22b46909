use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Absent means the in-memory store: fine for dry runs, required
    /// for anything that should survive the process.
    pub database_url: Option<String>,
    pub port: u16,
    /// Command invoked per on-demand scrape request, split on
    /// whitespace into program + leading args; the query is appended.
    pub scrape_command: Vec<String>,
    pub scrape_timeout_secs: u64,
    /// Batch ingestion target list.
    pub targets_file: String,
    /// Optional taxonomy override file (JSON); default taxonomy
    /// otherwise.
    pub taxonomy_file: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let scrape_command = env::var("SCRAPE_COMMAND")
            .unwrap_or_else(|_| "python3 scraper.py".to_string())
            .split_whitespace()
            .map(str::to_string)
            .collect::<Vec<_>>();
        if scrape_command.is_empty() {
            anyhow::bail!("SCRAPE_COMMAND must not be blank");
        }

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok(),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            scrape_command,
            scrape_timeout_secs: env::var("SCRAPE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .context("SCRAPE_TIMEOUT_SECS must be a valid number")?,
            targets_file: env::var("TARGETS_FILE").unwrap_or_else(|_| "urls.txt".to_string()),
            taxonomy_file: env::var("TAXONOMY_FILE").ok(),
        })
    }
}
