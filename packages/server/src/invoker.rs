//! The scrape-on-demand capability.
//!
//! The transport is behind one trait with one method so it can be a
//! subprocess today and an RPC or in-process call later without the
//! routes changing.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

use scheme_scraper::types::WireScheme;

#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("failed to spawn scrape process: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("scrape process timed out after {0:?}")]
    Timeout(Duration),
    #[error("scrape process exited with {status}: {stderr}")]
    Failed { status: i32, stderr: String },
    #[error("scrape process produced malformed output: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait ScrapeInvoker: Send + Sync {
    async fn invoke(&self, query: &str) -> Result<Vec<WireScheme>, InvokeError>;
}

/// Spawns one external scrape process per request, bounded by a
/// timeout. No state is shared between requests.
pub struct SubprocessInvoker {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl SubprocessInvoker {
    /// `command` is program + leading args; the query becomes the final
    /// argument of every invocation.
    pub fn new(command: &[String], timeout: Duration) -> Self {
        let (program, args) = command
            .split_first()
            .map(|(p, rest)| (p.clone(), rest.to_vec()))
            .unwrap_or_else(|| ("python3".to_string(), Vec::new()));
        Self {
            program,
            args,
            timeout,
        }
    }

    /// The process logs progress to stdout before printing the result
    /// array, so parse the whole output first and fall back to the last
    /// line that looks like JSON.
    fn parse_output(stdout: &str) -> Result<Vec<WireScheme>, InvokeError> {
        let trimmed = stdout.trim();
        if let Ok(schemes) = serde_json::from_str::<Vec<WireScheme>>(trimmed) {
            return Ok(schemes);
        }

        for line in trimmed.lines().rev() {
            let line = line.trim();
            if line.starts_with('[') {
                if let Ok(schemes) = serde_json::from_str::<Vec<WireScheme>>(line) {
                    return Ok(schemes);
                }
            }
        }

        Err(InvokeError::Malformed(format!(
            "no JSON array in {} bytes of output",
            stdout.len()
        )))
    }
}

#[async_trait]
impl ScrapeInvoker for SubprocessInvoker {
    async fn invoke(&self, query: &str) -> Result<Vec<WireScheme>, InvokeError> {
        tracing::info!(query = %query, program = %self.program, "Invoking scrape process");

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(query)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // A timed-out request must not leak its child.
            .kill_on_drop(true);

        let child = command.spawn()?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| InvokeError::Timeout(self.timeout))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(InvokeError::Failed {
                status: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let schemes = Self::parse_output(&stdout)?;

        tracing::info!(query = %query, results = schemes.len(), "Scrape process completed");
        Ok(schemes)
    }
}
