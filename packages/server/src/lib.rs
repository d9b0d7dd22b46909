//! Query service for the loan-scheme store: the on-demand scrape
//! endpoint, batch ingestion and upload entry points, and their shared
//! configuration.

pub mod app;
pub mod config;
pub mod invoker;
pub mod routes;

pub use app::{build_app, AppState};
pub use config::Config;
pub use invoker::{InvokeError, ScrapeInvoker, SubprocessInvoker};
