//! Loan-scheme ingestion and classification pipeline.
//!
//! Fetch a bank page, extract rate and excerpt facts, classify into
//! the loan taxonomy, build a canonical record, and upsert it into the
//! shared scheme store keyed by a URL-derived deterministic id.

pub mod builder;
pub mod classifier;
pub mod extractor;
pub mod fetcher;
pub mod session;
pub mod store;
pub mod targets;
pub mod taxonomy;
pub mod types;

pub use builder::{build_record, classify_and_build};
pub use classifier::{classify_bank_type, classify_sub_category};
pub use extractor::{extract_facts, ExtractedFacts, RATE_FALLBACK};
pub use fetcher::{FetchError, FetchedPage, HttpFetcher, PageFetcher};
pub use session::{ScrapeSession, SessionStats};
pub use store::{MemorySchemeStore, PostgresSchemeStore, SchemeStore, StoreError};
pub use targets::{parse_targets, read_targets_file, ScrapeTarget};
pub use taxonomy::{Taxonomy, GENERAL_SUB_CATEGORY};
pub use types::{BankType, LoanType, RateValue, SchemeId, SchemeRecord, WireScheme};
