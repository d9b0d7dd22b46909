//! One scrape session: a sequential loop over target URLs, each
//! fetched, classified, built, and upserted. A failure on one target
//! is logged and the batch continues.

use crate::builder::classify_and_build;
use crate::extractor::extract_facts;
use crate::fetcher::PageFetcher;
use crate::store::SchemeStore;
use crate::targets::ScrapeTarget;
use crate::taxonomy::Taxonomy;
use crate::types::SchemeRecord;

/// Outcome counts for one session.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionStats {
    pub attempted: usize,
    pub stored: usize,
    pub failed: usize,
}

/// Owns the session-scoped resources: one fetcher (and its HTTP
/// client), one store handle, one taxonomy.
pub struct ScrapeSession<'a> {
    fetcher: &'a dyn PageFetcher,
    store: &'a dyn SchemeStore,
    taxonomy: &'a Taxonomy,
}

impl<'a> ScrapeSession<'a> {
    pub fn new(
        fetcher: &'a dyn PageFetcher,
        store: &'a dyn SchemeStore,
        taxonomy: &'a Taxonomy,
    ) -> Self {
        Self {
            fetcher,
            store,
            taxonomy,
        }
    }

    /// Scrape one target into a record without writing it.
    pub async fn scrape_one(&self, target: &ScrapeTarget) -> anyhow::Result<SchemeRecord> {
        let page = self.fetcher.fetch(&target.url).await?;
        let facts = extract_facts(&page.body_text);
        Ok(classify_and_build(
            self.taxonomy,
            &target.url,
            target.loan_type,
            page.title.as_deref(),
            &page.body_text,
            facts,
        ))
    }

    /// Run the batch. Fetch and store errors skip the target; nothing
    /// aborts the loop.
    pub async fn run(&self, targets: &[ScrapeTarget]) -> SessionStats {
        let mut stats = SessionStats::default();

        tracing::info!(targets = targets.len(), "Starting scrape session");

        for target in targets {
            stats.attempted += 1;

            let record = match self.scrape_one(target).await {
                Ok(record) => record,
                Err(e) => {
                    stats.failed += 1;
                    tracing::warn!(url = %target.url, error = %e, "Skipping target: fetch failed");
                    continue;
                }
            };

            match self.store.upsert(&record).await {
                Ok(()) => {
                    stats.stored += 1;
                    tracing::info!(
                        id = %record.id,
                        url = %record.url,
                        sub_category = %record.sub_category,
                        "Stored scheme"
                    );
                }
                Err(e) => {
                    stats.failed += 1;
                    tracing::warn!(url = %target.url, error = %e, "Skipping target: store write failed");
                }
            }
        }

        tracing::info!(
            attempted = stats.attempted,
            stored = stats.stored,
            failed = stats.failed,
            "Scrape session complete"
        );

        stats
    }
}
