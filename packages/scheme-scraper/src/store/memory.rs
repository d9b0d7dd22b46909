use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{SchemeStore, StoreError};
use crate::types::{SchemeId, SchemeRecord};

/// In-memory store for tests and database-less runs (the upload mode
/// dry run). Same overwrite semantics as the Postgres store.
#[derive(Default)]
pub struct MemorySchemeStore {
    records: Mutex<HashMap<SchemeId, SchemeRecord>>,
}

impl MemorySchemeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SchemeStore for MemorySchemeStore {
    async fn upsert(&self, record: &SchemeRecord) -> Result<(), StoreError> {
        self.records
            .lock()
            .expect("scheme store mutex poisoned")
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, id: &SchemeId) -> Result<Option<SchemeRecord>, StoreError> {
        Ok(self
            .records
            .lock()
            .expect("scheme store mutex poisoned")
            .get(id)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<SchemeRecord>, StoreError> {
        Ok(self
            .records
            .lock()
            .expect("scheme store mutex poisoned")
            .values()
            .cloned()
            .collect())
    }

    async fn count_for_url(&self, url: &str) -> Result<u64, StoreError> {
        Ok(self
            .records
            .lock()
            .expect("scheme store mutex poisoned")
            .values()
            .filter(|r| r.url == url)
            .count() as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LoanType, RateValue};
    use chrono::Utc;

    fn record(url: &str, details: &str) -> SchemeRecord {
        SchemeRecord {
            id: SchemeId::from_url(url),
            title: "Public Bank – crops".to_string(),
            provider: "Public Bank".to_string(),
            loan_type: LoanType::Agriculture,
            sub_category: "crops".to_string(),
            interest_rate: RateValue::Freeform("7.5%".to_string()),
            url: url.to_string(),
            details: details.to_string(),
            last_scraped_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn upsert_same_url_overwrites_not_duplicates() {
        let store = MemorySchemeStore::new();
        let url = "https://sbi.co.in/kcc";

        store.upsert(&record(url, "first scrape")).await.unwrap();
        store.upsert(&record(url, "second scrape")).await.unwrap();

        assert_eq!(store.count_for_url(url).await.unwrap(), 1);
        let stored = store.get(&SchemeId::from_url(url)).await.unwrap().unwrap();
        assert_eq!(stored.details, "second scrape");
    }

    #[tokio::test]
    async fn distinct_urls_stored_independently() {
        let store = MemorySchemeStore::new();
        store.upsert(&record("https://a.example/1", "a")).await.unwrap();
        store.upsert(&record("https://b.example/2", "b")).await.unwrap();
        assert_eq!(store.list_all().await.unwrap().len(), 2);
    }
}
