//! The on-demand query endpoint: `GET /api/scrape?q=<text>`.
//!
//! Per-request lifecycle is `Received -> Scraping -> {Success, Failure}`.
//! On failure the caller falls back to the persisted store snapshot;
//! this endpoint never falls back internally.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::app::AppState;

#[derive(Debug, Deserialize)]
pub struct ScrapeParams {
    pub q: Option<String>,
}

pub async fn scrape_handler(
    State(state): State<AppState>,
    Query(params): Query<ScrapeParams>,
) -> Response {
    // Validate before spawning anything; a blank query is a client
    // error, not a wasted scrape.
    let query = match params.q.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => q.to_string(),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "missing query parameter q" })),
            )
                .into_response();
        }
    };

    tracing::info!(query = %query, "On-demand scrape request");

    match state.invoker.invoke(&query).await {
        Ok(schemes) => (StatusCode::OK, Json(schemes)).into_response(),
        Err(e) => {
            tracing::error!(query = %query, error = %e, "On-demand scrape failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "scrape failed" })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::{InvokeError, ScrapeInvoker};
    use async_trait::async_trait;
    use scheme_scraper::store::MemorySchemeStore;
    use scheme_scraper::types::WireScheme;
    use std::sync::Arc;
    use std::time::Duration;

    struct StubInvoker {
        result: Result<Vec<WireScheme>, ()>,
    }

    #[async_trait]
    impl ScrapeInvoker for StubInvoker {
        async fn invoke(&self, _query: &str) -> Result<Vec<WireScheme>, InvokeError> {
            match &self.result {
                Ok(schemes) => Ok(schemes.clone()),
                Err(()) => Err(InvokeError::Failed {
                    status: 1,
                    stderr: "boom".to_string(),
                }),
            }
        }
    }

    fn state(result: Result<Vec<WireScheme>, ()>) -> AppState {
        AppState {
            store: Arc::new(MemorySchemeStore::new()),
            invoker: Arc::new(StubInvoker { result }),
        }
    }

    fn wire() -> WireScheme {
        WireScheme {
            bank: "SBI".to_string(),
            loan_category: "Agriculture".to_string(),
            sub_category: "Crops".to_string(),
            interest_rate: "7.5%, 9.0%".to_string(),
            source: "https://sbi.co.in/kcc".to_string(),
            details: "Kisan Credit Card".to_string(),
        }
    }

    #[tokio::test]
    async fn missing_query_is_bad_request() {
        let response =
            scrape_handler(State(state(Ok(vec![]))), Query(ScrapeParams { q: None })).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn blank_query_is_bad_request() {
        let response = scrape_handler(
            State(state(Ok(vec![]))),
            Query(ScrapeParams {
                q: Some("   ".to_string()),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn successful_scrape_returns_wire_array() {
        let response = scrape_handler(
            State(state(Ok(vec![wire()]))),
            Query(ScrapeParams {
                q: Some("crop loan".to_string()),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        let parsed: Vec<WireScheme> = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].bank, "SBI");

        // Field names on the wire are the published contract.
        let raw: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(raw[0].get("Loan Category").is_some());
        assert!(raw[0].get("Sub-Category").is_some());
    }

    #[tokio::test]
    async fn failed_subprocess_is_internal_error() {
        let response = scrape_handler(
            State(state(Err(()))),
            Query(ScrapeParams {
                q: Some("xyz123nonexistent".to_string()),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn real_invoker_type_is_constructible() {
        // Sanity check that the production wiring compiles with the
        // trait object the router expects.
        let _state = AppState {
            store: Arc::new(MemorySchemeStore::new()),
            invoker: Arc::new(crate::invoker::SubprocessInvoker::new(
                &["python3".to_string(), "scraper.py".to_string()],
                Duration::from_secs(60),
            )),
        };
    }
}
