use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    store: StoreHealth,
}

#[derive(Serialize)]
pub struct StoreHealth {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint.
///
/// Returns 200 OK when the scheme store answers a probe within the
/// deadline, 503 Service Unavailable otherwise.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store_health = match tokio::time::timeout(
        std::time::Duration::from_secs(5),
        state.store.ping(),
    )
    .await
    {
        Ok(Ok(())) => StoreHealth {
            status: "ok".to_string(),
            error: None,
        },
        Ok(Err(e)) => StoreHealth {
            status: "error".to_string(),
            error: Some(e.to_string()),
        },
        Err(_) => StoreHealth {
            status: "error".to_string(),
            error: Some("store probe timeout (>5s)".to_string()),
        },
    };

    let is_healthy = store_health.status == "ok";
    let status_code = if is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: if is_healthy { "healthy" } else { "unhealthy" }.to_string(),
            store: store_health,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::{InvokeError, ScrapeInvoker};
    use async_trait::async_trait;
    use scheme_scraper::store::MemorySchemeStore;
    use scheme_scraper::types::WireScheme;
    use std::sync::Arc;

    struct NeverInvoker;

    #[async_trait]
    impl ScrapeInvoker for NeverInvoker {
        async fn invoke(&self, _query: &str) -> Result<Vec<WireScheme>, InvokeError> {
            unreachable!("health check never scrapes")
        }
    }

    #[tokio::test]
    async fn memory_store_is_healthy() {
        let state = AppState {
            store: Arc::new(MemorySchemeStore::new()),
            invoker: Arc::new(NeverInvoker),
        };
        let (status, _body) = health_handler(State(state)).await;
        assert_eq!(status, StatusCode::OK);
    }
}
