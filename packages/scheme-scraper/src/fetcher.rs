//! Page fetching: one HTTP round-trip per target URL, parsed title and
//! visible text out.
//!
//! Waits only for the document itself, not for network idle, which
//! bounds per-page latency at the client timeout. No JavaScript
//! rendering; bank scheme pages are static enough for this to hold.

use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Per-request timeout. Elapsing it is a `FetchError::Timeout`.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("timed out fetching {url}")]
    Timeout { url: String },
    #[error("HTTP {status} for {url}")]
    Http { url: String, status: u16 },
    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

/// Title and visible text of one fetched page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub title: Option<String>,
    pub body_text: String,
}

/// Capability to retrieve a page's rendered text content.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// HTTP fetcher backed by a shared reqwest client.
///
/// The client is the session-scoped resource: built once per scrape
/// session, shared by every fetch, dropped at session end. Individual
/// fetches own only their response.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> anyhow::Result<Self> {
        // Browser-like User-Agent; several bank sites reject default
        // library agents outright.
        let user_agent = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client })
    }

    /// Extract title and visible body text from an HTML document.
    fn parse_page(html: &str) -> FetchedPage {
        let stripped = Self::strip_invisible(html);
        let document = Html::parse_document(&stripped);

        let title = Selector::parse("title")
            .ok()
            .and_then(|sel| {
                document
                    .select(&sel)
                    .next()
                    .map(|el| el.text().collect::<String>().trim().to_string())
            })
            .filter(|t| !t.is_empty());

        let body_text = match Selector::parse("body") {
            Ok(sel) => document
                .select(&sel)
                .next()
                .map(|body| body.text().collect::<Vec<_>>().join(" "))
                .unwrap_or_else(|| document.root_element().text().collect::<Vec<_>>().join(" ")),
            Err(_) => document.root_element().text().collect::<Vec<_>>().join(" "),
        };

        FetchedPage { title, body_text }
    }

    /// Remove elements whose text content is never user-visible.
    fn strip_invisible(html: &str) -> String {
        let document = Html::parse_document(html);
        let mut result = html.to_string();
        for selector_str in ["script", "style", "noscript"] {
            if let Ok(selector) = Selector::parse(selector_str) {
                for element in document.select(&selector) {
                    result = result.replace(&element.html(), "");
                }
            }
        }
        result
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;

        tracing::debug!(url = %url, "Fetching page");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Network {
                    url: url.to_string(),
                    source: e,
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Network {
                    url: url.to_string(),
                    source: e,
                }
            }
        })?;

        Ok(Self::parse_page(&html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_page_extracts_title_and_text() {
        let html = r#"<html><head><title>Crop Loans</title></head>
            <body><h1>Kisan Credit Card</h1><p>Rate from 7.5%</p></body></html>"#;
        let page = HttpFetcher::parse_page(html);
        assert_eq!(page.title.as_deref(), Some("Crop Loans"));
        assert!(page.body_text.contains("Kisan Credit Card"));
        assert!(page.body_text.contains("7.5%"));
    }

    #[test]
    fn parse_page_strips_script_and_style_text() {
        let html = r#"<html><head><style>.x{color:red}</style></head>
            <body><script>var rate = "99%";</script><p>Visible</p></body></html>"#;
        let page = HttpFetcher::parse_page(html);
        assert!(page.body_text.contains("Visible"));
        assert!(!page.body_text.contains("99%"));
        assert!(!page.body_text.contains("color:red"));
    }

    #[test]
    fn parse_page_without_title() {
        let page = HttpFetcher::parse_page("<html><body>text only</body></html>");
        assert_eq!(page.title, None);
    }

    #[tokio::test]
    async fn fetch_rejects_invalid_url() {
        let fetcher = HttpFetcher::new().unwrap();
        let err = fetcher.fetch("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }
}
