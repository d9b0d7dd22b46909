//! The external reasoning call: an opaque generative-model invocation
//! used to rank candidate schemes for a user.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::json;

/// Generic completion capability. One method so the transport is
/// swappable; the matcher owns prompt construction and parsing.
#[async_trait]
pub trait Reasoner: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Reasoner backed by an OpenAI-compatible chat completions API.
#[derive(Clone)]
pub struct HttpReasoner {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl HttpReasoner {
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl Reasoner for HttpReasoner {
    async fn complete(&self, prompt: &str) -> Result<String> {
        tracing::debug!(
            prompt_length = prompt.len(),
            model = %self.model,
            "Calling reasoning API"
        );

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": prompt }
            ],
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .context("Failed to send reasoning request")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("reasoning API returned HTTP {}", status);
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse reasoning response")?;

        let text = payload
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|t| t.as_str())
            .context("Reasoning response missing message content")?;

        Ok(text.to_string())
    }
}

/// Extract the first JSON object from model output, tolerating markdown
/// fences and prose around it. Returns the `{...}` slice or None.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_object_from_fenced_output() {
        let text = "Here you go:\n```json\n{\"summary\": \"ok\"}\n```";
        assert_eq!(extract_json_object(text), Some("{\"summary\": \"ok\"}"));
    }

    #[test]
    fn no_object_yields_none() {
        assert_eq!(extract_json_object("sorry, I cannot help"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }
}
