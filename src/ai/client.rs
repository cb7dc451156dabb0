//! Minimal OpenAI-compatible HTTP client.
//!
//! Calls are made once: no retry or backoff. A failed call surfaces
//! immediately to the caller, which decides whether to fall back.

use anyhow::{bail, Context, Result};
use base64::Engine;
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::AiConfig;

pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl ChatClient {
    /// Builds a client from `[ai]` settings.
    ///
    /// The API key is read from the environment variable named by
    /// `ai.api_key_env`. A missing key is allowed so local endpoints
    /// without authentication work.
    pub fn new(config: &AiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let api_key = std::env::var(&config.api_key_env).ok();
        if api_key.is_none() {
            tracing::debug!(env = %config.api_key_env, "no API key set; sending unauthenticated requests");
        }
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let req = self
            .http
            .post(format!("{}/{}", self.base_url, path))
            .header("Content-Type", "application/json");
        match &self.api_key {
            Some(key) => req.header("Authorization", format!("Bearer {}", key)),
            None => req,
        }
    }

    async fn send(&self, path: &str, body: &Value) -> Result<Value> {
        let response = self
            .post(path)
            .json(body)
            .send()
            .await
            .with_context(|| format!("AI request to {} failed", path))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("AI API error {}: {}", status, body_text);
        }
        Ok(response.json().await?)
    }

    /// Sends a system + user prompt and parses the reply as a JSON object.
    ///
    /// With `web_search`, the request carries `web_search_options` instead
    /// of a JSON response format (search models reject both together), and
    /// the object is extracted from the prose reply.
    pub async fn complete_json(
        &self,
        model: &str,
        system: &str,
        user: &str,
        web_search: bool,
    ) -> Result<Value> {
        let mut body = json!({
            "model": model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
        });
        if web_search {
            body["web_search_options"] = json!({});
        } else {
            body["response_format"] = json!({ "type": "json_object" });
        }

        let reply = self.send("chat/completions", &body).await?;
        let content = reply
            .pointer("/choices/0/message/content")
            .and_then(|c| c.as_str())
            .ok_or_else(|| anyhow::anyhow!("Invalid AI response: missing message content"))?;

        extract_json_object(content)
    }

    /// Generates an image and returns it as a URL or `data:` URI.
    pub async fn generate_image(&self, model: &str, prompt: &str) -> Result<String> {
        let body = json!({
            "model": model,
            "prompt": prompt,
            "n": 1,
            "size": "1024x1024",
        });
        let reply = self.send("images/generations", &body).await?;
        parse_image_response(&reply)
    }
}

/// Parses a model reply into a JSON object, tolerating code fences and
/// prose around the object.
pub fn extract_json_object(content: &str) -> Result<Value> {
    let trimmed = strip_code_fence(content.trim());
    if let Ok(v @ Value::Object(_)) = serde_json::from_str::<Value>(trimmed) {
        return Ok(v);
    }

    let start = trimmed.find('{');
    let end = trimmed.rfind('}');
    match (start, end) {
        (Some(s), Some(e)) if s < e => serde_json::from_str(&trimmed[s..=e])
            .context("Invalid AI response: reply is not a JSON object"),
        _ => bail!("Invalid AI response: reply is not a JSON object"),
    }
}

fn strip_code_fence(s: &str) -> &str {
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };
    // Skip an optional language tag on the opening fence.
    let rest = match rest.find('\n') {
        Some(i) => &rest[i + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn parse_image_response(json: &Value) -> Result<String> {
    let item = json
        .pointer("/data/0")
        .ok_or_else(|| anyhow::anyhow!("Invalid image response: missing data array"))?;

    if let Some(b64) = item.get("b64_json").and_then(|v| v.as_str()) {
        // Reject payloads that are not valid base64 before embedding them.
        base64::engine::general_purpose::STANDARD
            .decode(b64)
            .context("Invalid image response: b64_json is not base64")?;
        return Ok(format!("data:image/png;base64,{}", b64));
    }
    if let Some(url) = item.get("url").and_then(|v| v.as_str()) {
        return Ok(url.to_string());
    }
    bail!("Invalid image response: no b64_json or url")
}
