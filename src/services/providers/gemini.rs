/// Google Gemini provider
///
/// Calls `POST {api_url}/v1beta/models/{model}:generateContent` and returns the
/// text of the first candidate. Completions are optionally cached in Redis by
/// prompt fingerprint.
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::GenerativeError,
    services::{providers::GenerativeProvider, recommendations::generative::strip_code_fence},
};

const DEFAULT_CACHE_TTL: u64 = 3600; // 1 hour

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate
    fn into_text(self) -> Result<String, GenerativeError> {
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| GenerativeError::Malformed("response has no candidates".to_string()))?;

        let text: String = candidate
            .content
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GenerativeError::Malformed(
                "first candidate has no text".to_string(),
            ));
        }

        Ok(text)
    }
}

/// Only completions that hold a JSON array are worth replaying
fn is_cacheable(text: &str) -> bool {
    matches!(
        serde_json::from_str::<Value>(strip_code_fence(text)),
        Ok(Value::Array(_))
    )
}

#[derive(Clone)]
pub struct GeminiProvider {
    http_client: HttpClient,
    api_key: Option<String>,
    api_url: String,
    model: String,
    cache: Option<Cache>,
    cache_ttl: u64,
}

impl GeminiProvider {
    /// Creates a provider; with no key every call fails with `Unavailable`
    pub fn new(api_key: Option<String>, api_url: String, model: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            model,
            cache: None,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    /// Caches completions for `ttl` seconds
    pub fn with_cache(mut self, cache: Cache, ttl: u64) -> Self {
        self.cache = Some(cache);
        self.cache_ttl = ttl;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url.trim_end_matches('/'),
            self.model
        )
    }

    async fn send(
        &self,
        api_key: &str,
        prompt: &str,
        timeout: Duration,
    ) -> Result<String, GenerativeError> {
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .timeout(timeout)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerativeError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let response_text = response.text().await?;
        tracing::debug!(response = %response_text, "Raw Gemini response");

        let parsed: GenerateContentResponse = serde_json::from_str(&response_text)
            .map_err(|e| GenerativeError::Malformed(e.to_string()))?;

        parsed.into_text()
    }
}

#[async_trait::async_trait]
impl GenerativeProvider for GeminiProvider {
    async fn complete(&self, prompt: &str, timeout: Duration) -> Result<String, GenerativeError> {
        let api_key = self.api_key.as_deref().ok_or(GenerativeError::Unavailable)?;

        // The cache read and the HTTP exchange share one budget
        let lookup = async {
            let result: Result<String, GenerativeError> = cached!(
                self.cache.as_ref(),
                CacheKey::completion(&self.model, prompt),
                self.cache_ttl,
                self.send(api_key, prompt, timeout),
                keep_if = is_cacheable
            );
            result
        };

        match tokio::time::timeout(timeout, lookup).await {
            Ok(Err(GenerativeError::Timeout(_))) | Err(_) => Err(GenerativeError::Timeout(timeout)),
            Ok(result) => result,
        }
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
