use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::{
    db::MediaCatalog,
    error::GenerativeError,
    models::{ConsumedMedia, MediaItem, MediaKind, RecommendationCandidate, Source, UnresolvedStub},
    services::providers::GenerativeProvider,
};

/// Number of titles the model is asked for
const SUGGESTION_COUNT: usize = 10;

/// A title proposed by the model, before catalog resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub title: String,
    pub kind: MediaKind,
}

fn describe(item: &MediaItem) -> String {
    format!(
        "- {}: \"{}\" by {} (genre: {})",
        item.kind().label(),
        item.title(),
        item.creator().filter(|c| !c.trim().is_empty()).unwrap_or("Unknown"),
        item.genre().filter(|g| !g.trim().is_empty()).unwrap_or("Unknown"),
    )
}

/// Renders the recommendation prompt for a consumption history
pub fn build_prompt(consumed: &ConsumedMedia) -> String {
    let history = consumed.iter().map(describe).collect::<Vec<_>>().join("\n");

    format!(
        r#"The user has consumed the following media items:
{history}

Please recommend {SUGGESTION_COUNT} culturally, thematically, or stylistically connected titles across books, music, or movies that the user might enjoy.

Return only a JSON array of objects with "title" and "type" fields, where "type" is one of "book", "movie", or "music".

Example:
[
  {{"title": "Example Book Title", "type": "book"}},
  {{"title": "Example Movie Title", "type": "movie"}},
  {{"title": "Example Music Title", "type": "music"}}
]

Only return the JSON array, no additional text."#
    )
}

/// Removes a surrounding markdown code fence (```json ... ``` or ``` ... ```)
pub fn strip_code_fence(raw: &str) -> &str {
    let text = raw.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}

/// Drops a trailing parenthetical such as "Dune (Book)" -> "Dune"
///
/// Only the final group is removed, and only when it closes the title.
pub fn strip_trailing_annotation(title: &str) -> &str {
    let trimmed = title.trim_end();
    let Some(body) = trimmed.strip_suffix(')') else {
        return title.trim();
    };
    let search_from = body.rfind(')').map_or(0, |i| i + 1);
    match body[search_from..].find('(') {
        Some(open) => body[..search_from + open].trim(),
        None => title.trim(),
    }
}

fn suggestion_kind(tag: &str) -> Option<MediaKind> {
    match tag.trim().to_ascii_lowercase().as_str() {
        "book" => Some(MediaKind::Book),
        "movie" => Some(MediaKind::Film),
        "music" => Some(MediaKind::Music),
        _ => None,
    }
}

/// Parses raw model output into suggestions
///
/// Anything that is not a JSON array yields nothing. Entries without a
/// usable title or with an unknown type are skipped individually.
pub fn parse_suggestions(raw: &str) -> Vec<Suggestion> {
    let cleaned = strip_code_fence(raw);
    if cleaned.is_empty() {
        tracing::warn!("Generative response was empty after cleaning");
        return Vec::new();
    }

    let entries = match serde_json::from_str::<Value>(cleaned) {
        Ok(Value::Array(entries)) => entries,
        Ok(other) => {
            tracing::warn!(kind = json_kind(&other), "Generative response was not a JSON array");
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!(error = %e, "Generative response was not valid JSON");
            return Vec::new();
        }
    };

    entries
        .iter()
        .filter_map(|entry| {
            let title = entry.get("title")?.as_str()?;
            let kind = suggestion_kind(entry.get("type")?.as_str()?)?;
            let title = strip_trailing_annotation(title);
            if title.is_empty() {
                return None;
            }
            Some(Suggestion {
                title: title.to_string(),
                kind,
            })
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Asks a generative model for titles and resolves them against the catalog
///
/// Never fails: provider errors, malformed output and lookup errors all
/// degrade to fewer (or no) candidates.
#[derive(Clone)]
pub struct GenerativeAugmenter {
    provider: Option<Arc<dyn GenerativeProvider>>,
    timeout: Duration,
}

impl GenerativeAugmenter {
    pub fn new(provider: Arc<dyn GenerativeProvider>, timeout: Duration) -> Self {
        Self {
            provider: Some(provider),
            timeout,
        }
    }

    /// An augmenter that never contributes candidates
    pub fn disabled() -> Self {
        Self {
            provider: None,
            timeout: Duration::ZERO,
        }
    }

    pub async fn suggest(
        &self,
        catalog: &dyn MediaCatalog,
        consumed: &ConsumedMedia,
    ) -> Vec<RecommendationCandidate> {
        let Some(provider) = self.provider.as_ref().filter(|p| p.is_configured()) else {
            tracing::debug!("No generative provider configured, skipping generative candidates");
            return Vec::new();
        };

        let prompt = build_prompt(consumed);
        // The provider may ignore its budget
        let outcome = tokio::time::timeout(self.timeout, provider.complete(&prompt, self.timeout))
            .await
            .unwrap_or(Err(GenerativeError::Timeout(self.timeout)));
        let raw = match outcome {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(
                    provider = provider.name(),
                    error = %e,
                    kind = e.kind(),
                    "Generative call failed, continuing without generative candidates"
                );
                return Vec::new();
            }
        };

        let suggestions = parse_suggestions(&raw);
        let mut candidates = Vec::with_capacity(suggestions.len());
        for suggestion in suggestions {
            candidates.push(resolve(catalog, suggestion).await);
        }

        tracing::debug!(
            provider = provider.name(),
            candidates = candidates.len(),
            resolved = candidates.iter().filter(|c| c.is_resolved()).count(),
            "Generative candidates ready"
        );

        candidates
    }
}

/// Exact-title lookup; a miss or a failed lookup becomes an unresolved stub
async fn resolve(catalog: &dyn MediaCatalog, suggestion: Suggestion) -> RecommendationCandidate {
    match catalog.find_by_exact_title(suggestion.kind, &suggestion.title).await {
        Ok(Some(item)) => RecommendationCandidate::catalog(item, Source::Generative),
        Ok(None) => {
            tracing::debug!(title = %suggestion.title, kind = %suggestion.kind, "Suggestion not in catalog");
            RecommendationCandidate::unresolved(UnresolvedStub::new(suggestion.title, suggestion.kind))
        }
        Err(e) => {
            tracing::warn!(
                title = %suggestion.title,
                error = %e,
                "Catalog lookup failed for suggestion"
            );
            RecommendationCandidate::unresolved(UnresolvedStub::new(suggestion.title, suggestion.kind))
        }
    }
}
