use serde::{Deserialize, Serialize};

use super::{MediaId, MediaItem, MediaKind, UserId};
use crate::services::pagination::PageRequest;

/// Which strategy produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    ContentBased,
    Collaborative,
    Generative,
}

/// A suggested title the catalog does not know about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedStub {
    pub title: String,
    pub kind: MediaKind,
}

impl UnresolvedStub {
    pub fn new(title: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            title: title.into(),
            kind,
        }
    }
}

/// What a candidate points at
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CandidateItem {
    Catalog(MediaItem),
    Unresolved(UnresolvedStub),
}

/// Identity used when merging candidates
///
/// Stubs have no catalog id, so they only ever collide with other stubs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CandidateKey {
    Catalog(MediaKind, MediaId),
    Stub(MediaKind, String),
}

/// A single recommendation, never persisted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationCandidate {
    pub item: CandidateItem,
    pub source: Source,
}

impl RecommendationCandidate {
    pub fn catalog(item: MediaItem, source: Source) -> Self {
        Self {
            item: CandidateItem::Catalog(item),
            source,
        }
    }

    pub fn unresolved(stub: UnresolvedStub) -> Self {
        Self {
            item: CandidateItem::Unresolved(stub),
            source: Source::Generative,
        }
    }

    pub fn media_kind(&self) -> MediaKind {
        match &self.item {
            CandidateItem::Catalog(item) => item.kind(),
            CandidateItem::Unresolved(stub) => stub.kind,
        }
    }

    pub fn title(&self) -> &str {
        match &self.item {
            CandidateItem::Catalog(item) => item.title(),
            CandidateItem::Unresolved(stub) => &stub.title,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.item, CandidateItem::Catalog(_))
    }

    pub fn key(&self) -> CandidateKey {
        match &self.item {
            CandidateItem::Catalog(item) => CandidateKey::Catalog(item.kind(), item.id()),
            CandidateItem::Unresolved(stub) => {
                CandidateKey::Stub(stub.kind, normalize_title(&stub.title))
            }
        }
    }
}

/// Lowercases and collapses whitespace so "The  Hobbit" and "the hobbit" collide
pub fn normalize_title(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Caller-supplied dimension narrowing the consumed items used as signals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "focus", content = "value", rename_all = "snake_case")]
pub enum Focus {
    Genre(String),
    Creator(String),
}

impl Focus {
    /// Parses a `focus` name and its value; author, director and artist all mean creator
    pub fn parse(focus: &str, value: &str) -> Result<Self, String> {
        let value = value.trim();
        if value.is_empty() {
            return Err("focus_value cannot be empty".to_string());
        }
        match focus.trim().to_lowercase().as_str() {
            "genre" => Ok(Focus::Genre(value.to_string())),
            "creator" | "author" | "director" | "artist" => Ok(Focus::Creator(value.to_string())),
            other => Err(format!("unknown focus '{}'", other)),
        }
    }

    pub fn matches(&self, item: &MediaItem) -> bool {
        match self {
            Focus::Genre(genre) => item
                .genre_tokens()
                .iter()
                .any(|token| token.eq_ignore_ascii_case(genre)),
            Focus::Creator(creator) => item
                .creator()
                .is_some_and(|c| c.trim().eq_ignore_ascii_case(creator)),
        }
    }
}

/// Inbound recommendation query
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationQuery {
    pub user_id: UserId,
    pub focus: Option<Focus>,
    pub media_kind: Option<MediaKind>,
    pub page: PageRequest,
}

impl RecommendationQuery {
    pub fn new(user_id: UserId, page: PageRequest) -> Self {
        Self {
            user_id,
            focus: None,
            media_kind: None,
            page,
        }
    }

    pub fn with_focus(mut self, focus: Focus) -> Self {
        self.focus = Some(focus);
        self
    }

    pub fn with_media_kind(mut self, kind: MediaKind) -> Self {
        self.media_kind = Some(kind);
        self
    }
}

/// Merged, shuffled recommendations for one page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationPage {
    pub recommendations: Vec<RecommendationCandidate>,
    pub current_page: u32,
    pub total_pages: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Music;

    fn album(artist: &str, genre: &str) -> MediaItem {
        MediaItem::Music(Music {
            id: 3,
            title: "Kind of Blue".to_string(),
            artist: Some(artist.to_string()),
            genre: Some(genre.to_string()),
            year: Some(1959),
            country: None,
            language: None,
            label: Some("Columbia".to_string()),
            description: None,
            coverart: None,
        })
    }

    #[test]
    fn test_unresolved_candidate_serializes_flat() {
        let candidate =
            RecommendationCandidate::unresolved(UnresolvedStub::new("Arrival", MediaKind::Film));
        let json = serde_json::to_value(&candidate).unwrap();
        assert_eq!(json["item"]["title"], "Arrival");
        assert_eq!(json["source"], "generative");
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("  The   Hobbit "), "the hobbit");
    }

    #[test]
    fn test_stub_key_uses_normalized_title() {
        let a = RecommendationCandidate::unresolved(UnresolvedStub::new("The Hobbit", MediaKind::Book));
        let b = RecommendationCandidate::unresolved(UnresolvedStub::new("the  hobbit", MediaKind::Book));
        let c = RecommendationCandidate::unresolved(UnresolvedStub::new("The Hobbit", MediaKind::Film));
        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), c.key());
        assert!(!a.is_resolved());
        assert_eq!(a.source, Source::Generative);
    }

    #[test]
    fn test_catalog_key() {
        let candidate = RecommendationCandidate::catalog(album("Miles Davis", "Jazz"), Source::Collaborative);
        assert_eq!(candidate.key(), CandidateKey::Catalog(MediaKind::Music, 3));
        assert_eq!(candidate.media_kind(), MediaKind::Music);
        assert!(candidate.is_resolved());
    }

    #[test]
    fn test_focus_parse_aliases() {
        assert_eq!(
            Focus::parse("director", "Agnes Varda"),
            Ok(Focus::Creator("Agnes Varda".to_string()))
        );
        assert_eq!(Focus::parse("Genre", " Jazz "), Ok(Focus::Genre("Jazz".to_string())));
        assert!(Focus::parse("mood", "calm").is_err());
        assert!(Focus::parse("genre", "  ").is_err());
    }

    #[test]
    fn test_focus_matches() {
        let item = album("Miles Davis", "Jazz, Modal");
        assert!(Focus::Genre("modal".to_string()).matches(&item));
        assert!(!Focus::Genre("Rock".to_string()).matches(&item));
        assert!(Focus::Creator("miles davis".to_string()).matches(&item));
        assert!(!Focus::Creator("John Coltrane".to_string()).matches(&item));
    }
}
