use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

pub mod consumption;
pub mod media;
pub mod recommendation;
pub mod signals;

pub use consumption::{ConsumedMedia, ConsumptionRecord, FollowEdge};
pub use media::{Book, CatalogKey, Film, MediaItem, Music};
pub use recommendation::{
    CandidateItem, CandidateKey, Focus, RecommendationCandidate, RecommendationPage,
    RecommendationQuery, Source, UnresolvedStub,
};
pub use signals::ContentSignals;

/// Identifier of a user account
pub type UserId = i64;

/// Identifier of a catalog record, unique within one media kind
pub type MediaId = i64;

/// The three independent catalogs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Book,
    #[serde(rename = "movie", alias = "film", alias = "cinema")]
    Film,
    Music,
}

impl MediaKind {
    pub const ALL: [MediaKind; 3] = [MediaKind::Book, MediaKind::Film, MediaKind::Music];

    /// Wire name, also the `type` value the generative service is asked to use
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Book => "book",
            MediaKind::Film => "movie",
            MediaKind::Music => "music",
        }
    }

    /// Human label used when describing consumed items in prompts
    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Book => "Book",
            MediaKind::Film => "Movie",
            MediaKind::Music => "Music",
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "book" | "books" => Ok(MediaKind::Book),
            "movie" | "movies" | "film" | "films" | "cinema" => Ok(MediaKind::Film),
            "music" => Ok(MediaKind::Music),
            other => Err(format!("unknown media type '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_serialization() {
        assert_eq!(serde_json::to_string(&MediaKind::Book).unwrap(), "\"book\"");
        assert_eq!(serde_json::to_string(&MediaKind::Film).unwrap(), "\"movie\"");
        assert_eq!(serde_json::to_string(&MediaKind::Music).unwrap(), "\"music\"");
    }

    #[test]
    fn test_media_kind_deserialization_aliases() {
        let kind: MediaKind = serde_json::from_str("\"cinema\"").unwrap();
        assert_eq!(kind, MediaKind::Film);
        let kind: MediaKind = serde_json::from_str("\"film\"").unwrap();
        assert_eq!(kind, MediaKind::Film);
    }

    #[test]
    fn test_media_kind_from_str() {
        assert_eq!("Book".parse::<MediaKind>(), Ok(MediaKind::Book));
        assert_eq!(" MOVIE ".parse::<MediaKind>(), Ok(MediaKind::Film));
        assert_eq!("music".parse::<MediaKind>(), Ok(MediaKind::Music));
        assert!("podcast".parse::<MediaKind>().is_err());
    }
}
