use serde::{Deserialize, Serialize};

use super::{MediaId, MediaKind};

/// A book record from the book catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    pub id: MediaId,
    pub title: String,
    pub author: Option<String>,
    /// Comma-joined genre list as stored in the catalog
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub country: Option<String>,
    pub language: Option<String>,
    pub publisher: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub coverart: Option<String>,
}

/// A film record from the cinema catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Film {
    pub id: MediaId,
    pub title: String,
    pub director: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub country: Option<String>,
    pub language: Option<String>,
    /// Film type (feature, documentary, series, ...)
    #[serde(rename = "type")]
    pub film_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub coverart: Option<String>,
}

/// A release from the music catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Music {
    pub id: MediaId,
    pub title: String,
    pub artist: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub country: Option<String>,
    pub language: Option<String>,
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub coverart: Option<String>,
}

/// Catalog identity of an item: ids are only unique within one kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CatalogKey {
    pub kind: MediaKind,
    pub id: MediaId,
}

/// An item from any of the three catalogs
///
/// The accessors below are the shared projection used by the matchers, so
/// callers never branch on the kind to read a creator or a secondary tag.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum MediaItem {
    Book(Book),
    Film(Film),
    Music(Music),
}

impl MediaItem {
    pub fn kind(&self) -> MediaKind {
        match self {
            MediaItem::Book(_) => MediaKind::Book,
            MediaItem::Film(_) => MediaKind::Film,
            MediaItem::Music(_) => MediaKind::Music,
        }
    }

    pub fn id(&self) -> MediaId {
        match self {
            MediaItem::Book(b) => b.id,
            MediaItem::Film(f) => f.id,
            MediaItem::Music(m) => m.id,
        }
    }

    pub fn key(&self) -> CatalogKey {
        CatalogKey {
            kind: self.kind(),
            id: self.id(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            MediaItem::Book(b) => &b.title,
            MediaItem::Film(f) => &f.title,
            MediaItem::Music(m) => &m.title,
        }
    }

    /// Author, director or artist
    pub fn creator(&self) -> Option<&str> {
        match self {
            MediaItem::Book(b) => b.author.as_deref(),
            MediaItem::Film(f) => f.director.as_deref(),
            MediaItem::Music(m) => m.artist.as_deref(),
        }
    }

    /// Raw genre string, possibly comma-joined
    pub fn genre(&self) -> Option<&str> {
        match self {
            MediaItem::Book(b) => b.genre.as_deref(),
            MediaItem::Film(f) => f.genre.as_deref(),
            MediaItem::Music(m) => m.genre.as_deref(),
        }
    }

    /// Atomic genre tokens, trimmed, empty entries dropped
    pub fn genre_tokens(&self) -> Vec<&str> {
        split_genres(self.genre())
    }

    pub fn year(&self) -> Option<i32> {
        match self {
            MediaItem::Book(b) => b.year,
            MediaItem::Film(f) => f.year,
            MediaItem::Music(m) => m.year,
        }
    }

    pub fn country(&self) -> Option<&str> {
        match self {
            MediaItem::Book(b) => b.country.as_deref(),
            MediaItem::Film(f) => f.country.as_deref(),
            MediaItem::Music(m) => m.country.as_deref(),
        }
    }

    pub fn language(&self) -> Option<&str> {
        match self {
            MediaItem::Book(b) => b.language.as_deref(),
            MediaItem::Film(f) => f.language.as_deref(),
            MediaItem::Music(m) => m.language.as_deref(),
        }
    }

    /// Publisher, film type or record label
    pub fn type_tag(&self) -> Option<&str> {
        match self {
            MediaItem::Book(b) => b.publisher.as_deref(),
            MediaItem::Film(f) => f.film_type.as_deref(),
            MediaItem::Music(m) => m.label.as_deref(),
        }
    }
}

/// Splits a comma-joined genre column into its tokens
pub fn split_genres(genre: Option<&str>) -> Vec<&str> {
    genre
        .map(|g| {
            g.split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
