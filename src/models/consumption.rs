use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{MediaId, MediaItem, MediaKind, UserId};

/// A user's library entry for one catalog item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsumptionRecord {
    pub user_id: UserId,
    pub media_kind: MediaKind,
    pub media_id: MediaId,
    pub done: bool,
    pub planned: bool,
    pub rating: Option<i16>,
    pub date_consumed: Option<NaiveDate>,
}

/// Directed follow edge between two users
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FollowEdge {
    pub follower_id: UserId,
    pub followed_id: UserId,
}

/// Everything a user has in their library, grouped by catalog
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ConsumedMedia {
    pub books: Vec<MediaItem>,
    pub films: Vec<MediaItem>,
    pub music: Vec<MediaItem>,
}

impl ConsumedMedia {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the grouping from items of mixed kinds
    pub fn from_items(items: impl IntoIterator<Item = MediaItem>) -> Self {
        let mut consumed = Self::new();
        for item in items {
            consumed.push(item);
        }
        consumed
    }

    /// Files an item under its own kind
    pub fn push(&mut self, item: MediaItem) {
        match item.kind() {
            MediaKind::Book => self.books.push(item),
            MediaKind::Film => self.films.push(item),
            MediaKind::Music => self.music.push(item),
        }
    }

    pub fn of_kind(&self, kind: MediaKind) -> &[MediaItem] {
        match kind {
            MediaKind::Book => &self.books,
            MediaKind::Film => &self.films,
            MediaKind::Music => &self.music,
        }
    }

    /// Catalog ids consumed under one kind, used to exclude them from candidates
    pub fn ids(&self, kind: MediaKind) -> Vec<MediaId> {
        self.of_kind(kind).iter().map(MediaItem::id).collect()
    }

    /// Books, then films, then music
    pub fn iter(&self) -> impl Iterator<Item = &MediaItem> {
        self.books.iter().chain(self.films.iter()).chain(self.music.iter())
    }

    pub fn len(&self) -> usize {
        self.books.len() + self.films.len() + self.music.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Book, Music};

    fn book(id: MediaId) -> MediaItem {
        MediaItem::Book(Book {
            id,
            title: format!("Book {}", id),
            author: None,
            genre: None,
            year: None,
            country: None,
            language: None,
            publisher: None,
            description: None,
            coverart: None,
        })
    }

    fn album(id: MediaId) -> MediaItem {
        MediaItem::Music(Music {
            id,
            title: format!("Album {}", id),
            artist: None,
            genre: None,
            year: None,
            country: None,
            language: None,
            label: None,
            description: None,
            coverart: None,
        })
    }

    #[test]
    fn test_from_items_groups_by_kind() {
        let consumed = ConsumedMedia::from_items(vec![book(1), album(1), book(2)]);
        assert_eq!(consumed.ids(MediaKind::Book), vec![1, 2]);
        assert_eq!(consumed.ids(MediaKind::Music), vec![1]);
        assert!(consumed.of_kind(MediaKind::Film).is_empty());
        assert_eq!(consumed.len(), 3);
    }

    #[test]
    fn test_empty() {
        assert!(ConsumedMedia::new().is_empty());
    }
}
