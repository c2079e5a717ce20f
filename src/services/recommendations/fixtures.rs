//! Catalog builders shared by the recommendation tests.

use crate::{
    db::MemoryStore,
    models::{Book, ConsumptionRecord, Film, MediaId, MediaItem, MediaKind, Music, UserId},
};

pub fn book(id: MediaId, title: &str, author: &str, genre: &str) -> MediaItem {
    MediaItem::Book(Book {
        id,
        title: title.to_string(),
        author: Some(author.to_string()),
        genre: Some(genre.to_string()),
        year: None,
        country: None,
        language: None,
        publisher: None,
        description: None,
        coverart: None,
    })
}

pub fn film(id: MediaId, title: &str, director: &str, genre: &str) -> MediaItem {
    MediaItem::Film(Film {
        id,
        title: title.to_string(),
        director: Some(director.to_string()),
        genre: Some(genre.to_string()),
        year: None,
        country: None,
        language: None,
        film_type: None,
        description: None,
        coverart: None,
    })
}

pub fn album(id: MediaId, title: &str, artist: &str, genre: &str) -> MediaItem {
    MediaItem::Music(Music {
        id,
        title: title.to_string(),
        artist: Some(artist.to_string()),
        genre: Some(genre.to_string()),
        year: None,
        country: None,
        language: None,
        label: None,
        description: None,
        coverart: None,
    })
}

pub fn done(user_id: UserId, kind: MediaKind, media_id: MediaId) -> ConsumptionRecord {
    ConsumptionRecord {
        user_id,
        media_kind: kind,
        media_id,
        done: true,
        planned: false,
        rating: None,
        date_consumed: None,
    }
}

pub fn planned(user_id: UserId, kind: MediaKind, media_id: MediaId) -> ConsumptionRecord {
    ConsumptionRecord {
        done: false,
        planned: true,
        ..done(user_id, kind, media_id)
    }
}

/// Store seeded with the given catalog items
pub async fn store_with(items: Vec<MediaItem>) -> MemoryStore {
    let store = MemoryStore::new();
    for item in items {
        store.add_item(item).await;
    }
    store
}
