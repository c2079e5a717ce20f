use crate::{
    db::MediaCatalog,
    error::AppResult,
    models::{ConsumedMedia, ContentSignals, Focus, MediaKind, Source},
    services::pagination::{Page, PageRequest},
};

use super::SourceCandidates;

/// Pools creator, genre, country, year, language and secondary-tag signals
/// from all consumed items, narrowed to those matching `focus` when given
pub fn extract_signals(consumed: &ConsumedMedia, focus: Option<&Focus>) -> ContentSignals {
    match focus {
        Some(focus) => ContentSignals::from_items(consumed.iter().filter(|item| focus.matches(item))),
        None => ContentSignals::from_items(consumed.iter()),
    }
}

/// Content-based candidates: catalog items sharing any signal with the
/// user's history, one page per kind
///
/// OR-composition keeps sparse histories from producing nothing. Already
/// consumed items are excluded using the full history, not the focused one.
pub async fn content_candidates(
    catalog: &dyn MediaCatalog,
    consumed: &ConsumedMedia,
    focus: Option<&Focus>,
    page: PageRequest,
) -> AppResult<SourceCandidates> {
    let signals = extract_signals(consumed, focus);
    if signals.is_empty() {
        tracing::debug!("No content signals, skipping content-based candidates");
        return Ok(SourceCandidates::default());
    }

    let signals = &signals;
    let fetch = move |kind: MediaKind| {
        async move {
            let exclude = consumed.ids(kind);
            catalog.find_matching(kind, signals, &exclude, page).await
        }
    };

    let (books, films, music): (Page<_>, Page<_>, Page<_>) = tokio::try_join!(
        fetch(MediaKind::Book),
        fetch(MediaKind::Film),
        fetch(MediaKind::Music)
    )?;

    Ok(SourceCandidates::from_pages(Source::ContentBased, [books, films, music]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ConsumptionStore;
    use crate::models::CandidateKey;
    use crate::services::recommendations::fixtures::{album, book, done, film, planned, store_with};

    fn keys(result: &SourceCandidates) -> Vec<CandidateKey> {
        result.candidates.iter().map(|c| c.key()).collect()
    }

    fn first_page() -> PageRequest {
        PageRequest::new(1, 10).unwrap()
    }

    #[tokio::test]
    async fn test_same_creator_and_same_genre_both_match() {
        let consumed_book = book(1, "First", "A. Doe", "Fantasy");
        let store = store_with(vec![
            consumed_book.clone(),
            book(2, "Second", "A. Doe", "Horror"),
            book(3, "Third", "B. Roe", "Fantasy"),
            book(4, "Unrelated", "C. Poe", "Romance"),
        ])
        .await;
        let consumed = ConsumedMedia::from_items(vec![consumed_book]);

        let result = content_candidates(&store, &consumed, None, first_page()).await.unwrap();
        assert_eq!(
            keys(&result),
            vec![
                CandidateKey::Catalog(MediaKind::Book, 2),
                CandidateKey::Catalog(MediaKind::Book, 3),
            ]
        );
        assert!(result.candidates.iter().all(|c| c.source == Source::ContentBased));
    }

    #[tokio::test]
    async fn test_empty_history_builds_no_query() {
        let store = store_with(vec![book(1, "Any", "A. Doe", "Fantasy")]).await;
        let result = content_candidates(&store, &ConsumedMedia::new(), None, first_page())
            .await
            .unwrap();
        assert!(result.candidates.is_empty());
        assert_eq!(result.total_pages, 0);
    }

    #[tokio::test]
    async fn test_unknown_genre_does_not_match_everything() {
        let consumed_book = book(1, "Mystery Item", "", "Unknown");
        let store = store_with(vec![
            consumed_book.clone(),
            book(2, "Also Unknown", "Someone", "Unknown"),
        ])
        .await;
        let consumed = ConsumedMedia::from_items(vec![consumed_book]);

        let result = content_candidates(&store, &consumed, None, first_page()).await.unwrap();
        assert!(result.candidates.is_empty());
    }

    #[tokio::test]
    async fn test_signals_cross_media_kinds() {
        let consumed_film = film(1, "Spirited Away", "Hayao Miyazaki", "Animation, Fantasy");
        let store = store_with(vec![
            consumed_film.clone(),
            book(1, "Earthsea", "Ursula K. Le Guin", "Fantasy"),
            album(1, "Spirited Away OST", "Joe Hisaishi", "Soundtrack"),
        ])
        .await;
        let consumed = ConsumedMedia::from_items(vec![consumed_film]);

        let result = content_candidates(&store, &consumed, None, first_page()).await.unwrap();
        assert_eq!(keys(&result), vec![CandidateKey::Catalog(MediaKind::Book, 1)]);
    }

    #[tokio::test]
    async fn test_consumed_and_planned_items_are_excluded() {
        let store = store_with(vec![
            book(1, "Read", "A. Doe", "Fantasy"),
            book(2, "Planned", "A. Doe", "Fantasy"),
            book(3, "Fresh", "A. Doe", "Fantasy"),
        ])
        .await;
        store.add_record(done(7, MediaKind::Book, 1)).await;
        store.add_record(planned(7, MediaKind::Book, 2)).await;
        let consumed = store.list_consumed(7).await.unwrap();

        let result = content_candidates(&store, &consumed, None, first_page()).await.unwrap();
        assert_eq!(keys(&result), vec![CandidateKey::Catalog(MediaKind::Book, 3)]);
    }

    #[tokio::test]
    async fn test_focus_narrows_signals() {
        let fantasy = book(1, "Fantasy Read", "A. Doe", "Fantasy");
        let horror = book(2, "Horror Read", "B. Roe", "Horror");
        let store = store_with(vec![
            fantasy.clone(),
            horror.clone(),
            book(3, "More Fantasy", "C. Poe", "Fantasy"),
            book(4, "More Horror", "D. Moe", "Horror"),
        ])
        .await;
        let consumed = ConsumedMedia::from_items(vec![fantasy, horror]);
        let focus = Focus::Genre("Horror".to_string());

        let result = content_candidates(&store, &consumed, Some(&focus), first_page())
            .await
            .unwrap();
        assert_eq!(keys(&result), vec![CandidateKey::Catalog(MediaKind::Book, 4)]);
    }

    #[tokio::test]
    async fn test_focus_matching_nothing_yields_nothing() {
        let consumed_book = book(1, "Read", "A. Doe", "Fantasy");
        let store = store_with(vec![consumed_book.clone(), book(2, "Other", "A. Doe", "Fantasy")]).await;
        let consumed = ConsumedMedia::from_items(vec![consumed_book]);
        let focus = Focus::Creator("Nobody".to_string());

        let result = content_candidates(&store, &consumed, Some(&focus), first_page())
            .await
            .unwrap();
        assert!(result.candidates.is_empty());
    }

    #[tokio::test]
    async fn test_each_kind_is_paginated_independently() {
        let consumed_book = book(100, "Seed", "A. Doe", "Fantasy");
        let mut items = vec![consumed_book.clone()];
        for id in 1..=5 {
            items.push(book(id, &format!("Book {}", id), "A. Doe", "Fantasy"));
        }
        for id in 1..=2 {
            items.push(film(id, &format!("Film {}", id), "Someone", "Fantasy"));
        }
        let store = store_with(items).await;
        let consumed = ConsumedMedia::from_items(vec![consumed_book]);

        let result = content_candidates(&store, &consumed, None, PageRequest::new(2, 2).unwrap())
            .await
            .unwrap();
        // Page two of five books; the two films fit on page one
        assert_eq!(
            keys(&result),
            vec![
                CandidateKey::Catalog(MediaKind::Book, 3),
                CandidateKey::Catalog(MediaKind::Book, 4),
            ]
        );
        assert_eq!(result.total_pages, 3);
    }
}
