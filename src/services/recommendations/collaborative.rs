use crate::{
    db::{MediaCatalog, SocialGraph},
    error::AppResult,
    models::{ConsumedMedia, MediaKind, Source, UserId},
    services::pagination::PageRequest,
};

use super::SourceCandidates;

/// Collaborative candidates: items in the libraries of users that `user_id`
/// follows, minus anything `user_id` already has
///
/// One hop only; followees of followees are not considered. A user with no
/// history gets nothing, even when they follow someone.
pub async fn collaborative_candidates(
    social: &dyn SocialGraph,
    catalog: &dyn MediaCatalog,
    user_id: UserId,
    consumed: &ConsumedMedia,
    page: PageRequest,
) -> AppResult<SourceCandidates> {
    if consumed.is_empty() {
        tracing::debug!(user_id = user_id, "Empty history, skipping collaborative candidates");
        return Ok(SourceCandidates::default());
    }

    let followees = social.list_followees(user_id).await?;
    if followees.is_empty() {
        tracing::debug!(user_id = user_id, "User follows nobody, skipping collaborative candidates");
        return Ok(SourceCandidates::default());
    }

    let followees = &followees;
    let fetch = move |kind: MediaKind| {
        async move {
            let exclude = consumed.ids(kind);
            catalog.find_consumed_by(kind, followees, &exclude, page).await
        }
    };

    let (books, films, music) = tokio::try_join!(
        fetch(MediaKind::Book),
        fetch(MediaKind::Film),
        fetch(MediaKind::Music)
    )?;

    tracing::debug!(
        user_id = user_id,
        followees = followees.len(),
        "Fetched collaborative candidates"
    );

    Ok(SourceCandidates::from_pages(Source::Collaborative, [books, films, music]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ConsumptionStore;
    use crate::models::CandidateKey;
    use crate::services::recommendations::fixtures::{album, book, done, film, planned, store_with};

    fn first_page() -> PageRequest {
        PageRequest::new(1, 10).unwrap()
    }

    #[tokio::test]
    async fn test_followee_library_minus_own() {
        let store = store_with(vec![
            book(1, "Shared", "A. Doe", "Fantasy"),
            film(5, "Only Theirs", "B. Roe", "Drama"),
        ])
        .await;
        // U follows V; U has book 1, V has book 1 and film 5
        store.follow(1, 2).await;
        store.add_record(done(1, MediaKind::Book, 1)).await;
        store.add_record(done(2, MediaKind::Book, 1)).await;
        store.add_record(done(2, MediaKind::Film, 5)).await;
        let consumed = store.list_consumed(1).await.unwrap();

        let result = collaborative_candidates(&store, &store, 1, &consumed, first_page())
            .await
            .unwrap();

        assert_eq!(result.candidates.len(), 1);
        assert_eq!(result.candidates[0].key(), CandidateKey::Catalog(MediaKind::Film, 5));
        assert_eq!(result.candidates[0].source, Source::Collaborative);
    }

    #[tokio::test]
    async fn test_no_followees_yields_nothing() {
        let store = store_with(vec![
            book(1, "Lonely", "A. Doe", "Fantasy"),
            book(2, "Mine", "B. Roe", "Drama"),
        ])
        .await;
        store.add_record(done(1, MediaKind::Book, 2)).await;
        store.add_record(done(2, MediaKind::Book, 1)).await;
        let consumed = store.list_consumed(1).await.unwrap();

        let result = collaborative_candidates(&store, &store, 1, &consumed, first_page())
            .await
            .unwrap();
        assert!(result.candidates.is_empty());
        assert_eq!(result.total_pages, 0);
    }

    #[tokio::test]
    async fn test_is_one_hop_only() {
        let store = store_with(vec![
            album(9, "Two Hops Away", "C. Poe", "Jazz"),
            book(1, "Mine", "A. Doe", "Fantasy"),
        ])
        .await;
        store.follow(1, 2).await;
        store.follow(2, 3).await;
        store.add_record(done(1, MediaKind::Book, 1)).await;
        store.add_record(done(3, MediaKind::Music, 9)).await;
        let consumed = store.list_consumed(1).await.unwrap();

        let result = collaborative_candidates(&store, &store, 1, &consumed, first_page())
            .await
            .unwrap();
        assert!(result.candidates.is_empty());
    }

    #[tokio::test]
    async fn test_items_shared_by_several_followees_appear_once() {
        let store = store_with(vec![
            book(3, "Popular", "A. Doe", "Fantasy"),
            book(4, "Mine", "B. Roe", "Drama"),
        ])
        .await;
        store.follow(1, 2).await;
        store.follow(1, 3).await;
        store.add_record(done(1, MediaKind::Book, 4)).await;
        store.add_record(done(2, MediaKind::Book, 3)).await;
        store.add_record(planned(3, MediaKind::Book, 3)).await;
        let consumed = store.list_consumed(1).await.unwrap();

        let result = collaborative_candidates(&store, &store, 1, &consumed, first_page())
            .await
            .unwrap();
        assert_eq!(result.candidates.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_history_yields_nothing_even_with_followees() {
        let store = store_with(vec![film(5, "Only Theirs", "B. Roe", "Drama")]).await;
        store.follow(1, 2).await;
        store.add_record(done(2, MediaKind::Film, 5)).await;

        let result =
            collaborative_candidates(&store, &store, 1, &ConsumedMedia::new(), first_page())
                .await
                .unwrap();
        assert!(result.candidates.is_empty());
        assert_eq!(result.total_pages, 0);
    }
}
