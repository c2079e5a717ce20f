use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    db::store::{ConsumptionStore, MediaCatalog, SocialGraph},
    error::AppResult,
    models::{
        ConsumedMedia, ConsumptionRecord, ContentSignals, FollowEdge, MediaId, MediaItem,
        MediaKind, UserId,
    },
    services::pagination::{paginate, Page, PageRequest},
};

/// In-process catalog, library and follow graph
///
/// Same matching semantics as the Postgres store; used for local runs and tests.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
}

#[derive(Default)]
struct MemoryStoreInner {
    items: Vec<MediaItem>,
    records: Vec<ConsumptionRecord>,
    follows: HashSet<FollowEdge>,
}

impl MemoryStoreInner {
    /// Catalog items of one kind ordered by id
    fn catalog(&self, kind: MediaKind) -> impl Iterator<Item = &MediaItem> {
        let mut items: Vec<&MediaItem> =
            self.items.iter().filter(|item| item.kind() == kind).collect();
        items.sort_by_key(|item| item.id());
        items.into_iter()
    }

    fn library_ids(&self, kind: MediaKind, users: &[UserId]) -> BTreeSet<MediaId> {
        self.records
            .iter()
            .filter(|r| r.media_kind == kind && users.contains(&r.user_id))
            .map(|r| r.media_id)
            .collect()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a catalog item
    pub async fn add_item(&self, item: MediaItem) {
        let mut inner = self.inner.write().await;
        let key = item.key();
        inner.items.retain(|existing| existing.key() != key);
        inner.items.push(item);
    }

    /// Adds a library record; a second record for the same item replaces the first
    pub async fn add_record(&self, record: ConsumptionRecord) {
        let mut inner = self.inner.write().await;
        inner.records.retain(|r| {
            !(r.user_id == record.user_id
                && r.media_kind == record.media_kind
                && r.media_id == record.media_id)
        });
        inner.records.push(record);
    }

    pub async fn follow(&self, follower_id: UserId, followed_id: UserId) {
        let mut inner = self.inner.write().await;
        inner.follows.insert(FollowEdge {
            follower_id,
            followed_id,
        });
    }

    pub async fn unfollow(&self, follower_id: UserId, followed_id: UserId) {
        let mut inner = self.inner.write().await;
        inner.follows.remove(&FollowEdge {
            follower_id,
            followed_id,
        });
    }
}

#[async_trait::async_trait]
impl MediaCatalog for MemoryStore {
    async fn find_matching(
        &self,
        kind: MediaKind,
        signals: &ContentSignals,
        exclude_ids: &[MediaId],
        page: PageRequest,
    ) -> AppResult<Page<MediaItem>> {
        let inner = self.inner.read().await;
        let matches: Vec<MediaItem> = inner
            .catalog(kind)
            .filter(|item| !exclude_ids.contains(&item.id()) && signals.matches(item))
            .cloned()
            .collect();
        Ok(paginate(matches, page))
    }

    async fn find_consumed_by(
        &self,
        kind: MediaKind,
        user_ids: &[UserId],
        exclude_ids: &[MediaId],
        page: PageRequest,
    ) -> AppResult<Page<MediaItem>> {
        let inner = self.inner.read().await;
        let ids = inner.library_ids(kind, user_ids);
        let items: Vec<MediaItem> = inner
            .catalog(kind)
            .filter(|item| ids.contains(&item.id()) && !exclude_ids.contains(&item.id()))
            .cloned()
            .collect();
        Ok(paginate(items, page))
    }

    async fn find_by_exact_title(
        &self,
        kind: MediaKind,
        title: &str,
    ) -> AppResult<Option<MediaItem>> {
        let inner = self.inner.read().await;
        let found = inner.catalog(kind).find(|item| item.title() == title).cloned();
        Ok(found)
    }
}

#[async_trait::async_trait]
impl ConsumptionStore for MemoryStore {
    async fn list_consumed(&self, user_id: UserId) -> AppResult<ConsumedMedia> {
        let inner = self.inner.read().await;
        let mut consumed = ConsumedMedia::new();
        for kind in MediaKind::ALL {
            let ids = inner.library_ids(kind, &[user_id]);
            for item in inner.catalog(kind).filter(|item| ids.contains(&item.id())) {
                consumed.push(item.clone());
            }
        }
        Ok(consumed)
    }
}

#[async_trait::async_trait]
impl SocialGraph for MemoryStore {
    async fn list_followees(&self, user_id: UserId) -> AppResult<Vec<UserId>> {
        let inner = self.inner.read().await;
        let mut followees: Vec<UserId> = inner
            .follows
            .iter()
            .filter(|edge| edge.follower_id == user_id)
            .map(|edge| edge.followed_id)
            .collect();
        followees.sort_unstable();
        Ok(followees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Book;

    fn book(id: MediaId, title: &str) -> MediaItem {
        MediaItem::Book(Book {
            id,
            title: title.to_string(),
            author: Some("A. Doe".to_string()),
            genre: None,
            year: None,
            country: None,
            language: None,
            publisher: None,
            description: None,
            coverart: None,
        })
    }

    fn record(user_id: UserId, media_id: MediaId, planned: bool) -> ConsumptionRecord {
        ConsumptionRecord {
            user_id,
            media_kind: MediaKind::Book,
            media_id,
            done: !planned,
            planned,
            rating: None,
            date_consumed: None,
        }
    }

    #[tokio::test]
    async fn test_list_consumed_includes_any_status() {
        let store = MemoryStore::new();
        store.add_item(book(1, "One")).await;
        store.add_item(book(2, "Two")).await;
        store.add_item(book(3, "Three")).await;
        store.add_record(record(10, 1, false)).await;
        store.add_record(record(10, 2, true)).await;

        let consumed = store.list_consumed(10).await.unwrap();
        assert_eq!(consumed.ids(MediaKind::Book), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_find_by_exact_title_is_exact() {
        let store = MemoryStore::new();
        store.add_item(book(1, "Dune")).await;

        assert!(store.find_by_exact_title(MediaKind::Book, "Dune").await.unwrap().is_some());
        assert!(store.find_by_exact_title(MediaKind::Book, "dune").await.unwrap().is_none());
        assert!(store.find_by_exact_title(MediaKind::Film, "Dune").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_follow_and_unfollow() {
        let store = MemoryStore::new();
        store.follow(1, 3).await;
        store.follow(1, 2).await;
        store.follow(1, 2).await;
        assert_eq!(store.list_followees(1).await.unwrap(), vec![2, 3]);

        store.unfollow(1, 3).await;
        assert_eq!(store.list_followees(1).await.unwrap(), vec![2]);
        assert!(store.list_followees(2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_consumed_by_deduplicates_and_excludes() {
        let store = MemoryStore::new();
        store.add_item(book(1, "One")).await;
        store.add_item(book(2, "Two")).await;
        store.add_record(record(20, 1, false)).await;
        store.add_record(record(21, 1, false)).await;
        store.add_record(record(21, 2, false)).await;

        let page = store
            .find_consumed_by(MediaKind::Book, &[20, 21], &[2], PageRequest::new(1, 10).unwrap())
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id(), 1);
        assert_eq!(page.total_items, 1);
    }
}
