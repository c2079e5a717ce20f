//! Read contracts of the three collaborators the recommendation engine
//! depends on. Implemented by [`PgStore`](super::postgres::PgStore) and by
//! [`MemoryStore`](super::memory::MemoryStore).

use crate::{
    error::AppResult,
    models::{ConsumedMedia, ContentSignals, MediaId, MediaItem, MediaKind, UserId},
    services::pagination::{Page, PageRequest},
};

/// The book, film and music catalogs
#[async_trait::async_trait]
pub trait MediaCatalog: Send + Sync {
    /// Items of `kind` matching any of the signals, minus `exclude_ids`, ordered by id
    async fn find_matching(
        &self,
        kind: MediaKind,
        signals: &ContentSignals,
        exclude_ids: &[MediaId],
        page: PageRequest,
    ) -> AppResult<Page<MediaItem>>;

    /// Distinct items of `kind` in any of the given users' libraries, minus `exclude_ids`
    async fn find_consumed_by(
        &self,
        kind: MediaKind,
        user_ids: &[UserId],
        exclude_ids: &[MediaId],
        page: PageRequest,
    ) -> AppResult<Page<MediaItem>>;

    /// First item of `kind` whose title is exactly `title`
    async fn find_by_exact_title(&self, kind: MediaKind, title: &str)
        -> AppResult<Option<MediaItem>>;
}

/// Per-user library records joined with the catalogs
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ConsumptionStore: Send + Sync {
    /// Every catalog item in the user's library, whatever its status
    async fn list_consumed(&self, user_id: UserId) -> AppResult<ConsumedMedia>;
}

/// Directed follow edges
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SocialGraph: Send + Sync {
    /// Users directly followed by `user_id`
    async fn list_followees(&self, user_id: UserId) -> AppResult<Vec<UserId>>;
}
