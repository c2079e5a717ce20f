use crate::{
    db::ConsumptionStore,
    error::AppResult,
    models::{ConsumedMedia, UserId},
};

/// Loads every catalog item in the user's library, grouped by kind
///
/// Store failures propagate; there is nothing to recommend from without them.
pub async fn load_consumption(
    store: &dyn ConsumptionStore,
    user_id: UserId,
) -> AppResult<ConsumedMedia> {
    let consumed = store.list_consumed(user_id).await?;

    tracing::debug!(
        user_id = user_id,
        books = consumed.books.len(),
        films = consumed.films.len(),
        music = consumed.music.len(),
        "Loaded consumption history"
    );

    Ok(consumed)
}
