/// Read-through caching over an optional [`Cache`](crate::db::Cache).
///
/// `$cache` is an `Option<&Cache>`. A hit returns the cached value. A miss, an
/// absent cache or a failed cache read runs `$block` and returns its result.
/// The result is queued for a background write only when `$keep(&value)` is
/// true. Errors of `$block` propagate with `?`.
///
/// ```ignore
/// let text: String = cached!(self.cache.as_ref(), key, ttl, async {
///     self.request(prompt).await
/// }, keep_if = |text: &String| !text.is_empty())?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr, keep_if = $keep:expr) => {{
        let cache: Option<&$crate::db::Cache> = $cache;
        let key = $key;

        let hit = match cache {
            Some(cache) => match cache.get_from_cache(&key).await {
                Ok(hit) => hit,
                Err(e) => {
                    tracing::warn!(error = %e, key = %key, "Cache read failed, treating as miss");
                    None
                }
            },
            None => None,
        };

        match hit {
            Some(cached) => {
                tracing::debug!(key = %key, "Cache hit");
                Ok(cached)
            }
            None => {
                let value = $block.await?;
                if let Some(cache) = cache {
                    if ($keep)(&value) {
                        cache.set_in_background(&key, &value, $ttl);
                    } else {
                        tracing::debug!(key = %key, "Value not cacheable, skipping write");
                    }
                }
                Ok(value)
            }
        }
    }};
}
