/// Read-through caching around an async computation.
///
/// Returns the cached value for `$key` when present. Otherwise awaits
/// `$block`, queues the result for a background write with `$ttl` seconds to
/// live, and returns it. Errors from the lookup or the block propagate with
/// `?`, so the enclosing function must return `AppResult`.
///
/// ```rust,ignore
/// let item: CatalogItem = cached!(self.cache, key, DETAILS_TTL, async move {
///     self.fetch_details(media_type, tmdb_id).await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        match $cache.get_from_cache(&key).await? {
            Some(hit) => {
                tracing::debug!(key = %key, "Cache hit");
                Ok(hit)
            }
            None => {
                tracing::debug!(key = %key, "Cache miss");
                let value = $block.await?;
                $cache.set_in_background(&key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
