/// Read-through caching on top of [`crate::db::Cache`].
///
/// Returns the cached value for `$key` when present. Otherwise awaits `$block`
/// (which must yield an `AppResult`), queues the value for a background write
/// with `$ttl` seconds to live, and returns it. Errors from `$block` are
/// propagated with `?` and never cached. A failed cache read counts as a miss.
///
/// # Example
/// ```rust,ignore
/// let summary = cached!(cache, CacheKey::MovieSummary(title), 3600, async move {
///     lookup_summary(&title).await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        match $cache.get_from_cache(&key).await {
            Ok(Some(cached)) => Ok(cached),
            lookup => {
                if let Err(e) = lookup {
                    tracing::warn!(error = %e, key = %key, "Cache read failed, treating as miss");
                }
                let value = $block.await?;
                $cache.set_in_background(&key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
