/// Wraps a fetch in a read-through Redis cache.
///
/// `$cache` is an `Option<&Cache>`. With no cache the block simply runs. With a
/// cache, a hit is returned directly; a miss or a failed cache read runs the
/// block and stores its value in the background.
///
/// # Arguments
/// * `$cache`: `Option<&Cache>` to read from and write to.
/// * `$key`: The `CacheKey` for the value.
/// * `$ttl`: Time-to-live for the stored value, in seconds.
/// * `$block`: Future producing `AppResult<T>` on a miss.
///
/// # Example
/// ```rust,ignore
/// let key = CacheKey::MovieDetails(id);
/// cached!(self.cache.as_ref(), key, DETAILS_CACHE_TTL, async move {
///     fetch_details(id).await
/// })
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        match $cache {
            Some(cache) => match cache.get_from_cache(&$key).await {
                Ok(Some(hit)) => Ok(hit),
                lookup => {
                    if let Err(e) = lookup {
                        tracing::warn!(error = %e, key = %$key, "Cache read failed, fetching from origin");
                    }
                    let value = $block.await?;
                    cache.set_in_background(&$key, &value, $ttl);
                    Ok(value)
                }
            },
            None => $block.await,
        }
    }};
}
