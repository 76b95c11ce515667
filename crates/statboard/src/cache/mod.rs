//! Two-tier cache for computed activity feeds and leaderboard pages.
//!
//! Tier one is a process-local map with a short TTL for hot reads; tier
//! two is an optional redis store with a longer TTL shared across
//! processes. The distributed tier is strictly best-effort: any redis
//! failure degrades to local-only behavior and is logged, never
//! propagated to the caller.
//!
//! Payloads written to redis are zstd-compressed with a plain-JSON
//! fallback; reads detect compression by magic bytes, so mixed content
//! is always readable.

pub mod compression;
pub mod keys;

use std::time::{Duration, Instant};

use dashmap::DashMap;

use compression::{compress_bytes, decompress_bytes};

/// Configuration for the tiered cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Redis connection URL; `None` disables the distributed tier.
    pub redis_url: Option<String>,
    /// TTL for the process-local tier.
    pub local_ttl: Duration,
    /// TTL for the distributed tier.
    pub remote_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            local_ttl: Duration::from_secs(120),
            remote_ttl: Duration::from_secs(600),
        }
    }
}

struct LocalEntry {
    value: serde_json::Value,
    built_at: Instant,
}

/// The two-tier cache.
///
/// Constructed once per process and passed by handle to every consumer;
/// there is deliberately no ambient global instance.
pub struct TieredCache {
    local: DashMap<String, LocalEntry>,
    /// Build-lock fallback when the distributed tier is absent.
    local_locks: DashMap<String, Instant>,
    local_ttl: Duration,
    remote_ttl: Duration,
    #[cfg(feature = "redis-cache")]
    remote: Option<redis::aio::ConnectionManager>,
}

impl TieredCache {
    /// Create a cache with only the process-local tier.
    pub fn local_only(config: &CacheConfig) -> Self {
        Self {
            local: DashMap::new(),
            local_locks: DashMap::new(),
            local_ttl: config.local_ttl,
            remote_ttl: config.remote_ttl,
            #[cfg(feature = "redis-cache")]
            remote: None,
        }
    }

    /// Create a cache, connecting the distributed tier when configured.
    ///
    /// Never fails: an absent or unreachable redis leaves the cache in
    /// local-only mode so callers keep working.
    pub async fn connect(config: &CacheConfig) -> Self {
        #[cfg(feature = "redis-cache")]
        {
            let mut cache = Self::local_only(config);
            if let Some(url) = &config.redis_url {
                match redis::Client::open(url.as_str()) {
                    Ok(client) => match redis::aio::ConnectionManager::new(client).await {
                        Ok(conn) => {
                            tracing::info!("distributed cache tier connected");
                            cache.remote = Some(conn);
                        }
                        Err(e) => {
                            tracing::warn!(
                                "distributed cache unreachable, continuing local-only: {}",
                                e
                            );
                        }
                    },
                    Err(e) => {
                        tracing::warn!("invalid redis URL, continuing local-only: {}", e);
                    }
                }
            }
            cache
        }
        #[cfg(not(feature = "redis-cache"))]
        {
            Self::local_only(config)
        }
    }

    /// Whether the distributed tier is connected.
    pub fn has_remote(&self) -> bool {
        #[cfg(feature = "redis-cache")]
        {
            self.remote.is_some()
        }
        #[cfg(not(feature = "redis-cache"))]
        {
            false
        }
    }

    /// Get a cached payload.
    ///
    /// Checks the local tier first, then the distributed tier (populating
    /// the local tier on a hit). Returns `None` on a miss; the caller
    /// rebuilds and calls [`set`](Self::set).
    pub async fn get(&self, key: &str) -> Option<serde_json::Value> {
        if let Some(entry) = self.local.get(key) {
            if entry.built_at.elapsed() < self.local_ttl {
                return Some(entry.value.clone());
            }
            drop(entry);
            self.local.remove(key);
        }

        let bytes = self.remote_get(key).await?;
        let raw = match decompress_bytes(&bytes) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!("cache payload for {} undecodable: {}", key, e);
                return None;
            }
        };
        let value: serde_json::Value = match serde_json::from_slice(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("cache payload for {} is not JSON: {}", key, e);
                return None;
            }
        };

        self.local.insert(
            key.to_string(),
            LocalEntry {
                value: value.clone(),
                built_at: Instant::now(),
            },
        );
        Some(value)
    }

    /// Write a payload through both tiers.
    pub async fn set(&self, key: &str, value: &serde_json::Value) {
        self.local.insert(
            key.to_string(),
            LocalEntry {
                value: value.clone(),
                built_at: Instant::now(),
            },
        );

        let Ok(raw) = serde_json::to_vec(value) else {
            return;
        };
        // Compression failure falls back to the uncompressed payload
        let payload = match compress_bytes(&raw) {
            Ok(compressed) => compressed,
            Err(e) => {
                tracing::debug!("compression failed for {}, storing plain: {}", key, e);
                raw
            }
        };
        self.remote_set(key, payload).await;
    }

    /// Remove one entry from both tiers.
    pub async fn clear(&self, key: &str) {
        self.local.remove(key);
        self.remote_delete(key).await;
    }

    /// Remove every entry under the cache namespace from both tiers.
    ///
    /// Administrative: normal sync flow uses targeted invalidation plus
    /// the global-feed merge update instead.
    pub async fn clear_all(&self) {
        self.local.clear();
        self.remote_clear_all().await;
    }

    /// Try to acquire the build lock for a key.
    ///
    /// At most one caller per TTL window gets `true` and proceeds to
    /// rebuild; losers poll the cache or serve a slightly stale value.
    /// Backed by `SET NX EX` on the distributed tier so the lock holds
    /// across processes; falls back to a process-local lock otherwise.
    pub async fn try_acquire_build_lock(&self, key: &str, ttl: Duration) -> bool {
        if let Some(acquired) = self.remote_try_lock(key, ttl).await {
            return acquired;
        }

        let now = Instant::now();
        match self.local_locks.entry(key.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(mut occupied) => {
                if *occupied.get() > now {
                    false
                } else {
                    occupied.insert(now + ttl);
                    true
                }
            }
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(now + ttl);
                true
            }
        }
    }

    /// Release the build lock for a key.
    pub async fn release_build_lock(&self, key: &str) {
        self.local_locks.remove(key);
        self.remote_unlock(key).await;
    }

    // ─── Distributed tier primitives ─────────────────────────────────────────
    // Every redis failure is logged at debug and swallowed; the caller
    // sees a miss or a local-only lock, never an error.

    #[cfg(feature = "redis-cache")]
    async fn remote_get(&self, key: &str) -> Option<Vec<u8>> {
        let conn = self.remote.as_ref()?;
        let mut conn = conn.clone();
        let full_key = format!("{}{}", keys::CACHE_PREFIX, key);

        match redis::cmd("GET")
            .arg(&full_key)
            .query_async::<Option<Vec<u8>>>(&mut conn)
            .await
        {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("cache get failed for {}: {}", key, e);
                None
            }
        }
    }

    #[cfg(not(feature = "redis-cache"))]
    async fn remote_get(&self, _key: &str) -> Option<Vec<u8>> {
        None
    }

    #[cfg(feature = "redis-cache")]
    async fn remote_set(&self, key: &str, payload: Vec<u8>) {
        let Some(conn) = self.remote.as_ref() else {
            return;
        };
        let mut conn = conn.clone();
        let full_key = format!("{}{}", keys::CACHE_PREFIX, key);

        let result = redis::cmd("SET")
            .arg(&full_key)
            .arg(payload)
            .arg("EX")
            .arg(self.remote_ttl.as_secs())
            .query_async::<()>(&mut conn)
            .await;
        if let Err(e) = result {
            tracing::debug!("cache set failed for {}: {}", key, e);
        }
    }

    #[cfg(not(feature = "redis-cache"))]
    async fn remote_set(&self, _key: &str, _payload: Vec<u8>) {}

    #[cfg(feature = "redis-cache")]
    async fn remote_delete(&self, key: &str) {
        let Some(conn) = self.remote.as_ref() else {
            return;
        };
        let mut conn = conn.clone();
        let full_key = format!("{}{}", keys::CACHE_PREFIX, key);

        if let Err(e) = redis::cmd("DEL")
            .arg(&full_key)
            .query_async::<()>(&mut conn)
            .await
        {
            tracing::debug!("cache delete failed for {}: {}", key, e);
        }
    }

    #[cfg(not(feature = "redis-cache"))]
    async fn remote_delete(&self, _key: &str) {}

    #[cfg(feature = "redis-cache")]
    async fn remote_clear_all(&self) {
        use redis::AsyncCommands;

        let Some(conn) = self.remote.as_ref() else {
            return;
        };
        let mut conn = conn.clone();
        let pattern = format!("{}*", keys::CACHE_PREFIX);

        let found: Vec<String> = {
            let mut iter = match conn.scan_match::<_, String>(&pattern).await {
                Ok(iter) => iter,
                Err(e) => {
                    tracing::debug!("cache scan failed: {}", e);
                    return;
                }
            };
            let mut found = Vec::new();
            while let Some(key) = iter.next_item().await {
                found.push(key);
            }
            found
        };

        if found.is_empty() {
            return;
        }
        if let Err(e) = redis::cmd("DEL")
            .arg(&found)
            .query_async::<()>(&mut conn)
            .await
        {
            tracing::debug!("cache clear-all delete failed: {}", e);
        }
    }

    #[cfg(not(feature = "redis-cache"))]
    async fn remote_clear_all(&self) {}

    /// Try the distributed lock; `None` means no distributed tier.
    #[cfg(feature = "redis-cache")]
    async fn remote_try_lock(&self, key: &str, ttl: Duration) -> Option<bool> {
        let conn = self.remote.as_ref()?;
        let mut conn = conn.clone();
        let lock_key = format!("{}{}", keys::LOCK_PREFIX, key);

        match redis::cmd("SET")
            .arg(&lock_key)
            .arg("1")
            .arg("NX")
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async::<Option<String>>(&mut conn)
            .await
        {
            Ok(reply) => Some(reply.is_some()),
            Err(e) => {
                tracing::debug!("build lock acquire failed for {}: {}", key, e);
                // Treat a broken lock service as no lock service
                None
            }
        }
    }

    #[cfg(not(feature = "redis-cache"))]
    async fn remote_try_lock(&self, _key: &str, _ttl: Duration) -> Option<bool> {
        None
    }

    #[cfg(feature = "redis-cache")]
    async fn remote_unlock(&self, key: &str) {
        let Some(conn) = self.remote.as_ref() else {
            return;
        };
        let mut conn = conn.clone();
        let lock_key = format!("{}{}", keys::LOCK_PREFIX, key);

        if let Err(e) = redis::cmd("DEL")
            .arg(&lock_key)
            .query_async::<()>(&mut conn)
            .await
        {
            tracing::debug!("build lock release failed for {}: {}", key, e);
        }
    }

    #[cfg(not(feature = "redis-cache"))]
    async fn remote_unlock(&self, _key: &str) {}
}
