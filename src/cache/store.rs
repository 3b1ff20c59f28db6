// Cache store with generation-based TTL.
// One shared timestamp governs validity of the listing and every cached body.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::clock::Clock;
use super::medium::CacheMedium;

/// Default TTL for a cache generation: 5 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Namespaced keys used on the medium.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeys {
    pub listing: String,
    pub timestamp: String,
    content_prefix: String,
}

impl CacheKeys {
    pub fn new(namespace: &str) -> Self {
        Self {
            listing: format!("{}:listing", namespace),
            timestamp: format!("{}:timestamp", namespace),
            content_prefix: format!("{}:content:", namespace),
        }
    }

    /// Key of the cached body for one document filename.
    pub fn content(&self, filename: &str) -> String {
        format!("{}{}", self.content_prefix, filename)
    }
}

/// A cached body tagged with the generation it was written under.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct CachedBody {
    generation: i64,
    content: String,
}

/// Time-bounded cache for the document listing and bodies.
///
/// Reads never fail: any medium error or corrupt entry is logged and
/// reported as a miss. Only [`CacheStore::set_listing`] starts a new
/// generation; bodies written under an older generation read as misses.
pub struct CacheStore {
    medium: Box<dyn CacheMedium>,
    clock: Arc<dyn Clock>,
    keys: CacheKeys,
    ttl: Duration,
}

impl CacheStore {
    pub fn new(
        medium: Box<dyn CacheMedium>,
        clock: Arc<dyn Clock>,
        namespace: &str,
        ttl: Duration,
    ) -> Self {
        Self {
            medium,
            clock,
            keys: CacheKeys::new(namespace),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// True iff a generation stamp exists and is younger than the TTL.
    pub fn is_valid(&self) -> bool {
        self.valid_generation().is_some()
    }

    /// When the current generation was stamped, if any.
    pub fn generation_stamp(&self) -> Option<DateTime<Utc>> {
        self.stored_generation()
            .and_then(DateTime::from_timestamp_millis)
    }

    /// Cached listing, only within a valid generation.
    pub fn get_listing(&self) -> Option<Vec<String>> {
        self.valid_generation()?;

        let raw = self.read(&self.keys.listing)?;
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(listing) => {
                tracing::debug!(entries = listing.len(), "listing cache hit");
                Some(listing)
            }
            Err(e) => {
                tracing::warn!(error = %e, "discarding corrupt cached listing");
                None
            }
        }
    }

    /// Cached body for `filename`, only if written under the current valid generation.
    pub fn get_content(&self, filename: &str) -> Option<String> {
        let generation = self.valid_generation()?;

        let raw = self.read(&self.keys.content(filename))?;
        match serde_json::from_str::<CachedBody>(&raw) {
            Ok(body) if body.generation == generation => {
                tracing::debug!(filename, "content cache hit");
                Some(body.content)
            }
            Ok(_) => {
                tracing::debug!(filename, "cached content belongs to an older generation");
                None
            }
            Err(e) => {
                tracing::warn!(filename, error = %e, "discarding corrupt cached content");
                None
            }
        }
    }

    /// Store the listing and start a new generation stamped now.
    pub fn set_listing(&mut self, listing: &[String]) {
        let json = match serde_json::to_string(listing) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize listing");
                return;
            }
        };

        // A stamp without its listing would validate stale data
        if !self.write(&self.keys.listing.clone(), &json) {
            return;
        }

        let stamp = self.clock.now().timestamp_millis();
        self.write(&self.keys.timestamp.clone(), &stamp.to_string());
        tracing::debug!(entries = listing.len(), stamp, "cache generation started");
    }

    /// Store a body under the current generation without refreshing its stamp.
    pub fn set_content(&mut self, filename: &str, content: &str) {
        let Some(generation) = self.valid_generation() else {
            tracing::debug!(filename, "no valid cache generation, skipping content write");
            return;
        };

        let body = CachedBody {
            generation,
            content: content.to_string(),
        };
        match serde_json::to_string(&body) {
            Ok(json) => {
                self.write(&self.keys.content(filename), &json);
            }
            Err(e) => tracing::warn!(filename, error = %e, "failed to serialize content"),
        }
    }

    /// Drop the generation stamp so every read misses until the next listing write.
    pub fn invalidate(&mut self) {
        let key = self.keys.timestamp.clone();
        if let Err(e) = self.medium.remove(&key) {
            tracing::warn!(error = %e, "failed to invalidate cache generation");
        }
    }

    fn stored_generation(&self) -> Option<i64> {
        let raw = self.read(&self.keys.timestamp)?;
        match raw.trim().parse::<i64>() {
            Ok(stamp) => Some(stamp),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring corrupt cache timestamp");
                None
            }
        }
    }

    fn valid_generation(&self) -> Option<i64> {
        let stamp = self.stored_generation()?;
        let elapsed_ms = self.clock.now().timestamp_millis() - stamp;
        let ttl_ms = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);

        if elapsed_ms < ttl_ms {
            Some(stamp)
        } else {
            tracing::debug!(elapsed_ms, ttl_ms, "cache generation expired");
            None
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.medium.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache read failed, treating as miss");
                None
            }
        }
    }

    fn write(&mut self, key: &str, value: &str) -> bool {
        match self.medium.set(key, value) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache write failed, dropping entry");
                false
            }
        }
    }
}
