/*
 * cache.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Finestra, a minimal text-mode web browser.
 *
 * Finestra is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Finestra is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Finestra.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Time-bounded in-memory response cache keyed by request identity.
//!
//! Entries are written only for cacheable 200 responses and evicted lazily
//! when a lookup finds them expired. Unbounded; the cache lives as long as
//! the client that owns it. The clock is injectable so tests can drive time.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use log::debug;

use crate::url::CacheKey;

/// Source of "now" for expiry decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock; the default.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct CacheEntry {
    body: String,
    expires_at: Instant,
}

/// Response cache: body plus absolute expiry per request identity.
/// Lookup and store each take the mutex, so the read-check-then-write is
/// serialized across concurrent fetches.
pub struct ResponseCache {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Body for `key` if present and strictly before expiry. An expired
    /// entry is removed as a side effect.
    pub fn lookup(&self, key: &CacheKey) -> Option<String> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(key) {
            Some(entry) if now < entry.expires_at => Some(entry.body.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store the body iff the response is cacheable: status 200 and a
    /// cache-control of exactly `max-age=<seconds>`. Overwrites any prior
    /// entry for the same key.
    pub fn maybe_store(
        &self,
        key: &CacheKey,
        status: u16,
        headers: &HashMap<String, String>,
        body: &str,
    ) {
        if status != 200 {
            return;
        }
        let Some(cache_control) = headers.get("cache-control") else {
            return;
        };
        let Some(max_age) = parse_max_age(cache_control) else {
            return;
        };
        let expires_at = self.clock.now() + Duration::from_secs(max_age);
        debug!("caching {:?} for {}s", key, max_age);
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            key.clone(),
            CacheEntry {
                body: body.to_string(),
                expires_at,
            },
        );
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Accept exactly `max-age=<nonnegative integer>`, case-folded. A comma
/// anywhere means a directive list we do not understand, so the response is
/// not cached at all.
fn parse_max_age(value: &str) -> Option<u64> {
    let value = value.trim().to_ascii_lowercase();
    if value.contains(',') {
        return None;
    }
    value.strip_prefix("max-age=")?.parse::<u64>().ok()
}
