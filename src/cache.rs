//! Bounded read-through cache over generated levels.
//!
//! Generation is a pure function of (level, seed), so caching is plain
//! memoization: values are immutable `Arc<Level>`s and a hit is
//! indistinguishable from a fresh generation. The cache belongs to the
//! serving layer; the generator itself holds no shared state.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::debug;

use crate::generator::generate;
use crate::{Level, Result};

pub const DEFAULT_CAPACITY: usize = 128;

pub struct LevelCache {
    levels: Mutex<LruCache<(u32, u64), Arc<Level>>>,
}

impl LevelCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        Self {
            levels: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Process-wide default instance.
    pub fn global() -> &'static LevelCache {
        static GLOBAL: Lazy<LevelCache> = Lazy::new(|| LevelCache::new(DEFAULT_CAPACITY));
        &GLOBAL
    }

    /// Returns the cached level for (level, seed), generating and inserting
    /// it on a miss. Generation failures are not cached.
    pub fn get_or_generate(&self, level: u32, seed: Option<u64>) -> Result<Arc<Level>> {
        let seed = seed.unwrap_or(u64::from(level));
        let key = (level, seed);

        if let Some(cached) = self.levels.lock().get(&key) {
            debug!(level, seed, "level cache hit");
            return Ok(Arc::clone(cached));
        }

        let generated = Arc::new(generate(level, Some(seed))?);
        self.levels.lock().put(key, Arc::clone(&generated));
        debug!(level, seed, "level cache miss, generated");
        Ok(generated)
    }

    pub fn len(&self) -> usize {
        self.levels.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.lock().is_empty()
    }
}
