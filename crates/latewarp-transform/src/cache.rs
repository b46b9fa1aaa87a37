//! Pluggable caching for expensive pipeline stages.
//!
//! The cache interface makes no assumptions about capacity or eviction;
//! it only promises presence checks, stores, and an at-most-once
//! fill path for concurrent access.

use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, OnceLock};

use latewarp_image::NdImage;

use crate::error::TransformError;
use crate::transforms::Transform;

/// A caching mechanism usable from multiple threads.
///
/// Implementations must guarantee that [`fetch_or_store_with`] computes
/// at most once per key: concurrent lookups for the same key block
/// behind the in-flight computation instead of duplicating it.
///
/// [`fetch_or_store_with`]: CacheMechanism::fetch_or_store_with
pub trait CacheMechanism<K, V: Clone>: Send + Sync {
    /// Fetch the value for a key if present.
    fn try_fetch(&self, key: &K) -> Option<V>;

    /// Store a value for a key. The first stored value wins.
    fn store(&self, key: K, value: V);

    /// Fetch the value for a key, computing and storing it on a miss.
    fn fetch_or_store_with<F: FnOnce() -> V>(&self, key: K, f: F) -> V;
}

/// An unbounded in-memory cache with per-key at-most-once fills.
///
/// Every key owns one slot; the slot is created under the map lock and
/// filled outside it, so a long computation for one key never blocks
/// lookups for other keys.
#[derive(Debug, Default)]
pub struct MemoryCache<K, V> {
    slots: Mutex<HashMap<K, Arc<OnceLock<V>>>>,
}

impl<K, V> MemoryCache<K, V>
where
    K: Eq + Hash,
{
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, key: K) -> Arc<OnceLock<V>> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.entry(key).or_default().clone()
    }
}

impl<K, V> CacheMechanism<K, V> for MemoryCache<K, V>
where
    K: Eq + Hash + Send,
    V: Clone + Send + Sync,
{
    fn try_fetch(&self, key: &K) -> Option<V> {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.get(key).and_then(|slot| slot.get().cloned())
    }

    fn store(&self, key: K, value: V) {
        let slot = self.slot(key);
        let _ = slot.set(value);
    }

    fn fetch_or_store_with<F: FnOnce() -> V>(&self, key: K, f: F) -> V {
        self.slot(key).get_or_init(f).clone()
    }
}

/// Caches the output of a wrapped transform per key.
///
/// A hit returns the cached image without running the pipeline; a miss
/// runs it and stores the result. Failed runs are not cached.
pub struct CachedTransform<K, T, C> {
    transform: T,
    cache: C,
    _key: PhantomData<K>,
}

impl<K, T, C> CachedTransform<K, T, C>
where
    T: Transform,
    C: CacheMechanism<K, NdImage>,
{
    /// Wrap a transform with a cache.
    pub fn new(transform: T, cache: C) -> Self {
        Self {
            transform,
            cache,
            _key: PhantomData,
        }
    }

    /// Run the wrapped transform for `key`, reusing a cached result.
    pub fn call(&mut self, key: K, img: NdImage) -> Result<NdImage, TransformError> {
        if let Some(cached) = self.cache.try_fetch(&key) {
            return Ok(cached);
        }
        let out = self.transform.apply(img)?;
        self.cache.store(key, out.clone());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::{CacheMechanism, CachedTransform, MemoryCache};
    use crate::error::TransformError;
    use crate::transforms::{Transform, Translate};
    use latewarp_image::NdImage;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn fetch_after_store_round_trips() {
        let cache = MemoryCache::new();
        assert_eq!(cache.try_fetch(&1u32), None);

        cache.store(1u32, 42u64);
        assert_eq!(cache.try_fetch(&1u32), Some(42));
    }

    #[test]
    fn first_store_wins() {
        let cache = MemoryCache::new();
        cache.store(1u32, 42u64);
        cache.store(1u32, 7u64);
        assert_eq!(cache.try_fetch(&1u32), Some(42));
    }

    #[test]
    fn concurrent_fills_compute_exactly_once() {
        let cache = Arc::new(MemoryCache::<u32, u64>::new());
        let computed = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let computed = Arc::clone(&computed);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    cache.fetch_or_store_with(7, || {
                        computed.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(std::time::Duration::from_millis(20));
                        99
                    })
                })
            })
            .collect();

        let values: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(computed.load(Ordering::SeqCst), 1);
        assert_eq!(values, vec![99, 99]);
    }

    #[test]
    fn cached_transform_runs_the_pipeline_once_per_key() -> Result<(), TransformError> {
        let transform = Translate::new(vec![1.0, 0.0]);
        let mut cached = CachedTransform::new(transform, MemoryCache::new());

        let img = NdImage::from_shape_val(&[1, 4, 4], 1.0)?;
        let first = cached.call("subject-1", img)?;
        assert_eq!(first.pending().len(), 1);

        // a hit returns the stored result and ignores the new input
        let other = NdImage::from_shape_val(&[1, 4, 4], 2.0)?;
        let second = cached.call("subject-1", other)?;
        assert_eq!(second.as_slice(), first.as_slice());

        // a different key runs the pipeline on its own input
        let third = cached.call("subject-2", NdImage::from_shape_val(&[1, 4, 4], 3.0)?)?;
        assert!(third.as_slice().iter().all(|&v| v == 3.0));
        Ok(())
    }
}
