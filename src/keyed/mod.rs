//! Keyed Sources
//!
//! Generators over the contents of a hash map:
//! - [`KeyedSource::keys`] walks the key space
//! - [`KeyedSource::values`] maps each key to its value
//! - [`KeyedSource::items`] maps each key to a `(key, value)` pair
//!
//! The map is held behind an [`Arc`], so it cannot be mutated while a
//! generator walks it. Iteration order is the map's own (unspecified) order.
//! The key set is captured when a key generator starts.

use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

use crate::combinators;
use crate::config::GeneratorConfig;
use crate::engine::BaseGenerator;
use crate::error::Result;
use crate::sources::SequenceProducer;

/// Generator factory over a shared hash map.
#[derive(Debug)]
pub struct KeyedSource<K, V, S = std::collections::hash_map::RandomState> {
    map: Arc<HashMap<K, V, S>>,
}

/// [`KeyedSource`] over a [`rustc_hash::FxHashMap`].
pub type FxKeyedSource<K, V> = KeyedSource<K, V, rustc_hash::FxBuildHasher>;

impl<K, V, S> Clone for KeyedSource<K, V, S> {
    fn clone(&self) -> Self {
        Self {
            map: Arc::clone(&self.map),
        }
    }
}

impl<K, V, S> KeyedSource<K, V, S>
where
    K: Eq + Hash + Clone + Default + Send + Sync + 'static,
    V: Clone + Default + Send + Sync + 'static,
    S: BuildHasher + Send + Sync + 'static,
{
    pub fn new(map: impl Into<Arc<HashMap<K, V, S>>>) -> Self {
        Self { map: map.into() }
    }

    /// The backing map.
    pub fn map(&self) -> &HashMap<K, V, S> {
        &self.map
    }

    /// Generator over the keys.
    ///
    /// The keys are cloned into a snapshot on the calling thread before the
    /// generator starts, so this costs O(n) memory up front. Values are still
    /// looked up one pull at a time by [`values`](Self::values) and
    /// [`items`](Self::items).
    pub fn keys(&self) -> Result<BaseGenerator<K>> {
        let keys: Vec<K> = self.map.keys().cloned().collect();
        BaseGenerator::from_producer(
            SequenceProducer::new(keys),
            GeneratorConfig::named("lazyseq-keys"),
        )
    }

    /// Generator over the values, in key order.
    pub fn values(&self) -> Result<BaseGenerator<V>> {
        let map = Arc::clone(&self.map);
        combinators::map(self.keys()?, move |key: K| {
            map.get(&key).cloned().unwrap_or_default()
        })
    }

    /// Generator over `(key, value)` pairs.
    pub fn items(&self) -> Result<BaseGenerator<(K, V)>> {
        let map = Arc::clone(&self.map);
        combinators::map(self.keys()?, move |key: K| {
            let value = map.get(&key).cloned().unwrap_or_default();
            (key, value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{Generator, GeneratorExt, IteratorResult};
    use rustc_hash::FxHashMap;

    fn sample() -> HashMap<i32, String> {
        HashMap::from([(1, "1".to_string()), (2, "2".to_string()), (3, "3".to_string())])
    }

    #[test]
    fn test_keys_cover_map_then_default() {
        let source = KeyedSource::new(sample());
        let mut keys = source.keys().unwrap();

        let mut seen = Vec::new();
        for _ in 0..3 {
            let r = keys.next().unwrap();
            assert!(!r.done);
            seen.push(r.value);
        }
        seen.sort();
        assert_eq!(seen, vec![1, 2, 3]);
        assert_eq!(keys.next().unwrap(), IteratorResult { value: 0, done: true });
    }

    #[test]
    fn test_empty_map_is_immediately_done() {
        let source: KeyedSource<i32, String> = KeyedSource::new(HashMap::new());
        let mut keys = source.keys().unwrap();
        assert_eq!(keys.next().unwrap(), IteratorResult { value: 0, done: true });

        let mut items = source.items().unwrap();
        assert!(items.next().unwrap().done);
    }

    #[test]
    fn test_values_and_items_follow_keys() {
        let source = KeyedSource::new(sample());

        let mut values = source.values().unwrap().drain().unwrap();
        values.sort();
        assert_eq!(values, vec!["1", "2", "3"]);

        let mut items = source.items().unwrap().drain().unwrap();
        items.sort();
        assert_eq!(
            items,
            vec![(1, "1".to_string()), (2, "2".to_string()), (3, "3".to_string())]
        );
    }

    #[test]
    fn test_fx_map_source() {
        let mut map: FxHashMap<&'static str, u32> = FxHashMap::default();
        map.insert("x", 10);
        map.insert("y", 20);
        let source: FxKeyedSource<&'static str, u32> = KeyedSource::new(map);

        let total: u32 = source.values().unwrap().drain().unwrap().into_iter().sum();
        assert_eq!(total, 30);
        assert_eq!(source.map().len(), 2);
    }

    #[test]
    fn test_key_snapshot_outlives_source() {
        let source = KeyedSource::new(sample());
        let mut keys = source.keys().unwrap();
        drop(source);

        let mut seen = keys.drain().unwrap();
        seen.sort();
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn test_stopping_items_view() {
        let source = KeyedSource::new(sample());
        let mut items = source.items().unwrap();
        assert!(!items.next().unwrap().done);
        items.stop();
        items.stop();
        assert!(items.next().unwrap().done);
    }
}
