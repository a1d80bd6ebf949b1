// Memoization for expensive, pure pipeline steps.
//
// Entries are keyed by which step produced them and a fingerprint of the
// input. Inputs are static files for the life of the process, so entries
// are never invalidated. Failed computations are not stored.
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub function: &'static str,
    pub fingerprint: String,
}

impl CacheKey {
    pub fn new(function: &'static str, fingerprint: impl Into<String>) -> Self {
        CacheKey {
            function,
            fingerprint: fingerprint.into(),
        }
    }
}

#[derive(Debug)]
pub struct MemoCache<V> {
    entries: HashMap<CacheKey, Rc<V>>,
}

impl<V> Default for MemoCache<V> {
    fn default() -> Self {
        MemoCache {
            entries: HashMap::new(),
        }
    }
}

impl<V> MemoCache<V> {
    pub fn get_or_try_insert_with<E, F>(&mut self, key: CacheKey, compute: F) -> Result<Rc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(hit) = self.entries.get(&key) {
            log::debug!("cache hit: {} [{}]", key.function, key.fingerprint);
            return Ok(Rc::clone(hit));
        }
        log::debug!("cache miss: {} [{}]", key.function, key.fingerprint);
        let value = Rc::new(compute()?);
        self.entries.insert(key, Rc::clone(&value));
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
