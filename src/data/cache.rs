//! Time-bounded memo of loaded datasets.
//!
//! The cache is an ordinary value owned by whoever drives the pipeline and
//! passed in explicitly; there is no process-wide instance.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::loader;
use super::model::Dataset;
use crate::error::Result;

/// Identity of a listing source: where it lives and how to split it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Source {
    pub path: PathBuf,
    pub delimiter: Option<u8>,
}

impl Source {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: None,
        }
    }

    pub fn with_delimiter(mut self, delimiter: Option<u8>) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the source from disk, bypassing any cache.
    pub fn load(&self) -> Result<Dataset> {
        loader::load_file(&self.path, self.delimiter)
    }
}

#[derive(Debug)]
struct CacheEntry {
    loaded_at: Instant,
    dataset: Arc<Dataset>,
}

/// Loaded datasets keyed by [`Source`], each stamped with its load time.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<Source, CacheEntry>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset for `source` when it was loaded less than
    /// `ttl` ago; otherwise read it again and replace the entry.
    pub fn get_or_load(&mut self, source: &Source, ttl: Duration) -> Result<Arc<Dataset>> {
        self.get_or_load_with(source, ttl, Instant::now(), Source::load)
    }

    /// [`get_or_load`](Self::get_or_load) with an explicit clock reading and
    /// loader.  A failed load leaves the cache untouched, so the error is
    /// not remembered.
    pub fn get_or_load_with<F>(
        &mut self,
        source: &Source,
        ttl: Duration,
        now: Instant,
        load: F,
    ) -> Result<Arc<Dataset>>
    where
        F: FnOnce(&Source) -> Result<Dataset>,
    {
        if let Some(entry) = self.entries.get(source) {
            let age = now.saturating_duration_since(entry.loaded_at);
            if age < ttl {
                log::debug!("cache hit for {} (age {age:?})", source.path.display());
                return Ok(Arc::clone(&entry.dataset));
            }
            log::debug!("cache entry for {} expired", source.path.display());
        } else {
            log::debug!("cache miss for {}", source.path.display());
        }

        let dataset = Arc::new(load(source)?);
        self.entries.insert(
            source.clone(),
            CacheEntry {
                loaded_at: now,
                dataset: Arc::clone(&dataset),
            },
        );
        Ok(dataset)
    }

    /// When the cached copy of `source` was loaded, if there is one.
    pub fn loaded_at(&self, source: &Source) -> Option<Instant> {
        self.entries.get(source).map(|e| e.loaded_at)
    }

    pub fn invalidate(&mut self, source: &Source) {
        self.entries.remove(source);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Value;
    use crate::error::DataError;
    use std::cell::Cell;

    const TTL: Duration = Duration::from_secs(60);

    fn one_row() -> Dataset {
        Dataset::new(vec!["price".into()], vec![vec![Value::Integer(1)]])
    }

    #[test]
    fn reuses_entry_within_ttl() {
        let mut cache = DatasetCache::new();
        let source = Source::new("vehicles.csv");
        let loads = Cell::new(0);
        let t0 = Instant::now();

        let loader = |_: &Source| {
            loads.set(loads.get() + 1);
            Ok(one_row())
        };
        let first = cache.get_or_load_with(&source, TTL, t0, loader).unwrap();
        let second = cache
            .get_or_load_with(&source, TTL, t0 + Duration::from_secs(59), loader)
            .unwrap();

        assert_eq!(loads.get(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn reloads_after_ttl() {
        let mut cache = DatasetCache::new();
        let source = Source::new("vehicles.csv");
        let loads = Cell::new(0);
        let t0 = Instant::now();
        let loader = |_: &Source| {
            loads.set(loads.get() + 1);
            Ok(one_row())
        };

        cache.get_or_load_with(&source, TTL, t0, loader).unwrap();
        let later = t0 + TTL;
        cache.get_or_load_with(&source, TTL, later, loader).unwrap();

        assert_eq!(loads.get(), 2);
        assert_eq!(cache.loaded_at(&source), Some(later));
    }

    #[test]
    fn errors_are_not_cached() {
        let mut cache = DatasetCache::new();
        let source = Source::new("missing.csv");
        let t0 = Instant::now();

        let err = cache
            .get_or_load_with(&source, TTL, t0, |s: &Source| {
                Err(DataError::unavailable(s.path(), "gone"))
            })
            .unwrap_err();
        assert!(matches!(err, DataError::SourceUnavailable { .. }));
        assert!(cache.is_empty());

        cache
            .get_or_load_with(&source, TTL, t0, |_: &Source| Ok(one_row()))
            .unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn sources_are_keyed_separately() {
        let mut cache = DatasetCache::new();
        let comma = Source::new("vehicles.txt");
        let semi = Source::new("vehicles.txt").with_delimiter(Some(b';'));
        let t0 = Instant::now();

        cache.get_or_load_with(&comma, TTL, t0, |_: &Source| Ok(one_row())).unwrap();
        cache.get_or_load_with(&semi, TTL, t0, |_: &Source| Ok(one_row())).unwrap();
        assert_eq!(cache.len(), 2);

        cache.invalidate(&comma);
        assert!(cache.loaded_at(&comma).is_none());
        assert!(cache.loaded_at(&semi).is_some());
    }

    #[test]
    fn get_or_load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vehicles.csv");
        std::fs::write(&path, "price,fuel\n100,gas\n").unwrap();

        let mut cache = DatasetCache::new();
        let ds = cache.get_or_load(&Source::new(&path), TTL).unwrap();
        assert_eq!(ds.len(), 1);

        // Within the TTL the on-disk change is not observed.
        std::fs::write(&path, "price,fuel\n100,gas\n200,diesel\n").unwrap();
        let again = cache.get_or_load(&Source::new(&path), TTL).unwrap();
        assert_eq!(again.len(), 1);
    }
}
