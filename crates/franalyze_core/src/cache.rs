use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use dashmap::DashMap;
use log::trace;

use crate::constants::CACHE_TTL;

/// A cached value plus the moment it was computed.
struct Expiring<V> {
    value: V,
    fetched_at: Instant,
}

/// Read-through caches shared by one or more analysis runs.
///
/// Owned state, never a process-wide singleton: callers create a handle, may
/// keep it across invocations, and can [`clear`](Self::clear) it at any time.
/// Entries expire after the configured TTL so long-lived processes do not
/// serve stale file contents forever. Concurrent writers may race to populate
/// the same key; values are computed deterministically from the key, so the
/// last write wins harmlessly.
pub struct Caches {
    content: DashMap<PathBuf, Expiring<Arc<str>>>,
    resolutions: DashMap<(PathBuf, String), Expiring<Option<PathBuf>>>,
    manifests: DashMap<PathBuf, Expiring<Arc<Vec<String>>>>,
    ttl: Duration,
}

impl Default for Caches {
    fn default() -> Self {
        Self::new()
    }
}

impl Caches {
    pub fn new() -> Self {
        Self::with_ttl(CACHE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            content: DashMap::new(),
            resolutions: DashMap::new(),
            manifests: DashMap::new(),
            ttl,
        }
    }

    /// Drops every cached entry.
    pub fn clear(&self) {
        self.content.clear();
        self.resolutions.clear();
        self.manifests.clear();
    }

    /// Reads a file through the content cache.
    pub fn read_file(&self, path: &Path) -> Result<Arc<str>> {
        if let Some(hit) = self.content.get(path)
            && hit.fetched_at.elapsed() < self.ttl
        {
            trace!("Cache hit for contents: {}", path.display());
            return Ok(Arc::clone(&hit.value));
        }
        let text: Arc<str> = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
            .into();
        self.content.insert(
            path.to_path_buf(),
            Expiring { value: Arc::clone(&text), fetched_at: Instant::now() },
        );
        Ok(text)
    }

    pub(crate) fn get_resolution(&self, key: &(PathBuf, String)) -> Option<Option<PathBuf>> {
        let hit = self.resolutions.get(key)?;
        if hit.fetched_at.elapsed() < self.ttl { Some(hit.value.clone()) } else { None }
    }

    pub(crate) fn put_resolution(&self, key: (PathBuf, String), value: Option<PathBuf>) {
        self.resolutions.insert(key, Expiring { value, fetched_at: Instant::now() });
    }

    pub(crate) fn get_manifest(&self, dir: &Path) -> Option<Arc<Vec<String>>> {
        let hit = self.manifests.get(dir)?;
        if hit.fetched_at.elapsed() < self.ttl { Some(Arc::clone(&hit.value)) } else { None }
    }

    pub(crate) fn put_manifest(&self, dir: PathBuf, packages: Arc<Vec<String>>) {
        self.manifests.insert(dir, Expiring { value: packages, fetched_at: Instant::now() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_file_is_cached() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.ts");
        fs::write(&file, "first").unwrap();

        let caches = Caches::new();
        assert_eq!(&*caches.read_file(&file).unwrap(), "first");

        // A hit must be served from the cache, not the filesystem.
        fs::write(&file, "second").unwrap();
        assert_eq!(&*caches.read_file(&file).unwrap(), "first");
    }

    #[test]
    fn test_read_file_refreshes_after_ttl() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.ts");
        fs::write(&file, "first").unwrap();

        let caches = Caches::with_ttl(Duration::ZERO);
        assert_eq!(&*caches.read_file(&file).unwrap(), "first");

        fs::write(&file, "second").unwrap();
        assert_eq!(&*caches.read_file(&file).unwrap(), "second");
    }

    #[test]
    fn test_clear_invalidates_everything() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.ts");
        fs::write(&file, "first").unwrap();

        let caches = Caches::new();
        caches.read_file(&file).unwrap();
        caches.put_resolution((file.clone(), ".ts".into()), Some(file.clone()));

        caches.clear();

        fs::write(&file, "second").unwrap();
        assert_eq!(&*caches.read_file(&file).unwrap(), "second");
        assert!(caches.get_resolution(&(file, ".ts".into())).is_none());
    }

    #[test]
    fn test_read_file_missing_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.ts");
        let caches = Caches::new();
        assert!(caches.read_file(&missing).is_err());
    }
}
