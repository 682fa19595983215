use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use log::{debug, trace};
use serde_json::Value;

use crate::cache::Caches;

/// Locates the nearest ancestor `package.json` of `file` and returns the
/// union of its declared dependency and dev-dependency names.
///
/// A missing, unreadable or malformed manifest classifies as "no third-party
/// context available": the result is an empty set, never an error.
pub fn installed_packages(file: &Path, caches: &Caches) -> Arc<Vec<String>> {
    let start = file.parent().unwrap_or(file).to_path_buf();
    if let Some(packages) = caches.get_manifest(&start) {
        trace!("Cache hit for manifest lookup from {}", start.display());
        return packages;
    }
    let packages = Arc::new(read_packages(&start));
    caches.put_manifest(start, Arc::clone(&packages));
    packages
}

fn read_packages(start: &Path) -> Vec<String> {
    let Some(manifest) = find_manifest(start) else {
        debug!("No package.json found above {}", start.display());
        return Vec::new();
    };
    trace!("Reading manifest at {}", manifest.display());

    let text = match fs::read_to_string(&manifest) {
        Ok(text) => text,
        Err(e) => {
            debug!("Failed to read {}: {}", manifest.display(), e);
            return Vec::new();
        }
    };
    let json: Value = match serde_json::from_str(&text) {
        Ok(json) => json,
        Err(e) => {
            debug!("Malformed manifest {}: {}", manifest.display(), e);
            return Vec::new();
        }
    };

    let mut packages = Vec::new();
    for section in ["dependencies", "devDependencies"] {
        if let Some(deps) = json.get(section).and_then(|v| v.as_object()) {
            packages.extend(deps.keys().cloned());
        }
    }
    debug!("Found {} declared packages in {}", packages.len(), manifest.display());
    packages
}

/// Walks upward from `start` until a `package.json` is found or the
/// filesystem root is reached.
fn find_manifest(start: &Path) -> Option<PathBuf> {
    let mut dir = start;
    loop {
        let candidate = dir.join("package.json");
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
}
