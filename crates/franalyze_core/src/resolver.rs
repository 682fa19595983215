use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::trace;
use path_clean::clean;

use crate::cache::Caches;
use crate::constants::{DEFAULT_SUFFIXES, INDEX_BASENAME};

/// Outcome of resolving a raw specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The specifier names a declared package; no edge is followed.
    ThirdParty(String),
    /// The specifier maps to an existing file.
    Module(PathBuf),
    /// No existing file matches; the edge is skipped.
    Unresolved,
}

/// Resolves `request` as written in a file under `from_dir`.
///
/// Order: declared-package prefix short-circuit, alias substitution (first
/// matching key in insertion order, target resolved against `cwd`), then
/// filesystem probing with directory-index expansion and suffix inference.
/// Probing is memoized by candidate path and suffix list; filesystem errors
/// during probes read as "does not exist".
pub fn resolve(
    request: &str,
    from_dir: &Path,
    cwd: &Path,
    alias: &IndexMap<String, String>,
    suffixes: &[String],
    installed: &[String],
    caches: &Caches,
) -> Resolution {
    if let Some(package) = installed.iter().find(|pkg| request.starts_with(pkg.as_str())) {
        trace!("'{}' matches declared package '{}'", request, package);
        return Resolution::ThirdParty(package.clone());
    }

    let candidate = match alias.iter().find(|(key, _)| request.starts_with(key.as_str())) {
        Some((key, target)) => {
            // Aliased specifiers resolve against cwd, not the importing dir.
            let remainder = request[key.len()..].trim_start_matches('/');
            trace!("Alias '{}' rewrites '{}' to {}/{}", key, request, target, remainder);
            clean(cwd.join(target).join(remainder))
        }
        None => clean(from_dir.join(request)),
    };

    match transform_candidate(&candidate, suffixes, caches) {
        Some(path) => {
            trace!("Resolved '{}' to {}", request, path.display());
            Resolution::Module(path)
        }
        None => {
            trace!("'{}' did not resolve from {}", request, from_dir.display());
            Resolution::Unresolved
        }
    }
}

/// Probes the filesystem for `candidate`, memoized by (candidate, suffixes).
fn transform_candidate(candidate: &Path, suffixes: &[String], caches: &Caches) -> Option<PathBuf> {
    let key = (candidate.to_path_buf(), suffixes.join(","));
    if let Some(hit) = caches.get_resolution(&key) {
        trace!("Cache hit for resolution: {}", candidate.display());
        return hit;
    }
    let resolved = probe(candidate, suffixes);
    caches.put_resolution(key, resolved.clone());
    resolved
}

fn probe(candidate: &Path, suffixes: &[String]) -> Option<PathBuf> {
    let mut path = candidate.to_path_buf();

    // A directory import resolves to its index file, named with the first
    // configured suffix, before any suffix guessing on the bare name.
    if path.is_dir() {
        let first = suffixes.first().map(String::as_str).unwrap_or(DEFAULT_SUFFIXES[0]);
        path = path.join(format!("{INDEX_BASENAME}{first}"));
    }

    if path.exists() {
        return Some(path);
    }
    // An explicit extension that does not exist gets no suffix guessing.
    if path.extension().is_some() {
        return None;
    }
    for suffix in suffixes {
        let with_suffix = PathBuf::from(format!("{}{}", path.display(), suffix));
        if with_suffix.exists() {
            return Some(with_suffix);
        }
    }
    None
}
