//! Constants for suffix inference, traversal bounds and cache lifetime.

use std::time::Duration;

/// Extensions tried, in order, when a specifier has no extension and the bare
/// candidate does not exist on disk. Entries carry their dot.
pub const DEFAULT_SUFFIXES: &[&str] = &[".ts"];

/// Base name expanded when a specifier resolves to a directory; the first
/// configured suffix is appended to it.
pub const INDEX_BASENAME: &str = "index";

/// Hard ceiling on traversal recursion depth. Cycles are already cut by the
/// in-stack check; this bounds stack usage against pathological graphs.
pub const MAX_TRAVERSAL_DEPTH: usize = 128;

/// How long cached file contents, resolutions and manifests stay fresh.
pub const CACHE_TTL: Duration = Duration::from_secs(30 * 60);
