//! Core building blocks for franalyze.
//!
//! This crate provides the leaf pieces of the import-graph engine:
//! - Extracting raw import/require/export specifiers from source text
//! - Classifying files against the nearest package manifest
//! - Resolving specifiers to absolute module paths (aliases, directory-index
//!   expansion, suffix inference)
//! - Shared read-through caches with time-based expiry

mod cache;
mod constants;
mod extractor;
mod manifest;
mod resolver;
mod types;

// Re-export public API
pub use cache::Caches;
pub use constants::{CACHE_TTL, DEFAULT_SUFFIXES, INDEX_BASENAME, MAX_TRAVERSAL_DEPTH};
pub use extractor::{ExtractMode, extract_specifiers};
pub use manifest::installed_packages;
pub use resolver::{Resolution, resolve};
pub use types::{SpecKind, Specifier};
