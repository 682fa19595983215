//! Import-graph analysis for JavaScript/TypeScript projects.
//!
//! Starting from a set of entry files this crate walks the module-import
//! graph (static `import`, dynamic `import()`, `require()` and
//! `export ... from`) and reports:
//! - files under the entries' roots never reached from any entry
//! - circular import chains
//! - declared packages never imported
//!
//! # Examples
//!
//! ```no_run
//! use franalyze_analysis::{Options, analyze};
//!
//! let result = analyze(&["./src/main.ts".to_string()], &Options::default());
//! for file in &result.unused_files {
//!     println!("unused: {}", file.display());
//! }
//! for (module, traces) in &result.circular_dep_map {
//!     println!("cycle at {}: {:?}", module.display(), traces);
//! }
//! ```

mod analyzer;
mod config;
mod reporter;
mod traverse;
mod types;
mod universe;

// Re-export public API
pub use analyzer::{analyze, analyze_with_caches};
pub use config::{Config, Options, resolve_config};
pub use franalyze_core::Caches;
pub use reporter::{print_report, result_file_path, write_result_file};
pub use types::AnalyzeResult;
