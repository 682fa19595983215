use std::collections::BTreeMap;
use std::path::PathBuf;

/// Outcome of one analysis run.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeResult {
    /// Files under the entries' roots never reached from any entry,
    /// lexicographically sorted.
    pub unused_files: Vec<PathBuf>,
    /// Modules that close at least one import cycle, each with the
    /// `" --> "`-joined chains that reached them.
    pub circular_dep_map: BTreeMap<PathBuf, Vec<String>>,
    /// Declared packages never referenced by any specifier, sorted.
    pub unused_packages: Vec<String>,
}

impl AnalyzeResult {
    /// True when nothing questionable was found.
    pub fn is_clean(&self) -> bool {
        self.unused_files.is_empty()
            && self.circular_dep_map.is_empty()
            && self.unused_packages.is_empty()
    }
}
