use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use ignore::{
    WalkBuilder,
    overrides::{Override, OverrideBuilder},
};
use log::{debug, trace};
use path_clean::clean;

/// Compiles the exclusion globs, rooted at `cwd`.
pub(crate) fn build_exclusions(cwd: &Path, patterns: &[String]) -> Result<Option<Override>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = OverrideBuilder::new(cwd);
    for pattern in patterns {
        builder.add(pattern).with_context(|| format!("Invalid exclude pattern '{pattern}'"))?;
    }
    let overrides = builder.build().context("Failed to compile exclude patterns")?;
    Ok(Some(overrides))
}

/// True when `path` is matched by the exclusion globs.
pub(crate) fn is_excluded(excludes: Option<&Override>, path: &Path) -> bool {
    excludes.is_some_and(|globs| globs.matched(path, false).is_whitelist())
}

/// Collects every file under `root`, minus the excluded ones.
///
/// Dotfiles count; excluded files are removed from the universe entirely so
/// they can neither show up as unused nor be followed as edges.
pub(crate) fn collect_universe(root: &Path, excludes: Option<&Override>) -> Result<HashSet<PathBuf>> {
    debug!("Collecting file universe under {}", root.display());
    let mut files = HashSet::new();
    let walker = WalkBuilder::new(root).hidden(false).git_ignore(true).build();

    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let path = clean(path);
        if is_excluded(excludes, &path) {
            trace!("Excluded from universe: {}", path.display());
            continue;
        }
        files.insert(path);
    }

    debug!("Universe under {} holds {} files", root.display(), files.len());
    Ok(files)
}
