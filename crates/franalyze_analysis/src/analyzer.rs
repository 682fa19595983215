use std::{
    collections::BTreeMap,
    env,
    path::{Path, PathBuf},
    sync::Arc,
};

use dashmap::{DashMap, DashSet};
use log::{debug, info, warn};
use path_clean::clean;
use rayon::prelude::*;

use franalyze_core::{
    Caches, DEFAULT_SUFFIXES, ExtractMode, MAX_TRAVERSAL_DEPTH, installed_packages,
};

use crate::config::Options;
use crate::traverse::{TraverseContext, traverse};
use crate::types::AnalyzeResult;
use crate::universe::{build_exclusions, collect_universe};

/// Analyzes the import graph reachable from `entries` with fresh caches.
pub fn analyze(entries: &[String], options: &Options) -> AnalyzeResult {
    let caches = Caches::new();
    analyze_with_caches(entries, options, &caches)
}

/// Like [`analyze`], but reusing a caller-owned cache handle across runs.
///
/// No failure inside the analysis is fatal: a missing entry, a bad exclude
/// pattern or an unreadable module degrades to an empty contribution for the
/// affected entry or edge while the others proceed.
pub fn analyze_with_caches(
    entries: &[String],
    options: &Options,
    caches: &Caches,
) -> AnalyzeResult {
    info!("Analyzing {} entries", entries.len());

    let cwd = clean(
        options
            .cwd
            .clone()
            .unwrap_or_else(|| env::current_dir().unwrap_or_else(|_| PathBuf::from("."))),
    );
    let suffixes: Vec<String> = if options.sup_suffix.is_empty() {
        DEFAULT_SUFFIXES.iter().map(|s| s.to_string()).collect()
    } else {
        options.sup_suffix.clone()
    };
    let mode = if options.fast { ExtractMode::Fast } else { ExtractMode::Precise };

    // Shared run state; entries may mutate it concurrently. The visited set
    // and cycle record only ever grow.
    let universe: DashSet<PathBuf> = DashSet::new();
    let visited: DashSet<PathBuf> = DashSet::new();
    let circular: DashMap<PathBuf, Vec<String>> = DashMap::new();
    let installed: DashSet<String> = DashSet::new();
    let referenced: DashSet<String> = DashSet::new();

    entries.par_iter().for_each(|entry| {
        let entry_path = clean(cwd.join(entry));
        if !entry_path.is_file() {
            warn!("Entry {} does not exist; skipping", entry_path.display());
            return;
        }
        let Some(entry_root) = entry_path.parent().map(Path::to_path_buf) else {
            warn!("Entry {} has no parent directory; skipping", entry_path.display());
            return;
        };
        debug!("Processing entry {}", entry_path.display());

        let (excludes, universe_intact) = match build_exclusions(&cwd, &options.exclude) {
            Ok(globs) => (globs, true),
            Err(e) => {
                warn!("Exclude patterns failed ({}); dropping this entry's file universe", e);
                (None, false)
            }
        };

        if universe_intact {
            match collect_universe(&entry_root, excludes.as_ref()) {
                Ok(files) => {
                    for file in files {
                        universe.insert(file);
                    }
                }
                Err(e) => {
                    warn!("Failed to collect files under {}: {}", entry_root.display(), e);
                }
            }
        }

        let packages = installed_packages(&entry_path, caches);
        for package in packages.iter() {
            installed.insert(package.clone());
        }

        let ctx = TraverseContext {
            cwd: &cwd,
            alias: &options.alias,
            suffixes: &suffixes,
            mode,
            installed: Arc::clone(&packages),
            excludes: excludes.as_ref(),
            caches,
            visited_global: &visited,
            circular: &circular,
            referenced_packages: &referenced,
            max_depth: MAX_TRAVERSAL_DEPTH,
        };
        traverse(entry_path, Vec::new(), 0, &ctx);
    });

    let mut unused_files: Vec<PathBuf> =
        universe.into_iter().filter(|file| !visited.contains(file)).collect();
    unused_files.sort();

    let circular_dep_map: BTreeMap<PathBuf, Vec<String>> = circular.into_iter().collect();

    let mut unused_packages: Vec<String> =
        installed.into_iter().filter(|package| !referenced.contains(package)).collect();
    unused_packages.sort();

    info!(
        "Analysis complete: {} unused files, {} cyclic modules, {} unused packages",
        unused_files.len(),
        circular_dep_map.len(),
        unused_packages.len()
    );

    AnalyzeResult { unused_files, circular_dep_map, unused_packages }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, path: &str, content: &str) -> PathBuf {
        let file_path = dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    fn options_for(root: &Path) -> Options {
        Options {
            cwd: Some(root.to_path_buf()),
            sup_suffix: vec![".ts".to_string()],
            ..Options::default()
        }
    }

    #[test]
    fn test_orphan_file_is_unused() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "src/main.ts", "import './used';");
        create_test_file(root, "src/used.ts", "");
        let orphan = create_test_file(root, "src/orphan.ts", "");

        let result = analyze(&["./src/main.ts".to_string()], &options_for(root));
        assert_eq!(result.unused_files, vec![orphan]);
        assert!(result.circular_dep_map.is_empty());
    }

    #[test]
    fn test_cycle_is_reported_once() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "src/main.ts", "import './a';");
        create_test_file(root, "src/a.ts", "import './main';");

        let result = analyze(&["./src/main.ts".to_string()], &options_for(root));
        assert_eq!(result.circular_dep_map.len(), 1);
        let traces = result.circular_dep_map.values().next().unwrap();
        assert_eq!(traces.len(), 1);
        assert_eq!(traces[0].split(" --> ").count(), 3);
        assert!(result.unused_files.is_empty());
    }

    #[test]
    fn test_unused_packages() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(
            root,
            "package.json",
            r#"{"dependencies": {"lodash": "^4", "axios": "^1"}}"#,
        );
        create_test_file(root, "src/main.ts", "import merge from 'lodash/merge';");

        let result = analyze(&["./src/main.ts".to_string()], &options_for(root));
        assert_eq!(result.unused_packages, vec!["axios"]);
    }

    #[test]
    fn test_excluded_file_cannot_rescue_itself() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "src/main.ts", "import './services/api';");
        create_test_file(root, "src/services/api.ts", "");

        let mut options = options_for(root);
        options.exclude = vec!["**/services/**".to_string()];
        let result = analyze(&["./src/main.ts".to_string()], &options);

        // Excluded both from the universe and from traversal.
        assert!(result.unused_files.is_empty());
    }

    #[test]
    fn test_missing_entry_does_not_poison_others() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "src/main.ts", "");
        let orphan = create_test_file(root, "src/orphan.ts", "");

        let entries = vec!["./src/gone.ts".to_string(), "./src/main.ts".to_string()];
        let result = analyze(&entries, &options_for(root));
        assert_eq!(result.unused_files, vec![orphan]);
    }

    #[test]
    fn test_alias_resolution_end_to_end() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "src/main.ts", "import '@/helper';");
        create_test_file(root, "src/helper.ts", "");

        let mut options = options_for(root);
        options.alias.insert("@".to_string(), "./src".to_string());
        let result = analyze(&["./src/main.ts".to_string()], &options);
        assert!(result.unused_files.is_empty());
    }

    #[test]
    fn test_diamond_across_two_entries() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "src/first.ts", "import './shared';");
        create_test_file(root, "src/second.ts", "import './shared';");
        create_test_file(root, "src/shared.ts", "");

        let entries = vec!["./src/first.ts".to_string(), "./src/second.ts".to_string()];
        let result = analyze(&entries, &options_for(root));
        assert!(result.circular_dep_map.is_empty());
        assert!(result.unused_files.is_empty());
    }

    #[test]
    fn test_idempotent_with_cleared_caches() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "src/main.ts", "import './a';");
        create_test_file(root, "src/a.ts", "import './main';");
        create_test_file(root, "src/orphan.ts", "");

        let options = options_for(root);
        let caches = Caches::new();
        let first = analyze_with_caches(&["./src/main.ts".to_string()], &options, &caches);
        caches.clear();
        let second = analyze_with_caches(&["./src/main.ts".to_string()], &options, &caches);

        assert_eq!(first.unused_files, second.unused_files);
        let first_keys: Vec<_> = first.circular_dep_map.keys().collect();
        let second_keys: Vec<_> = second.circular_dep_map.keys().collect();
        assert_eq!(first_keys, second_keys);
    }

    #[test]
    fn test_unused_files_are_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "src/main.ts", "");
        create_test_file(root, "src/zebra.ts", "");
        create_test_file(root, "src/apple.ts", "");

        let result = analyze(&["./src/main.ts".to_string()], &options_for(root));
        let mut sorted = result.unused_files.clone();
        sorted.sort();
        assert_eq!(result.unused_files, sorted);
        assert_eq!(result.unused_files.len(), 2);
    }
}
