use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use dashmap::{DashMap, DashSet};
use ignore::overrides::Override;
use indexmap::IndexMap;
use log::{trace, warn};

use franalyze_core::{Caches, ExtractMode, Resolution, extract_specifiers, resolve};

use crate::universe::is_excluded;

/// Shared state and configuration for one analysis run.
pub(crate) struct TraverseContext<'a> {
    pub(crate) cwd: &'a Path,
    pub(crate) alias: &'a IndexMap<String, String>,
    pub(crate) suffixes: &'a [String],
    pub(crate) mode: ExtractMode,
    /// Declared packages of the entry being traversed.
    pub(crate) installed: Arc<Vec<String>>,
    pub(crate) excludes: Option<&'a Override>,
    pub(crate) caches: &'a Caches,
    /// Every module read and processed, across all entries.
    pub(crate) visited_global: &'a DashSet<PathBuf>,
    /// Cycle traces keyed by the module that closed the cycle.
    pub(crate) circular: &'a DashMap<PathBuf, Vec<String>>,
    /// Declared packages referenced by at least one specifier.
    pub(crate) referenced_packages: &'a DashSet<String>,
    pub(crate) max_depth: usize,
}

/// Depth-first walk from `path` carrying the branch's visitation stack.
///
/// The stack is branch-local: every edge recurses with its own copy, so
/// sibling imports of the same module cannot see each other's path. A module
/// found on the current stack is a genuine back-edge and gets a cycle trace;
/// a module merely in the global visited set is a shared dependency and the
/// branch is cut without recording anything.
pub(crate) fn traverse(
    path: PathBuf,
    mut visited: Vec<PathBuf>,
    depth: usize,
    ctx: &TraverseContext<'_>,
) {
    if let Some(pos) = visited.iter().position(|seen| *seen == path) {
        let mut chain: Vec<String> =
            visited[pos..].iter().map(|p| p.display().to_string()).collect();
        chain.push(path.display().to_string());
        let link = chain.join(" --> ");
        trace!("Circular dependency: {}", link);
        ctx.circular.entry(path).or_default().push(link);
        return;
    }

    if depth >= ctx.max_depth {
        warn!(
            "Traversal depth ceiling ({}) reached at {}; not descending further",
            ctx.max_depth,
            path.display()
        );
        return;
    }

    // The insert doubles as the claim that makes concurrent entries process
    // a node exactly once.
    if !ctx.visited_global.insert(path.clone()) {
        trace!("Already visited: {}", path.display());
        return;
    }

    let text = match ctx.caches.read_file(&path) {
        Ok(text) => text,
        Err(e) => {
            warn!("Skipping unreadable module {}: {}", path.display(), e);
            // Release the claim so the file is not reported as used.
            ctx.visited_global.remove(&path);
            return;
        }
    };

    let from_dir = path.parent().unwrap_or(ctx.cwd).to_path_buf();
    visited.push(path);

    for spec in extract_specifiers(&text, ctx.mode) {
        match resolve(
            &spec.request,
            &from_dir,
            ctx.cwd,
            ctx.alias,
            ctx.suffixes,
            &ctx.installed,
            ctx.caches,
        ) {
            Resolution::ThirdParty(package) => {
                ctx.referenced_packages.insert(package);
            }
            Resolution::Unresolved => {
                trace!("Skipping unresolved specifier '{}'", spec.request);
            }
            Resolution::Module(next) => {
                if is_excluded(ctx.excludes, &next) {
                    trace!("Skipping excluded module {}", next.display());
                    continue;
                }
                traverse(next, visited.clone(), depth + 1, ctx);
            }
        }
    }
}
