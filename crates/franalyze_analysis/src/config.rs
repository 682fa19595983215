use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;

/// Options recognized by [`analyze`](crate::analyze).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    /// Prefix substitutions applied to specifiers before resolution; the
    /// first matching key, in insertion order, wins.
    pub alias: IndexMap<String, String>,
    /// Glob patterns for files dropped from the universe and refused as
    /// traversal edges.
    pub exclude: Vec<String>,
    /// Extensions tried, in order, when a specifier has no extension.
    /// Defaults to `[".ts"]` when empty.
    pub sup_suffix: Vec<String>,
    /// Base directory for resolving relative entries; the process working
    /// directory when unset.
    pub cwd: Option<PathBuf>,
    /// Trade extraction precision for speed.
    pub fast: bool,
}

/// Command-line flags, merged with config-file values by [`resolve_config`].
#[derive(Debug, Clone, Parser)]
#[command(name = "franalyze")]
#[command(about = "Find unused files and circular dependencies in JS/TS projects")]
pub struct Config {
    /// Entry files, comma separated
    #[arg(short, long, value_delimiter = ',')]
    pub entries: Vec<String>,

    /// Extensions to try when an import has no suffix
    #[arg(short, long, value_delimiter = ',')]
    pub suffix: Vec<String>,

    /// Glob patterns for files to ignore
    #[arg(short = 'x', long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Path aliases as key=value pairs (e.g. --alias @=./src)
    #[arg(short, long, value_parser = parse_alias)]
    pub alias: Vec<(String, String)>,

    /// Base directory for resolving relative entries
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// Use the simplified single-pattern specifier matcher
    #[arg(long)]
    pub fast: bool,
}

fn parse_alias(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, target)| (key.to_string(), target.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

/// A config value that may be written as one comma-joined string or a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum StringOrSeq {
    One(String),
    Many(Vec<String>),
}

impl Default for StringOrSeq {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl StringOrSeq {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(joined) => {
                joined.split(',').filter(|part| !part.is_empty()).map(str::to_string).collect()
            }
            Self::Many(list) => list,
        }
    }
}

/// On-disk configuration, discovered in the working directory.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct FileConfig {
    entries: StringOrSeq,
    alias: IndexMap<String, String>,
    exclude: StringOrSeq,
    sup_suffix: StringOrSeq,
    fast: bool,
}

/// Config file names probed in the working directory, first hit wins.
const CONFIG_FILES: &[&str] = &["fra.config.json", ".frarc.json", ".frarc"];

const DEFAULT_ENTRIES: &[&str] = &["./src/main.ts"];
const DEFAULT_SUP_SUFFIXES: &[&str] = &[".ts", ".tsx"];

fn load_file_config(cwd: &Path) -> Result<Option<FileConfig>> {
    for name in CONFIG_FILES {
        let path = cwd.join(name);
        if !path.is_file() {
            continue;
        }
        debug!("Loading config file {}", path.display());
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: FileConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        return Ok(Some(config));
    }
    Ok(None)
}

/// Merges defaults, a discovered config file and CLI flags into the entry
/// list and [`Options`] handed to [`analyze`](crate::analyze).
///
/// Precedence: defaults < config file < flags.
pub fn resolve_config(cli: Config) -> Result<(Vec<String>, Options)> {
    let cwd = match &cli.cwd {
        Some(dir) => dir.clone(),
        None => env::current_dir().context("Failed to determine working directory")?,
    };

    let mut entries: Vec<String> = DEFAULT_ENTRIES.iter().map(|s| s.to_string()).collect();
    let mut options = Options {
        sup_suffix: DEFAULT_SUP_SUFFIXES.iter().map(|s| s.to_string()).collect(),
        cwd: Some(cwd.clone()),
        ..Options::default()
    };

    if let Some(file) = load_file_config(&cwd)? {
        let file_entries = file.entries.into_vec();
        if !file_entries.is_empty() {
            entries = file_entries;
        }
        if !file.alias.is_empty() {
            options.alias = file.alias;
        }
        let exclude = file.exclude.into_vec();
        if !exclude.is_empty() {
            options.exclude = exclude;
        }
        let sup_suffix = file.sup_suffix.into_vec();
        if !sup_suffix.is_empty() {
            options.sup_suffix = sup_suffix;
        }
        if file.fast {
            options.fast = true;
        }
    }

    if !cli.entries.is_empty() {
        entries = cli.entries;
    }
    if !cli.alias.is_empty() {
        options.alias = cli.alias.into_iter().collect();
    }
    if !cli.exclude.is_empty() {
        options.exclude = cli.exclude;
    }
    if !cli.suffix.is_empty() {
        options.sup_suffix = cli.suffix;
    }
    if cli.fast {
        options.fast = true;
    }

    debug!(
        "Resolved config: {} entries, {} aliases, {} exclude patterns",
        entries.len(),
        options.alias.len(),
        options.exclude.len()
    );
    Ok((entries, options))
}
