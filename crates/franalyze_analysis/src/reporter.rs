use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use colored::Colorize;
use log::debug;
use path_clean::clean;
use serde_json::json;

use crate::types::AnalyzeResult;

/// Where the result file lands: `fra.result.json` in the parent of the first
/// entry's directory.
pub fn result_file_path(cwd: &Path, first_entry: &str) -> PathBuf {
    clean(cwd.join(first_entry).join("../../fra.result.json"))
}

fn result_json(result: &AnalyzeResult) -> serde_json::Value {
    let unused: Vec<String> =
        result.unused_files.iter().map(|path| path.display().to_string()).collect();
    let circular: Vec<serde_json::Value> = result
        .circular_dep_map
        .iter()
        .map(|(path, traces)| {
            let mut entry = serde_json::Map::new();
            entry.insert(path.display().to_string(), json!(traces));
            serde_json::Value::Object(entry)
        })
        .collect();
    json!({
        "unused": unused,
        "circularDep": circular,
        "unusedPackages": result.unused_packages,
    })
}

/// Writes the JSON result file (`{unused, circularDep, unusedPackages}`).
pub fn write_result_file(result: &AnalyzeResult, path: &Path) -> Result<()> {
    let payload = serde_json::to_string_pretty(&result_json(result))
        .context("Failed to serialize analysis result")?;
    fs::write(path, payload).with_context(|| format!("Failed to write {}", path.display()))?;
    debug!("Wrote result file to {}", path.display());
    Ok(())
}

/// Renders the analysis outcome for the terminal.
pub fn print_report<W: Write>(
    writer: &mut W,
    result: &AnalyzeResult,
    result_path: &Path,
) -> io::Result<()> {
    if result.is_clean() {
        writeln!(
            writer,
            "{} {}",
            "FRANALYZE".reversed().green(),
            "There is no problem!".green()
        )?;
        writer.flush()?;
        return Ok(());
    }

    if !result.circular_dep_map.is_empty() {
        writeln!(
            writer,
            "{} Circular dependencies ({} modules)\n",
            "⚠".yellow().bold(),
            result.circular_dep_map.len().to_string().yellow()
        )?;
        for (path, traces) in &result.circular_dep_map {
            writeln!(writer, "{}", path.display().to_string().bright_white().bold())?;
            for (idx, trace) in traces.iter().enumerate() {
                let prefix = if idx == traces.len() - 1 { "└──" } else { "├──" };
                writeln!(writer, "{}  {}", prefix.dimmed(), trace)?;
            }
            writeln!(writer)?;
        }
    }

    if !result.unused_files.is_empty() {
        writeln!(
            writer,
            "{} Unused files ({})\n",
            "⚠".yellow().bold(),
            result.unused_files.len().to_string().yellow()
        )?;
        for file in &result.unused_files {
            writeln!(writer, "  {}", file.display().to_string().blue())?;
        }
        writeln!(writer)?;
    }

    if !result.unused_packages.is_empty() {
        writeln!(
            writer,
            "{} Unused packages ({})\n",
            "⚠".yellow().bold(),
            result.unused_packages.len().to_string().yellow()
        )?;
        for package in &result.unused_packages {
            writeln!(writer, "  {}", package.yellow())?;
        }
        writeln!(writer)?;
    }

    writeln!(
        writer,
        "{} {}",
        "FRANALYZE".reversed().red(),
        format!("Problems detected, full report at {}.", result_path.display()).red()
    )?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn sample_result() -> AnalyzeResult {
        let mut circular = BTreeMap::new();
        circular.insert(
            PathBuf::from("/p/src/main.ts"),
            vec!["/p/src/main.ts --> /p/src/a.ts --> /p/src/main.ts".to_string()],
        );
        AnalyzeResult {
            unused_files: vec![PathBuf::from("/p/src/orphan.ts")],
            circular_dep_map: circular,
            unused_packages: vec!["axios".to_string()],
        }
    }

    #[test]
    fn test_result_file_path_lands_beside_entry_root() {
        let path = result_file_path(Path::new("/p"), "./src/main.ts");
        assert_eq!(path, PathBuf::from("/p/fra.result.json"));
    }

    #[test]
    fn test_result_json_shape() {
        let value = result_json(&sample_result());
        assert_eq!(value["unused"][0], "/p/src/orphan.ts");
        assert_eq!(
            value["circularDep"][0]["/p/src/main.ts"][0],
            "/p/src/main.ts --> /p/src/a.ts --> /p/src/main.ts"
        );
        assert_eq!(value["unusedPackages"][0], "axios");
    }

    #[test]
    fn test_write_result_file_roundtrips() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fra.result.json");
        write_result_file(&sample_result(), &path).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["unused"][0], "/p/src/orphan.ts");
    }

    #[test]
    fn test_print_report_mentions_every_section() {
        let mut out = Vec::new();
        print_report(&mut out, &sample_result(), Path::new("/p/fra.result.json")).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Circular dependencies"));
        assert!(text.contains("Unused files"));
        assert!(text.contains("Unused packages"));
        assert!(text.contains("fra.result.json"));
    }

    #[test]
    fn test_print_report_clean() {
        let mut out = Vec::new();
        print_report(&mut out, &AnalyzeResult::default(), Path::new("/p/fra.result.json"))
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("There is no problem!"));
    }
}
