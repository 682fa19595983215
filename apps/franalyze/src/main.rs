use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use franalyze_analysis::{
    Config, analyze, print_report, resolve_config, result_file_path, write_result_file,
};
use log::{debug, info};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

fn main() -> Result<()> {
    env_logger::init();

    // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
    // See https://github.com/rust-lang/rust/issues/60673
    let mut stdout = BufWriter::new(std::io::stdout());

    let cli = Config::parse();
    debug!("Parsed CLI arguments: {:?}", cli);

    let start = Instant::now();

    let (entries, options) = resolve_config(cli)?;
    let num_threads = rayon::current_num_threads();
    info!("Analyzing {} entries (using {} threads)", entries.len(), num_threads);

    let result = analyze(&entries, &options);

    let cwd = options.cwd.clone().unwrap_or_else(|| PathBuf::from("."));
    let result_path =
        result_file_path(&cwd, entries.first().map(String::as_str).unwrap_or("."));
    write_result_file(&result, &result_path)?;
    debug!(
        "unused files: {}, cyclic modules: {}, unused packages: {}",
        result.unused_files.len(),
        result.circular_dep_map.len(),
        result.unused_packages.len()
    );

    let elapsed_ms = start.elapsed().as_millis();
    print_report(&mut stdout, &result, &result_path)?;
    writeln!(
        stdout,
        "\n{} Finished in {}ms (using {} threads).",
        "●".bright_blue(),
        elapsed_ms.to_string().cyan(),
        num_threads.to_string().cyan()
    )?;
    stdout.flush()?;

    if !result.is_clean() {
        // Non-zero exit to fail CI
        std::process::exit(1);
    }

    Ok(())
}
