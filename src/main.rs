use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use shadow_rs::shadow;
use tracing_subscriber::EnvFilter;

use logsum::report::{print_summary, result_path, write_summary_json};
use logsum::summary::summarize_file;

shadow!(build);

#[derive(Parser, Debug)]
#[command(version = build::CLAP_LONG_VERSION, about = "Per-file request statistics from access logs")]
struct Cli {
    /// Path to a log file, or to a directory whose entries are read as log files
    #[clap(long)]
    path: PathBuf,
}

/// A file stands for itself; a directory contributes every entry one level
/// deep, name-sorted, with no extension or type filtering. Entries that turn
/// out to be unreadable fail later, when they are opened.
fn collect_log_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_dir() {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(path)? {
            files.push(entry?.path());
        }
        files.sort();
        Ok(files)
    } else {
        Ok(vec![path.to_path_buf()])
    }
}

fn main() -> Result<()> {
    std::env::set_var(
        "RUST_LOG",
        format!("info,{}", std::env::var("RUST_LOG").unwrap_or_default()),
    );
    let enable_color = std::env::var("NO_COLOR").is_err();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_ansi(enable_color)
        .init();

    let args = Cli::parse();
    tracing::debug!("{:?}", args);

    let files = collect_log_files(&args.path)?;
    if files.is_empty() {
        tracing::warn!("No log files under {}", args.path.display());
        return Ok(());
    }

    for file in files {
        let size = std::fs::metadata(&file).map(|m| m.len()).unwrap_or(0);
        tracing::info!(
            "Processing {} ({})",
            file.display(),
            humansize::format_size(size, humansize::BINARY)
        );
        let started = Instant::now();

        let summary = summarize_file(&file)?;
        let result = result_path(&file);
        write_summary_json(&result, &summary)?;

        let elapsed = Duration::from_millis(started.elapsed().as_millis() as u64);
        tracing::info!(
            "Wrote {} in {}",
            result.display(),
            humantime::format_duration(elapsed)
        );
        print_summary(&summary);
    }
    Ok(())
}
