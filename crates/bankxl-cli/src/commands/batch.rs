//! Batch command - convert every statement in a directory.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::{glob, Pattern};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, warn};

use bankxl_core::{Converter, ErrorKind, Outcome, StatementReport};

use super::load_config;

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Directory holding the statements
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Also write a summary CSV to this path
    #[arg(long)]
    summary: Option<PathBuf>,
}

/// What became of one statement.
enum Disposition {
    Converted(StatementReport),
    Skipped { name: String, reason: String },
    IoFailed { name: String, reason: String },
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.dir.is_dir() {
        anyhow::bail!("Not a directory: {}", args.dir.display());
    }

    let names = discover(&args.dir, &config.layout.extension)?;
    if names.is_empty() {
        println!(
            "{} No *.{} files in {}",
            style("ℹ").blue(),
            config.layout.extension,
            args.dir.display()
        );
        return Ok(());
    }

    println!(
        "{} Found {} statements to convert",
        style("ℹ").blue(),
        names.len()
    );

    let pb = ProgressBar::new(names.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    let converter = Converter::builder().with_config(config).build()?;
    let mut results = Vec::with_capacity(names.len());

    for name in names {
        pb.set_message(name.clone());

        let disposition = match converter.convert(&args.dir, &name) {
            Ok(report) => Disposition::Converted(report),
            Err(e) if e.kind() == ErrorKind::Parse => {
                warn!("Skipping {}: {}", name, e);
                Disposition::Skipped {
                    name,
                    reason: e.to_string(),
                }
            }
            Err(e) => {
                error!("{}: {}", name, e);
                Disposition::IoFailed {
                    name,
                    reason: e.to_string(),
                }
            }
        };
        results.push(disposition);

        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    if let Some(ref summary_path) = args.summary {
        write_summary(summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    print_summary(&results, start);

    let io_failures = results
        .iter()
        .filter(|r| matches!(r, Disposition::IoFailed { .. }))
        .count();
    if io_failures > 0 {
        anyhow::bail!("{} statements could not be written or moved", io_failures);
    }

    Ok(())
}

/// File names of the statements directly inside `dir`, sorted.
fn discover(dir: &Path, extension: &str) -> anyhow::Result<Vec<String>> {
    let dir_str = dir
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Directory path is not valid UTF-8: {}", dir.display()))?;
    let pattern = format!("{}/*.{}", Pattern::escape(dir_str), extension);

    let mut names: Vec<String> = glob(&pattern)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(String::from))
        .collect();
    names.sort();

    Ok(names)
}

fn print_summary(results: &[Disposition], start: Instant) {
    let mut processed = Vec::new();
    let mut failed = Vec::new();
    let mut skipped = Vec::new();

    for result in results {
        match result {
            Disposition::Converted(report) if report.outcome == Outcome::Processed => {
                processed.push(report)
            }
            Disposition::Converted(report) => failed.push(report),
            Disposition::Skipped { name, reason } | Disposition::IoFailed { name, reason } => {
                skipped.push((name, reason))
            }
        }
    }

    println!();
    println!(
        "{} Handled {} statements in {:?} (finished {})",
        style("✓").green(),
        results.len(),
        start.elapsed(),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    println!(
        "   {} processed, {} failed, {} skipped",
        style(processed.len()).green(),
        style(failed.len()).red(),
        style(skipped.len()).yellow()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Moved to failed:").red());
        for report in &failed {
            match &report.error {
                Some(error) => println!("  - {}: {}", report.source_name, error),
                None => println!(
                    "  - {} ({} bytes of output)",
                    report.source_name, report.output_bytes
                ),
            }
        }
    }

    if !skipped.is_empty() {
        println!();
        println!("{}", style("Skipped:").yellow());
        for (name, reason) in &skipped {
            println!("  - {}: {}", name, reason);
        }
    }
}

fn write_summary(path: &Path, results: &[Disposition]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "outcome",
        "bank",
        "office",
        "year",
        "ocr_attempted",
        "tables",
        "rows",
        "output_bytes",
        "error",
    ])?;

    for result in results {
        match result {
            Disposition::Converted(report) => {
                wtr.write_record([
                    report.source_name.as_str(),
                    &report.outcome.to_string(),
                    &report.bank.to_string(),
                    &report.office.to_string(),
                    &report.year.to_string(),
                    &report.ocr_attempted.to_string(),
                    &report.tables.to_string(),
                    &report.rows.to_string(),
                    &report.output_bytes.to_string(),
                    report.error.as_deref().unwrap_or(""),
                ])?;
            }
            Disposition::Skipped { name, reason } | Disposition::IoFailed { name, reason } => {
                wtr.write_record([name.as_str(), "skipped", "", "", "", "", "", "", "", reason])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
