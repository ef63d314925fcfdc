//! Process command - convert a single statement in place.

use std::path::{Path, PathBuf};

use clap::Args;
use console::style;

use bankxl_core::{Converter, Outcome, StatementReport};

use super::load_config;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Statement file
    #[arg(required = true)]
    input: PathBuf,

    /// Output format for the report
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON report
    Json,
    /// Plain text summary
    Text,
}

pub fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.is_file() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let name = args
        .input
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid file name: {}", args.input.display()))?;
    let root = match args.input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let converter = Converter::builder().with_config(config).build()?;
    let report = converter.convert(root, name)?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&report),
    }

    Ok(())
}

fn print_report(report: &StatementReport) {
    let marker = match report.outcome {
        Outcome::Processed => style("✓").green(),
        Outcome::Failed => style("✗").red(),
    };

    println!("{} {} -> {}", marker, report.source_name, report.outcome);
    println!("  Bank:       {}", report.bank);
    println!("  Office:     {}", report.office);
    println!("  Year:       {}", report.year);
    println!("  OCR:        {}", if report.ocr_attempted { "yes" } else { "no" });
    println!("  Tables:     {} ({} rows)", report.tables, report.rows);
    println!("  Output:     {} bytes", report.output_bytes);
    println!("  Location:   {}", report.location.display());
    if let Some(ref error) = report.error {
        println!("  Error:      {}", style(error).red());
    }
    println!("  Time:       {}ms", report.processing_time_ms);
}
