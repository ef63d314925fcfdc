//! Inspect command - show classification and workarounds without touching files.

use clap::Args;
use console::style;

use bankxl_core::models::statement::{ExtractionOptions, Statement};

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Statement file names
    #[arg(required = true)]
    filenames: Vec<String>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

pub fn run(args: InspectArgs) -> anyhow::Result<()> {
    let mut entries = Vec::with_capacity(args.filenames.len());

    for name in &args.filenames {
        match Statement::new(name, ".") {
            Ok(statement) => {
                if args.json {
                    entries.push(serde_json::json!({
                        "filename": name,
                        "bank": statement.bank(),
                        "office": statement.office(),
                        "year": statement.year(),
                        "options": statement.options(),
                        "flags": statement.flags(),
                    }));
                } else {
                    print_statement(&statement);
                }
            }
            Err(e) => {
                if args.json {
                    entries.push(serde_json::json!({
                        "filename": name,
                        "error": e.to_string(),
                    }));
                } else {
                    println!("{} {}: {}", style("✗").yellow(), name, e);
                }
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    }

    Ok(())
}

fn print_statement(statement: &Statement) {
    let flags = statement.flags();

    println!("{} {}", style("✓").green(), statement.source_name());
    println!("  Bank:         {}", statement.bank());
    println!("  Office:       {}", statement.office());
    println!("  Year:         {}", statement.year());
    println!("  Requires OCR: {}", flags.requires_ocr);
    println!("  Repair dates: {}", flags.repair_dates);
    println!("  Extraction:   {}", describe_options(statement.options()));
}

fn describe_options(options: &ExtractionOptions) -> String {
    let area = match options.crop_region {
        Some(region) => {
            let [top, left, bottom, right] = region.as_area();
            format!("area {},{},{},{}", top, left, bottom, right)
        }
        None => "whole page".to_string(),
    };
    let toggle = |value: Option<bool>| match value {
        Some(true) => "on",
        Some(false) => "off",
        None => "default",
    };

    format!(
        "{}, lattice {}, stream {}",
        area,
        toggle(options.lattice),
        toggle(options.stream)
    )
}
