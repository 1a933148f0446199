//! Batch processing command for multiple invoice CSVs.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use packdoc_core::process_shipment;

use super::{load_config, user_facing, write_archive, Settings, ShipmentArgs};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for input CSV files
    #[arg(required = true)]
    input: String,

    /// Output directory; each CSV gets a subdirectory named after it
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Also write summary.csv into the output directory
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    #[command(flatten)]
    shipment: ShipmentArgs,
}

/// Result of processing a single file.
struct FileOutcome {
    path: PathBuf,
    archive: Option<PathBuf>,
    records: usize,
    total_quantity: u64,
    warnings: usize,
    error: Option<String>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;
    let settings = Arc::new(args.shipment.settings(&config)?);

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("csv"))
                .unwrap_or(false)
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching CSV files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    fs::create_dir_all(&args.output_dir)?;

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let output_dir = Arc::new(args.output_dir.clone());
    let mut results = Vec::with_capacity(files.len());

    // Each file is an independent request; at most `jobs` run at once.
    for chunk in files.chunks(args.jobs.max(1)) {
        let handles: Vec<_> = chunk
            .iter()
            .cloned()
            .map(|path| {
                let settings = Arc::clone(&settings);
                let output_dir = Arc::clone(&output_dir);
                tokio::task::spawn_blocking(move || process_file(path, &settings, &output_dir))
            })
            .collect();

        for handle in handles {
            let outcome = handle.await?;
            overall_pb.inc(1);

            if let Some(message) = &outcome.error {
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", outcome.path.display(), message);
                } else {
                    overall_pb.abandon();
                    error!("Failed to process {}: {}", outcome.path.display(), message);
                    anyhow::bail!("Processing failed for {}: {}", outcome.path.display(), message);
                }
            }
            results.push(outcome);
        }
    }

    overall_pb.finish_with_message("Complete");

    if args.summary {
        let summary_path = args.output_dir.join("summary.csv");
        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(results.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn process_file(path: PathBuf, settings: &Settings, output_dir: &Path) -> FileOutcome {
    let mut outcome = FileOutcome {
        path,
        archive: None,
        records: 0,
        total_quantity: 0,
        warnings: 0,
        error: None,
    };

    let written = fs::read(&outcome.path)
        .map_err(anyhow::Error::from)
        .and_then(|csv| {
            let bundle = process_shipment(&settings.request(&csv)).map_err(user_facing)?;

            let stem = outcome
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("upload");
            let archive = write_archive(&output_dir.join(stem), &bundle)?;
            Ok((bundle, archive))
        });

    match written {
        Ok((bundle, archive)) => {
            debug!("Wrote {}", archive.display());
            outcome.archive = Some(archive);
            outcome.records = bundle.record_count;
            outcome.total_quantity = bundle.total_quantity;
            outcome.warnings = bundle.warnings.len();
        }
        Err(e) => outcome.error = Some(e.to_string()),
    }

    outcome
}

fn write_summary(path: &Path, results: &[FileOutcome]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(["file", "status", "records", "total_qty", "warnings", "archive", "error"])?;

    for result in results {
        let filename = result.path.file_name().and_then(|s| s.to_str()).unwrap_or("");
        let archive = result
            .archive
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        match &result.error {
            None => wtr.write_record([
                filename,
                "success",
                &result.records.to_string(),
                &result.total_quantity.to_string(),
                &result.warnings.to_string(),
                &archive,
                "",
            ])?,
            Some(message) => wtr.write_record([filename, "error", "", "", "", "", message.as_str()])?,
        }
    }

    wtr.flush()?;
    Ok(())
}
