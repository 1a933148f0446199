//! Process command - turn one invoice CSV into a shipment archive.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use packdoc_core::models::config::OcrConfig;
use packdoc_core::{process_shipment, recognizer_for, TextRecognizer, TrackingInputKind};

use super::{load_config, user_facing, write_archive, ShipmentArgs};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Invoice or packing CSV file
    #[arg(required = true)]
    csv: PathBuf,

    /// Tracking label: an image (png, jpg, tiff, bmp) or a text file
    #[arg(long)]
    tracking_image: Option<PathBuf>,

    /// Output directory for the archive
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    #[command(flatten)]
    shipment: ShipmentArgs,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;
    let settings = args.shipment.settings(&config)?;

    if !args.csv.exists() {
        anyhow::bail!("CSV file not found: {}", args.csv.display());
    }

    info!("Processing file: {}", args.csv.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));

    pb.set_message("Reading CSV...");
    let csv = fs::read(&args.csv)?;

    let label = match &args.tracking_image {
        Some(path) => {
            pb.set_message("Loading tracking label...");
            Some((fs::read(path)?, path.clone()))
        }
        None => None,
    };
    let recognizer = match &label {
        Some((bytes, path)) => load_recognizer(path, bytes, &config.ocr),
        None => None,
    };

    let mut request = settings.request(&csv);
    if let (Some((bytes, _)), Some(recognizer)) = (&label, &recognizer) {
        request = request.with_tracking_upload(bytes, recognizer.as_ref());
    }

    pb.set_message("Generating documents...");
    let result = process_shipment(&request);
    pb.finish_and_clear();

    let bundle = result.map_err(user_facing)?;

    for warning in &bundle.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    let path = write_archive(&args.output, &bundle)?;

    println!(
        "{} Wrote {} ({} records, total qty {})",
        style("✓").green(),
        path.display(),
        bundle.record_count,
        bundle.total_quantity
    );
    if bundle.tracking_number.is_empty() {
        println!("{} No tracking number on the documents", style("ℹ").blue());
    } else {
        println!("{} Tracking: {}", style("ℹ").blue(), bundle.tracking_number);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Pick a recognizer for the label. Failing to load one only costs the tracking number.
fn load_recognizer(path: &Path, bytes: &[u8], config: &OcrConfig) -> Option<Box<dyn TextRecognizer>> {
    let kind = TrackingInputKind::detect(Some(path), bytes);
    debug!("Tracking label {} treated as {:?}", path.display(), kind);

    match recognizer_for(kind, config) {
        Ok(recognizer) => Some(recognizer),
        Err(e) => {
            warn!("Cannot read tracking label {}: {}", path.display(), e);
            None
        }
    }
}
