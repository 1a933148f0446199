//! Tracking command - read a UPS tracking number from a label or typed value.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use tracing::{debug, warn};

use packdoc_core::{extract_tracking, recognizer_for, TrackingInputKind};

use super::load_config;

/// Arguments for the tracking command.
#[derive(Args)]
pub struct TrackingArgs {
    /// Label image or text file
    input: Option<PathBuf>,

    /// Typed tracking number; wins over the label when non-blank
    #[arg(short, long)]
    manual: Option<String>,

    /// Print the recognized text before the tracking number
    #[arg(long)]
    show_text: bool,
}

pub async fn run(args: TrackingArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    if args.input.is_none() && args.manual.is_none() {
        anyhow::bail!("Provide a label file, --manual, or both");
    }

    let config = load_config(config_path)?;
    let manual = args.manual.unwrap_or_default();

    let recognized = match &args.input {
        Some(path) if manual.trim().is_empty() => {
            let bytes = fs::read(path)?;
            let kind = TrackingInputKind::detect(Some(path), &bytes);
            debug!("Reading {} as {:?}", path.display(), kind);

            // Recognition failures leave the number empty rather than aborting
            match recognizer_for(kind, &config.ocr).and_then(|r| r.recognize(&bytes)) {
                Ok(text) => text,
                Err(e) => {
                    warn!("Recognition failed for {}: {}", path.display(), e);
                    String::new()
                }
            }
        }
        _ => String::new(),
    };

    if args.show_text && !recognized.is_empty() {
        eprintln!("{}", recognized);
    }

    let tracking = extract_tracking(&manual, &recognized);
    if tracking.is_empty() {
        anyhow::bail!("No tracking number found");
    }

    println!("{}", tracking);
    Ok(())
}
