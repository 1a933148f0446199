//! CLI subcommands and the plumbing they share.

pub mod batch;
pub mod config;
pub mod process;
pub mod tracking;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use tracing::{debug, error, warn};

use packdoc_core::models::shipment::{date_stamp, validate_date_stamp};
use packdoc_core::{
    ArtifactKind, CsvProfile, HtmlLayout, PackdocConfig, PackdocError, ShipmentBundle,
    ShipmentParameters, ShipmentRequest,
};

/// Shipment options shared by `process` and `batch`.
#[derive(Args, Debug, Clone)]
pub struct ShipmentArgs {
    /// Freight price per kilogram in RMB [default: from config]
    #[arg(long)]
    pub rmb: Option<f64>,

    /// Exchange rate in RMB per USD [default: from config]
    #[arg(long)]
    pub rate: Option<f64>,

    /// Number of boxes
    #[arg(short, long, default_value_t = 0)]
    pub boxes: u32,

    /// Gross weight in kilograms
    #[arg(short, long, default_value_t = 0.0)]
    pub weight: f64,

    /// Tracking number typed by hand (wins over any label)
    #[arg(short, long)]
    pub tracking: Option<String>,

    /// CSV schema: invoice or packing [default: from config]
    #[arg(long)]
    pub profile: Option<CsvProfile>,

    /// Date stamp in yyMMdd form [default: today]
    #[arg(long)]
    pub date: Option<String>,

    /// Only produce these artifacts (comma separated: csv, html, msdos)
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<ArtifactKind>,

    /// Items per HTML page [default: from config]
    #[arg(long)]
    pub page_size: Option<usize>,
}

/// Resolved per-request settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub shipment: ShipmentParameters,
    pub manual_tracking: String,
    pub profile: CsvProfile,
    pub artifacts: Vec<ArtifactKind>,
    pub layout: HtmlLayout,
}

impl ShipmentArgs {
    /// Merge command-line values over configuration defaults.
    pub fn settings(&self, config: &PackdocConfig) -> anyhow::Result<Settings> {
        let stamp = match &self.date {
            Some(stamp) => {
                validate_date_stamp(stamp)?;
                stamp.clone()
            }
            None => date_stamp(chrono::Local::now().date_naive()),
        };

        let rmb = self.rmb.unwrap_or(config.shipment.unit_price_rmb);
        let rate = self.rate.unwrap_or(config.shipment.exchange_rate);
        if rate == 0.0 {
            warn!("Exchange rate is zero; freight will print as non-finite");
        }

        let mut layout = HtmlLayout::from(&config.html);
        if let Some(page_size) = self.page_size {
            layout.page_size = page_size;
        }

        let artifacts = if self.only.is_empty() {
            config.output.artifacts.clone()
        } else {
            self.only.clone()
        };

        let settings = Settings {
            shipment: ShipmentParameters::new(stamp)
                .with_weight(self.weight, self.boxes)
                .with_freight_rate(rmb, rate),
            manual_tracking: self.tracking.clone().unwrap_or_default(),
            profile: self.profile.unwrap_or(config.output.profile),
            artifacts,
            layout,
        };
        debug!("Resolved settings: {:?}", settings);

        Ok(settings)
    }
}

impl Settings {
    /// Request for one CSV upload, without a tracking label.
    pub fn request<'a>(&self, csv: &'a [u8]) -> ShipmentRequest<'a> {
        ShipmentRequest::new(csv, self.shipment.clone())
            .with_manual_tracking(self.manual_tracking.clone())
            .with_profile(self.profile)
            .with_artifacts(self.artifacts.clone())
            .with_layout(self.layout)
    }
}

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("packdoc")
        .join("config.json")
}

/// Configuration path in effect: the `--config` value or the default location.
pub fn config_path(config_path: Option<&str>) -> PathBuf {
    config_path.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load configuration, falling back to defaults when no file exists.
pub fn load_config(path: Option<&str>) -> anyhow::Result<PackdocConfig> {
    let path = config_path(path);
    if path.exists() {
        debug!("Loading config from {}", path.display());
        Ok(PackdocConfig::from_file(&path)?)
    } else {
        Ok(PackdocConfig::default())
    }
}

/// Write the archive next to its final name, then rename into place.
pub fn write_archive(dir: &Path, bundle: &ShipmentBundle) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let target = dir.join(&bundle.archive_name);

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(&bundle.archive)?;
    temp.as_file().sync_all()?;
    temp.persist(&target)?;

    Ok(target)
}

/// Convert a pipeline failure into what the user gets to see.
///
/// Input errors keep their message; internal ones are logged in full and
/// reported with the generic apology.
pub fn user_facing(err: PackdocError) -> anyhow::Error {
    if !err.is_user_error() {
        error!("Processing failed: {}", err);
    }
    anyhow::anyhow!(err.user_message())
}
