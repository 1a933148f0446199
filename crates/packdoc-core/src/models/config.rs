//! Configuration structures for the document pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::documents::ArtifactKind;
use crate::invoice::CsvProfile;

/// Main configuration for packdoc.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PackdocConfig {
    /// Default freight parameters.
    pub shipment: ShipmentDefaults,

    /// HTML packing list layout.
    pub html: HtmlConfig,

    /// OCR model configuration.
    pub ocr: OcrConfig,

    /// Output selection.
    pub output: OutputConfig,
}

/// Freight defaults used when the caller omits them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipmentDefaults {
    /// Freight price per kilogram in RMB.
    pub unit_price_rmb: f64,

    /// RMB per USD.
    pub exchange_rate: f64,
}

impl Default for ShipmentDefaults {
    fn default() -> Self {
        Self {
            unit_price_rmb: 40.0,
            exchange_rate: 7.2,
        }
    }
}

/// HTML packing list layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlConfig {
    /// Items per printed page.
    pub page_size: usize,

    /// Days added to the PO date to get the arrival date.
    pub arrival_offset_days: i64,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            page_size: 72,
            arrival_offset_days: 7,
        }
    }
}

/// OCR model files for tracking label recognition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Keep `[UNK]` tokens in recognized text instead of blanking them.
    pub keep_unk: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
            keep_unk: false,
        }
    }
}

impl OcrConfig {
    /// Whether all model files are present.
    pub fn models_available(&self) -> bool {
        [&self.detection_model, &self.recognition_model, &self.dictionary]
            .iter()
            .all(|name| self.model_dir.join(name).exists())
    }
}

/// Which artifacts to produce and how to read input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Artifacts included in the archive.
    pub artifacts: Vec<ArtifactKind>,

    /// CSV schema assumed for uploads.
    pub profile: CsvProfile,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            artifacts: ArtifactKind::ALL.to_vec(),
            profile: CsvProfile::Invoice,
        }
    }
}

impl PackdocConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
