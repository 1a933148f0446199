//! Text recognition for tracking labels.
//!
//! The pipeline only sees [`TextRecognizer`]; images go to the ONNX engine
//! (behind the `native` feature), anything else is read as plain text.

#[cfg(feature = "native")]
mod pure_engine;

#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::RecognitionError;
use crate::models::config::OcrConfig;

/// Turns uploaded bytes into free text.
pub trait TextRecognizer {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Recognize text in `bytes`.
    fn recognize(&self, bytes: &[u8]) -> Result<String, RecognitionError>;
}

/// Reads the upload as UTF-8 text (lossily).
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextRecognizer;

impl TextRecognizer for PlainTextRecognizer {
    fn name(&self) -> &str {
        "plain-text"
    }

    fn recognize(&self, bytes: &[u8]) -> Result<String, RecognitionError> {
        let text = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        Ok(String::from_utf8_lossy(text).into_owned())
    }
}

/// How a tracking upload should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingInputKind {
    Image,
    Text,
}

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "tif", "tiff", "bmp"];

impl TrackingInputKind {
    /// Classify by file extension, then by content sniffing.
    pub fn detect(file_name: Option<&Path>, bytes: &[u8]) -> Self {
        let image_extension = file_name
            .and_then(|p| p.extension())
            .and_then(|e| e.to_str())
            .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
            .unwrap_or(false);

        if image_extension {
            return TrackingInputKind::Image;
        }

        match image::guess_format(bytes) {
            Ok(format) => {
                debug!("Tracking input sniffed as {:?}", format);
                TrackingInputKind::Image
            }
            Err(_) => TrackingInputKind::Text,
        }
    }
}

/// A recognized text fragment with its location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Quadrilateral corners (x1, y1, x2, y2, x3, y3, x4, y4).
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence (0.0 - 1.0).
    pub confidence: f32,
}

impl TextBox {
    /// Axis-aligned bounding rectangle (min_x, min_y, max_x, max_y).
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }
}

/// Output of one recognition run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizedText {
    /// Fragments in reading order.
    pub boxes: Vec<TextBox>,

    /// Fragments joined with newlines.
    pub text: String,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,

    /// Image dimensions (width, height).
    pub image_size: (u32, u32),
}

impl RecognizedText {
    pub fn new(boxes: Vec<TextBox>, processing_time_ms: u64, image_size: (u32, u32)) -> Self {
        let mut result = Self {
            boxes,
            text: String::new(),
            processing_time_ms,
            image_size,
        };
        result.sort_by_reading_order();
        result
    }

    /// Sort boxes top-to-bottom, then left-to-right, and rebuild `text`.
    pub fn sort_by_reading_order(&mut self) {
        self.boxes.sort_by(|a, b| {
            let (ax, ay, _, _) = a.rect();
            let (bx, by, _, _) = b.rect();

            // Boxes within 20px vertically share a line
            let row_a = (ay / 20.0) as i32;
            let row_b = (by / 20.0) as i32;

            row_a
                .cmp(&row_b)
                .then_with(|| ax.partial_cmp(&bx).unwrap_or(std::cmp::Ordering::Equal))
        });

        self.text = self
            .boxes
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
    }
}

/// Build the recognizer suited to `kind`.
///
/// Image recognition needs the `native` feature and model files on disk.
pub fn recognizer_for(
    kind: TrackingInputKind,
    config: &OcrConfig,
) -> Result<Box<dyn TextRecognizer>, RecognitionError> {
    match kind {
        TrackingInputKind::Text => Ok(Box::new(PlainTextRecognizer)),
        TrackingInputKind::Image => image_recognizer(config),
    }
}

#[cfg(feature = "native")]
fn image_recognizer(config: &OcrConfig) -> Result<Box<dyn TextRecognizer>, RecognitionError> {
    Ok(Box::new(PureOcrEngine::from_config(config.clone())?))
}

#[cfg(not(feature = "native"))]
fn image_recognizer(_config: &OcrConfig) -> Result<Box<dyn TextRecognizer>, RecognitionError> {
    Err(RecognitionError::ModelLoad(
        "image recognition requires the `native` feature".to_string(),
    ))
}
