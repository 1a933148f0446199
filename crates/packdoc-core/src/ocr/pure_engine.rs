//! Label OCR backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).

use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::RecognitionError;
use crate::models::config::OcrConfig;

use super::{RecognizedText, TextBox, TextRecognizer};

/// OCR engine loaded from detection/recognition models on disk.
pub struct PureOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
    config: OcrConfig,
}

impl PureOcrEngine {
    /// Load the models named in `config` from its model directory.
    pub fn from_config(config: OcrConfig) -> Result<Self, RecognitionError> {
        let det_path = config.model_dir.join(&config.detection_model);
        let rec_path = config.model_dir.join(&config.recognition_model);
        let dict_path = config.model_dir.join(&config.dictionary);

        if !config.models_available() {
            return Err(RecognitionError::ModelLoad(format!(
                "model files not found in {}",
                config.model_dir.display()
            )));
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| RecognitionError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded OCR models from {}", config.model_dir.display());

        Ok(Self { engine, config })
    }

    /// Recognize text fragments in a decoded image.
    pub fn process(&self, image: &DynamicImage) -> Result<RecognizedText, RecognitionError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();

        debug!("Running OCR on {}x{} image", width, height);

        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| RecognitionError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        let boxes: Vec<TextBox> = results
            .iter()
            .map(|r| TextBox {
                bbox: polygon_to_bbox(&r.bounding_box),
                text: if self.config.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                },
                confidence: r.confidence,
            })
            .collect();

        let elapsed = start.elapsed().as_millis() as u64;
        info!("OCR complete: {} text regions in {}ms", boxes.len(), elapsed);

        Ok(RecognizedText::new(boxes, elapsed, (width, height)))
    }
}

impl TextRecognizer for PureOcrEngine {
    fn name(&self) -> &str {
        "pure-onnx-ocr"
    }

    fn recognize(&self, bytes: &[u8]) -> Result<String, RecognitionError> {
        let image =
            image::load_from_memory(bytes).map_err(|e| RecognitionError::InvalidImage(e.to_string()))?;
        Ok(self.process(&image)?.text)
    }
}

/// First four exterior points of the polygon as `[x1, y1, ..., x4, y4]`.
fn polygon_to_bbox(polygon: &pure_onnx_ocr::Polygon<f64>) -> [f32; 8] {
    let mut bbox = [0.0f32; 8];
    for (i, coord) in polygon.exterior().coords().take(4).enumerate() {
        bbox[i * 2] = coord.x as f32;
        bbox[i * 2 + 1] = coord.y as f32;
    }
    bbox
}
