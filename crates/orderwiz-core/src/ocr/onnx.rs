//! OCR through `pure-onnx-ocr` with PaddleOCR models.

use std::cmp::Ordering;
use std::path::Path;
use std::time::Instant;

use image::GenericImageView;
use tracing::{debug, info};

use super::TextRecognizer;
use crate::error::ExtractionError;
use crate::models::config::OcrConfig;

/// Pixel height of a reading-order row.
const ROW_HEIGHT: f32 = 20.0;

/// Pure Rust OCR engine. No external ONNX Runtime is needed.
pub struct OnnxRecognizer {
    engine: pure_onnx_ocr::engine::OcrEngine,
    keep_unk: bool,
}

/// One recognized text region.
struct Region {
    text: String,
    left: f32,
    top: f32,
}

impl OnnxRecognizer {
    /// Load the default model file names from a directory.
    pub fn from_dir(model_dir: &Path) -> Result<Self, ExtractionError> {
        Self::from_config(&OcrConfig {
            model_dir: model_dir.to_path_buf(),
            ..OcrConfig::default()
        })
    }

    /// Load the models named in the configuration.
    pub fn from_config(config: &OcrConfig) -> Result<Self, ExtractionError> {
        let det_path = config.model_dir.join(&config.detection_model);
        let rec_path = config.model_dir.join(&config.recognition_model);
        let dict_path = config.model_dir.join(&config.dictionary);

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.is_file() {
                return Err(ExtractionError::EngineUnavailable(format!(
                    "model file not found: {}",
                    path.display()
                )));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| ExtractionError::EngineUnavailable(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", config.model_dir.display());

        Ok(Self {
            engine,
            keep_unk: config.keep_unk,
        })
    }
}

impl TextRecognizer for OnnxRecognizer {
    fn name(&self) -> &str {
        "onnx"
    }

    fn recognize(&self, image_bytes: &[u8]) -> Result<String, ExtractionError> {
        let start = Instant::now();

        let image = image::load_from_memory(image_bytes)
            .map_err(|e| ExtractionError::InvalidImage(e.to_string()))?;
        let (width, height) = image.dimensions();
        debug!("Processing image: {}x{}", width, height);

        let results = self
            .engine
            .run_from_image(&image)
            .map_err(|e| ExtractionError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        let mut regions: Vec<Region> = results
            .iter()
            .map(|r| {
                let (left, top) = top_left(&r.bounding_box);
                let text = if self.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                };
                Region { text, left, top }
            })
            .collect();

        sort_reading_order(&mut regions);

        let text = regions
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        info!(
            "OCR complete: {} text regions in {}ms",
            regions.len(),
            start.elapsed().as_millis()
        );

        Ok(text)
    }
}

/// Top-to-bottom in rows of [`ROW_HEIGHT`], then left-to-right.
fn sort_reading_order(regions: &mut [Region]) {
    regions.sort_by(|a, b| {
        let row_a = (a.top / ROW_HEIGHT) as i32;
        let row_b = (b.top / ROW_HEIGHT) as i32;
        if row_a != row_b {
            row_a.cmp(&row_b)
        } else {
            a.left.partial_cmp(&b.left).unwrap_or(Ordering::Equal)
        }
    });
}

/// Minimum x and y of the first four polygon points.
fn top_left(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f32, f32) {
    polygon
        .exterior()
        .coords()
        .take(4)
        .fold((f32::INFINITY, f32::INFINITY), |(x, y), c| {
            (x.min(c.x as f32), y.min(c.y as f32))
        })
}
