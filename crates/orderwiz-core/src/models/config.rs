//! Configuration structures for orderwiz.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::store::ImageRetention;

/// Main configuration for orderwiz.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Database and image storage configuration.
    pub store: StoreConfig,

    /// OCR engine configuration.
    pub ocr: OcrConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,
}

/// Storage locations and retention policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file.
    pub database_path: PathBuf,

    /// Directory attached screenshots are copied into.
    pub image_dir: PathBuf,

    /// What happens to an attached image when its order is deleted.
    pub image_retention: ImageRetention,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let root = data_root();
        Self {
            database_path: root.join("orders.db"),
            image_dir: root.join("images"),
            image_retention: ImageRetention::Keep,
        }
    }
}

/// Which OCR engine to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrEngineKind {
    /// `pure-onnx-ocr` with PaddleOCR models (requires the `native` feature).
    #[default]
    Onnx,
    /// External `tesseract` binary.
    Tesseract,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Engine selection.
    pub engine: OcrEngineKind,

    /// Directory containing ONNX model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Keep `[UNK]` tokens in recognized text.
    pub keep_unk: bool,

    /// Tesseract executable.
    pub tesseract_path: PathBuf,

    /// Tesseract language code.
    pub language: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            engine: OcrEngineKind::Onnx,
            model_dir: data_root().join("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
            keep_unk: false,
            tesseract_path: PathBuf::from("tesseract"),
            language: "eng".to_string(),
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Order number regexes, tried in order. An empty list uses the built-in pattern.
    pub order_number_patterns: Vec<String>,

    /// Amount regexes, tried in order. An empty list uses the built-in pattern.
    pub amount_patterns: Vec<String>,

    /// Use the whole-word variants of the built-in patterns.
    pub word_boundaries: bool,

    /// Tolerance for amount search.
    pub amount_tolerance: Decimal,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            order_number_patterns: Vec::new(),
            amount_patterns: Vec::new(),
            word_boundaries: false,
            amount_tolerance: crate::store::AMOUNT_TOLERANCE,
        }
    }
}

impl AppConfig {
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

/// Per-user data directory, falling back to the working directory.
pub fn data_root() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("orderwiz")
}
