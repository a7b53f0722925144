//! OCR engines that turn screenshot bytes into text.

#[cfg(feature = "native")]
mod onnx;
mod tesseract;

#[cfg(feature = "native")]
pub use onnx::OnnxRecognizer;
pub use tesseract::TesseractRecognizer;

use tracing::info;

use crate::error::{ExtractionError, Result};
use crate::models::config::{OcrConfig, OcrEngineKind};

/// Anything that can read text out of an image.
pub trait TextRecognizer {
    /// Short engine name for logs and results.
    fn name(&self) -> &str;

    /// Recognize all text in the encoded image.
    fn recognize(&self, image_bytes: &[u8]) -> std::result::Result<String, ExtractionError>;
}

impl<T: TextRecognizer + ?Sized> TextRecognizer for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn recognize(&self, image_bytes: &[u8]) -> std::result::Result<String, ExtractionError> {
        (**self).recognize(image_bytes)
    }
}

/// Build the engine selected in the configuration.
pub fn build_recognizer(config: &OcrConfig) -> Result<Box<dyn TextRecognizer>> {
    let recognizer: Box<dyn TextRecognizer> = match config.engine {
        OcrEngineKind::Onnx => build_onnx(config)?,
        OcrEngineKind::Tesseract => Box::new(TesseractRecognizer::from_config(config)),
    };

    info!("Using {} OCR engine", recognizer.name());
    Ok(recognizer)
}

#[cfg(feature = "native")]
fn build_onnx(config: &OcrConfig) -> Result<Box<dyn TextRecognizer>> {
    Ok(Box::new(OnnxRecognizer::from_config(config)?))
}

#[cfg(not(feature = "native"))]
fn build_onnx(_config: &OcrConfig) -> Result<Box<dyn TextRecognizer>> {
    Err(crate::error::OrderError::Config(
        "the onnx OCR engine requires the `native` feature".to_string(),
    ))
}
