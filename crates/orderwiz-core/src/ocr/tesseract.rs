//! OCR through an external `tesseract` executable.

use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::Command;
use std::time::Instant;

use tracing::{debug, info};

use super::TextRecognizer;
use crate::error::ExtractionError;
use crate::models::config::OcrConfig;
use crate::store::detect_format;

/// Runs `tesseract <image> stdout -l <language>`.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    binary: PathBuf,
    language: String,
}

impl TesseractRecognizer {
    pub fn new(binary: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
        }
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(&config.tesseract_path, &config.language)
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new("tesseract", "eng")
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize(&self, image_bytes: &[u8]) -> Result<String, ExtractionError> {
        let start = Instant::now();

        let kind = detect_format(image_bytes)
            .ok_or_else(|| ExtractionError::InvalidImage("unsupported image data".to_string()))?;

        // Tesseract picks the decoder from the file extension.
        let mut input = tempfile::Builder::new()
            .prefix("orderwiz-ocr-")
            .suffix(&format!(".{}", kind.extension()))
            .tempfile()
            .map_err(|e| ExtractionError::Recognition(format!("failed to create temp file: {}", e)))?;
        input
            .write_all(image_bytes)
            .and_then(|()| input.flush())
            .map_err(|e| ExtractionError::Recognition(format!("failed to write temp file: {}", e)))?;

        debug!(
            "Running {} on {}",
            self.binary.display(),
            input.path().display()
        );

        let output = Command::new(&self.binary)
            .arg(input.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => ExtractionError::EngineUnavailable(format!(
                    "{} not found; install tesseract or set ocr.tesseract_path",
                    self.binary.display()
                )),
                _ => ExtractionError::EngineUnavailable(format!(
                    "failed to start {}: {}",
                    self.binary.display(),
                    e
                )),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::Recognition(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();

        info!(
            "Tesseract OCR complete: {} characters in {}ms",
            text.len(),
            start.elapsed().as_millis()
        );

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn test_missing_binary() {
        let recognizer = TesseractRecognizer::new("/nonexistent/orderwiz-tesseract", "eng");
        let err = recognizer.recognize(PNG_MAGIC).unwrap_err();
        assert!(matches!(err, ExtractionError::EngineUnavailable(_)));
    }

    #[test]
    fn test_rejects_non_image() {
        let err = TesseractRecognizer::default()
            .recognize(b"plain text")
            .unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidImage(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_reads_stdout() {
        let recognizer = TesseractRecognizer::new("echo", "eng");
        let text = recognizer.recognize(PNG_MAGIC).unwrap();
        assert!(text.ends_with("stdout -l eng"), "{text}");
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit() {
        let recognizer = TesseractRecognizer::new("false", "eng");
        let err = recognizer.recognize(PNG_MAGIC).unwrap_err();
        assert!(matches!(err, ExtractionError::Recognition(_)));
    }
}
