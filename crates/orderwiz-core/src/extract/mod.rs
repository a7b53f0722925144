//! Order field extraction from screenshots.
//!
//! The extractor runs OCR through a [`TextRecognizer`] and then applies a
//! [`PatternSet`] to the recognized text. It only proposes values. Saving
//! them is up to the caller.

pub mod rules;

pub use rules::{FieldPattern, OrderNumberExtractor, AmountExtractor};

use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ExtractionError, Result};
use crate::models::config::ExtractionConfig;
use crate::models::order::OrderDraft;
use crate::ocr::TextRecognizer;
use crate::store::detect_format;
use rules::patterns::{
    AMOUNT_BOUNDED_PATTERN, AMOUNT_PATTERN, ORDER_NUMBER_BOUNDED_PATTERN, ORDER_NUMBER_PATTERN,
};
use rules::FieldExtractor;

/// Candidate order fields found in an image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub order_number: Option<String>,
    pub amount: Option<Decimal>,
    /// Full recognized text.
    pub raw_text: String,
    /// Engine confidence. The current engines do not report one.
    pub confidence: Option<f32>,
    /// Name of the OCR engine that produced `raw_text`.
    pub engine: Option<String>,
    pub processing_time_ms: u64,
}

impl ExtractionResult {
    /// True if both fields were found.
    pub fn is_complete(&self) -> bool {
        self.order_number.is_some() && self.amount.is_some()
    }

    /// A draft for the store, if both fields were found.
    pub fn into_draft(self) -> Option<OrderDraft> {
        match (self.order_number, self.amount) {
            (Some(order_number), Some(amount)) => Some(OrderDraft::new(order_number, amount)),
            _ => None,
        }
    }
}

/// Ordered regex lists for the two extracted fields.
#[derive(Debug, Clone)]
pub struct PatternSet {
    order_number: OrderNumberExtractor,
    amount: AmountExtractor,
}

impl PatternSet {
    pub fn new(order_number: Vec<FieldPattern>, amount: Vec<FieldPattern>) -> Self {
        Self {
            order_number: OrderNumberExtractor::with_patterns(order_number),
            amount: AmountExtractor::with_patterns(amount),
        }
    }

    /// Replace the order number patterns.
    pub fn with_order_number(mut self, patterns: Vec<FieldPattern>) -> Self {
        self.order_number = OrderNumberExtractor::with_patterns(patterns);
        self
    }

    /// Replace the amount patterns.
    pub fn with_amount(mut self, patterns: Vec<FieldPattern>) -> Self {
        self.amount = AmountExtractor::with_patterns(patterns);
        self
    }

    /// Built-in patterns that only match whole words.
    ///
    /// Stricter than the default set. Text glued to a value, such as
    /// `Total45.67`, is not matched.
    pub fn bounded() -> Self {
        Self::new(
            vec![FieldPattern::new("order_number", ORDER_NUMBER_BOUNDED_PATTERN.clone())],
            vec![FieldPattern::new("amount", AMOUNT_BOUNDED_PATTERN.clone())],
        )
    }

    /// Compile the configured patterns. Empty lists keep the built-in ones.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        let mut set = if config.word_boundaries {
            Self::bounded()
        } else {
            Self::default()
        };

        if !config.order_number_patterns.is_empty() {
            set = set.with_order_number(compile_all("order_number", &config.order_number_patterns)?);
        }
        if !config.amount_patterns.is_empty() {
            set = set.with_amount(compile_all("amount", &config.amount_patterns)?);
        }

        Ok(set)
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::new(
            vec![FieldPattern::new("order_number", ORDER_NUMBER_PATTERN.clone())],
            vec![FieldPattern::new("amount", AMOUNT_PATTERN.clone())],
        )
    }
}

fn compile_all(field: &str, sources: &[String]) -> Result<Vec<FieldPattern>> {
    sources
        .iter()
        .enumerate()
        .map(|(i, source)| FieldPattern::compile(format!("{}[{}]", field, i), source))
        .collect()
}

/// Runs OCR and pattern matching over order screenshots.
pub struct OrderExtractor<R: TextRecognizer> {
    recognizer: R,
    patterns: PatternSet,
}

impl<R: TextRecognizer> OrderExtractor<R> {
    /// Create an extractor with the default patterns.
    pub fn new(recognizer: R) -> Self {
        Self {
            recognizer,
            patterns: PatternSet::default(),
        }
    }

    /// Set the pattern set.
    pub fn with_patterns(mut self, patterns: PatternSet) -> Self {
        self.patterns = patterns;
        self
    }

    /// Recognize text in an image and pull order fields out of it.
    ///
    /// Bytes that are not a supported image fail before the engine runs.
    pub fn extract(&self, image_bytes: &[u8]) -> std::result::Result<ExtractionResult, ExtractionError> {
        let start = Instant::now();

        let kind = detect_format(image_bytes).ok_or_else(|| {
            ExtractionError::InvalidImage(format!(
                "unsupported image data ({} bytes)",
                image_bytes.len()
            ))
        })?;

        debug!(
            "Running {} OCR on {:?} image ({} bytes)",
            self.recognizer.name(),
            kind,
            image_bytes.len()
        );

        let text = self.recognizer.recognize(image_bytes)?;

        let mut result = self.extract_from_text(&text);
        result.engine = Some(self.recognizer.name().to_string());
        result.processing_time_ms = start.elapsed().as_millis() as u64;

        info!(
            "Extraction complete in {}ms (order number: {}, amount: {})",
            result.processing_time_ms,
            result.order_number.is_some(),
            result.amount.is_some()
        );

        Ok(result)
    }

    /// Apply the patterns to already recognized text. Never fails.
    pub fn extract_from_text(&self, text: &str) -> ExtractionResult {
        let order_number = self.patterns.order_number.extract(text);
        let amount = self.patterns.amount.extract(text);

        if let Some(m) = &order_number {
            debug!("Order number '{}' matched by {}", m.value, m.pattern);
        }
        if let Some(m) = &amount {
            debug!("Amount {} matched by {}", m.value, m.pattern);
        }

        ExtractionResult {
            order_number: order_number.map(|m| m.value),
            amount: amount.map(|m| m.value),
            raw_text: text.to_string(),
            confidence: None,
            engine: None,
            processing_time_ms: 0,
        }
    }
}
