//! Order number extraction.

use super::patterns::ORDER_NUMBER_PATTERN;
use super::{ExtractionMatch, FieldExtractor, FieldPattern};

/// Order number extractor. Patterns are tried in order.
#[derive(Debug, Clone)]
pub struct OrderNumberExtractor {
    patterns: Vec<FieldPattern>,
}

impl OrderNumberExtractor {
    /// Extractor with the built-in marketplace pattern.
    pub fn new() -> Self {
        Self::with_patterns(vec![FieldPattern::new(
            "order_number",
            ORDER_NUMBER_PATTERN.clone(),
        )])
    }

    pub fn with_patterns(patterns: Vec<FieldPattern>) -> Self {
        Self { patterns }
    }
}

impl Default for OrderNumberExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for OrderNumberExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.patterns.iter().find_map(|pattern| {
            pattern
                .hits(text)
                .into_iter()
                .map(|hit| (pattern, hit))
                .find(|(_, hit)| !hit.value.trim().is_empty())
                .map(|(pattern, hit)| {
                    ExtractionMatch::new(hit.value.trim().to_string(), pattern.name(), hit.matched)
                        .with_position(hit.start, hit.end)
                })
        })
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.patterns
            .iter()
            .flat_map(|pattern| {
                pattern
                    .hits(text)
                    .into_iter()
                    .filter(|hit| !hit.value.trim().is_empty())
                    .map(move |hit| {
                        ExtractionMatch::new(hit.value.trim().to_string(), pattern.name(), hit.matched)
                            .with_position(hit.start, hit.end)
                    })
            })
            .collect()
    }
}
