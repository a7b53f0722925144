//! Amount extraction for order screenshots.

use rust_decimal::Decimal;
use tracing::debug;

use super::patterns::AMOUNT_PATTERN;
use super::{ExtractionMatch, FieldExtractor, FieldPattern};
use crate::models::order::parse_amount;

/// Amount field extractor. Patterns are tried in order.
#[derive(Debug, Clone)]
pub struct AmountExtractor {
    patterns: Vec<FieldPattern>,
}

impl AmountExtractor {
    /// Extractor with the built-in dollar amount pattern.
    pub fn new() -> Self {
        Self::with_patterns(vec![FieldPattern::new("amount", AMOUNT_PATTERN.clone())])
    }

    pub fn with_patterns(patterns: Vec<FieldPattern>) -> Self {
        Self { patterns }
    }

    fn matches<'a>(
        &'a self,
        pattern: &'a FieldPattern,
        text: &'a str,
    ) -> impl Iterator<Item = ExtractionMatch<Decimal>> + 'a {
        pattern.hits(text).into_iter().filter_map(move |hit| {
            match parse_extracted_amount(hit.value) {
                Some(amount) => Some(
                    ExtractionMatch::new(amount, pattern.name(), hit.matched)
                        .with_position(hit.start, hit.end),
                ),
                None => {
                    debug!("Skipping unparsable amount '{}'", hit.value);
                    None
                }
            }
        })
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.patterns
            .iter()
            .find_map(|pattern| self.matches(pattern, text).next())
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.patterns
            .iter()
            .flat_map(|pattern| self.matches(pattern, text))
            .collect()
    }
}

/// Parse matched amount text such as `$45.67` or `1,234.56`.
///
/// Returns `None` for anything the store would not accept.
pub fn parse_extracted_amount(s: &str) -> Option<Decimal> {
    parse_amount(s).ok()
}
