//! Rule-based field extractors for order screenshots.

pub mod amounts;
pub mod order_number;
pub mod patterns;

pub use amounts::{parse_extracted_amount, AmountExtractor};
pub use order_number::OrderNumberExtractor;

use regex::Regex;

use crate::error::{OrderError, Result};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A value found in text, with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Name of the pattern that produced the value.
    pub pattern: String,
    /// Byte range of the whole match in the source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, pattern: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            value,
            pattern: pattern.into(),
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}

/// A named regex for one field.
///
/// If the regex has a capture group, group 1 is the value. Otherwise the
/// whole match is.
#[derive(Debug, Clone)]
pub struct FieldPattern {
    name: String,
    regex: Regex,
}

/// One raw hit of a [`FieldPattern`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternHit<'t> {
    /// The captured value text.
    pub value: &'t str,
    /// The whole match.
    pub matched: &'t str,
    pub start: usize,
    pub end: usize,
}

impl FieldPattern {
    /// Wrap an already compiled regex.
    pub fn new(name: impl Into<String>, regex: Regex) -> Self {
        Self {
            name: name.into(),
            regex,
        }
    }

    /// Compile a user-supplied pattern.
    pub fn compile(name: impl Into<String>, source: &str) -> Result<Self> {
        let name = name.into();
        let regex = Regex::new(source)
            .map_err(|e| OrderError::Config(format!("invalid pattern '{}' for {}: {}", source, name, e)))?;
        Ok(Self::new(name, regex))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// All hits, leftmost first.
    pub fn hits<'t>(&self, text: &'t str) -> Vec<PatternHit<'t>> {
        let grouped = self.regex.captures_len() > 1;

        self.regex
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let value = if grouped { caps.get(1)? } else { whole };
                Some(PatternHit {
                    value: value.as_str(),
                    matched: whole.as_str(),
                    start: whole.start(),
                    end: whole.end(),
                })
            })
            .collect()
    }
}
