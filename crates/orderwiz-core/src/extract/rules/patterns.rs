//! Built-in regex patterns for order screenshots.

use lazy_static::lazy_static;
use regex::Regex;

/// Marketplace order number: three, seven and seven digits.
pub const ORDER_NUMBER_SOURCE: &str = r"\d{3}-\d{7}-\d{7}";

/// Dollar amount with exactly two decimals, optional `$` prefix.
pub const AMOUNT_SOURCE: &str = r"\$?\d{1,4}\.\d{2}";

/// Order number that must stand alone as a word.
pub const ORDER_NUMBER_BOUNDED_SOURCE: &str = r"\b\d{3}-\d{7}-\d{7}\b";

/// Amount that may not start or end inside a longer number.
pub const AMOUNT_BOUNDED_SOURCE: &str = r"\$?\b\d{1,4}\.\d{2}\b";

lazy_static! {
    pub static ref ORDER_NUMBER_PATTERN: Regex = Regex::new(ORDER_NUMBER_SOURCE).unwrap();

    pub static ref AMOUNT_PATTERN: Regex = Regex::new(AMOUNT_SOURCE).unwrap();

    pub static ref ORDER_NUMBER_BOUNDED_PATTERN: Regex =
        Regex::new(ORDER_NUMBER_BOUNDED_SOURCE).unwrap();

    pub static ref AMOUNT_BOUNDED_PATTERN: Regex = Regex::new(AMOUNT_BOUNDED_SOURCE).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first<'t>(pattern: &Regex, text: &'t str) -> Option<&'t str> {
        pattern.find(text).map(|m| m.as_str())
    }

    #[test]
    fn test_order_number_pattern() {
        assert!(ORDER_NUMBER_PATTERN.is_match("Order #113-2089298-0236240"));
        assert!(!ORDER_NUMBER_PATTERN.is_match("113-208929-0236240"));
    }

    #[test]
    fn test_order_number_in_glued_text() {
        assert_eq!(
            first(&ORDER_NUMBER_PATTERN, "ORDER123-4567890-1234567 Total:$45.67"),
            Some("123-4567890-1234567")
        );
        assert_eq!(
            first(&ORDER_NUMBER_PATTERN, "Order#123-4567890-1234567x"),
            Some("123-4567890-1234567")
        );
        assert_eq!(first(&ORDER_NUMBER_BOUNDED_PATTERN, "Order#123-4567890-1234567x"), None);
    }

    #[test]
    fn test_amount_pattern() {
        let found: Vec<&str> = AMOUNT_PATTERN
            .find_iter("Subtotal $16.15 Tax 1.30")
            .map(|m| m.as_str())
            .collect();
        assert_eq!(found, vec!["$16.15", "1.30"]);
    }

    #[test]
    fn test_amount_in_glued_text() {
        assert_eq!(first(&AMOUNT_PATTERN, "Total45.67"), Some("45.67"));
        assert_eq!(first(&AMOUNT_PATTERN, "$45.67USD"), Some("$45.67"));
        assert_eq!(first(&AMOUNT_BOUNDED_PATTERN, "Total45.67"), None);
        assert_eq!(first(&AMOUNT_BOUNDED_PATTERN, "$45.67USD"), None);
    }

    #[test]
    fn test_bounded_amount_skips_long_numbers() {
        assert_eq!(first(&AMOUNT_PATTERN, "Ref 123456.78"), Some("3456.78"));
        assert_eq!(first(&AMOUNT_BOUNDED_PATTERN, "Ref 123456.78"), None);
        assert_eq!(first(&AMOUNT_BOUNDED_PATTERN, "Ref 123456.78 Total $9.99"), Some("$9.99"));
    }
}
