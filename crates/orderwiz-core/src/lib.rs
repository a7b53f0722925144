//! Core library for orderwiz order tracking.
//!
//! This crate provides:
//! - The order data model with amount and flag validation
//! - A SQLite-backed order store with search queries
//! - Managed storage for attached screenshot images
//! - OCR collaborators and pattern-based order field extraction

pub mod error;
pub mod extract;
pub mod models;
pub mod ocr;
pub mod store;

pub use error::{ExtractionError, OrderError, Result, StorageError};
pub use extract::{ExtractionResult, FieldPattern, OrderExtractor, PatternSet};
pub use models::config::AppConfig;
pub use models::order::{parse_amount, Order, OrderDraft, OrderPatch, OrderSort};
pub use ocr::{build_recognizer, TesseractRecognizer, TextRecognizer};
#[cfg(feature = "native")]
pub use ocr::OnnxRecognizer;
pub use store::{ImageKind, ImageRetention, ImageStore, OrderStore, StoreOptions, AMOUNT_TOLERANCE};
