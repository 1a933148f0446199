//! Rule-based field handling for shipping sheets.

pub mod fields;
pub mod numbers;
pub mod ordering;
pub mod tracking;

pub use fields::{get_field, HeaderIndex, TabularRow};
pub use numbers::{coerce_quantity, coerce_unit_value, parse_quantity, parse_unit_value, Coerced};
pub use ordering::{compare_item_ids, is_lexically_sorted, sort_by_item_id};
pub use tracking::{extract_tracking, TrackingExtractor, TRACKING_NUMBER};

/// Trait for field extractors working on free text.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A value located in free text.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
