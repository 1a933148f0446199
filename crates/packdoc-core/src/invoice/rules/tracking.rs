//! UPS tracking number extraction from recognized text.

use lazy_static::lazy_static;
use regex::Regex;

use super::{ExtractionMatch, FieldExtractor};

lazy_static! {
    // "1Z" + 16 alphanumerics, OCR sometimes inserts a space after the prefix
    pub static ref TRACKING_NUMBER: Regex = Regex::new(r"1Z ?[A-Z0-9]{16}").unwrap();
}

/// Tracking number extractor over recognized text.
pub struct TrackingExtractor;

impl TrackingExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TrackingExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for TrackingExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let upper = text.to_uppercase();

        TRACKING_NUMBER
            .find_iter(&upper)
            .map(|m| {
                ExtractionMatch::new(m.as_str().replace(' ', ""), m.as_str())
                    .with_position(m.start(), m.end())
            })
            .collect()
    }
}

/// Pick the tracking number for a shipment.
///
/// A manual value that is non-empty after trimming always wins and is returned
/// trimmed. Otherwise the first pattern match in `recognized` is returned, or
/// an empty string.
pub fn extract_tracking(manual: &str, recognized: &str) -> String {
    let manual = manual.trim();
    if !manual.is_empty() {
        return manual.to_string();
    }

    TrackingExtractor::new()
        .extract(recognized)
        .map(|m| m.value)
        .unwrap_or_default()
}
