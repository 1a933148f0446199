//! Lexical ordering of item identifiers.
//!
//! Item ids are compared codepoint by codepoint: no numeric interpretation,
//! no case folding, no locale collation. `"100"` sorts before `"2"` and
//! `"A1"` before `"a1"`. Downstream import tooling depends on this order.

use std::cmp::Ordering;

use crate::models::LineRecord;

/// Compare two item ids by codepoint.
///
/// UTF-8 byte order equals codepoint order, so this is plain `str` ordering.
pub fn compare_item_ids(a: &str, b: &str) -> Ordering {
    a.cmp(b)
}

/// Stable sort by item id; equal ids keep their input order.
pub fn sort_by_item_id<R: LineRecord>(records: &mut [R]) {
    records.sort_by(|a, b| compare_item_ids(a.item_id(), b.item_id()));
}

/// Whether records are already in lexical item order.
pub fn is_lexically_sorted<R: LineRecord>(records: &[R]) -> bool {
    records
        .windows(2)
        .all(|pair| compare_item_ids(pair[0].item_id(), pair[1].item_id()) != Ordering::Greater)
}
