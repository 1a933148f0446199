//! Tolerant column lookup over header-addressed rows.

use std::collections::HashMap;

/// A row whose cells are addressed by header name.
pub trait TabularRow {
    /// Whether the sheet has a column with this exact header.
    fn has_column(&self, header: &str) -> bool;

    /// Cell under `header`, or `None` when the column is missing or the row is short.
    fn value(&self, header: &str) -> Option<&str>;
}

/// Resolve a logical column from its primary or fallback header.
///
/// Header names match exactly and case-sensitively. A column that exists but
/// is missing from a short row yields an empty string without trying the
/// fallback. An empty fallback means the column has none, so an unnamed
/// column in the sheet is never read. Never fails.
pub fn get_field<R: TabularRow + ?Sized>(row: &R, primary: &str, fallback: &str) -> String {
    if row.has_column(primary) {
        return row.value(primary).unwrap_or_default().to_string();
    }
    if !fallback.is_empty() && row.has_column(fallback) {
        return row.value(fallback).unwrap_or_default().to_string();
    }
    String::new()
}

/// Header name to column position.
#[derive(Debug, Clone, Default)]
pub struct HeaderIndex {
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    /// Build from header cells. The last occurrence of a repeated name wins.
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut positions = HashMap::new();
        for (i, name) in headers.into_iter().enumerate() {
            positions.insert(name.into(), i);
        }
        Self { positions }
    }

    pub fn position(&self, header: &str) -> Option<usize> {
        self.positions.get(header).copied()
    }

    pub fn contains(&self, header: &str) -> bool {
        self.positions.contains_key(header)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Bind a row of cells to this header.
    pub fn row<'a>(&'a self, cells: &'a [String]) -> IndexedRow<'a> {
        IndexedRow { index: self, cells }
    }
}

/// Cells of one data row, addressed through a [`HeaderIndex`].
#[derive(Debug, Clone, Copy)]
pub struct IndexedRow<'a> {
    index: &'a HeaderIndex,
    cells: &'a [String],
}

impl TabularRow for IndexedRow<'_> {
    fn has_column(&self, header: &str) -> bool {
        self.index.contains(header)
    }

    fn value(&self, header: &str) -> Option<&str> {
        self.index
            .position(header)
            .and_then(|i| self.cells.get(i))
            .map(String::as_str)
    }
}

impl TabularRow for HashMap<String, String> {
    fn has_column(&self, header: &str) -> bool {
        self.contains_key(header)
    }

    fn value(&self, header: &str) -> Option<&str> {
        self.get(header).map(String::as_str)
    }
}
