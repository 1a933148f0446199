//! Line records parsed from invoice and packing CSV files.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Read-only view of one shipped line, shared by both input shapes.
///
/// Document generators only see this trait, so they render invoice and packing
/// records identically.
pub trait LineRecord {
    /// Purchase-order identifier.
    fn purchase_order(&self) -> &str;

    /// Item identifier, the sort key.
    fn item_id(&self) -> &str;

    /// Shipped quantity.
    fn quantity(&self) -> u32;

    /// Free-text notes (empty when the input shape has none).
    fn notes(&self) -> &str;

    /// FOB unit value in USD.
    fn unit_value(&self) -> Decimal;
}

/// One row of a commercial invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Purchase order (PO/NO.).
    pub purchase_order: String,

    /// Item number (ITEM NO.).
    pub item_id: String,

    /// Description of goods.
    pub description: String,

    /// Quantity (QTY).
    pub quantity: u32,

    /// Unit value in USD.
    pub unit_value: Decimal,
}

impl InvoiceRecord {
    pub fn new(
        purchase_order: impl Into<String>,
        item_id: impl Into<String>,
        description: impl Into<String>,
        quantity: u32,
        unit_value: Decimal,
    ) -> Self {
        Self {
            purchase_order: purchase_order.into(),
            item_id: item_id.into(),
            description: description.into(),
            quantity,
            unit_value,
        }
    }
}

impl LineRecord for InvoiceRecord {
    fn purchase_order(&self) -> &str {
        &self.purchase_order
    }

    fn item_id(&self) -> &str {
        &self.item_id
    }

    fn quantity(&self) -> u32 {
        self.quantity
    }

    fn notes(&self) -> &str {
        ""
    }

    fn unit_value(&self) -> Decimal {
        self.unit_value
    }
}

/// One row of the legacy packing sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackingRecord {
    /// Purchase order (PO.NO).
    pub purchase_order: String,

    /// Item number (ITEM NO).
    pub item_id: String,

    /// Quantity (QTY).
    pub quantity: u32,

    /// Notes column, empty when absent.
    #[serde(default)]
    pub notes: String,

    /// Unit value in USD, zero when the sheet has no value column.
    #[serde(default)]
    pub unit_value: Decimal,
}

impl PackingRecord {
    pub fn new(
        purchase_order: impl Into<String>,
        item_id: impl Into<String>,
        quantity: u32,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            purchase_order: purchase_order.into(),
            item_id: item_id.into(),
            quantity,
            notes: notes.into(),
            unit_value: Decimal::ZERO,
        }
    }

    pub fn with_unit_value(mut self, unit_value: Decimal) -> Self {
        self.unit_value = unit_value;
        self
    }
}

impl LineRecord for PackingRecord {
    fn purchase_order(&self) -> &str {
        &self.purchase_order
    }

    fn item_id(&self) -> &str {
        &self.item_id
    }

    fn quantity(&self) -> u32 {
        self.quantity
    }

    fn notes(&self) -> &str {
        &self.notes
    }

    fn unit_value(&self) -> Decimal {
        self.unit_value
    }
}

/// Records of either input shape, as produced by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "profile", content = "records", rename_all = "snake_case")]
pub enum RecordSet {
    Invoice(Vec<InvoiceRecord>),
    Packing(Vec<PackingRecord>),
}

impl RecordSet {
    pub fn len(&self) -> usize {
        match self {
            RecordSet::Invoice(records) => records.len(),
            RecordSet::Packing(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of all quantities.
    pub fn total_quantity(&self) -> u64 {
        match self {
            RecordSet::Invoice(records) => total_quantity(records),
            RecordSet::Packing(records) => total_quantity(records),
        }
    }

    /// Item ids in current order.
    pub fn item_ids(&self) -> Vec<&str> {
        match self {
            RecordSet::Invoice(records) => records.iter().map(|r| r.item_id.as_str()).collect(),
            RecordSet::Packing(records) => records.iter().map(|r| r.item_id.as_str()).collect(),
        }
    }
}

/// Sum quantities without overflowing on large sheets.
pub fn total_quantity<R: LineRecord>(records: &[R]) -> u64 {
    records.iter().map(|r| u64::from(r.quantity())).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_record_has_no_notes() {
        let record = InvoiceRecord::new("PO001", "1015", "Widget", 10, Decimal::new(500, 2));
        assert_eq!(record.notes(), "");
        assert_eq!(record.unit_value(), Decimal::new(5, 0));
    }

    #[test]
    fn test_packing_record_defaults_unit_value() {
        let record = PackingRecord::new("PO001", "1015", 3, "fragile");
        assert_eq!(record.unit_value(), Decimal::ZERO);
        assert_eq!(record.notes(), "fragile");
    }

    #[test]
    fn test_total_quantity() {
        let records = vec![
            PackingRecord::new("A", "1", u32::MAX, ""),
            PackingRecord::new("A", "2", 1, ""),
        ];
        assert_eq!(total_quantity(&records), u64::from(u32::MAX) + 1);
    }
}
