//! CSV record parser for invoice and packing sheets.

use std::io::Read;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::InputError;
use crate::models::{InvoiceRecord, LineRecord, PackingRecord, RecordSet};

use super::rules::{coerce_quantity, coerce_unit_value, get_field, sort_by_item_id, HeaderIndex};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A logical column and the header spellings accepted for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub primary: &'static str,
    pub fallback: &'static str,
}

impl Column {
    const fn new(primary: &'static str, fallback: &'static str) -> Self {
        Self { primary, fallback }
    }
}

/// Input schema of an uploaded CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CsvProfile {
    /// Commercial invoice (PO/NO., ITEM NO., DESCRIPTION OF GOODS, QTY, UNIT VALUE (USD)).
    #[default]
    Invoice,
    /// Legacy packing sheet (PO.NO, ITEM NO, QTY, NOTES).
    Packing,
}

impl CsvProfile {
    pub const INVOICE_PO: Column = Column::new("PO/NO.", "PO.NO");
    pub const INVOICE_ITEM: Column = Column::new("ITEM NO.", "ITEM NO");
    pub const DESCRIPTION: Column = Column::new("DESCRIPTION OF GOODS", "DESCRIPTION");
    pub const QTY: Column = Column::new("QTY", "QTY");
    pub const UNIT_VALUE: Column = Column::new("UNIT VALUE (USD)", "UNIT VALUE");
    pub const PACKING_PO: Column = Column::new("PO.NO", "PO/NO.");
    pub const PACKING_ITEM: Column = Column::new("ITEM NO", "ITEM NO.");
    pub const NOTES: Column = Column::new("NOTES", "");

    /// Columns read by this profile.
    pub fn columns(&self) -> &'static [Column] {
        match self {
            CsvProfile::Invoice => &[
                Self::INVOICE_PO,
                Self::INVOICE_ITEM,
                Self::DESCRIPTION,
                Self::QTY,
                Self::UNIT_VALUE,
            ],
            CsvProfile::Packing => &[
                Self::PACKING_PO,
                Self::PACKING_ITEM,
                Self::QTY,
                Self::NOTES,
                Self::UNIT_VALUE,
            ],
        }
    }

    /// Header names a user must supply, for error messages.
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            CsvProfile::Invoice => &[
                "PO/NO.",
                "ITEM NO.",
                "DESCRIPTION OF GOODS",
                "QTY",
                "UNIT VALUE (USD)",
            ],
            CsvProfile::Packing => &["PO.NO", "ITEM NO", "QTY"],
        }
    }

    /// Whether the header names at least one column this profile reads.
    pub fn recognizes(&self, index: &HeaderIndex) -> bool {
        self.columns().iter().any(|c| {
            index.contains(c.primary) || (!c.fallback.is_empty() && index.contains(c.fallback))
        })
    }

    /// Parse CSV bytes under this profile, in file order.
    pub fn parse(&self, data: &[u8]) -> Result<ParsedRecords, InputError> {
        match self {
            CsvProfile::Invoice => {
                let outcome = parse_invoice_csv(data)?;
                Ok(ParsedRecords {
                    records: RecordSet::Invoice(outcome.records),
                    warnings: outcome.warnings,
                })
            }
            CsvProfile::Packing => {
                let outcome = parse_packing_csv(data)?;
                Ok(ParsedRecords {
                    records: RecordSet::Packing(outcome.records),
                    warnings: outcome.warnings,
                })
            }
        }
    }
}

impl std::fmt::Display for CsvProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CsvProfile::Invoice => write!(f, "invoice"),
            CsvProfile::Packing => write!(f, "packing"),
        }
    }
}

impl std::str::FromStr for CsvProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "invoice" => Ok(CsvProfile::Invoice),
            "packing" => Ok(CsvProfile::Packing),
            other => Err(format!("unknown CSV profile: {}", other)),
        }
    }
}

/// Typed records plus the non-fatal diagnostics raised while reading them.
#[derive(Debug, Clone)]
pub struct ParseOutcome<R> {
    /// Records in file order.
    pub records: Vec<R>,
    /// Coercion warnings.
    pub warnings: Vec<String>,
}

impl<R: LineRecord> ParseOutcome<R> {
    /// Records in lexical item order.
    pub fn sorted(mut self) -> Self {
        sort_by_item_id(&mut self.records);
        self
    }
}

/// Records of either profile plus warnings.
#[derive(Debug, Clone)]
pub struct ParsedRecords {
    pub records: RecordSet,
    pub warnings: Vec<String>,
}

impl ParsedRecords {
    /// Records in lexical item order.
    pub fn sorted(mut self) -> Self {
        match &mut self.records {
            RecordSet::Invoice(records) => sort_by_item_id(records),
            RecordSet::Packing(records) => sort_by_item_id(records),
        }
        self
    }
}

/// Trait for sheet parsers.
pub trait RecordParser {
    type Record: LineRecord;

    /// Parse records from a CSV stream.
    fn parse_reader<Rd: Read>(&self, reader: Rd) -> Result<ParseOutcome<Self::Record>, InputError>;

    /// Parse records from CSV bytes.
    fn parse(&self, data: &[u8]) -> Result<ParseOutcome<Self::Record>, InputError> {
        self.parse_reader(strip_bom(data))
    }
}

/// Parser for commercial invoice sheets.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvoiceCsvParser;

impl RecordParser for InvoiceCsvParser {
    type Record = InvoiceRecord;

    fn parse_reader<Rd: Read>(&self, reader: Rd) -> Result<ParseOutcome<InvoiceRecord>, InputError> {
        read_rows(reader, CsvProfile::Invoice, |row, warnings| {
            let quantity = coerce_quantity(&get_field(&row, CsvProfile::QTY.primary, CsvProfile::QTY.fallback));
            let unit_value = coerce_unit_value(&get_field(
                &row,
                CsvProfile::UNIT_VALUE.primary,
                CsvProfile::UNIT_VALUE.fallback,
            ));
            warnings.extend(quantity.warning);
            warnings.extend(unit_value.warning);

            InvoiceRecord {
                purchase_order: get_field(&row, CsvProfile::INVOICE_PO.primary, CsvProfile::INVOICE_PO.fallback),
                item_id: get_field(&row, CsvProfile::INVOICE_ITEM.primary, CsvProfile::INVOICE_ITEM.fallback),
                description: get_field(&row, CsvProfile::DESCRIPTION.primary, CsvProfile::DESCRIPTION.fallback),
                quantity: quantity.value,
                unit_value: unit_value.value,
            }
        })
    }
}

/// Parser for legacy packing sheets.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackingCsvParser;

impl RecordParser for PackingCsvParser {
    type Record = PackingRecord;

    fn parse_reader<Rd: Read>(&self, reader: Rd) -> Result<ParseOutcome<PackingRecord>, InputError> {
        read_rows(reader, CsvProfile::Packing, |row, warnings| {
            let quantity = coerce_quantity(&get_field(&row, CsvProfile::QTY.primary, CsvProfile::QTY.fallback));
            let unit_value = coerce_unit_value(&get_field(
                &row,
                CsvProfile::UNIT_VALUE.primary,
                CsvProfile::UNIT_VALUE.fallback,
            ));
            warnings.extend(quantity.warning);
            warnings.extend(unit_value.warning);

            PackingRecord {
                purchase_order: get_field(&row, CsvProfile::PACKING_PO.primary, CsvProfile::PACKING_PO.fallback),
                item_id: get_field(&row, CsvProfile::PACKING_ITEM.primary, CsvProfile::PACKING_ITEM.fallback),
                quantity: quantity.value,
                notes: get_field(&row, CsvProfile::NOTES.primary, CsvProfile::NOTES.fallback),
                unit_value: unit_value.value,
            }
        })
    }
}

/// Parse an invoice sheet, in file order.
pub fn parse_invoice_csv(data: &[u8]) -> Result<ParseOutcome<InvoiceRecord>, InputError> {
    InvoiceCsvParser.parse(data)
}

/// Parse a packing sheet, in file order.
pub fn parse_packing_csv(data: &[u8]) -> Result<ParseOutcome<PackingRecord>, InputError> {
    PackingCsvParser.parse(data)
}

fn strip_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(UTF8_BOM).unwrap_or(data)
}

fn malformed(e: csv::Error) -> InputError {
    InputError::MalformedCsv {
        line: e.position().map(|p| p.line()).unwrap_or(0),
        reason: e.to_string(),
    }
}

fn decode_cells(record: &csv::ByteRecord) -> Vec<String> {
    record
        .iter()
        .map(|cell| String::from_utf8_lossy(cell).into_owned())
        .collect()
}

/// Shared header-driven row loop.
fn read_rows<Rd, R, F>(reader: Rd, profile: CsvProfile, mut build: F) -> Result<ParseOutcome<R>, InputError>
where
    Rd: Read,
    F: FnMut(super::rules::fields::IndexedRow<'_>, &mut Vec<String>) -> R,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = decode_cells(csv_reader.byte_headers().map_err(malformed)?);
    let index = HeaderIndex::new(headers);

    if !profile.recognizes(&index) {
        warn!("CSV header has none of the {} profile columns", profile);
        return Err(InputError::NoRecords { profile });
    }

    let mut records = Vec::new();
    let mut warnings = Vec::new();
    let mut raw = csv::ByteRecord::new();

    while csv_reader.read_byte_record(&mut raw).map_err(malformed)? {
        let cells = decode_cells(&raw);
        records.push(build(index.row(&cells), &mut warnings));
    }

    if records.is_empty() {
        warn!("CSV contains a header but no data rows");
        return Err(InputError::NoRecords { profile });
    }

    info!(
        "Parsed {} {} records ({} warnings)",
        records.len(),
        profile,
        warnings.len()
    );
    debug!("Header columns: {}", index.len());

    Ok(ParseOutcome { records, warnings })
}
