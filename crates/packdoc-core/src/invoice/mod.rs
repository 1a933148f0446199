//! Reading invoice and packing sheets into ordered line records.

mod parser;
pub mod rules;

pub use parser::{
    parse_invoice_csv, parse_packing_csv, Column, CsvProfile, InvoiceCsvParser, PackingCsvParser,
    ParseOutcome, ParsedRecords, RecordParser,
};
