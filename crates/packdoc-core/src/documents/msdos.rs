//! Import CSV for the MS-DOS inventory system.
//!
//! The importer is strict: CR+LF on every line regardless of host platform,
//! and unit values with exactly two decimals.

use std::io::Write;

use crate::error::RenderError;
use crate::models::LineRecord;

use super::{csv_error, format_decimal, ArtifactKind, LineEnding};

const ARTIFACT: ArtifactKind = ArtifactKind::MsdosCsv;

pub const HEADER: [&str; 4] = ["PO#", "ITEM#", "CASE_QTY", "FOB"];

/// Write the MS-DOS import CSV.
pub fn write_msdos_csv<W: Write, R: LineRecord>(out: W, records: &[R]) -> Result<(), RenderError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(LineEnding::CrLf.csv_terminator())
        .from_writer(out);

    writer.write_record(HEADER).map_err(|e| csv_error(ARTIFACT, e))?;

    for record in records {
        let quantity = record.quantity().to_string();
        let fob = format_decimal(record.unit_value(), 2);
        writer
            .write_record([
                record.purchase_order(),
                record.item_id(),
                quantity.as_str(),
                fob.as_str(),
            ])
            .map_err(|e| csv_error(ARTIFACT, e))?;
    }

    writer
        .flush()
        .map_err(|source| RenderError::Write { artifact: ARTIFACT, source })
}
