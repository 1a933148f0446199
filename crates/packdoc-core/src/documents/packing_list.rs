//! Plain packing-list CSV.
//!
//! A free-form header block (arrival, freight, weight, tracking, PO code)
//! followed by a CSV table and a trailing total row:
//!
//! ```text
//! ARRIVAL#: XR250115
//! AMNT:
//! DATE:
//!
//! UPS FREIGHT: 12.0 KG * 40 RMB / 7.20 RATE = $66.67
//! WEIGHT & BOXES: 12.0 KG || 3 BOXES
//! UPS TRACKING#: 1Z999AA12345678901
//!
//! P.O#: W250115
//! PO#,ITEM#,QTY,,NOTES
//! PO002,100,20,,
//! ,,TOTAL QTY: 20,,
//! ```

use std::io::Write;

use crate::error::RenderError;
use crate::models::record::total_quantity;
use crate::models::{LineRecord, ShipmentParameters};

use super::{csv_error, format_fixed, write_line, ArtifactKind, LineEnding};

const ARTIFACT: ArtifactKind = ArtifactKind::PackingListCsv;

/// Table header of the item section.
pub const TABLE_HEADER: [&str; 5] = ["PO#", "ITEM#", "QTY", "", "NOTES"];

/// `UPS FREIGHT: ...` line.
pub fn freight_line(shipment: &ShipmentParameters) -> String {
    format!(
        "UPS FREIGHT: {} KG * {} RMB / {} RATE = ${}",
        format_fixed(shipment.gross_weight_kg, 1),
        format_fixed(shipment.unit_price_rmb, 0),
        format_fixed(shipment.exchange_rate, 2),
        format_fixed(shipment.freight_cost(), 2),
    )
}

/// `WEIGHT & BOXES: ...` line.
pub fn weight_line(shipment: &ShipmentParameters) -> String {
    format!(
        "WEIGHT & BOXES: {} KG || {} BOXES",
        format_fixed(shipment.gross_weight_kg, 1),
        shipment.box_count
    )
}

/// `UPS TRACKING#: ...` line; the value may be empty.
pub fn tracking_line(shipment: &ShipmentParameters) -> String {
    format!("UPS TRACKING#: {}", shipment.tracking_number)
}

/// `TOTAL QTY: ...` cell.
pub fn total_cell(total: u64) -> String {
    format!("TOTAL QTY: {}", total)
}

/// Write the packing list CSV.
pub fn write_packing_list_csv<W: Write, R: LineRecord>(
    mut out: W,
    shipment: &ShipmentParameters,
    records: &[R],
    ending: LineEnding,
) -> Result<(), RenderError> {
    let preamble = [
        format!("ARRIVAL#: {}", shipment.arrival_code()),
        "AMNT:".to_string(),
        "DATE:".to_string(),
        String::new(),
        freight_line(shipment),
        weight_line(shipment),
        tracking_line(shipment),
        String::new(),
        format!("P.O#: {}", shipment.po_code()),
    ];
    for line in &preamble {
        write_line(&mut out, ARTIFACT, line, ending)?;
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(ending.csv_terminator())
        .from_writer(&mut out);

    writer
        .write_record(TABLE_HEADER)
        .map_err(|e| csv_error(ARTIFACT, e))?;

    for record in records {
        let quantity = record.quantity().to_string();
        writer
            .write_record([
                record.purchase_order(),
                record.item_id(),
                quantity.as_str(),
                "",
                record.notes(),
            ])
            .map_err(|e| csv_error(ARTIFACT, e))?;
    }

    let total = total_cell(total_quantity(records));
    writer
        .write_record(["", "", total.as_str(), "", ""])
        .map_err(|e| csv_error(ARTIFACT, e))?;

    writer
        .flush()
        .map_err(|source| RenderError::Write { artifact: ARTIFACT, source })
}
