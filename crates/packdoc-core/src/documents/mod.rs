//! Document generators for shipment artifacts.
//!
//! Every generator is a pure function of the shipment parameters and the
//! ordered records, writing into any `std::io::Write` sink.

pub mod html;
pub mod msdos;
pub mod packing_list;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::debug;

use crate::error::RenderError;
use crate::models::{LineRecord, RecordSet, ShipmentParameters};

pub use html::{write_packing_list_html, HtmlLayout};
pub use msdos::write_msdos_csv;
pub use packing_list::write_packing_list_csv;

/// The artifacts a shipment bundle can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Human-readable packing list as CSV.
    PackingListCsv,
    /// Printable paginated packing list.
    PackingListHtml,
    /// Import file for the MS-DOS inventory system.
    MsdosCsv,
}

impl ArtifactKind {
    /// All artifacts, in archive order.
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::PackingListCsv,
        ArtifactKind::PackingListHtml,
        ArtifactKind::MsdosCsv,
    ];

    /// Entry name inside the archive.
    pub fn file_name(&self, date_stamp: &str) -> String {
        match self {
            ArtifactKind::PackingListCsv => format!("packing-list-{}.csv", date_stamp),
            ArtifactKind::PackingListHtml => format!("packing-list-{}.html", date_stamp),
            ArtifactKind::MsdosCsv => format!("import_inv-{}.csv", date_stamp),
        }
    }

    /// Identifier used in configuration files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::PackingListCsv => "packing_list_csv",
            ArtifactKind::PackingListHtml => "packing_list_html",
            ArtifactKind::MsdosCsv => "msdos_csv",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactKind::PackingListCsv => write!(f, "packing list CSV"),
            ArtifactKind::PackingListHtml => write!(f, "packing list HTML"),
            ArtifactKind::MsdosCsv => write!(f, "MS-DOS import CSV"),
        }
    }
}

impl std::str::FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "packing_list_csv" | "csv" => Ok(ArtifactKind::PackingListCsv),
            "packing_list_html" | "html" => Ok(ArtifactKind::PackingListHtml),
            "msdos_csv" | "msdos" | "import" => Ok(ArtifactKind::MsdosCsv),
            other => Err(format!("unknown artifact: {}", other)),
        }
    }
}

/// A rendered artifact ready for bundling.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    /// Entry name, e.g. `import_inv-250115.csv`.
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Line terminator for text artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    /// Terminator of the host platform.
    pub fn native() -> Self {
        if cfg!(windows) {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }

    pub(crate) fn csv_terminator(&self) -> csv::Terminator {
        match self {
            LineEnding::Lf => csv::Terminator::Any(b'\n'),
            LineEnding::CrLf => csv::Terminator::CRLF,
        }
    }
}

impl Default for LineEnding {
    fn default() -> Self {
        Self::native()
    }
}

/// Fixed-point rendering with half-up rounding.
///
/// Non-finite values render as `NaN`, `Infinity` or `-Infinity`.
pub fn format_fixed(value: f64, decimals: u32) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    match Decimal::from_f64(value) {
        Some(exact) => format_decimal(exact, decimals),
        // Beyond Decimal range; no fractional digits left to round anyway.
        None => format!("{:.*}", decimals as usize, value),
    }
}

/// Fixed-point rendering of a decimal with half-up rounding.
pub fn format_decimal(value: Decimal, decimals: u32) -> String {
    let rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", decimals as usize, rounded)
}

/// Render one artifact into memory.
pub fn render<R: LineRecord>(
    kind: ArtifactKind,
    shipment: &ShipmentParameters,
    records: &[R],
    layout: &HtmlLayout,
) -> Result<Artifact, RenderError> {
    let mut bytes = Vec::new();

    match kind {
        ArtifactKind::PackingListCsv => {
            write_packing_list_csv(&mut bytes, shipment, records, LineEnding::native())?
        }
        ArtifactKind::PackingListHtml => {
            write_packing_list_html(&mut bytes, shipment, records, layout)?
        }
        ArtifactKind::MsdosCsv => write_msdos_csv(&mut bytes, records)?,
    }

    debug!("Rendered {} ({} bytes)", kind, bytes.len());

    Ok(Artifact {
        kind,
        name: kind.file_name(&shipment.date_stamp),
        bytes,
    })
}

/// Render one artifact from a profile-tagged record set.
pub fn render_set(
    kind: ArtifactKind,
    shipment: &ShipmentParameters,
    records: &RecordSet,
    layout: &HtmlLayout,
) -> Result<Artifact, RenderError> {
    match records {
        RecordSet::Invoice(records) => render(kind, shipment, records, layout),
        RecordSet::Packing(records) => render(kind, shipment, records, layout),
    }
}

/// Map a CSV writer failure onto the artifact being written.
pub(crate) fn csv_error(artifact: ArtifactKind, error: csv::Error) -> RenderError {
    match error.into_kind() {
        csv::ErrorKind::Io(source) => RenderError::Write { artifact, source },
        other => RenderError::Encode {
            artifact,
            reason: format!("{:?}", other),
        },
    }
}

pub(crate) fn write_line<W: Write>(
    out: &mut W,
    artifact: ArtifactKind,
    line: &str,
    ending: LineEnding,
) -> Result<(), RenderError> {
    out.write_all(line.as_bytes())
        .and_then(|_| out.write_all(ending.as_str().as_bytes()))
        .map_err(|source| RenderError::Write { artifact, source })
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InvoiceRecord;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_fixed_half_up() {
        assert_eq!(format_fixed(12.5, 0), "13");
        assert_eq!(format_fixed(0.125, 2), "0.13");
        assert_eq!(format_fixed(40.0, 0), "40");
        assert_eq!(format_fixed(12.0, 1), "12.0");
        assert_eq!(format_fixed(7.2, 2), "7.20");
        assert_eq!(format_fixed(66.66666666666667, 2), "66.67");
    }

    #[test]
    fn test_format_fixed_non_finite() {
        assert_eq!(format_fixed(f64::NAN, 2), "NaN");
        assert_eq!(format_fixed(f64::INFINITY, 2), "Infinity");
        assert_eq!(format_fixed(f64::NEG_INFINITY, 1), "-Infinity");
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(Decimal::new(5, 0), 2), "5.00");
        assert_eq!(format_decimal(Decimal::new(12345, 3), 2), "12.35");
        assert_eq!(format_decimal(Decimal::new(1, 1), 2), "0.10");
    }

    #[test]
    fn test_file_names() {
        assert_eq!(ArtifactKind::PackingListCsv.file_name("250115"), "packing-list-250115.csv");
        assert_eq!(ArtifactKind::PackingListHtml.file_name("250115"), "packing-list-250115.html");
        assert_eq!(ArtifactKind::MsdosCsv.file_name("250115"), "import_inv-250115.csv");
    }

    #[test]
    fn test_artifact_kind_from_str() {
        assert_eq!("html".parse::<ArtifactKind>(), Ok(ArtifactKind::PackingListHtml));
        assert_eq!("msdos-csv".parse::<ArtifactKind>(), Ok(ArtifactKind::MsdosCsv));
        assert_eq!("packing_list_csv".parse::<ArtifactKind>(), Ok(ArtifactKind::PackingListCsv));
        assert!("pdf".parse::<ArtifactKind>().is_err());
    }

    #[test]
    fn test_render_names_artifact() {
        let shipment = ShipmentParameters::new("250115");
        let records = vec![InvoiceRecord::new("PO001", "1", "", 1, Decimal::ONE)];

        let artifact = render(ArtifactKind::MsdosCsv, &shipment, &records, &HtmlLayout::default()).unwrap();

        assert_eq!(artifact.name, "import_inv-250115.csv");
        assert!(artifact.bytes.starts_with(b"PO#,ITEM#,CASE_QTY,FOB\r\n"));
    }
}
