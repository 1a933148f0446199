//! One upload in, one archive out.
//!
//! Parsing, tracking resolution, rendering and bundling run in sequence on the
//! caller's thread. Delivery is all-or-nothing: if any artifact fails, nothing
//! is returned but the error.

use tracing::{debug, info, warn};

use crate::archive::{archive_name, bundle};
use crate::documents::{render_set, Artifact, ArtifactKind, HtmlLayout};
use crate::error::{InputError, Result};
use crate::invoice::rules::extract_tracking;
use crate::invoice::CsvProfile;
use crate::models::shipment::validate_date_stamp;
use crate::models::ShipmentParameters;
use crate::ocr::TextRecognizer;

/// Tracking label bytes and the recognizer that reads them.
pub struct TrackingUpload<'a> {
    pub bytes: &'a [u8],
    pub recognizer: &'a dyn TextRecognizer,
}

/// Everything one upload supplies.
pub struct ShipmentRequest<'a> {
    /// Raw CSV bytes.
    pub csv: &'a [u8],

    /// Date stamp and freight figures. The tracking number is resolved here.
    pub shipment: ShipmentParameters,

    /// Tracking number typed by the user; wins over the label when non-blank.
    pub manual_tracking: String,

    /// Optional tracking label.
    pub tracking_upload: Option<TrackingUpload<'a>>,

    /// Expected CSV schema.
    pub profile: CsvProfile,

    /// Artifacts to produce; archive order is fixed regardless of this order.
    pub artifacts: Vec<ArtifactKind>,

    /// HTML pagination.
    pub layout: HtmlLayout,
}

impl<'a> ShipmentRequest<'a> {
    pub fn new(csv: &'a [u8], shipment: ShipmentParameters) -> Self {
        Self {
            csv,
            shipment,
            manual_tracking: String::new(),
            tracking_upload: None,
            profile: CsvProfile::default(),
            artifacts: ArtifactKind::ALL.to_vec(),
            layout: HtmlLayout::default(),
        }
    }

    pub fn with_manual_tracking(mut self, tracking: impl Into<String>) -> Self {
        self.manual_tracking = tracking.into();
        self
    }

    pub fn with_tracking_upload(mut self, bytes: &'a [u8], recognizer: &'a dyn TextRecognizer) -> Self {
        self.tracking_upload = Some(TrackingUpload { bytes, recognizer });
        self
    }

    pub fn with_profile(mut self, profile: CsvProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_artifacts(mut self, artifacts: Vec<ArtifactKind>) -> Self {
        self.artifacts = artifacts;
        self
    }

    pub fn with_layout(mut self, layout: HtmlLayout) -> Self {
        self.layout = layout;
        self
    }
}

/// The deliverable of one upload.
#[derive(Debug, Clone)]
pub struct ShipmentBundle {
    /// `packing-files-<date>.zip`.
    pub archive_name: String,

    /// ZIP bytes.
    pub archive: Vec<u8>,

    /// The artifacts inside the archive, in archive order.
    pub artifacts: Vec<Artifact>,

    /// Tracking number printed on the documents (may be empty).
    pub tracking_number: String,

    pub record_count: usize,

    pub total_quantity: u64,

    /// Coercion warnings, in row order.
    pub warnings: Vec<String>,
}

/// Process one upload into an archive.
pub fn process_shipment(request: &ShipmentRequest<'_>) -> Result<ShipmentBundle> {
    if request.csv.is_empty() {
        return Err(InputError::MissingCsv.into());
    }
    validate_date_stamp(&request.shipment.date_stamp)?;

    info!(
        "Processing {} CSV ({} bytes) for {}",
        request.profile,
        request.csv.len(),
        request.shipment.date_stamp
    );

    let parsed = request.profile.parse(request.csv)?.sorted();
    debug!("Item order: {:?}", parsed.records.item_ids());

    let tracking_number = resolve_tracking(request);
    let shipment = request.shipment.clone().with_tracking(tracking_number.clone());

    let artifacts = ArtifactKind::ALL
        .into_iter()
        .filter(|kind| request.artifacts.contains(kind))
        .map(|kind| render_set(kind, &shipment, &parsed.records, &request.layout))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let archive = bundle(&artifacts)?;

    info!(
        "Bundled {} artifacts ({} bytes) from {} records",
        artifacts.len(),
        archive.len(),
        parsed.records.len()
    );

    Ok(ShipmentBundle {
        archive_name: archive_name(&shipment.date_stamp),
        archive,
        artifacts,
        tracking_number,
        record_count: parsed.records.len(),
        total_quantity: parsed.records.total_quantity(),
        warnings: parsed.warnings,
    })
}

/// Manual value first, then the label. Recognition problems never fail the upload.
fn resolve_tracking(request: &ShipmentRequest<'_>) -> String {
    if !request.manual_tracking.trim().is_empty() {
        return extract_tracking(&request.manual_tracking, "");
    }

    let recognized = match &request.tracking_upload {
        Some(upload) if !upload.bytes.is_empty() => match upload.recognizer.recognize(upload.bytes) {
            Ok(text) => {
                debug!("{} recognized {} chars", upload.recognizer.name(), text.len());
                text
            }
            Err(e) => {
                warn!("Tracking recognition failed ({}), continuing without it", e);
                String::new()
            }
        },
        _ => String::new(),
    };

    let tracking = extract_tracking("", &recognized);
    if tracking.is_empty() && request.tracking_upload.is_some() {
        warn!("No tracking number found in the tracking upload");
    }
    tracking
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::LineEnding;
    use crate::error::{PackdocError, RecognitionError};
    use crate::ocr::PlainTextRecognizer;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::io::{Cursor, Read};

    const CSV: &str = "PO/NO.,ITEM NO.,DESCRIPTION,QTY,UNIT VALUE\n\
                       PO001,1015,Item A,10,$5.00\n\
                       PO002,100,Item B,20,$3.00\n\
                       PO003,2,Item C,5,$10.00\n";

    fn shipment() -> ShipmentParameters {
        ShipmentParameters::new("250115")
            .with_weight(12.0, 3)
            .with_freight_rate(40.0, 7.2)
    }

    fn entry(archive: &[u8], name: &str) -> String {
        let mut zip = zip::ZipArchive::new(Cursor::new(archive)).unwrap();
        let mut file = zip.by_name(name).unwrap();
        let mut text = String::new();
        file.read_to_string(&mut text).unwrap();
        text
    }

    struct FailingRecognizer;

    impl TextRecognizer for FailingRecognizer {
        fn name(&self) -> &str {
            "failing"
        }

        fn recognize(&self, _bytes: &[u8]) -> std::result::Result<String, RecognitionError> {
            Err(RecognitionError::Recognition("engine crashed".to_string()))
        }
    }

    struct CountingRecognizer(Cell<usize>);

    impl TextRecognizer for CountingRecognizer {
        fn name(&self) -> &str {
            "counting"
        }

        fn recognize(&self, _bytes: &[u8]) -> std::result::Result<String, RecognitionError> {
            self.0.set(self.0.get() + 1);
            Ok("1Z111AA11111111111".to_string())
        }
    }

    #[test]
    fn test_end_to_end() {
        let request = ShipmentRequest::new(CSV.as_bytes(), shipment()).with_tracking_upload(
            b"Tracking: 1Z999BB98765432109 thanks",
            &PlainTextRecognizer,
        );

        let result = process_shipment(&request).unwrap();

        assert_eq!(result.archive_name, "packing-files-250115.zip");
        assert_eq!(result.tracking_number, "1Z999BB98765432109");
        assert_eq!(result.record_count, 3);
        assert_eq!(result.total_quantity, 35);
        assert!(result.warnings.is_empty());

        let names: Vec<_> = result.artifacts.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "packing-list-250115.csv",
                "packing-list-250115.html",
                "import_inv-250115.csv"
            ]
        );

        assert_eq!(
            entry(&result.archive, "import_inv-250115.csv"),
            "PO#,ITEM#,CASE_QTY,FOB\r\nPO002,100,20,3.00\r\nPO001,1015,10,5.00\r\nPO003,2,5,10.00\r\n"
        );

        let packing_list = entry(&result.archive, "packing-list-250115.csv");
        assert!(packing_list.contains("UPS TRACKING#: 1Z999BB98765432109"));
        assert!(packing_list.contains("TOTAL QTY: 35"));

        let html = entry(&result.archive, "packing-list-250115.html");
        assert!(html.contains("ARRIVAL#: XR250122"));
    }

    #[test]
    fn test_manual_tracking_skips_recognition() {
        let recognizer = CountingRecognizer(Cell::new(0));
        let request = ShipmentRequest::new(CSV.as_bytes(), shipment())
            .with_manual_tracking(" 1Z999AA1 ")
            .with_tracking_upload(b"label", &recognizer);

        let result = process_shipment(&request).unwrap();

        assert_eq!(result.tracking_number, "1Z999AA1");
        assert_eq!(recognizer.0.get(), 0);
    }

    #[test]
    fn test_recognition_failure_is_not_fatal() {
        let request = ShipmentRequest::new(CSV.as_bytes(), shipment())
            .with_tracking_upload(b"\x89PNG", &FailingRecognizer);

        let result = process_shipment(&request).unwrap();

        assert_eq!(result.tracking_number, "");
        let expected = format!("UPS TRACKING#: {}", LineEnding::native().as_str());
        assert!(entry(&result.archive, "packing-list-250115.csv").contains(&expected));
    }

    #[test]
    fn test_artifact_subset_keeps_archive_order() {
        let request = ShipmentRequest::new(CSV.as_bytes(), shipment())
            .with_artifacts(vec![ArtifactKind::MsdosCsv, ArtifactKind::PackingListCsv]);

        let result = process_shipment(&request).unwrap();

        let kinds: Vec<_> = result.artifacts.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![ArtifactKind::PackingListCsv, ArtifactKind::MsdosCsv]);
    }

    #[test]
    fn test_warnings_returned() {
        let csv = "PO/NO.,ITEM NO.,QTY,UNIT VALUE (USD)\nPO001,1,abc,$2.00\n";
        let request = ShipmentRequest::new(csv.as_bytes(), shipment());

        let result = process_shipment(&request).unwrap();

        assert_eq!(
            result.warnings,
            vec!["Invalid quantity value 'abc'. Using 0 as default.".to_string()]
        );
    }

    #[test]
    fn test_empty_csv_is_user_error() {
        let err = process_shipment(&ShipmentRequest::new(b"", shipment())).unwrap_err();
        assert!(err.is_user_error());
        assert!(matches!(err, PackdocError::Input(InputError::MissingCsv)));
    }

    #[test]
    fn test_header_only_csv_is_user_error() {
        let err = process_shipment(&ShipmentRequest::new(b"PO/NO.,ITEM NO.\n", shipment())).unwrap_err();

        assert!(err.is_user_error());
        assert!(err.user_message().starts_with("CSV file appears to be empty or has invalid format."));
    }

    #[test]
    fn test_bad_date_stamp_rejected() {
        let request = ShipmentRequest::new(CSV.as_bytes(), ShipmentParameters::new("../etc"));
        let err = process_shipment(&request).unwrap_err();

        assert!(matches!(err, PackdocError::Input(InputError::InvalidDateStamp(_))));
    }

    #[test]
    fn test_packing_profile() {
        let csv = "PO.NO,ITEM NO,QTY,NOTES\nPO001,b,1,x\nPO002,a,2,y\n";
        let request = ShipmentRequest::new(csv.as_bytes(), shipment()).with_profile(CsvProfile::Packing);

        let result = process_shipment(&request).unwrap();

        let packing_list = entry(&result.archive, "packing-list-250115.csv");
        let eol = LineEnding::native().as_str();
        assert!(packing_list.contains(&format!("PO002,a,2,,y{eol}PO001,b,1,,x{eol}")));
    }
}
