//! Core library for shipment document generation.
//!
//! This crate provides:
//! - Tolerant parsing of invoice and packing CSV sheets
//! - Lexical ordering of line items by item number
//! - Packing list (CSV and paginated HTML) and MS-DOS import generators
//! - UPS tracking number extraction from typed values or label OCR
//! - ZIP bundling of the generated documents

pub mod archive;
pub mod documents;
pub mod error;
pub mod invoice;
pub mod models;
pub mod ocr;
pub mod pipeline;

pub use archive::{archive_name, bundle};
pub use documents::{render, render_set, Artifact, ArtifactKind, HtmlLayout, LineEnding};
pub use error::{InputError, PackdocError, Result};
pub use invoice::rules::extract_tracking;
pub use invoice::{CsvProfile, ParseOutcome, ParsedRecords};
pub use models::config::PackdocConfig;
pub use models::{InvoiceRecord, LineRecord, PackingRecord, RecordSet, ShipmentParameters};
pub use ocr::{recognizer_for, PlainTextRecognizer, TextRecognizer, TrackingInputKind};
#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
pub use pipeline::{process_shipment, ShipmentBundle, ShipmentRequest};
