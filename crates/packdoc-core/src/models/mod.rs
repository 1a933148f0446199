//! Data models for records, shipment parameters, and configuration.

pub mod config;
pub mod record;
pub mod shipment;

pub use record::{InvoiceRecord, LineRecord, PackingRecord, RecordSet};
pub use shipment::ShipmentParameters;
