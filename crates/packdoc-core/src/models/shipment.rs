//! Per-request shipment parameters and the codes derived from them.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::InputError;

/// Format of the day-granularity date stamp.
pub const DATE_STAMP_FORMAT: &str = "%y%m%d";

/// Shipment parameters supplied once per upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentParameters {
    /// Day stamp (yyMMdd) used for arrival/PO codes and file names.
    pub date_stamp: String,

    /// Carrier tracking number, possibly empty.
    #[serde(default)]
    pub tracking_number: String,

    /// Gross weight in kilograms.
    pub gross_weight_kg: f64,

    /// Number of boxes.
    pub box_count: u32,

    /// Freight price per kilogram in RMB.
    pub unit_price_rmb: f64,

    /// RMB per USD.
    pub exchange_rate: f64,
}

impl ShipmentParameters {
    pub fn new(date_stamp: impl Into<String>) -> Self {
        Self {
            date_stamp: date_stamp.into(),
            tracking_number: String::new(),
            gross_weight_kg: 0.0,
            box_count: 0,
            unit_price_rmb: 0.0,
            exchange_rate: 1.0,
        }
    }

    pub fn with_tracking(mut self, tracking: impl Into<String>) -> Self {
        self.tracking_number = tracking.into();
        self
    }

    pub fn with_weight(mut self, gross_weight_kg: f64, box_count: u32) -> Self {
        self.gross_weight_kg = gross_weight_kg;
        self.box_count = box_count;
        self
    }

    pub fn with_freight_rate(mut self, unit_price_rmb: f64, exchange_rate: f64) -> Self {
        self.unit_price_rmb = unit_price_rmb;
        self.exchange_rate = exchange_rate;
        self
    }

    /// Freight cost in USD.
    ///
    /// A zero exchange rate yields a non-finite value; callers validate rates.
    pub fn freight_cost(&self) -> f64 {
        self.gross_weight_kg * self.unit_price_rmb / self.exchange_rate
    }

    /// Arrival code, `XR` + date stamp.
    pub fn arrival_code(&self) -> String {
        format!("XR{}", self.date_stamp)
    }

    /// Purchase-order code, `W` + date stamp.
    pub fn po_code(&self) -> String {
        format!("W{}", self.date_stamp)
    }

    /// Arrival code with the PO date moved forward by `days`.
    ///
    /// Falls back to the unshifted code when the stamp is not a valid date.
    pub fn shifted_arrival_code(&self, days: i64) -> String {
        match NaiveDate::parse_from_str(&self.date_stamp, DATE_STAMP_FORMAT) {
            Ok(date) => match Duration::try_days(days).and_then(|d| date.checked_add_signed(d)) {
                Some(arrival) => format!("XR{}", arrival.format(DATE_STAMP_FORMAT)),
                None => {
                    warn!("Arrival offset of {} days is out of range", days);
                    self.arrival_code()
                }
            },
            Err(e) => {
                warn!(
                    "Cannot parse date stamp '{}' ({}), using unshifted arrival code",
                    self.date_stamp, e
                );
                self.arrival_code()
            }
        }
    }
}

/// Format a calendar date as a date stamp.
pub fn date_stamp(date: NaiveDate) -> String {
    date.format(DATE_STAMP_FORMAT).to_string()
}

/// Check that a caller-supplied stamp is six ASCII digits.
///
/// The stamp ends up in archive entry names, so anything else is rejected
/// before generation starts. Calendar validity is not required here.
pub fn validate_date_stamp(stamp: &str) -> Result<(), InputError> {
    if stamp.len() == 6 && stamp.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(InputError::InvalidDateStamp(stamp.to_string()))
    }
}
