//! Allocation inputs and the itemized bill record produced from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::reading::Reading;

/// One room's submeter reading for the billing period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomReading {
    /// Caller-assigned identifier, unique within a calculation. Required on
    /// deserialization.
    pub id: String,
    /// Display label; need not be unique.
    pub name: String,
    /// Submeter consumption (kWh), possibly as text.
    #[serde(default)]
    pub consumption: Reading,
}

impl RoomReading {
    /// Creates a room reading from anything convertible to a [`Reading`].
    pub fn new(id: impl Into<String>, name: impl Into<String>, consumption: impl Into<Reading>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            consumption: consumption.into(),
        }
    }
}

/// Billing period label, e.g. `"January"` / `2024`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingPeriod {
    /// Free-form period label (usually a month name).
    pub label: String,
    /// Calendar year.
    pub year: i32,
}

impl BillingPeriod {
    pub fn new(label: impl Into<String>, year: i32) -> Self {
        Self {
            label: label.into(),
            year,
        }
    }
}

impl std::fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.label, self.year)
    }
}

/// A complete calculation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationInput {
    /// Main (aggregate) meter reading (kWh).
    #[serde(default)]
    pub main_meter_kwh: Reading,
    /// Price per kWh.
    #[serde(default)]
    pub rate_per_kwh: Reading,
    /// Room submeter readings, in display order.
    #[serde(default)]
    pub rooms: Vec<RoomReading>,
    /// Period the bill covers.
    pub period: BillingPeriod,
}

impl AllocationInput {
    /// Labels of the readings that normalize to zero because they were
    /// missing, unparseable, or not finite. Rooms are labelled by id.
    pub fn malformed_readings(&self) -> Vec<String> {
        let mut fields = Vec::new();
        if self.main_meter_kwh.is_malformed() {
            fields.push("main_meter_kwh".to_string());
        }
        if self.rate_per_kwh.is_malformed() {
            fields.push("rate_per_kwh".to_string());
        }
        fields.extend(
            self.rooms
                .iter()
                .filter(|r| r.consumption.is_malformed())
                .map(|r| format!("rooms[{}]", r.id)),
        );
        fields
    }
}

/// Per-room allocation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatedRoom {
    /// Identifier copied from the input reading.
    pub id: String,
    /// Display label copied from the input reading.
    pub name: String,
    /// Normalized submeter consumption (kWh).
    pub original_kwh: f64,
    /// Fraction of total submeter consumption, in `[0, 1]` for non-negative inputs.
    pub share: f64,
    /// Portion of the missing consumption assigned to this room (kWh).
    pub compensation_kwh: f64,
    /// `original_kwh + compensation_kwh`.
    pub final_kwh: f64,
    /// `final_kwh * rate_per_kwh`.
    pub bill_amount: f64,
}

/// Fully itemized bill for one period.
///
/// Created once by the engine and never mutated afterwards, apart from
/// attaching property metadata through [`BillRecord::with_property`] or
/// [`BillRecord::with_property_name`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillRecord {
    /// Unique identifier assigned at creation.
    pub id: Uuid,
    /// Period the bill covers.
    pub period: BillingPeriod,
    /// Normalized price per kWh.
    pub rate_per_kwh: f64,
    /// Normalized main meter reading (kWh).
    pub main_meter_kwh: f64,
    /// Sum of normalized room consumptions (kWh).
    pub total_submeter_kwh: f64,
    /// `max(0, main_meter_kwh - total_submeter_kwh)`.
    pub missing_kwh: f64,
    /// Per-room results in input order.
    pub rooms: Vec<CalculatedRoom>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Rental property this bill was calculated for, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_id: Option<String>,
    /// Display name of that property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_name: Option<String>,
}

impl BillRecord {
    /// Sum of all room bill amounts.
    pub fn total_amount(&self) -> f64 {
        self.rooms.iter().map(|r| r.bill_amount).sum()
    }

    /// Sum of all rooms' final billed consumption (kWh).
    pub fn billed_kwh(&self) -> f64 {
        self.rooms.iter().map(|r| r.final_kwh).sum()
    }

    /// Amount by which the submeters exceed the main meter (kWh).
    ///
    /// This excess is not redistributed; it is exposed so callers can
    /// flag a likely meter fault.
    pub fn submeter_excess(&self) -> f64 {
        (self.total_submeter_kwh - self.main_meter_kwh).max(0.0)
    }

    /// Tags the record with the rental property it was computed for.
    #[must_use]
    pub fn with_property(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.property_id = Some(id.into());
        self.property_name = Some(name.into());
        self
    }

    /// Tags the record with a property name only, for bills computed
    /// outside a stored property.
    #[must_use]
    pub fn with_property_name(mut self, name: impl Into<String>) -> Self {
        self.property_name = Some(name.into());
        self
    }
}
