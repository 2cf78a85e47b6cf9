//! API request and error types.

use serde::{Deserialize, Serialize};

use crate::billing::reading::Reading;
use crate::billing::types::{AllocationInput, BillingPeriod, RoomReading};

/// Body of `POST /calculate`; also embedded in `POST /bills`.
///
/// Numeric fields accept JSON numbers, strings, or `null`.
#[derive(Debug, Clone, Deserialize)]
pub struct CalculateRequest {
    #[serde(default)]
    pub main_meter_kwh: Reading,
    #[serde(default)]
    pub rate_per_kwh: Reading,
    #[serde(default)]
    pub rooms: Vec<RoomReading>,
    pub month: String,
    pub year: i32,
    /// Property to tag the bill with.
    #[serde(default)]
    pub property_id: Option<String>,
    #[serde(default)]
    pub property_name: Option<String>,
}

impl CalculateRequest {
    pub fn to_allocation_input(&self) -> AllocationInput {
        AllocationInput {
            main_meter_kwh: self.main_meter_kwh.clone(),
            rate_per_kwh: self.rate_per_kwh.clone(),
            rooms: self.rooms.clone(),
            period: BillingPeriod::new(self.month.clone(), self.year),
        }
    }
}

/// Body of `POST /bills`.
#[derive(Debug, Deserialize)]
pub struct SaveBillRequest {
    /// Owner the bill is saved under.
    pub owner: String,
    #[serde(flatten)]
    pub bill: CalculateRequest,
}

/// Body of `POST /properties`.
#[derive(Debug, Deserialize)]
pub struct NewPropertyRequest {
    pub owner: String,
    pub name: String,
    /// Room names; defaults to a single "Room 1".
    #[serde(default)]
    pub rooms: Vec<String>,
}

/// `?owner=` query for listings.
#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub owner: Option<String>,
}

/// Error response body for 4xx/5xx errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
