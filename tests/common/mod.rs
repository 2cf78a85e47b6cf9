//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use uuid::Uuid;
use voltshare::billing::engine::{FixedStamper, RecordStamp};
use voltshare::billing::types::{AllocationInput, BillingPeriod, RoomReading};

/// Absolute tolerance for floating-point sums.
pub const TOLERANCE: f64 = 1e-6;

/// Stamper that always yields the nil id at the Unix epoch.
pub fn fixed_stamper() -> FixedStamper {
    FixedStamper(RecordStamp {
        id: Uuid::nil(),
        created_at: DateTime::<Utc>::UNIX_EPOCH,
    })
}

/// Rooms named "Room 1".."Room N" with ids "1".."N".
pub fn rooms(kwh: &[f64]) -> Vec<RoomReading> {
    kwh.iter()
        .enumerate()
        .map(|(i, &k)| RoomReading::new((i + 1).to_string(), format!("Room {}", i + 1), k))
        .collect()
}

/// January 2024 request with numeric readings.
pub fn input(main_meter_kwh: f64, rate_per_kwh: f64, kwh: &[f64]) -> AllocationInput {
    AllocationInput {
        main_meter_kwh: main_meter_kwh.into(),
        rate_per_kwh: rate_per_kwh.into(),
        rooms: rooms(kwh),
        period: BillingPeriod::new("January", 2024),
    }
}

/// Relative-or-absolute closeness for values that scale with the inputs.
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= TOLERANCE * a.abs().max(b.abs()).max(1.0)
}
