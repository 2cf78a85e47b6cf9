//! Allocation engine: spreads unmetered consumption across rooms by share.
//!
//! [`allocate`] is the deterministic core. The bill identifier and creation
//! timestamp come from a [`Stamper`] so that everything except the envelope
//! can be tested for exact equality.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::reading::Reading;
use super::types::{AllocationInput, BillRecord, BillingPeriod, CalculatedRoom, RoomReading};

/// Identifier and creation time attached to a finished bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordStamp {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Source of bill identifiers and timestamps.
pub trait Stamper {
    /// Produces the envelope for one new record.
    fn stamp(&self) -> RecordStamp;
}

/// Random v4 identifiers and the current wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemStamper;

impl Stamper for SystemStamper {
    fn stamp(&self) -> RecordStamp {
        RecordStamp {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }
}

/// Always returns the same stamp. Useful for reproducible output.
#[derive(Debug, Clone, Copy)]
pub struct FixedStamper(pub RecordStamp);

impl Stamper for FixedStamper {
    fn stamp(&self) -> RecordStamp {
        self.0
    }
}

/// Numeric result of an allocation, before it is stamped into a [`BillRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub period: BillingPeriod,
    pub rate_per_kwh: f64,
    pub main_meter_kwh: f64,
    pub total_submeter_kwh: f64,
    pub missing_kwh: f64,
    pub rooms: Vec<CalculatedRoom>,
}

impl Allocation {
    /// Wraps the allocation in a bill envelope.
    pub fn into_record(self, stamp: RecordStamp) -> BillRecord {
        BillRecord {
            id: stamp.id,
            period: self.period,
            rate_per_kwh: self.rate_per_kwh,
            main_meter_kwh: self.main_meter_kwh,
            total_submeter_kwh: self.total_submeter_kwh,
            missing_kwh: self.missing_kwh,
            rooms: self.rooms,
            created_at: stamp.created_at,
            property_id: None,
            property_name: None,
        }
    }
}

/// Distributes the gap between the main meter and the submeter total.
///
/// Every numeric field is normalized independently (unparseable text reads
/// as zero). The gap is floored at zero: submeters that over-report the main
/// meter get no negative compensation. Each room's share of the gap is its
/// share of total submeter consumption, or zero when that total is not
/// positive. Room order is preserved.
///
/// # Examples
///
/// ```
/// use voltshare::billing::engine::allocate;
/// use voltshare::billing::types::{AllocationInput, BillingPeriod, RoomReading};
///
/// let input = AllocationInput {
///     main_meter_kwh: 200.0_f64.into(),
///     rate_per_kwh: 12.0_f64.into(),
///     rooms: vec![
///         RoomReading::new("1", "Room 1", 90.0),
///         RoomReading::new("2", "Room 2", 100.0),
///     ],
///     period: BillingPeriod::new("January", 2024),
/// };
/// let a = allocate(&input);
/// assert_eq!(a.total_submeter_kwh, 190.0);
/// assert_eq!(a.missing_kwh, 10.0);
/// ```
pub fn allocate(input: &AllocationInput) -> Allocation {
    let main_meter_kwh = input.main_meter_kwh.value();
    let rate_per_kwh = input.rate_per_kwh.value();
    let readings: Vec<f64> = input.rooms.iter().map(|r| r.consumption.value()).collect();

    let total_submeter_kwh: f64 = readings.iter().sum();
    let missing_kwh = (main_meter_kwh - total_submeter_kwh).max(0.0);

    let rooms = input
        .rooms
        .iter()
        .zip(readings)
        .map(|(room, original_kwh)| {
            let share = if total_submeter_kwh > 0.0 {
                original_kwh / total_submeter_kwh
            } else {
                0.0
            };
            let compensation_kwh = share * missing_kwh;
            let final_kwh = original_kwh + compensation_kwh;
            CalculatedRoom {
                id: room.id.clone(),
                name: room.name.clone(),
                original_kwh,
                share,
                compensation_kwh,
                final_kwh,
                bill_amount: final_kwh * rate_per_kwh,
            }
        })
        .collect();

    Allocation {
        period: input.period.clone(),
        rate_per_kwh,
        main_meter_kwh,
        total_submeter_kwh,
        missing_kwh,
        rooms,
    }
}

/// Allocates and stamps a bill using the given identifier/clock source.
pub fn calculate_bill_with<S: Stamper>(input: &AllocationInput, stamper: &S) -> BillRecord {
    allocate(input).into_record(stamper.stamp())
}

/// Allocates and stamps a bill with a fresh v4 identifier and the current time.
///
/// Numeric arguments accept numbers or text; see [`Reading`].
///
/// # Examples
///
/// ```
/// use voltshare::billing::engine::calculate_bill;
/// use voltshare::billing::types::RoomReading;
///
/// let bill = calculate_bill("abc", "12", vec![RoomReading::new("1", "R1", "xyz")], "January", 2024);
/// assert_eq!(bill.main_meter_kwh, 0.0);
/// assert_eq!(bill.rate_per_kwh, 12.0);
/// assert_eq!(bill.rooms[0].share, 0.0);
/// ```
pub fn calculate_bill(
    main_meter_kwh: impl Into<Reading>,
    rate_per_kwh: impl Into<Reading>,
    rooms: Vec<RoomReading>,
    period_label: impl Into<String>,
    period_year: i32,
) -> BillRecord {
    let input = AllocationInput {
        main_meter_kwh: main_meter_kwh.into(),
        rate_per_kwh: rate_per_kwh.into(),
        rooms,
        period: BillingPeriod::new(period_label, period_year),
    };
    calculate_bill_with(&input, &SystemStamper)
}
