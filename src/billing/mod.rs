/// Allocation of missing consumption and bill assembly.
pub mod engine;
/// Parse-or-zero normalization for loosely typed numeric input.
pub mod reading;
pub mod statement;
pub mod types;

pub use engine::{Allocation, RecordStamp, Stamper, SystemStamper, allocate, calculate_bill};
pub use reading::Reading;
pub use types::{AllocationInput, BillRecord, BillingPeriod, CalculatedRoom, RoomReading};
