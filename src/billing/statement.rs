//! Human-readable billing statement.

use std::fmt;

use super::types::BillRecord;

/// Label used when a bill is not tied to a saved rental property.
pub const MANUAL_ENTRY: &str = "Manual Entry";

/// Plain-text statement view of a [`BillRecord`].
///
/// All rounding to two decimals happens here; the record itself keeps full
/// precision.
pub struct Statement<'a>(pub &'a BillRecord);

impl fmt::Display for Statement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bill = self.0;
        writeln!(f, "--- VoltShare Statement ---")?;
        writeln!(
            f,
            "Property:              {}",
            bill.property_name.as_deref().unwrap_or(MANUAL_ENTRY)
        )?;
        writeln!(f, "Billing period:        {}", bill.period)?;
        writeln!(f, "Main meter reading:    {:.2} kWh", bill.main_meter_kwh)?;
        writeln!(f, "Submeter total:        {:.2} kWh", bill.total_submeter_kwh)?;
        writeln!(f, "Discrepancy shared:    {:.2} kWh", bill.missing_kwh)?;
        writeln!(f, "Rate:                  {:.2} /kWh", bill.rate_per_kwh)?;
        writeln!(f)?;
        writeln!(
            f,
            "{:<20} {:>12} {:>9} {:>12} {:>12} {:>14}",
            "Room", "Actual kWh", "Share %", "Loss kWh", "Total kWh", "Amount"
        )?;
        for room in &bill.rooms {
            writeln!(
                f,
                "{:<20} {:>12.2} {:>8.2}% {:>12.2} {:>12.2} {:>14.2}",
                room.name,
                room.original_kwh,
                room.share * 100.0,
                room.compensation_kwh,
                room.final_kwh,
                room.bill_amount
            )?;
        }
        writeln!(f)?;
        write!(f, "Total property bill:   {:.2}", bill.total_amount())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::engine::calculate_bill;
    use crate::billing::types::RoomReading;

    fn sample() -> BillRecord {
        calculate_bill(
            200.0,
            12.0,
            vec![
                RoomReading::new("1", "Room 1", 90.0),
                RoomReading::new("2", "Room 2", 100.0),
            ],
            "January",
            2024,
        )
    }

    #[test]
    fn statement_lists_every_room_and_total() {
        let text = Statement(&sample()).to_string();
        assert!(text.contains("Manual Entry"));
        assert!(text.contains("January 2024"));
        assert!(text.contains("Room 1"));
        assert!(text.contains("1136.84"));
        assert!(text.contains("1263.16"));
        assert!(text.contains("47.37%"));
        assert!(text.ends_with("Total property bill:   2400.00"));
    }

    #[test]
    fn statement_uses_property_name() {
        let bill = sample().with_property("p1", "Maple House");
        let text = Statement(&bill).to_string();
        assert!(text.contains("Maple House"));
        assert!(!text.contains(MANUAL_ENTRY));
    }
}
