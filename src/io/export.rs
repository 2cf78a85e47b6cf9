//! CSV spreadsheet export for bill records.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::billing::statement::MANUAL_ENTRY;
use crate::billing::types::BillRecord;

/// Column header for the per-room section of the spreadsheet.
const HEADER: &str = "room,actual_kwh,share_pct,loss_shared_kwh,final_kwh,rate_per_kwh,amount";

/// Conventional download name, e.g. `VoltShare_Statement_January_2024.csv`.
pub fn statement_file_name(record: &BillRecord, ext: &str) -> String {
    format!(
        "VoltShare_Statement_{}_{}.{ext}",
        record.period.label.replace(char::is_whitespace, "_"),
        record.period.year
    )
}

/// Exports a bill to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(record: &BillRecord, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(record, buf)
}

/// Writes a bill as CSV to any writer.
///
/// One row per room in bill order, followed by two-column summary rows
/// (property, period, meter totals, distributed loss, grand total).
/// Produces identical bytes for identical records.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(record: &BillRecord, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(writer);

    wtr.write_record(HEADER.split(','))?;

    for room in &record.rooms {
        wtr.write_record(&[
            room.name.clone(),
            format!("{:.4}", room.original_kwh),
            format!("{:.2}", room.share * 100.0),
            format!("{:.4}", room.compensation_kwh),
            format!("{:.4}", room.final_kwh),
            format!("{:.4}", record.rate_per_kwh),
            format!("{:.2}", room.bill_amount),
        ])?;
    }

    let summary = [
        (
            "property",
            record
                .property_name
                .clone()
                .unwrap_or_else(|| MANUAL_ENTRY.to_string()),
        ),
        ("billing_period", record.period.to_string()),
        ("main_meter_kwh", format!("{:.4}", record.main_meter_kwh)),
        ("total_submeter_kwh", format!("{:.4}", record.total_submeter_kwh)),
        ("missing_kwh_distributed", format!("{:.4}", record.missing_kwh)),
        ("grand_total", format!("{:.2}", record.total_amount())),
    ];
    for (key, value) in &summary {
        wtr.write_record([*key, value.as_str()])?;
    }

    wtr.flush()?;
    Ok(())
}
