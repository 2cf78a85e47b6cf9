/// Spreadsheet (CSV) export of bill records.
pub mod export;
