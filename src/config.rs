//! TOML-based billing input and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::billing::reading::Reading;
use crate::billing::types::{AllocationInput, BillingPeriod, RoomReading};

/// Top-level billing input parsed from TOML.
///
/// ```toml
/// [bill]
/// main_meter_kwh = 200
/// rate_per_kwh = "12.00"
/// month = "January"
/// year = 2024
///
/// [[rooms]]
/// name = "Room 1"
/// kwh = 90
/// ```
///
/// Numeric fields accept numbers or strings; see [`Reading`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BillingInput {
    /// Meter totals, rate, and period.
    #[serde(default)]
    pub bill: BillSection,
    /// Room submeter readings, in statement order.
    #[serde(default)]
    pub rooms: Vec<RoomEntry>,
}

/// Meter totals, rate, and period.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BillSection {
    /// Main meter reading (kWh).
    pub main_meter_kwh: Reading,
    /// Price per kWh.
    pub rate_per_kwh: Reading,
    /// Period label, usually a month name.
    pub month: String,
    /// Calendar year (must be >= 1).
    pub year: i32,
    /// Optional property name printed on the statement.
    pub property_name: Option<String>,
}

impl Default for BillSection {
    fn default() -> Self {
        Self {
            main_meter_kwh: Reading::Number(0.0),
            rate_per_kwh: Reading::Number(12.0),
            month: "January".to_string(),
            year: 2024,
            property_name: None,
        }
    }
}

/// One room's submeter reading.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoomEntry {
    /// Optional stable identifier; sequential ids are assigned when absent.
    #[serde(default)]
    pub id: Option<String>,
    /// Display name (must be non-empty).
    pub name: String,
    /// Submeter consumption (kWh).
    #[serde(default)]
    pub kwh: Reading,
}

impl RoomEntry {
    pub fn new(name: impl Into<String>, kwh: impl Into<Reading>) -> Self {
        Self {
            id: None,
            name: name.into(),
            kwh: kwh.into(),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"bill.month"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl BillingInput {
    /// Two rooms, 200 kWh main meter, rate 12: 10 kWh of line loss to share.
    pub fn demo() -> Self {
        Self {
            bill: BillSection {
                main_meter_kwh: Reading::Number(200.0),
                ..BillSection::default()
            },
            rooms: vec![RoomEntry::new("Room 1", 90.0), RoomEntry::new("Room 2", 100.0)],
        }
    }

    /// Six-room boarding house with a large unmetered common area.
    pub fn dormitory() -> Self {
        Self {
            bill: BillSection {
                main_meter_kwh: Reading::Number(1240.0),
                rate_per_kwh: Reading::Number(11.75),
                month: "March".to_string(),
                year: 2025,
                property_name: Some("Dormitory".to_string()),
            },
            rooms: [132.0, 158.5, 97.0, 210.25, 144.0, 176.0]
                .iter()
                .enumerate()
                .map(|(i, &kwh)| RoomEntry::new(format!("Room {}", i + 1), kwh))
                .collect(),
        }
    }

    /// Submeters sum above the main meter; nothing is left to distribute.
    pub fn over_reported() -> Self {
        Self {
            bill: BillSection {
                main_meter_kwh: Reading::Number(150.0),
                ..BillSection::default()
            },
            rooms: vec![RoomEntry::new("Room 1", 90.0), RoomEntry::new("Room 2", 100.0)],
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["demo", "dormitory", "over_reported"];

    /// Loads billing input from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "demo" => Ok(Self::demo()),
            "dormitory" => Ok(Self::dormitory()),
            "over_reported" => Ok(Self::over_reported()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses billing input from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "input".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses billing input from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates descriptive fields and returns a list of errors.
    ///
    /// Readings are deliberately not checked: malformed numbers are read as
    /// zero by the engine.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.bill.month.trim().is_empty() {
            errors.push(ConfigError {
                field: "bill.month".into(),
                message: "must not be empty".into(),
            });
        }
        if self.bill.year < 1 {
            errors.push(ConfigError {
                field: "bill.year".into(),
                message: format!("must be >= 1, got {}", self.bill.year),
            });
        }
        for (i, room) in self.rooms.iter().enumerate() {
            if room.name.trim().is_empty() {
                errors.push(ConfigError {
                    field: format!("rooms[{i}].name"),
                    message: "must not be empty".into(),
                });
            }
        }

        let mut seen = std::collections::HashSet::new();
        for (i, id) in self.room_ids().iter().enumerate() {
            if !seen.insert(id.clone()) {
                errors.push(ConfigError {
                    field: format!("rooms[{i}].id"),
                    message: format!("duplicate room id \"{id}\""),
                });
            }
        }

        errors
    }

    /// Room identifiers: explicit ids, or the 1-based position when absent.
    fn room_ids(&self) -> Vec<String> {
        self.rooms
            .iter()
            .enumerate()
            .map(|(i, r)| r.id.clone().unwrap_or_else(|| (i + 1).to_string()))
            .collect()
    }

    /// Builds the engine request from this input.
    pub fn to_allocation_input(&self) -> AllocationInput {
        let rooms = self
            .rooms
            .iter()
            .zip(self.room_ids())
            .map(|(r, id)| RoomReading::new(id, r.name.clone(), r.kwh.clone()))
            .collect();
        AllocationInput {
            main_meter_kwh: self.bill.main_meter_kwh.clone(),
            rate_per_kwh: self.bill.rate_per_kwh.clone(),
            rooms,
            period: BillingPeriod::new(self.bill.month.clone(), self.bill.year),
        }
    }
}
