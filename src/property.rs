//! Rental property templates.
//!
//! A property remembers its room names so a new calculation can start from
//! the same room list. Templates carry no readings and never affect the
//! allocation itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::billing::reading::Reading;
use crate::billing::types::RoomReading;

/// A named room slot in a property template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomTemplate {
    pub id: String,
    pub name: String,
}

impl RoomTemplate {
    /// Creates a room slot with a fresh identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
        }
    }
}

/// A landlord's property and its room layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalProperty {
    pub id: String,
    pub name: String,
    pub rooms: Vec<RoomTemplate>,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}

impl RentalProperty {
    /// Creates a property with a single default room, "Room 1".
    pub fn new(name: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            rooms: vec![RoomTemplate::new("Room 1")],
            owner_id: owner_id.into(),
            created_at: Utc::now(),
        }
    }

    /// Appends a room named after its position ("Room N") and returns its id.
    pub fn add_room(&mut self) -> String {
        let room = RoomTemplate::new(format!("Room {}", self.rooms.len() + 1));
        let id = room.id.clone();
        self.rooms.push(room);
        id
    }

    /// Renames a room. Returns `false` if no room has that id.
    pub fn rename_room(&mut self, room_id: &str, name: impl Into<String>) -> bool {
        match self.rooms.iter_mut().find(|r| r.id == room_id) {
            Some(room) => {
                room.name = name.into();
                true
            }
            None => false,
        }
    }

    /// Removes a room. Returns `false` if no room has that id.
    pub fn remove_room(&mut self, room_id: &str) -> bool {
        let before = self.rooms.len();
        self.rooms.retain(|r| r.id != room_id);
        self.rooms.len() != before
    }

    /// Zero-consumption readings for every room, in template order.
    pub fn blank_readings(&self) -> Vec<RoomReading> {
        self.rooms
            .iter()
            .map(|r| RoomReading::new(r.id.clone(), r.name.clone(), Reading::Number(0.0)))
            .collect()
    }
}
