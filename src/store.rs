//! Storage gateway for saved bills and rental property templates.
//!
//! [`BillStore`] is the seam the binary and API talk to. [`MemoryStore`]
//! keeps everything in process, which is all the CLI and tests need.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;
use uuid::Uuid;

use crate::billing::types::BillRecord;
use crate::property::{RentalProperty, RoomTemplate};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("bill {0} not found")]
    BillNotFound(Uuid),

    #[error("property {0} not found")]
    PropertyNotFound(String),

    #[error("store lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Persistence contract for bills and property templates.
///
/// Listings are scoped to an owner and ordered newest first.
pub trait BillStore: Send + Sync {
    /// Saves a bill under `owner_id` and returns its identifier.
    fn save_bill(&self, record: BillRecord, owner_id: &str) -> Result<Uuid>;

    /// All bills saved by `owner_id`, newest first.
    fn bills(&self, owner_id: &str) -> Result<Vec<BillRecord>>;

    /// Deletes a bill by identifier.
    fn delete_bill(&self, id: Uuid) -> Result<()>;

    /// Saves a property template and returns its identifier.
    fn save_property(&self, property: RentalProperty) -> Result<String>;

    /// All properties owned by `owner_id`, newest first.
    fn properties(&self, owner_id: &str) -> Result<Vec<RentalProperty>>;

    /// Replaces the room list of an existing property.
    fn update_property_rooms(&self, id: &str, rooms: Vec<RoomTemplate>) -> Result<()>;

    /// Deletes a property template by identifier.
    fn delete_property(&self, id: &str) -> Result<()>;
}

#[derive(Debug)]
struct Saved<T> {
    seq: u64,
    owner_id: String,
    item: T,
}

#[derive(Debug, Default)]
struct Inner {
    next_seq: u64,
    bills: HashMap<Uuid, Saved<BillRecord>>,
    properties: HashMap<String, Saved<RentalProperty>>,
}

impl Inner {
    fn seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}

/// Thread-safe in-memory [`BillStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>> {
        self.inner.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>> {
        self.inner.write().map_err(|_| StoreError::Poisoned)
    }
}

impl BillStore for MemoryStore {
    fn save_bill(&self, record: BillRecord, owner_id: &str) -> Result<Uuid> {
        let mut inner = self.write()?;
        let seq = inner.seq();
        let id = record.id;
        inner.bills.insert(
            id,
            Saved {
                seq,
                owner_id: owner_id.to_string(),
                item: record,
            },
        );
        Ok(id)
    }

    fn bills(&self, owner_id: &str) -> Result<Vec<BillRecord>> {
        let inner = self.read()?;
        let mut owned: Vec<&Saved<BillRecord>> = inner
            .bills
            .values()
            .filter(|s| s.owner_id == owner_id)
            .collect();
        owned.sort_by(|a, b| {
            b.item
                .created_at
                .cmp(&a.item.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        Ok(owned.into_iter().map(|s| s.item.clone()).collect())
    }

    fn delete_bill(&self, id: Uuid) -> Result<()> {
        self.write()?
            .bills
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::BillNotFound(id))
    }

    fn save_property(&self, property: RentalProperty) -> Result<String> {
        let mut inner = self.write()?;
        let seq = inner.seq();
        let id = property.id.clone();
        inner.properties.insert(
            id.clone(),
            Saved {
                seq,
                owner_id: property.owner_id.clone(),
                item: property,
            },
        );
        Ok(id)
    }

    fn properties(&self, owner_id: &str) -> Result<Vec<RentalProperty>> {
        let inner = self.read()?;
        let mut owned: Vec<&Saved<RentalProperty>> = inner
            .properties
            .values()
            .filter(|s| s.owner_id == owner_id)
            .collect();
        owned.sort_by(|a, b| {
            b.item
                .created_at
                .cmp(&a.item.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        Ok(owned.into_iter().map(|s| s.item.clone()).collect())
    }

    fn update_property_rooms(&self, id: &str, rooms: Vec<RoomTemplate>) -> Result<()> {
        let mut inner = self.write()?;
        let saved = inner
            .properties
            .get_mut(id)
            .ok_or_else(|| StoreError::PropertyNotFound(id.to_string()))?;
        saved.item.rooms = rooms;
        Ok(())
    }

    fn delete_property(&self, id: &str) -> Result<()> {
        self.write()?
            .properties
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::PropertyNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::billing::engine::calculate_bill;
    use crate::billing::types::RoomReading;

    fn bill(label: &str) -> BillRecord {
        calculate_bill(100.0, 10.0, vec![RoomReading::new("1", "A", 80.0)], label, 2024)
    }

    #[test]
    fn bills_are_scoped_to_owner_and_newest_first() {
        let store = MemoryStore::new();
        let mut jan = bill("January");
        jan.created_at = Utc::now() - Duration::days(30);
        let feb = bill("February");

        store.save_bill(feb.clone(), "alice").expect("save");
        store.save_bill(jan.clone(), "alice").expect("save");
        store.save_bill(bill("March"), "bob").expect("save");

        let listed = store.bills("alice").expect("list");
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, feb.id);
        assert_eq!(listed[1].id, jan.id);
        assert_eq!(store.bills("carol").expect("list").len(), 0);
    }

    #[test]
    fn equal_timestamps_fall_back_to_save_order() {
        let store = MemoryStore::new();
        let first = bill("January");
        let mut second = bill("February");
        second.created_at = first.created_at;
        store.save_bill(first.clone(), "alice").expect("save");
        store.save_bill(second.clone(), "alice").expect("save");

        let listed = store.bills("alice").expect("list");
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[test]
    fn delete_bill_reports_missing() {
        let store = MemoryStore::new();
        let id = store.save_bill(bill("January"), "alice").expect("save");
        assert!(store.delete_bill(id).is_ok());
        assert!(matches!(store.delete_bill(id), Err(StoreError::BillNotFound(_))));
        assert!(store.bills("alice").expect("list").is_empty());
    }

    #[test]
    fn property_lifecycle() {
        let store = MemoryStore::new();
        let mut property = RentalProperty::new("Maple House", "alice");
        let id = store.save_property(property.clone()).expect("save");

        property.add_room();
        store
            .update_property_rooms(&id, property.rooms.clone())
            .expect("update");
        let listed = store.properties("alice").expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].rooms.len(), 2);

        assert!(matches!(
            store.update_property_rooms("nope", Vec::new()),
            Err(StoreError::PropertyNotFound(_))
        ));
        store.delete_property(&id).expect("delete");
        assert!(store.properties("alice").expect("list").is_empty());
    }
}
