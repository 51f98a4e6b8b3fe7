//! Whole-collection persistence over a key-value store.
//!
//! Each collection is one JSON array under a fixed key. Loads fail soft:
//! a missing, unreadable or corrupted value reads as an empty collection.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::db::{DbResult, KeyValueStore};
use crate::models::{Patient, Visit};

/// Key holding the serialized patient list.
pub const PATIENTS_KEY: &str = "patients";

/// Key holding the serialized visit list.
pub const VISITS_KEY: &str = "visits";

/// Collection-level access to the backing store.
pub struct PersistenceStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> PersistenceStore<S> {
    /// Wrap a key-value store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Load all patients, in storage order.
    pub fn load_patients(&self) -> Vec<Patient> {
        self.load_collection(PATIENTS_KEY)
    }

    /// Replace the stored patient list.
    pub fn save_patients(&mut self, patients: &[Patient]) -> DbResult<()> {
        self.save_collection(PATIENTS_KEY, patients)
    }

    /// Load all visits, in storage order.
    pub fn load_visits(&self) -> Vec<Visit> {
        self.load_collection(VISITS_KEY)
    }

    /// Replace the stored visit list.
    pub fn save_visits(&mut self, visits: &[Visit]) -> DbResult<()> {
        self.save_collection(VISITS_KEY, visits)
    }

    fn load_collection<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let raw = match self.store.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key, error = %e, "failed to read collection, treating as empty");
                return Vec::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(key, error = %e, "stored collection is unparsable, treating as empty");
            Vec::new()
        })
    }

    fn save_collection<T: Serialize>(&mut self, key: &str, items: &[T]) -> DbResult<()> {
        let json = serde_json::to_string(items)?;
        self.store.set_item(key, &json)
    }
}
