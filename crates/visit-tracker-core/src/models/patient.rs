//! Patient models.

use serde::{Deserialize, Serialize};

/// A patient identity record.
///
/// Patients are never created directly: they come into existence with their
/// first visit and disappear with their last one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Unique ID, generated locally
    pub id: String,
    /// Patient name
    pub name: String,
    /// Phone number or other contact, part of the natural key
    pub contact: String,
}

impl Patient {
    /// Create a new patient with a fresh ID.
    pub fn new(name: String, contact: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            contact,
        }
    }

    /// Check whether this patient is the one identified by `(name, contact)`.
    ///
    /// Name comparison ignores case, contact must match exactly.
    pub fn matches_natural_key(&self, name: &str, contact: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase() && self.contact == contact
    }
}
