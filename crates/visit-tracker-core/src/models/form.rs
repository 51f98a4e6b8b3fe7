//! Visit form input and its validated submission shape.
//!
//! Form fields are carried as text exactly as typed. [`VisitForm::validate`]
//! is the only way to obtain a [`VisitSubmission`], which is what the record
//! service accepts for writes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::patient::Patient;
use super::visit::{ClinicalReadings, Visit};

/// Placeholder name when a visit's patient cannot be resolved.
pub const UNKNOWN_PATIENT_NAME: &str = "Unknown Patient";

/// Placeholder contact when a visit's patient cannot be resolved.
pub const UNKNOWN_PATIENT_CONTACT: &str = "Unknown Contact";

/// Form validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("Patient Name and Contact are required.")]
    MissingIdentity,
}

pub type FormResult<T> = Result<T, FormError>;

/// Editable visit form, as entered by the user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VisitForm {
    pub patient_name: String,
    pub patient_contact: String,
    pub bp: String,
    pub sugar_before_food: String,
    pub sugar_after_food: String,
    pub prescription: String,
}

/// A validated form, ready for the record service.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitSubmission {
    pub patient_name: String,
    pub patient_contact: String,
    pub readings: ClinicalReadings,
}

impl VisitForm {
    /// Project a stored visit and its patient back into form text.
    pub fn from_visit(visit: &Visit, patient: Option<&Patient>) -> Self {
        let (patient_name, patient_contact) = match patient {
            Some(p) => (p.name.clone(), p.contact.clone()),
            None => (
                UNKNOWN_PATIENT_NAME.to_string(),
                UNKNOWN_PATIENT_CONTACT.to_string(),
            ),
        };

        Self {
            patient_name,
            patient_contact,
            bp: visit.bp.clone().unwrap_or_default(),
            sugar_before_food: format_reading(visit.sugar_before_food),
            sugar_after_food: format_reading(visit.sugar_after_food),
            prescription: visit.prescription.clone(),
        }
    }

    /// Copy a suggested patient's identity into the form.
    ///
    /// Nothing is persisted until the form is submitted.
    pub fn apply_suggestion(&mut self, patient: &Patient) {
        self.patient_name = patient.name.clone();
        self.patient_contact = patient.contact.clone();
    }

    /// Validate required fields and parse the numeric readings.
    ///
    /// Name and contact are passed through as typed; only blankness is checked.
    pub fn validate(&self) -> FormResult<VisitSubmission> {
        if self.patient_name.trim().is_empty() || self.patient_contact.trim().is_empty() {
            return Err(FormError::MissingIdentity);
        }

        Ok(VisitSubmission {
            patient_name: self.patient_name.clone(),
            patient_contact: self.patient_contact.clone(),
            readings: ClinicalReadings {
                bp: parse_bp(&self.bp),
                sugar_before_food: parse_reading(&self.sugar_before_food),
                sugar_after_food: parse_reading(&self.sugar_after_food),
                prescription: self.prescription.clone(),
            },
        })
    }
}

/// Parse a numeric reading from form text.
///
/// Blank, malformed, non-finite and negative input all mean "no value".
pub fn parse_reading(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Some(value),
        _ => {
            tracing::debug!(input = trimmed, "ignoring unusable numeric reading");
            None
        }
    }
}

/// Render a numeric reading back to form text.
pub fn format_reading(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn parse_bp(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
