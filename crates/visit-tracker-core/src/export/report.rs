//! Display data for a single exported visit.

use serde::{Deserialize, Serialize};

use crate::models::{format_reading, Patient, Visit};

/// Placeholder for a missing reading.
pub const NOT_AVAILABLE: &str = "N/A";

/// Placeholder for an empty prescription.
pub const NO_PRESCRIPTION: &str = "No prescription provided.";

/// Document title.
pub const REPORT_TITLE: &str = "Patient Visit Record";

/// One row of the metrics table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricRow {
    pub metric: String,
    pub value: String,
}

/// Everything the rendered document shows, already formatted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisitReport {
    pub title: String,
    pub patient_name: String,
    pub patient_contact: String,
    /// Human-readable visit timestamp
    pub visit_date: String,
    pub metrics: Vec<MetricRow>,
    pub prescription: String,
    pub filename: String,
}

impl VisitReport {
    /// Build report data for a resolved patient and visit.
    pub fn new(patient: &Patient, visit: &Visit) -> Self {
        let metrics = vec![
            MetricRow {
                metric: "Blood Pressure".into(),
                value: visit
                    .bp
                    .clone()
                    .filter(|bp| !bp.is_empty())
                    .unwrap_or_else(|| NOT_AVAILABLE.into()),
            },
            MetricRow {
                metric: "Sugar (Before Food)".into(),
                value: reading_or_na(visit.sugar_before_food),
            },
            MetricRow {
                metric: "Sugar (After Food)".into(),
                value: reading_or_na(visit.sugar_after_food),
            },
        ];

        let prescription = if visit.has_prescription() {
            visit.prescription.clone()
        } else {
            NO_PRESCRIPTION.to_string()
        };

        Self {
            title: REPORT_TITLE.into(),
            patient_name: patient.name.clone(),
            patient_contact: patient.contact.clone(),
            visit_date: visit.visit_date.format("%b %-d, %Y, %-I:%M %p UTC").to_string(),
            metrics,
            prescription,
            filename: export_filename(patient, visit),
        }
    }
}

/// `Visit_<name>_<YYYY-MM-DD>.pdf`, each whitespace character in the name
/// replaced by an underscore.
pub fn export_filename(patient: &Patient, visit: &Visit) -> String {
    let name: String = patient
        .name
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    format!("Visit_{}_{}.pdf", name, visit.visit_date.format("%Y-%m-%d"))
}

fn reading_or_na(value: Option<f64>) -> String {
    match value {
        Some(_) => format_reading(value),
        None => NOT_AVAILABLE.to_string(),
    }
}
