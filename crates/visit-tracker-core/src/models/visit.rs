//! Visit models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single clinical encounter for a patient.
///
/// `id`, `patient_id` and `visit_date` are fixed at creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    /// Unique visit ID
    pub id: String,
    /// Owning patient ID
    pub patient_id: String,
    /// Blood pressure, free text (e.g. "120/80")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bp: Option<String>,
    /// Blood sugar before food
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar_before_food: Option<f64>,
    /// Blood sugar after food
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar_after_food: Option<f64>,
    /// Prescription text, may be empty
    #[serde(default)]
    pub prescription: String,
    /// When the visit was recorded
    pub visit_date: DateTime<Utc>,
}

/// Clinical fields of a visit, shared by creation and edits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClinicalReadings {
    pub bp: Option<String>,
    pub sugar_before_food: Option<f64>,
    pub sugar_after_food: Option<f64>,
    pub prescription: String,
}

impl Visit {
    /// Create a new visit for a patient, stamped with the current time.
    pub fn new(patient_id: String, readings: ClinicalReadings) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id,
            bp: readings.bp,
            sugar_before_food: readings.sugar_before_food,
            sugar_after_food: readings.sugar_after_food,
            prescription: readings.prescription,
            visit_date: Utc::now(),
        }
    }

    /// Overwrite the mutable clinical fields.
    pub fn apply_readings(&mut self, readings: ClinicalReadings) {
        self.bp = readings.bp;
        self.sugar_before_food = readings.sugar_before_food;
        self.sugar_after_food = readings.sugar_after_food;
        self.prescription = readings.prescription;
    }

    /// Check if a prescription was recorded.
    pub fn has_prescription(&self) -> bool {
        !self.prescription.is_empty()
    }
}

/// Sort visits most recent first.
///
/// Visits with the same timestamp keep the later-stored one first.
pub fn sort_most_recent_first(visits: &mut Vec<Visit>) {
    let mut indexed: Vec<(usize, Visit)> = visits.drain(..).enumerate().collect();
    indexed.sort_by(|(ia, a), (ib, b)| b.visit_date.cmp(&a.visit_date).then(ib.cmp(ia)));
    visits.extend(indexed.into_iter().map(|(_, visit)| visit));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn visit_at(id: &str, hour: u32) -> Visit {
        Visit {
            id: id.into(),
            patient_id: "p1".into(),
            bp: None,
            sugar_before_food: None,
            sugar_after_food: None,
            prescription: String::new(),
            visit_date: Utc.with_ymd_and_hms(2024, 1, 15, hour, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_new_visit() {
        let readings = ClinicalReadings {
            bp: Some("120/80".into()),
            sugar_before_food: Some(95.0),
            ..Default::default()
        };
        let visit = Visit::new("patient-123".into(), readings);

        assert_eq!(visit.patient_id, "patient-123");
        assert_eq!(visit.bp.as_deref(), Some("120/80"));
        assert_eq!(visit.sugar_before_food, Some(95.0));
        assert_eq!(visit.sugar_after_food, None);
        assert!(!visit.has_prescription());
        assert_eq!(visit.id.len(), 36);
    }

    #[test]
    fn test_apply_readings_keeps_identity() {
        let mut visit = visit_at("v1", 9);
        let before = visit.clone();

        visit.apply_readings(ClinicalReadings {
            bp: Some("130/85".into()),
            sugar_before_food: None,
            sugar_after_food: Some(140.5),
            prescription: "Metformin 500mg".into(),
        });

        assert_eq!(visit.id, before.id);
        assert_eq!(visit.patient_id, before.patient_id);
        assert_eq!(visit.visit_date, before.visit_date);
        assert_eq!(visit.sugar_after_food, Some(140.5));
        assert!(visit.has_prescription());
    }

    #[test]
    fn test_serialized_field_names() {
        let mut visit = visit_at("v1", 10);
        visit.sugar_before_food = Some(95.0);

        let json = serde_json::to_value(&visit).unwrap();
        assert_eq!(json["patientId"], "p1");
        assert_eq!(json["sugarBeforeFood"], 95.0);
        assert!(json.get("sugarAfterFood").is_none());
        assert!(json.get("bp").is_none());
        assert_eq!(json["visitDate"], "2024-01-15T10:00:00Z");
    }

    #[test]
    fn test_deserialize_minimal_record() {
        let json = r#"{"id":"v1","patientId":"p1","visitDate":"2024-01-15T10:00:00.000Z"}"#;
        let visit: Visit = serde_json::from_str(json).unwrap();

        assert_eq!(visit.bp, None);
        assert_eq!(visit.prescription, "");
        assert_eq!(visit.visit_date, Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_sort_most_recent_first() {
        let mut visits = vec![visit_at("a", 8), visit_at("b", 12), visit_at("c", 10)];
        sort_most_recent_first(&mut visits);

        let ids: Vec<_> = visits.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_sort_ties_later_stored_first() {
        let mut visits = vec![visit_at("first", 9), visit_at("second", 9)];
        sort_most_recent_first(&mut visits);

        assert_eq!(visits[0].id, "second");
        assert_eq!(visits[1].id, "first");
    }
}
