//! Presentation and aggregation over record service output.
//!
//! Everything here is a pure function of the lists it is given; nothing
//! writes back to storage.

use strsim::jaro_winkler;

use crate::models::{Patient, Visit};

/// Patients whose name or contact contains `query`, ignoring case.
///
/// An empty query returns every patient in the original order.
pub fn filter_patients<'a>(query: &str, patients: &'a [Patient]) -> Vec<&'a Patient> {
    if query.is_empty() {
        return patients.iter().collect();
    }

    let needle = query.to_lowercase();
    patients
        .iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&needle) || p.contact.to_lowercase().contains(&needle)
        })
        .collect()
}

/// One patient's visits, most recent first.
///
/// Visits with the same timestamp keep the later one in `visits` first.
pub fn visits_for_patient<'a>(visits: &'a [Visit], patient_id: &str) -> Vec<&'a Visit> {
    let mut matching: Vec<(usize, &Visit)> = visits
        .iter()
        .enumerate()
        .filter(|(_, v)| v.patient_id == patient_id)
        .collect();
    matching.sort_by(|(ia, a), (ib, b)| b.visit_date.cmp(&a.visit_date).then(ib.cmp(ia)));
    matching.into_iter().map(|(_, v)| v).collect()
}

/// A patient with its grouped visits, ready for an expandable list.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientRow<'a> {
    pub patient: &'a Patient,
    pub visits: Vec<&'a Visit>,
}

impl PatientRow<'_> {
    /// Visit count badge, e.g. "1 visit" or "3 visits".
    pub fn visit_count_label(&self) -> String {
        visit_count_label(self.visits.len())
    }
}

/// Group visits under each of the given patients, keeping patient order.
pub fn patient_rows<'a>(patients: &[&'a Patient], visits: &'a [Visit]) -> Vec<PatientRow<'a>> {
    patients
        .iter()
        .map(|&patient| PatientRow {
            patient,
            visits: visits_for_patient(visits, &patient.id),
        })
        .collect()
}

/// Pluralized visit count.
pub fn visit_count_label(count: usize) -> String {
    if count == 1 {
        "1 visit".to_string()
    } else {
        format!("{} visits", count)
    }
}

/// What the patient list area should display.
#[derive(Debug, Clone, PartialEq)]
pub enum ListStatus {
    /// There are rows to show.
    Rows(usize),
    /// Nothing stored yet.
    NoRecords,
    /// Nothing matched the search query.
    NoMatches(String),
}

impl ListStatus {
    /// Headline message for the empty states.
    pub fn message(&self) -> Option<String> {
        match self {
            ListStatus::Rows(_) => None,
            ListStatus::NoRecords => Some("No patient records yet.".to_string()),
            ListStatus::NoMatches(query) => {
                Some(format!("No patients found matching \"{}\".", query))
            }
        }
    }

    /// Secondary hint for the empty states.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ListStatus::Rows(_) => None,
            ListStatus::NoRecords => Some("Click \"Add New Visit\" to get started."),
            ListStatus::NoMatches(_) => Some("Try a different search term or clear the search."),
        }
    }
}

/// Decide the list state from the query and the number of patients shown.
pub fn list_status(query: &str, shown: usize) -> ListStatus {
    match (shown, query.is_empty()) {
        (0, true) => ListStatus::NoRecords,
        (0, false) => ListStatus::NoMatches(query.to_string()),
        (n, _) => ListStatus::Rows(n),
    }
}

/// Autocomplete: patients whose name contains `text`, ignoring case.
///
/// Blank input suggests nothing.
pub fn name_suggestions<'a>(text: &str, patients: &'a [Patient]) -> Vec<&'a Patient> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let needle = text.to_lowercase();
    patients
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .collect()
}

/// Same set as [`name_suggestions`], closest names first.
pub fn ranked_name_suggestions<'a>(text: &str, patients: &'a [Patient]) -> Vec<&'a Patient> {
    let needle = text.to_lowercase();
    let mut scored: Vec<(f64, &Patient)> = name_suggestions(text, patients)
        .into_iter()
        .map(|p| (jaro_winkler(&needle, &p.name.to_lowercase()), p))
        .collect();

    // Stable sort keeps input order between equal scores
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.into_iter().map(|(_, p)| p).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn patient(id: &str, name: &str, contact: &str) -> Patient {
        Patient {
            id: id.into(),
            name: name.into(),
            contact: contact.into(),
        }
    }

    fn visit(id: &str, patient_id: &str, day: u32) -> Visit {
        Visit {
            id: id.into(),
            patient_id: patient_id.into(),
            bp: None,
            sugar_before_food: None,
            sugar_after_food: None,
            prescription: String::new(),
            visit_date: Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap(),
        }
    }

    fn sample_patients() -> Vec<Patient> {
        vec![
            patient("p1", "Alice Brown", "alice@example.com"),
            patient("p2", "Bob Stone", "555-0101"),
            patient("p3", "Carla Alvarez", "555-0202"),
        ]
    }

    #[test]
    fn test_filter_empty_query_returns_all() {
        let patients = sample_patients();
        let filtered = filter_patients("", &patients);

        let expected: Vec<&Patient> = patients.iter().collect();
        assert_eq!(filtered, expected);
    }

    #[test]
    fn test_filter_by_name_case_insensitive() {
        let patients = sample_patients();
        let filtered = filter_patients("ALICE", &patients);

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "p1");
    }

    #[test]
    fn test_filter_by_contact() {
        let patients = sample_patients();
        let ids: Vec<_> = filter_patients("555-0", &patients)
            .into_iter()
            .map(|p| p.id.as_str())
            .collect();

        assert_eq!(ids, vec!["p2", "p3"]);
    }

    #[test]
    fn test_filter_name_or_contact() {
        let patients = sample_patients();
        // "al" appears in "Alice", "Carla Alvarez" and "alice@example.com"
        assert_eq!(filter_patients("al", &patients).len(), 2);
        assert!(filter_patients("zzz", &patients).is_empty());
    }

    #[test]
    fn test_visits_for_patient_sorted() {
        let visits = vec![
            visit("v1", "p1", 1),
            visit("v2", "p2", 5),
            visit("v3", "p1", 9),
            visit("v4", "p1", 4),
        ];

        let ids: Vec<_> = visits_for_patient(&visits, "p1")
            .into_iter()
            .map(|v| v.id.as_str())
            .collect();
        assert_eq!(ids, vec!["v3", "v4", "v1"]);
        assert!(visits_for_patient(&visits, "p9").is_empty());
    }

    #[test]
    fn test_patient_rows() {
        let patients = sample_patients();
        let visits = vec![visit("v1", "p1", 1), visit("v2", "p1", 2), visit("v3", "p2", 3)];
        let shown = filter_patients("", &patients);

        let rows = patient_rows(&shown, &visits);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].visit_count_label(), "2 visits");
        assert_eq!(rows[0].visits[0].id, "v2");
        assert_eq!(rows[1].visit_count_label(), "1 visit");
        assert_eq!(rows[2].visit_count_label(), "0 visits");
    }

    #[test]
    fn test_list_status() {
        assert_eq!(list_status("", 0), ListStatus::NoRecords);
        assert_eq!(list_status("bob", 0), ListStatus::NoMatches("bob".into()));
        assert_eq!(list_status("bob", 2), ListStatus::Rows(2));

        assert_eq!(
            list_status("bob", 0).message().as_deref(),
            Some("No patients found matching \"bob\".")
        );
        assert_eq!(list_status("", 3).message(), None);
        assert!(list_status("", 0).hint().is_some());
    }

    #[test]
    fn test_name_suggestions() {
        let patients = sample_patients();

        let names: Vec<_> = name_suggestions("AL", &patients)
            .into_iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["Alice Brown", "Carla Alvarez"]);

        // Contact is not searched
        assert!(name_suggestions("555", &patients).is_empty());
        assert!(name_suggestions("   ", &patients).is_empty());
    }

    #[test]
    fn test_ranked_name_suggestions() {
        let patients = vec![
            patient("p1", "Marianne Holt", "1"),
            patient("p2", "Mari", "2"),
            patient("p3", "Omar Rios", "3"),
        ];

        let ranked = ranked_name_suggestions("mari", &patients);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].name, "Mari");
        assert_eq!(ranked[1].name, "Marianne Holt");
    }
}
