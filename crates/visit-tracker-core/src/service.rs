//! Record service: the only owner of the patient and visit collections.
//!
//! Invariants maintained here:
//! - every visit references an existing patient at creation time
//! - a patient with zero visits does not exist
//! - new visits resolve their patient by natural key (name ignoring case,
//!   contact exactly)
//!
//! Every mutation re-reads the full collection, applies the change and writes
//! the full collection back before returning.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::db::{DbError, KeyValueStore};
use crate::models::{sort_most_recent_first, Patient, Visit, VisitForm, VisitSubmission};
use crate::persistence::PersistenceStore;

/// Record service errors.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Query and mutation operations over patients and visits.
pub struct RecordService<S: KeyValueStore> {
    store: PersistenceStore<S>,
}

impl<S: KeyValueStore> RecordService<S> {
    /// Create a service over an opened store.
    pub fn new(store: S) -> Self {
        Self {
            store: PersistenceStore::new(store),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// All patients, ordered by name.
    pub fn list_patients(&self) -> Vec<Patient> {
        let mut patients = self.store.load_patients();
        patients.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        patients
    }

    /// All visits, most recent first.
    pub fn list_visits(&self) -> Vec<Visit> {
        let mut visits = self.store.load_visits();
        sort_most_recent_first(&mut visits);
        visits
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, patient_id: &str) -> Option<Patient> {
        self.store
            .load_patients()
            .into_iter()
            .find(|p| p.id == patient_id)
    }

    /// Get a visit by ID.
    pub fn get_visit(&self, visit_id: &str) -> Option<Visit> {
        self.store
            .load_visits()
            .into_iter()
            .find(|v| v.id == visit_id)
    }

    /// A patient's visits, most recent first.
    pub fn get_visits_for_patient(&self, patient_id: &str) -> Vec<Visit> {
        self.list_visits()
            .into_iter()
            .filter(|v| v.patient_id == patient_id)
            .collect()
    }

    /// Project a visit and its patient into the editable form shape.
    ///
    /// An unresolvable patient is replaced by placeholder text.
    pub fn visit_form_from_visit(&self, visit: &Visit) -> VisitForm {
        let patient = self.get_patient(&visit.patient_id);
        if patient.is_none() {
            warn!(
                visit_id = %visit.id,
                patient_id = %visit.patient_id,
                "visit references a missing patient"
            );
        }
        VisitForm::from_visit(visit, patient.as_ref())
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Find the patient identified by `(name, contact)`, creating it if absent.
    ///
    /// Callers must store a visit for the returned patient.
    fn find_or_create_patient(&mut self, name: &str, contact: &str) -> ServiceResult<Patient> {
        let mut patients = self.store.load_patients();

        if let Some(existing) = patients.iter().find(|p| p.matches_natural_key(name, contact)) {
            debug!(patient_id = %existing.id, "matched existing patient");
            return Ok(existing.clone());
        }

        let patient = Patient::new(name.to_string(), contact.to_string());
        patients.push(patient.clone());
        self.store.save_patients(&patients)?;

        info!(patient_id = %patient.id, "created patient");
        Ok(patient)
    }

    /// Record a new visit, creating its patient on first sight.
    pub fn create_visit(&mut self, submission: &VisitSubmission) -> ServiceResult<Visit> {
        let patient =
            self.find_or_create_patient(&submission.patient_name, &submission.patient_contact)?;

        let visit = Visit::new(patient.id, submission.readings.clone());

        let mut visits = self.store.load_visits();
        visits.push(visit.clone());
        self.store.save_visits(&visits)?;

        info!(visit_id = %visit.id, patient_id = %visit.patient_id, "created visit");
        Ok(visit)
    }

    /// Edit an existing visit.
    ///
    /// Clinical fields are overwritten; the visit's date and patient link are
    /// kept. A changed name or contact is written to the shared patient record,
    /// so every sibling visit sees it. Returns `false` when the visit does not
    /// exist.
    pub fn update_visit(&mut self, visit_id: &str, submission: &VisitSubmission) -> ServiceResult<bool> {
        let mut visits = self.store.load_visits();

        let Some(visit) = visits.iter_mut().find(|v| v.id == visit_id) else {
            warn!(visit_id, "visit not found for update");
            return Ok(false);
        };

        visit.apply_readings(submission.readings.clone());
        let patient_id = visit.patient_id.clone();
        self.store.save_visits(&visits)?;

        let mut patients = self.store.load_patients();
        let Some(index) = patients.iter().position(|p| p.id == patient_id) else {
            warn!(visit_id, patient_id = %patient_id, "visit references a missing patient");
            return Ok(true);
        };

        let patient = &mut patients[index];
        if patient.name != submission.patient_name || patient.contact != submission.patient_contact {
            patient.name = submission.patient_name.clone();
            patient.contact = submission.patient_contact.clone();
            self.store.save_patients(&patients)?;
            info!(patient_id = %patient_id, "updated patient identity");
        }

        Ok(true)
    }

    /// Create or update depending on whether a visit is being edited.
    ///
    /// Returns the stored visit, or `None` when the edited visit does not exist.
    pub fn save_visit(
        &mut self,
        editing_visit_id: Option<&str>,
        submission: &VisitSubmission,
    ) -> ServiceResult<Option<Visit>> {
        match editing_visit_id {
            None => self.create_visit(submission).map(Some),
            Some(visit_id) => {
                if self.update_visit(visit_id, submission)? {
                    Ok(self.get_visit(visit_id))
                } else {
                    Ok(None)
                }
            }
        }
    }

    /// Delete a visit and any patient left without visits.
    ///
    /// Returns `false` when the visit does not exist.
    pub fn delete_visit(&mut self, visit_id: &str) -> ServiceResult<bool> {
        let mut visits = self.store.load_visits();
        let before = visits.len();
        visits.retain(|v| v.id != visit_id);

        if visits.len() == before {
            warn!(visit_id, "visit not found for delete");
            return Ok(false);
        }

        self.store.save_visits(&visits)?;
        info!(visit_id, "deleted visit");

        self.remove_patients_without_visits(&visits)?;
        Ok(true)
    }

    /// Drop every patient with no visit in `visits`.
    fn remove_patients_without_visits(&mut self, visits: &[Visit]) -> ServiceResult<()> {
        let mut patients = self.store.load_patients();
        let before = patients.len();
        patients.retain(|p| visits.iter().any(|v| v.patient_id == p.id));

        if patients.len() != before {
            self.store.save_patients(&patients)?;
            info!(removed = before - patients.len(), "removed patients without visits");
        }
        Ok(())
    }
}
