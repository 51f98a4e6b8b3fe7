//! Visit Tracker Core Library
//!
//! Local-first patient visit records with search and per-visit PDF export.
//!
//! # Architecture
//!
//! ```text
//!                      UI (form submit / delete / search)
//!                                     │
//!                     ┌───────────────▼───────────────┐
//!                     │        Record Service         │
//!                     │  natural-key patient lookup   │
//!                     │  cascade: no patient w/o visit│
//!                     └───────────────┬───────────────┘
//!                                     │ whole-collection read/write
//!                     ┌───────────────▼───────────────┐
//!                     │       Persistence Store       │
//!                     │  "patients" / "visits" JSON   │
//!                     └───────────────┬───────────────┘
//!                                     │
//!                          Key-value store (SQLite)
//!
//!    Views: filter / group / suggest           Export: report → PDF
//! ```
//!
//! # Core Principle
//!
//! **Patients only exist through their visits.** A patient is created with its
//! first visit and removed with its last one.
//!
//! # Modules
//!
//! - [`db`]: SQLite-backed flat key-value store
//! - [`models`]: Domain types (Patient, Visit, VisitForm)
//! - [`persistence`]: Whole-collection JSON persistence under fixed keys
//! - [`service`]: Record service owning all patient/visit invariants
//! - [`views`]: Search, grouping and autocomplete over service output
//! - [`export`]: Per-visit report and PDF rendering
//! - [`config`]: Runtime configuration

pub mod config;
pub mod db;
pub mod export;
pub mod models;
pub mod persistence;
pub mod service;
pub mod views;

// Re-export commonly used types
pub use config::TrackerConfig;
pub use db::{Database, KeyValueStore, MemoryStore};
pub use export::{ExportedDocument, VisitReport};
pub use models::{ClinicalReadings, Patient, Visit, VisitForm, VisitSubmission};
pub use persistence::PersistenceStore;
pub use service::RecordService;

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum VisitTrackerError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("Config error: {0}")]
    ConfigError(String),
}

impl From<db::DbError> for VisitTrackerError {
    fn from(e: db::DbError) -> Self {
        VisitTrackerError::DatabaseError(e.to_string())
    }
}

impl From<service::ServiceError> for VisitTrackerError {
    fn from(e: service::ServiceError) -> Self {
        VisitTrackerError::DatabaseError(e.to_string())
    }
}

impl From<models::FormError> for VisitTrackerError {
    fn from(e: models::FormError) -> Self {
        VisitTrackerError::InvalidInput(e.to_string())
    }
}

impl From<export::ExportError> for VisitTrackerError {
    fn from(e: export::ExportError) -> Self {
        VisitTrackerError::ExportError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for VisitTrackerError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        VisitTrackerError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Install the global `tracing` subscriber.
///
/// An explicit filter wins over `RUST_LOG`. Calling this more than once is
/// harmless.
#[uniffi::export]
pub fn init_logging(filter: Option<String>) {
    let filter = match filter {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER)),
    };
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Open or create a tracker database at the given path.
#[uniffi::export]
pub fn open_tracker(path: String) -> Result<Arc<VisitTrackerCore>, VisitTrackerError> {
    let db = Database::open(&path)?;
    Ok(VisitTrackerCore::wrap(RecordService::new(db), None))
}

/// Create an in-memory tracker (for testing).
#[uniffi::export]
pub fn open_tracker_in_memory() -> Result<Arc<VisitTrackerCore>, VisitTrackerError> {
    let db = Database::open_in_memory()?;
    Ok(VisitTrackerCore::wrap(RecordService::new(db), None))
}

/// Open a tracker described by a JSON config file, installing logging too.
#[uniffi::export]
pub fn open_tracker_with_config(
    config_path: String,
) -> Result<Arc<VisitTrackerCore>, VisitTrackerError> {
    let config = TrackerConfig::from_json_file(&config_path)
        .map_err(|e| VisitTrackerError::ConfigError(format!("{:#}", e)))?;
    init_logging(Some(config.log_filter().to_string()));

    let service = config
        .open_service()
        .map_err(|e| VisitTrackerError::DatabaseError(format!("{:#}", e)))?;
    Ok(VisitTrackerCore::wrap(service, config.export_dir.clone()))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe record service wrapper for FFI.
#[derive(uniffi::Object)]
pub struct VisitTrackerCore {
    service: Arc<Mutex<RecordService<Database>>>,
    export_dir: Option<PathBuf>,
}

impl VisitTrackerCore {
    fn render_visit(&self, visit_id: &str) -> Result<Option<ExportedDocument>, VisitTrackerError> {
        let service = self.service.lock()?;
        let Some(visit) = service.get_visit(visit_id) else {
            tracing::warn!(visit_id, "visit not found for export");
            return Ok(None);
        };
        let Some(patient) = service.get_patient(&visit.patient_id) else {
            tracing::warn!(visit_id, "cannot export visit without a patient");
            return Ok(None);
        };

        Ok(Some(export::export_visit(&patient, &visit)?))
    }

    fn wrap(service: RecordService<Database>, export_dir: Option<PathBuf>) -> Arc<Self> {
        Arc::new(Self {
            service: Arc::new(Mutex::new(service)),
            export_dir,
        })
    }
}

#[uniffi::export]
impl VisitTrackerCore {
    // =========================================================================
    // Queries
    // =========================================================================

    /// All patients, ordered by name.
    pub fn list_patients(&self) -> Result<Vec<FfiPatient>, VisitTrackerError> {
        let service = self.service.lock()?;
        Ok(service.list_patients().into_iter().map(Into::into).collect())
    }

    /// All visits, most recent first.
    pub fn list_visits(&self) -> Result<Vec<FfiVisit>, VisitTrackerError> {
        let service = self.service.lock()?;
        Ok(service.list_visits().into_iter().map(Into::into).collect())
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, patient_id: String) -> Result<Option<FfiPatient>, VisitTrackerError> {
        let service = self.service.lock()?;
        Ok(service.get_patient(&patient_id).map(Into::into))
    }

    /// A patient's visits, most recent first.
    pub fn get_visits_for_patient(
        &self,
        patient_id: String,
    ) -> Result<Vec<FfiVisit>, VisitTrackerError> {
        let service = self.service.lock()?;
        Ok(service
            .get_visits_for_patient(&patient_id)
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Patients whose name or contact contains the query.
    pub fn search_patients(&self, query: String) -> Result<Vec<FfiPatient>, VisitTrackerError> {
        let service = self.service.lock()?;
        let patients = service.list_patients();
        Ok(views::filter_patients(&query, &patients)
            .into_iter()
            .cloned()
            .map(Into::into)
            .collect())
    }

    /// The filtered, grouped patient list as the UI renders it.
    pub fn patient_list(&self, query: String) -> Result<FfiPatientList, VisitTrackerError> {
        let service = self.service.lock()?;
        let patients = service.list_patients();
        let visits = service.list_visits();

        let shown = views::filter_patients(&query, &patients);
        let status = views::list_status(&query, shown.len());
        let rows = views::patient_rows(&shown, &visits)
            .into_iter()
            .map(|row| FfiPatientRow {
                visit_count_label: row.visit_count_label(),
                patient: row.patient.clone().into(),
                visits: row.visits.into_iter().cloned().map(Into::into).collect(),
            })
            .collect();

        Ok(FfiPatientList {
            rows,
            empty_message: status.message(),
            empty_hint: status.hint().map(str::to_string),
        })
    }

    /// Autocomplete candidates for a partially typed patient name.
    pub fn suggest_patients(&self, text: String) -> Result<Vec<FfiPatient>, VisitTrackerError> {
        let service = self.service.lock()?;
        let patients = service.list_patients();
        Ok(views::ranked_name_suggestions(&text, &patients)
            .into_iter()
            .cloned()
            .map(Into::into)
            .collect())
    }

    /// Form data for editing an existing visit.
    pub fn visit_form(&self, visit_id: String) -> Result<Option<FfiVisitForm>, VisitTrackerError> {
        let service = self.service.lock()?;
        Ok(service
            .get_visit(&visit_id)
            .map(|visit| service.visit_form_from_visit(&visit).into()))
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Submit the visit form: creates a visit, or edits one when
    /// `editing_visit_id` is set. Returns `None` if the edited visit is gone.
    pub fn save_visit(
        &self,
        editing_visit_id: Option<String>,
        form: FfiVisitForm,
    ) -> Result<Option<FfiVisit>, VisitTrackerError> {
        let submission = VisitForm::from(form).validate()?;
        let mut service = self.service.lock()?;
        let saved = service.save_visit(editing_visit_id.as_deref(), &submission)?;
        Ok(saved.map(Into::into))
    }

    /// Delete a visit (and its patient, if it was the last one).
    pub fn delete_visit(&self, visit_id: String) -> Result<bool, VisitTrackerError> {
        let mut service = self.service.lock()?;
        Ok(service.delete_visit(&visit_id)?)
    }

    // =========================================================================
    // Export Operations
    // =========================================================================

    /// Render a visit to PDF. Returns `None` if the visit or its patient is
    /// missing.
    pub fn export_visit_pdf(
        &self,
        visit_id: String,
    ) -> Result<Option<FfiExportedDocument>, VisitTrackerError> {
        Ok(self.render_visit(&visit_id)?.map(Into::into))
    }

    /// Render a visit to PDF and write it into the configured export
    /// directory. Returns the written path.
    pub fn save_visit_pdf(&self, visit_id: String) -> Result<Option<String>, VisitTrackerError> {
        let Some(dir) = &self.export_dir else {
            return Err(VisitTrackerError::ConfigError(
                "no export directory configured".into(),
            ));
        };
        let Some(document) = self.render_visit(&visit_id)? else {
            return Ok(None);
        };

        let path = document.save_in(dir)?;
        Ok(Some(path.display().to_string()))
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: String,
    pub name: String,
    pub contact: String,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name,
            contact: patient.contact,
        }
    }
}

/// FFI-safe visit.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiVisit {
    pub id: String,
    pub patient_id: String,
    pub bp: Option<String>,
    pub sugar_before_food: Option<f64>,
    pub sugar_after_food: Option<f64>,
    pub prescription: String,
    /// RFC 3339 timestamp
    pub visit_date: String,
}

impl From<Visit> for FfiVisit {
    fn from(visit: Visit) -> Self {
        Self {
            id: visit.id,
            patient_id: visit.patient_id,
            bp: visit.bp,
            sugar_before_food: visit.sugar_before_food,
            sugar_after_food: visit.sugar_after_food,
            prescription: visit.prescription,
            visit_date: visit.visit_date.to_rfc3339(),
        }
    }
}

/// FFI-safe visit form.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiVisitForm {
    pub patient_name: String,
    pub patient_contact: String,
    pub bp: String,
    pub sugar_before_food: String,
    pub sugar_after_food: String,
    pub prescription: String,
}

impl From<VisitForm> for FfiVisitForm {
    fn from(form: VisitForm) -> Self {
        Self {
            patient_name: form.patient_name,
            patient_contact: form.patient_contact,
            bp: form.bp,
            sugar_before_food: form.sugar_before_food,
            sugar_after_food: form.sugar_after_food,
            prescription: form.prescription,
        }
    }
}

impl From<FfiVisitForm> for VisitForm {
    fn from(form: FfiVisitForm) -> Self {
        VisitForm {
            patient_name: form.patient_name,
            patient_contact: form.patient_contact,
            bp: form.bp,
            sugar_before_food: form.sugar_before_food,
            sugar_after_food: form.sugar_after_food,
            prescription: form.prescription,
        }
    }
}

/// FFI-safe patient row with its grouped visits.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientRow {
    pub patient: FfiPatient,
    pub visits: Vec<FfiVisit>,
    pub visit_count_label: String,
}

/// FFI-safe patient list, with empty-state text when there are no rows.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientList {
    pub rows: Vec<FfiPatientRow>,
    pub empty_message: Option<String>,
    pub empty_hint: Option<String>,
}

/// FFI-safe exported document.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiExportedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl From<ExportedDocument> for FfiExportedDocument {
    fn from(document: ExportedDocument) -> Self {
        Self {
            filename: document.filename,
            bytes: document.bytes,
        }
    }
}
