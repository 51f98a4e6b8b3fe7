//! Per-visit document export.
//!
//! A [`VisitReport`] holds the display data for one visit; [`render_pdf`]
//! turns it into a downloadable document.

mod pdf;
mod report;

pub use pdf::*;
pub use report::*;

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::models::{Patient, Visit};

/// Export errors.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid file name: {0}")]
    InvalidFileName(String),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// A rendered document and the name it should be saved under.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl ExportedDocument {
    /// Write the document into `dir`, returning the full path.
    ///
    /// Path separators in the filename become `_`, so the file always lands
    /// directly inside `dir`.
    pub fn save_in<P: AsRef<Path>>(&self, dir: P) -> ExportResult<PathBuf> {
        let file_name = local_file_name(&self.filename)?;
        std::fs::create_dir_all(dir.as_ref())?;
        let path = dir.as_ref().join(file_name);
        std::fs::write(&path, &self.bytes)?;
        tracing::info!(path = %path.display(), "saved exported visit");
        Ok(path)
    }
}

/// Flatten `name` to a single normal path component.
fn local_file_name(name: &str) -> ExportResult<String> {
    let flat = name.replace(['/', '\\'], "_");
    let mut components = Path::new(&flat).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(flat),
        _ => Err(ExportError::InvalidFileName(name.to_string())),
    }
}

/// Build and render the export for one visit.
pub fn export_visit(patient: &Patient, visit: &Visit) -> ExportResult<ExportedDocument> {
    let report = VisitReport::new(patient, visit);
    let bytes = render_pdf(&report)?;
    Ok(ExportedDocument {
        filename: report.filename.clone(),
        bytes,
    })
}
