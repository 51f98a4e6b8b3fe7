//! Domain models for the visit tracker.

mod form;
mod patient;
mod visit;

pub use form::*;
pub use patient::*;
pub use visit::*;
