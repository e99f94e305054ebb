mod report;
mod validator;

pub use report::{MissingReference, OrphanedScene, ReportSummary, ValidationReport};
pub use validator::{validate_store, ValidationError, ATTRIBUTION_LIMIT};
