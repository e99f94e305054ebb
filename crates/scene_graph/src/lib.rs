use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tracing::error;

pub mod scenes;
pub mod validation;

pub use scenes::{
    collect_referenced, extract_references, load_scene_store, references_scene, referrers_of,
    DocumentSummary, Effect, ExitTarget, LoadIssue, LoadIssueCode, Scene, SceneId,
    SceneLoadError, SceneStore, SourceLocation, StructuredExit,
};
pub use validation::{
    validate_store, MissingReference, OrphanedScene, ReportSummary, ValidationError,
    ValidationReport, ATTRIBUTION_LIMIT,
};

pub const DEFAULT_DATA_DIR: &str = "src/data";
pub const DEFAULT_ENTRY_SCENE: &str = "start_alley";
pub const DEFAULT_RESERVED_KEYWORDS: &[&str] = &["RETURN"];

pub const REPORT_HEADER: &str = "Scene Validator - Checking all scene connections";
pub const PASSED_MESSAGE: &str = "Validation PASSED: All scene connections are valid";
pub const FAILED_MESSAGE: &str = "Validation FAILED: Found issues that need to be fixed";
const NO_SCENES_ERROR: &str = "No scenes found";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorConfig {
    pub data_dir: PathBuf,
    /// Exit targets that denote control actions rather than scenes.
    pub reserved_keywords: BTreeSet<String>,
    /// The start scene; exempt from orphan reporting.
    pub entry_scene: String,
    pub format: OutputFormat,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            reserved_keywords: DEFAULT_RESERVED_KEYWORDS
                .iter()
                .map(ToString::to_string)
                .collect(),
            entry_scene: DEFAULT_ENTRY_SCENE.to_string(),
            format: OutputFormat::Text,
        }
    }
}

/// Result of a completed run. `defect_count` drives the exit status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub defect_count: usize,
    pub errors: Vec<String>,
}

impl ValidationOutcome {
    pub fn passed(&self) -> bool {
        self.defect_count == 0
    }
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Load(#[from] SceneLoadError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("failed to write report: {0}")]
    Write(#[from] std::io::Error),
    #[error("failed to encode report as JSON: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct JsonOutcome<'a> {
    passed: bool,
    #[serde(flatten)]
    outcome: &'a ValidationOutcome,
    report: Option<&'a ValidationReport>,
}

/// Loads the scene store described by `config`, validates it, and writes the
/// report to `out`.
///
/// An empty store is reported as a single defect rather than an error. A
/// missing data directory or a scene without a measurable description aborts
/// the run.
pub fn run(config: &ValidatorConfig, out: &mut dyn Write) -> Result<ValidationOutcome, RunError> {
    if config.format == OutputFormat::Text {
        writeln!(out, "{REPORT_HEADER}")?;
        writeln!(out, "{}", "=".repeat(50))?;
    }

    let store = load_scene_store(&config.data_dir)?;
    let report = match validate_store(&store, &config.reserved_keywords, &config.entry_scene) {
        Ok(report) => report,
        Err(ValidationError::EmptyStore) => {
            error!(data_dir = %config.data_dir.display(), "no_scenes_found");
            let outcome = ValidationOutcome {
                defect_count: 1,
                errors: vec![NO_SCENES_ERROR.to_string()],
            };
            write_outcome(config.format, &outcome, None, out)?;
            return Ok(outcome);
        }
        Err(other) => return Err(other.into()),
    };

    let outcome = ValidationOutcome {
        defect_count: report.defect_count(),
        errors: report.errors(),
    };
    write_outcome(config.format, &outcome, Some(&report), out)?;
    Ok(outcome)
}

fn write_outcome(
    format: OutputFormat,
    outcome: &ValidationOutcome,
    report: Option<&ValidationReport>,
    out: &mut dyn Write,
) -> Result<(), RunError> {
    match format {
        OutputFormat::Text => {
            match report {
                Some(report) => writeln!(out, "{}", report.render_human_readable())?,
                None => writeln!(out, "ERROR: No scenes found in data directory")?,
            }
            let verdict = if outcome.passed() {
                PASSED_MESSAGE
            } else {
                FAILED_MESSAGE
            };
            writeln!(out, "\n{verdict}")?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonOutcome {
                passed: outcome.passed(),
                outcome,
                report,
            })?;
            writeln!(out, "{json}")?;
        }
    }
    Ok(())
}
