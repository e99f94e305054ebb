use std::collections::BTreeSet;

use thiserror::Error;
use tracing::info;

use crate::scenes::{collect_referenced, referrers_of, SceneId, SceneStore};

use super::report::{MissingReference, OrphanedScene, ReportSummary, ValidationReport};

/// Referrers listed per missing scene before collapsing the rest into a count.
pub const ATTRIBUTION_LIMIT: usize = 3;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("no scenes found in data directory")]
    EmptyStore,
    #[error("scene '{scene_id}' (in {document}) has no measurable description")]
    MalformedScene { scene_id: SceneId, document: String },
}

/// Checks that every referenced scene exists and lists scenes nothing leads to.
///
/// `entry_scene` is never reported as orphaned.
pub fn validate_store(
    store: &SceneStore,
    reserved: &BTreeSet<String>,
    entry_scene: &str,
) -> Result<ValidationReport, ValidationError> {
    if store.is_empty() {
        return Err(ValidationError::EmptyStore);
    }

    let total_description_length = total_description_length(store)?;

    let valid = store.scenes().keys().cloned().collect::<BTreeSet<_>>();
    let referenced = collect_referenced(store, reserved);

    let missing = referenced
        .difference(&valid)
        .map(|scene_id| attribute_missing(store, scene_id, reserved))
        .collect::<Vec<_>>();

    let orphaned = valid
        .difference(&referenced)
        .filter(|scene_id| scene_id.as_str() != entry_scene)
        .map(|scene_id| OrphanedScene {
            scene_id: scene_id.clone(),
            document: document_label(store, scene_id),
        })
        .collect::<Vec<_>>();

    let summary = ReportSummary {
        total_scenes: store.len(),
        referenced_scenes: referenced.len(),
        missing_scenes: missing.len(),
        orphaned_scenes: orphaned.len(),
        load_issues: store.issues().len(),
        total_description_length,
    };
    info!(
        total_scenes = summary.total_scenes,
        referenced_scenes = summary.referenced_scenes,
        missing_scenes = summary.missing_scenes,
        orphaned_scenes = summary.orphaned_scenes,
        load_issues = summary.load_issues,
        "scene_validation_summary"
    );

    Ok(ValidationReport {
        documents: store.documents().to_vec(),
        issues: store.issues().to_vec(),
        missing,
        orphaned,
        summary,
    })
}

fn total_description_length(store: &SceneStore) -> Result<usize, ValidationError> {
    store
        .scenes()
        .iter()
        .map(|(scene_id, scene)| {
            scene
                .description_len()
                .ok_or_else(|| ValidationError::MalformedScene {
                    scene_id: scene_id.clone(),
                    document: document_label(store, scene_id),
                })
        })
        .sum()
}

fn attribute_missing(
    store: &SceneStore,
    scene_id: &str,
    reserved: &BTreeSet<String>,
) -> MissingReference {
    let referrers = referrers_of(store, scene_id, reserved);
    MissingReference {
        scene_id: scene_id.to_string(),
        total_referrers: referrers.len(),
        referrers: referrers
            .into_iter()
            .take(ATTRIBUTION_LIMIT)
            .map(|source| format!("{} (in {})", source, document_label(store, source)))
            .collect(),
    }
}

fn document_label(store: &SceneStore, scene_id: &str) -> String {
    store.document_of(scene_id).unwrap_or("<unknown>").to_string()
}
