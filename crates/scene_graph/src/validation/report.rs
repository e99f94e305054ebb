use serde::Serialize;

use crate::scenes::{DocumentSummary, LoadIssue, SceneId};

/// A referenced scene id with no definition, attributed to (at most
/// `ATTRIBUTION_LIMIT`) of the scenes that reference it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingReference {
    pub scene_id: SceneId,
    pub referrers: Vec<String>,
    pub total_referrers: usize,
}

impl MissingReference {
    pub fn overflow(&self) -> usize {
        self.total_referrers.saturating_sub(self.referrers.len())
    }

    pub fn render_line(&self) -> String {
        let mut sources = self.referrers.join(", ");
        let overflow = self.overflow();
        if overflow > 0 {
            sources.push_str(&format!(" and {overflow} more"));
        }
        format!("- {}: Referenced from {}", self.scene_id, sources)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrphanedScene {
    pub scene_id: SceneId,
    pub document: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total_scenes: usize,
    pub referenced_scenes: usize,
    pub missing_scenes: usize,
    pub orphaned_scenes: usize,
    pub load_issues: usize,
    pub total_description_length: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub documents: Vec<DocumentSummary>,
    pub issues: Vec<LoadIssue>,
    pub missing: Vec<MissingReference>,
    pub orphaned: Vec<OrphanedScene>,
    pub summary: ReportSummary,
}

impl ValidationReport {
    /// Only missing references are defects; orphans and load issues are warnings.
    pub fn defect_count(&self) -> usize {
        self.missing.len()
    }

    pub fn passed(&self) -> bool {
        self.defect_count() == 0
    }

    pub fn errors(&self) -> Vec<String> {
        self.missing.iter().map(MissingReference::render_line).collect()
    }

    pub fn render_human_readable(&self) -> String {
        let mut lines = self
            .documents
            .iter()
            .map(|doc| format!("Loaded {} scenes from {}", doc.scene_count, doc.document))
            .collect::<Vec<_>>();

        if !self.missing.is_empty() {
            lines.push(String::new());
            lines.push("=== MISSING SCENES ===".to_string());
            lines.push("The following scenes are referenced but don't exist:".to_string());
            lines.extend(self.errors());
        }

        if !self.orphaned.is_empty() {
            lines.push(String::new());
            lines.push("=== ORPHANED SCENES ===".to_string());
            lines.push(
                "The following scenes exist but are not referenced from anywhere:".to_string(),
            );
            lines.extend(
                self.orphaned
                    .iter()
                    .map(|orphan| format!("- {} (in {})", orphan.scene_id, orphan.document)),
            );
        }

        let summary = self.summary;
        lines.push(String::new());
        lines.push("=== SUMMARY ===".to_string());
        lines.push(format!("Total scenes: {}", summary.total_scenes));
        lines.push(format!("Referenced scenes: {}", summary.referenced_scenes));
        lines.push(format!("Missing scenes: {}", summary.missing_scenes));
        lines.push(format!("Orphaned scenes: {}", summary.orphaned_scenes));
        lines.push(format!("Load issues: {}", summary.load_issues));
        lines.push(format!(
            "Total description length: {}",
            summary.total_description_length
        ));
        lines.join("\n")
    }
}
