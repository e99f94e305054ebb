use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, warn};

use super::discovery::discover_scene_documents;
use super::types::{Scene, SceneId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoadIssueCode {
    ReadDir,
    ReadFile,
    JsonMalformed,
    DuplicateScene,
}

/// A problem confined to one document. The loader records it and moves on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadIssue {
    pub code: LoadIssueCode,
    pub message: String,
    pub document: String,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for LoadIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(
                f,
                "{:?}: {} (document={}, line={}, column={})",
                self.code, self.message, self.document, loc.line, loc.column
            ),
            None => write!(
                f,
                "{:?}: {} (document={})",
                self.code, self.message, self.document
            ),
        }
    }
}

#[derive(Debug, Error)]
pub enum SceneLoadError {
    #[error("data directory '{}' not found", path.display())]
    DataDirMissing { path: PathBuf },
    #[error("failed to read data directory {}: {source}", path.display())]
    ReadDataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    pub document: String,
    pub scene_count: usize,
}

/// Every scene from every loaded document, merged by id, plus the document each
/// id was last defined in.
#[derive(Debug, Clone, Default)]
pub struct SceneStore {
    scenes: BTreeMap<SceneId, Scene>,
    provenance: BTreeMap<SceneId, String>,
    documents: Vec<DocumentSummary>,
    issues: Vec<LoadIssue>,
}

impl SceneStore {
    /// Inserts or replaces a scene, returning the document that previously
    /// defined `scene_id`, if any.
    pub fn insert(&mut self, scene_id: SceneId, scene: Scene, document: &str) -> Option<String> {
        self.scenes.insert(scene_id.clone(), scene);
        self.provenance.insert(scene_id, document.to_string())
    }

    pub fn scenes(&self) -> &BTreeMap<SceneId, Scene> {
        &self.scenes
    }

    pub fn scene(&self, scene_id: &str) -> Option<&Scene> {
        self.scenes.get(scene_id)
    }

    pub fn contains(&self, scene_id: &str) -> bool {
        self.scenes.contains_key(scene_id)
    }

    pub fn document_of(&self, scene_id: &str) -> Option<&str> {
        self.provenance.get(scene_id).map(String::as_str)
    }

    pub fn documents(&self) -> &[DocumentSummary] {
        &self.documents
    }

    pub fn issues(&self) -> &[LoadIssue] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    fn record_issue(&mut self, issue: LoadIssue) {
        match issue.code {
            LoadIssueCode::DuplicateScene => warn!(
                document = %issue.document,
                message = %issue.message,
                "duplicate_scene_id"
            ),
            LoadIssueCode::JsonMalformed => error!(
                document = %issue.document,
                location = ?issue.location,
                message = %issue.message,
                "scene_document_parse_failed"
            ),
            LoadIssueCode::ReadFile | LoadIssueCode::ReadDir => error!(
                document = %issue.document,
                message = %issue.message,
                "scene_document_read_failed"
            ),
        }
        self.issues.push(issue);
    }
}

/// Loads and merges every scene document under `data_dir`.
///
/// Unreadable or malformed documents are skipped and recorded as issues. A
/// scene id defined by more than one document keeps the value from the document
/// that sorts last.
pub fn load_scene_store(data_dir: &Path) -> Result<SceneStore, SceneLoadError> {
    let discovery = discover_scene_documents(data_dir)?;
    let mut store = SceneStore::default();
    for issue in discovery.issues {
        store.record_issue(issue);
    }

    for document in discovery.documents {
        let raw = match fs::read_to_string(&document.path) {
            Ok(raw) => raw,
            Err(source) => {
                store.record_issue(LoadIssue {
                    code: LoadIssueCode::ReadFile,
                    message: format!("failed to read scene document: {source}"),
                    document: document.name,
                    location: None,
                });
                continue;
            }
        };
        let scenes = match parse_scene_document(&document.name, &raw) {
            Ok(scenes) => scenes,
            Err(issue) => {
                store.record_issue(issue);
                continue;
            }
        };

        let scene_count = scenes.len();
        for (scene_id, scene) in scenes {
            if let Some(previous) = store.insert(scene_id.clone(), scene, &document.name) {
                store.record_issue(LoadIssue {
                    code: LoadIssueCode::DuplicateScene,
                    message: format!(
                        "duplicate scene id '{}' found in {} (already defined in {})",
                        scene_id, document.name, previous
                    ),
                    document: document.name.clone(),
                    location: None,
                });
            }
        }
        debug!(document = %document.name, scene_count, "scene_document_loaded");
        store.documents.push(DocumentSummary {
            document: document.name,
            scene_count,
        });
    }

    Ok(store)
}

fn parse_scene_document(document: &str, raw: &str) -> Result<BTreeMap<SceneId, Scene>, LoadIssue> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let scenes =
        serde_path_to_error::deserialize::<_, BTreeMap<SceneId, Scene>>(&mut deserializer)
            .map_err(|error| {
                let path = error.path().to_string();
                let source = error.into_inner();
                let message = if path.is_empty() || path == "." {
                    format!("malformed scene JSON: {source}")
                } else {
                    format!("malformed scene JSON at {path}: {source}")
                };
                malformed(document, message, &source)
            })?;
    deserializer.end().map_err(|source| {
        malformed(document, format!("malformed scene JSON: {source}"), &source)
    })?;
    Ok(scenes)
}

fn malformed(document: &str, message: String, source: &serde_json::Error) -> LoadIssue {
    LoadIssue {
        code: LoadIssueCode::JsonMalformed,
        message,
        document: document.to_string(),
        location: (source.line() > 0).then(|| SourceLocation {
            line: source.line(),
            column: source.column(),
        }),
    }
}
