use std::fs;
use std::path::{Path, PathBuf};

use super::loader::{LoadIssue, LoadIssueCode, SceneLoadError};

#[derive(Debug, Clone)]
pub(crate) struct SceneDocument {
    pub path: PathBuf,
    /// `/`-joined path relative to the data directory; used for ordering and provenance.
    pub name: String,
}

#[derive(Debug, Default)]
pub(crate) struct Discovery {
    pub documents: Vec<SceneDocument>,
    pub issues: Vec<LoadIssue>,
}

/// Finds every `.json` document under `root`, sorted by relative path so that
/// duplicate resolution does not depend on directory iteration order.
pub(crate) fn discover_scene_documents(root: &Path) -> Result<Discovery, SceneLoadError> {
    if !root.is_dir() {
        return Err(SceneLoadError::DataDirMissing {
            path: root.to_path_buf(),
        });
    }
    let entries = fs::read_dir(root).map_err(|source| SceneLoadError::ReadDataDir {
        path: root.to_path_buf(),
        source,
    })?;

    let mut discovery = Discovery::default();
    collect_recursive(root, root, entries, &mut discovery);
    discovery.documents.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(discovery)
}

fn collect_recursive(
    root: &Path,
    current: &Path,
    entries: fs::ReadDir,
    discovery: &mut Discovery,
) {
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) => {
                discovery.issues.push(read_dir_issue(root, current, &source));
                continue;
            }
        };
        let path = entry.path();
        if path.is_dir() {
            match fs::read_dir(&path) {
                Ok(nested) => collect_recursive(root, &path, nested, discovery),
                Err(source) => discovery.issues.push(read_dir_issue(root, &path, &source)),
            }
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        {
            let name = document_name(root, &path);
            discovery.documents.push(SceneDocument { path, name });
        }
    }
}

fn read_dir_issue(root: &Path, dir: &Path, source: &std::io::Error) -> LoadIssue {
    LoadIssue {
        code: LoadIssueCode::ReadDir,
        message: format!("failed to read scene directory: {source}"),
        document: document_name(root, dir),
        location: None,
    }
}

fn document_name(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(relative) if relative.as_os_str().is_empty() => ".".to_string(),
        Ok(relative) => normalize_rel_path(relative),
        Err(_) => path.display().to_string(),
    }
}

fn normalize_rel_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("/")
}
