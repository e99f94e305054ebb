mod discovery;
mod extract;
mod graph;
mod loader;
mod types;

pub use extract::extract_references;
pub use graph::{collect_referenced, references_scene, referrers_of};
pub use loader::{
    load_scene_store, DocumentSummary, LoadIssue, LoadIssueCode, SceneLoadError, SceneStore,
    SourceLocation,
};
pub use types::{Effect, ExitTarget, Scene, SceneId, StructuredExit};
