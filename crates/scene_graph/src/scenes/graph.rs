use std::collections::BTreeSet;

use super::extract::extract_references;
use super::loader::SceneStore;
use super::types::{Scene, SceneId};

/// Union of the references of every scene in the store.
pub fn collect_referenced(store: &SceneStore, reserved: &BTreeSet<String>) -> BTreeSet<SceneId> {
    store
        .scenes()
        .values()
        .flat_map(|scene| extract_references(scene, reserved))
        .collect()
}

pub fn references_scene(scene: &Scene, target: &str, reserved: &BTreeSet<String>) -> bool {
    extract_references(scene, reserved).contains(target)
}

/// Ids of the scenes that reference `target`, in scene-id order.
///
/// Rescans the store on every call; this only runs for ids that end up in the
/// report.
pub fn referrers_of<'a>(
    store: &'a SceneStore,
    target: &str,
    reserved: &BTreeSet<String>,
) -> Vec<&'a str> {
    store
        .scenes()
        .iter()
        .filter(|(_, scene)| references_scene(scene, target, reserved))
        .map(|(scene_id, _)| scene_id.as_str())
        .collect()
}
