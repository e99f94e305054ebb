use std::collections::BTreeSet;

use super::types::{ExitTarget, Scene, SceneId};

/// Scene ids referenced by one scene through its exits, exit results, and
/// `onEnter` effects. Reserved keywords are control actions and never count.
pub fn extract_references(scene: &Scene, reserved: &BTreeSet<String>) -> BTreeSet<SceneId> {
    let mut referenced = BTreeSet::new();

    for exit in scene.exits.values() {
        match exit {
            ExitTarget::Direct(target) => insert_target(&mut referenced, reserved, target),
            ExitTarget::Structured(structured) => {
                if let Some(target) = &structured.next_scene {
                    insert_target(&mut referenced, reserved, target);
                }
                for target in structured.results.iter().flat_map(|result| result.targets()) {
                    insert_target(&mut referenced, reserved, target);
                }
            }
            ExitTarget::Unrecognized => {}
        }
    }

    for target in scene.on_enter.iter().flat_map(|effect| effect.targets()) {
        insert_target(&mut referenced, reserved, target);
    }

    referenced
}

fn insert_target(
    referenced: &mut BTreeSet<SceneId>,
    reserved: &BTreeSet<String>,
    target: &SceneId,
) {
    if !reserved.contains(target) {
        referenced.insert(target.clone());
    }
}
