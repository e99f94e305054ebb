use std::collections::BTreeMap;

use serde::de::{self, Deserializer, Unexpected};
use serde::Deserialize;
use serde_json::{Map, Value};

pub type SceneId = String;

const EXITS_FIELD: &str = "exits";
const ON_ENTER_FIELD: &str = "onEnter";
const DESCRIPTION_FIELD: &str = "description";
const NEXT_SCENE_FIELD: &str = "nextScene";
const TRIGGER_EVENT_FIELD: &str = "triggerEvent";
const RESULTS_FIELD: &str = "results";

/// One node of the narrative graph as authored in a scene document.
///
/// Scene records are loosely typed on disk: optional fields may be absent or carry
/// an unexpected shape. Reading is lenient everywhere except the record itself,
/// which must be a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub description: Option<Value>,
    pub exits: BTreeMap<String, ExitTarget>,
    pub on_enter: Vec<Effect>,
}

/// Where an exit leads, keyed in [`Scene::exits`] by its action label.
#[derive(Debug, Clone, PartialEq)]
pub enum ExitTarget {
    Direct(SceneId),
    Structured(StructuredExit),
    /// Neither a string nor an object; carries no references.
    Unrecognized,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredExit {
    pub next_scene: Option<SceneId>,
    pub results: Vec<Effect>,
}

/// An entry of an exit's `results` list or of a scene's `onEnter` list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Effect {
    pub next_scene: Option<SceneId>,
    pub trigger_event: Option<SceneId>,
}

impl Scene {
    pub fn from_object(mut object: Map<String, Value>) -> Self {
        let description = object.remove(DESCRIPTION_FIELD).filter(|value| !value.is_null());
        let exits = match object.remove(EXITS_FIELD) {
            Some(Value::Object(exits)) => exits
                .into_iter()
                .map(|(label, target)| (label, ExitTarget::from_value(target)))
                .collect(),
            _ => BTreeMap::new(),
        };
        let on_enter = object
            .remove(ON_ENTER_FIELD)
            .map(effects_from_value)
            .unwrap_or_default();

        Self {
            description,
            exits,
            on_enter,
        }
    }

    /// Length used for the content-size statistic: characters of a string
    /// description, elements of a list, keys of an object. `None` when absent or
    /// scalar.
    pub fn description_len(&self) -> Option<usize> {
        match self.description.as_ref()? {
            Value::String(text) => Some(text.chars().count()),
            Value::Array(items) => Some(items.len()),
            Value::Object(fields) => Some(fields.len()),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Scene {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Object(object) => Ok(Self::from_object(object)),
            other => Err(de::Error::invalid_type(
                unexpected(&other),
                &"a scene object",
            )),
        }
    }
}

impl ExitTarget {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(target) => Self::Direct(target),
            Value::Object(mut object) => Self::Structured(StructuredExit {
                next_scene: scene_id_field(&object, NEXT_SCENE_FIELD),
                results: object
                    .remove(RESULTS_FIELD)
                    .map(effects_from_value)
                    .unwrap_or_default(),
            }),
            _ => Self::Unrecognized,
        }
    }
}

impl Effect {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(object) => Self {
                next_scene: scene_id_field(object, NEXT_SCENE_FIELD),
                trigger_event: scene_id_field(object, TRIGGER_EVENT_FIELD),
            },
            _ => Self::default(),
        }
    }

    pub fn targets(&self) -> impl Iterator<Item = &SceneId> {
        self.next_scene.iter().chain(self.trigger_event.iter())
    }
}

fn effects_from_value(value: Value) -> Vec<Effect> {
    match value {
        Value::Array(entries) => entries.iter().map(Effect::from_value).collect(),
        _ => Vec::new(),
    }
}

// Non-string ids are ignored rather than coerced.
fn scene_id_field(object: &Map<String, Value>, field: &str) -> Option<SceneId> {
    object
        .get(field)
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(flag) => Unexpected::Bool(*flag),
        Value::Number(number) => number
            .as_f64()
            .map(Unexpected::Float)
            .unwrap_or(Unexpected::Other("number")),
        Value::String(text) => Unexpected::Str(text),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}
