//! # Lenient Decoding Schema
//!
//! Every content entity is decoded field by field from a JSON object. A field
//! that is missing or has the wrong type falls back to the default listed in
//! the per-entity tables below; a single bad field never fails the entity.
//!
//! Only a handful of fields are structural (workout `sequence`, plan
//! `levels`, level `days`, day `workouts`, summary `id`). Those fail the
//! entity with a [`SchemaError`], which the content client escalates to the
//! raw-data path.
//!
//! Integer fields accept JSON integers and floats whose fractional part is
//! zero (`30.0` reads as `30`). Anything else falls back.

use serde_json::{Map, Value};
use thiserror::Error;

pub type JsonObject = Map<String, Value>;

/// Structural decoding failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("{entity}: expected a JSON object")]
    NotAnObject { entity: &'static str },

    #[error("{entity}: required field '{key}' is missing")]
    MissingField {
        entity: &'static str,
        key: &'static str,
    },

    #[error("{entity}: field '{key}' must be {expected}")]
    WrongType {
        entity: &'static str,
        key: &'static str,
        expected: &'static str,
    },

    #[error("{entity}[{index}]: {source}")]
    Item {
        entity: &'static str,
        index: usize,
        #[source]
        source: Box<SchemaError>,
    },

    #[error("{entity}.{key}: {source}")]
    Entry {
        entity: &'static str,
        key: String,
        #[source]
        source: Box<SchemaError>,
    },
}

impl SchemaError {
    pub(crate) fn at_index(self, entity: &'static str, index: usize) -> Self {
        SchemaError::Item {
            entity,
            index,
            source: Box::new(self),
        }
    }

    pub(crate) fn at_key(self, entity: &'static str, key: &str) -> Self {
        SchemaError::Entry {
            entity,
            key: key.to_string(),
            source: Box::new(self),
        }
    }
}

/// Reads an integer, accepting floats with a zero fractional part.
pub fn as_lenient_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i);
            }
            let f = n.as_f64()?;
            if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
                Some(f as i64)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// String field with a fallback
#[derive(Debug, Clone, Copy)]
pub struct Text {
    pub key: &'static str,
    pub default: &'static str,
}

impl Text {
    pub const fn new(key: &'static str, default: &'static str) -> Self {
        Self { key, default }
    }

    pub fn read(&self, obj: &JsonObject) -> String {
        obj.get(self.key)
            .and_then(Value::as_str)
            .unwrap_or(self.default)
            .to_string()
    }
}

/// Optional string field
#[derive(Debug, Clone, Copy)]
pub struct OptText {
    pub key: &'static str,
}

impl OptText {
    pub const fn new(key: &'static str) -> Self {
        Self { key }
    }

    pub fn read(&self, obj: &JsonObject) -> Option<String> {
        obj.get(self.key).and_then(Value::as_str).map(str::to_string)
    }
}

/// Integer field with a fallback
#[derive(Debug, Clone, Copy)]
pub struct Int {
    pub key: &'static str,
    pub default: i64,
}

impl Int {
    pub const fn new(key: &'static str, default: i64) -> Self {
        Self { key, default }
    }

    pub fn read(&self, obj: &JsonObject) -> i64 {
        obj.get(self.key)
            .and_then(as_lenient_int)
            .unwrap_or(self.default)
    }
}

/// Optional integer field
#[derive(Debug, Clone, Copy)]
pub struct OptInt {
    pub key: &'static str,
}

impl OptInt {
    pub const fn new(key: &'static str) -> Self {
        Self { key }
    }

    pub fn read(&self, obj: &JsonObject) -> Option<i64> {
        obj.get(self.key).and_then(as_lenient_int)
    }
}

/// Optional floating point field
#[derive(Debug, Clone, Copy)]
pub struct OptFloat {
    pub key: &'static str,
}

impl OptFloat {
    pub const fn new(key: &'static str) -> Self {
        Self { key }
    }

    pub fn read(&self, obj: &JsonObject) -> Option<f64> {
        obj.get(self.key).and_then(Value::as_f64)
    }
}

/// Array-of-strings field, empty when missing or not entirely strings
#[derive(Debug, Clone, Copy)]
pub struct TextList {
    pub key: &'static str,
}

impl TextList {
    pub const fn new(key: &'static str) -> Self {
        Self { key }
    }

    pub fn read(&self, obj: &JsonObject) -> Vec<String> {
        let Some(items) = obj.get(self.key).and_then(Value::as_array) else {
            return Vec::new();
        };
        items
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .unwrap_or_default()
    }
}

/// Array-of-strings field that keeps only non-empty string entries
#[derive(Debug, Clone, Copy)]
pub struct CompactTextList {
    pub key: &'static str,
}

impl CompactTextList {
    pub const fn new(key: &'static str) -> Self {
        Self { key }
    }

    pub fn read(&self, obj: &JsonObject) -> Vec<String> {
        obj.get(self.key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Returns the object stored under `key`, or a structural error.
pub fn required_object<'a>(
    obj: &'a JsonObject,
    entity: &'static str,
    key: &'static str,
) -> Result<&'a JsonObject, SchemaError> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(SchemaError::MissingField { entity, key }),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(SchemaError::WrongType {
            entity,
            key,
            expected: "an object",
        }),
    }
}

/// Returns the array of objects stored under `key`, or a structural error.
pub fn required_object_array<'a>(
    obj: &'a JsonObject,
    entity: &'static str,
    key: &'static str,
) -> Result<Vec<&'a JsonObject>, SchemaError> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(SchemaError::MissingField { entity, key }),
        Some(value) => object_array(value, entity, key),
    }
}

/// Like [`required_object_array`] but a missing key yields `None`.
pub fn optional_object_array<'a>(
    obj: &'a JsonObject,
    entity: &'static str,
    key: &'static str,
) -> Result<Option<Vec<&'a JsonObject>>, SchemaError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => object_array(value, entity, key).map(Some),
    }
}

fn object_array<'a>(
    value: &'a Value,
    entity: &'static str,
    key: &'static str,
) -> Result<Vec<&'a JsonObject>, SchemaError> {
    let wrong_type = || SchemaError::WrongType {
        entity,
        key,
        expected: "an array of objects",
    };
    value
        .as_array()
        .ok_or_else(wrong_type)?
        .iter()
        .map(|item| item.as_object().ok_or_else(wrong_type))
        .collect()
}

/// Workout table
pub mod workout {
    use super::*;

    pub const ENTITY: &str = "Workout";
    pub const ID: Text = Text::new("id", "NA");
    pub const TITLE: Text = Text::new("title", "Untitled Workout");
    pub const IMAGE: Text = Text::new("workout_desc_img", "");
    pub const CATEGORY: OptText = OptText::new("category");
    pub const DESCRIPTION: Text = Text::new("description", "");
    pub const TOTAL_MINUTES: OptInt = OptInt::new("total_minutes");
    pub const CALORIES: OptInt = OptInt::new("calories");
    pub const BODY_PARTS: TextList = TextList::new("body_parts");
    pub const DIFFICULTY: OptText = OptText::new("dif_level");
    /// Structural: array of objects
    pub const SEQUENCE: &str = "sequence";
}

/// Exercise table
pub mod exercise {
    use super::*;

    pub const ENTITY: &str = "Exercise";
    pub const ID: Text = Text::new("id", "NA");
    pub const TITLE: Text = Text::new("title", "Untitled Exercise");
    pub const THUMBNAIL_URL: Text = Text::new("thumbnail_URL", "");
    pub const VIDEO_URL: Text = Text::new("video_URL", "");
    pub const MALE_VIDEO_URL: Text = Text::new("male_video_URL", "");
    pub const MALE_THUMBNAIL_URL: Text = Text::new("male_thumbnail_URL", "");
    pub const WORKOUT_COUNTDOWN: OptInt = OptInt::new("workout_countdown");
    pub const WORKOUT_REPEATS: OptInt = OptInt::new("workout_repeats");
    pub const AVERAGE_REPS: OptInt = OptInt::new("avg_reps");
    pub const AVERAGE_COUNTDOWN: OptInt = OptInt::new("avg_countdown");
    pub const REST_DURATION: Int = Int::new("rest_duration", 10);
    pub const REST_SPEECH: Text = Text::new("rest_speech", "");
    pub const REST_SPEECH_TEXT: Text = Text::new("rest_speech_text", "");
    pub const AVERAGE_CALORIES: OptFloat = OptFloat::new("avg_cal");
    pub const BODY_PARTS: TextList = TextList::new("body_parts");
    pub const DESCRIPTION: Text = Text::new("description", "Missing exercise description");
    pub const DIFFICULTY: Text = Text::new("dif_level", "Medium");
    pub const COMMON_MISTAKES: Text = Text::new("common_mistakes", "");
    pub const STEPS: CompactTextList = CompactTextList::new("steps");
    pub const TIPS: Text = Text::new("tips", "");
    pub const MODEL_ID: Text = Text::new("model_id", "NA");
}

/// Plan table, including its nested category, level, day and summary tables
pub mod plan {
    use super::*;

    pub const ENTITY: &str = "Plan";
    pub const ID: Text = Text::new("id", "NA");
    pub const TITLE: Text = Text::new("title", "Untitled Plan");
    pub const IMAGE: Text = Text::new("img_URL", "");
    pub const CREATED_BY: Text = Text::new("created_by", "");
    /// Optional object; empty description and levels when absent
    pub const CATEGORY: &str = "category";
    /// Structural: object of level name -> level
    pub const LEVELS: &str = "levels";

    pub mod category {
        use super::super::*;

        pub const DESCRIPTION: Text = Text::new("description", "");
        /// Object of difficulty name -> integer; non-integer entries are skipped
        pub const LEVELS: &str = "levels";
    }

    pub mod level {
        use super::super::*;

        pub const ENTITY: &str = "PlanLevel";
        pub const TITLE: Text = Text::new("title", "");
        pub const DESCRIPTION: Text = Text::new("description", "");
        /// Structural: object of day name -> day
        pub const DAYS: &str = "days";
    }

    pub mod day {
        use super::super::*;

        pub const ENTITY: &str = "PlanDay";
        pub const TITLE: Text = Text::new("title", "");
        pub const DESCRIPTION: Text = Text::new("description", "");
        /// Optional; when present must be an array of objects
        pub const WORKOUTS: &str = "workouts";
    }

    pub mod summary {
        use super::super::*;

        pub const ENTITY: &str = "WorkoutSummary";
        /// Structural: string
        pub const ID: &str = "id";
        pub const IMAGE: Text = Text::new("imgURL", "");
        pub const TITLE: Text = Text::new("title", "");
        pub const CALORIES: OptFloat = OptFloat::new("calories");
        pub const TOTAL_MINUTES: OptInt = OptInt::new("total_minutes");
    }
}

/// List envelope keys
pub mod list {
    /// Fallback item key when the type-specific key is absent
    pub const ITEMS: &str = "items";
    pub const LAST_DOC_ID: &str = "lastDocId";
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_lenient_int() {
        assert_eq!(as_lenient_int(&json!(30)), Some(30));
        assert_eq!(as_lenient_int(&json!(30.0)), Some(30));
        assert_eq!(as_lenient_int(&json!(30.5)), None);
        assert_eq!(as_lenient_int(&json!("30")), None);
        assert_eq!(as_lenient_int(&json!(null)), None);
    }

    #[test]
    fn test_text_fallbacks() {
        let o = obj(json!({"title": 42, "id": "ex-1"}));
        assert_eq!(exercise::TITLE.read(&o), "Untitled Exercise");
        assert_eq!(exercise::ID.read(&o), "ex-1");
        assert_eq!(exercise::DIFFICULTY.read(&o), "Medium");
    }

    #[test]
    fn test_rest_duration_default() {
        assert_eq!(exercise::REST_DURATION.read(&obj(json!({}))), 10);
        assert_eq!(
            exercise::REST_DURATION.read(&obj(json!({"rest_duration": 0}))),
            0
        );
    }

    #[test]
    fn test_text_list_requires_all_strings() {
        let o = obj(json!({"body_parts": ["Abs", 3]}));
        assert!(workout::BODY_PARTS.read(&o).is_empty());
        let o = obj(json!({"body_parts": ["Abs", "Glutes"]}));
        assert_eq!(workout::BODY_PARTS.read(&o), vec!["Abs", "Glutes"]);
    }

    #[test]
    fn test_steps_drop_null_and_empty() {
        let o = obj(json!({"steps": ["Stand", null, "", "Squat"]}));
        assert_eq!(exercise::STEPS.read(&o), vec!["Stand", "Squat"]);
    }

    #[test]
    fn test_required_object_array() {
        let o = obj(json!({"sequence": [{"id": "a"}, 1]}));
        assert!(matches!(
            required_object_array(&o, workout::ENTITY, workout::SEQUENCE),
            Err(SchemaError::WrongType { .. })
        ));

        let o = obj(json!({}));
        assert_eq!(
            required_object_array(&o, workout::ENTITY, workout::SEQUENCE),
            Err(SchemaError::MissingField {
                entity: "Workout",
                key: "sequence"
            })
        );
    }

    #[test]
    fn test_optional_object_array() {
        let o = obj(json!({"workouts": null}));
        assert_eq!(
            optional_object_array(&o, plan::day::ENTITY, plan::day::WORKOUTS),
            Ok(None)
        );
        let o = obj(json!({"workouts": "w1"}));
        assert!(optional_object_array(&o, plan::day::ENTITY, plan::day::WORKOUTS).is_err());
    }

    #[test]
    fn test_nested_error_message() {
        let err = SchemaError::MissingField {
            entity: "PlanLevel",
            key: "days",
        }
        .at_key("Plan.levels", "Beginner");
        assert_eq!(
            err.to_string(),
            "Plan.levels.Beginner: PlanLevel: required field 'days' is missing"
        );
    }
}
