//! Content domain model
//!
//! Entities are built once per parse from a JSON object through the tables in
//! [`crate::schema`] and are immutable afterwards. Each keeps the unmodified
//! object it was decoded from in `raw`.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::schema::{self, JsonObject, SchemaError};

/// Kind of content served by the REST API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ContentType {
    Workout,
    Plan,
    Exercise,
}

impl ContentType {
    /// Display name, also used in decode error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Workout => "Workout",
            ContentType::Plan => "Plan",
            ContentType::Exercise => "Exercise",
        }
    }

    /// REST path segment
    pub fn endpoint(&self) -> &'static str {
        match self {
            ContentType::Workout => "workouts",
            ContentType::Plan => "plans",
            ContentType::Exercise => "exercises",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content kinds editable through the admin experience
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminContentType {
    Workout,
    Plan,
    Exercise,
}

impl AdminContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminContentType::Workout => "workout",
            AdminContentType::Plan => "plan",
            AdminContentType::Exercise => "exercise",
        }
    }

    /// Admin URL segment
    pub fn url_segment(&self) -> &'static str {
        match self {
            AdminContentType::Workout => "workouts",
            AdminContentType::Plan => "plans",
            AdminContentType::Exercise => "exercises",
        }
    }
}

/// Body parts understood by the content API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BodyPart {
    Abs,
    Biceps,
    Calves,
    Chest,
    #[serde(rename = "External Oblique")]
    ExternalOblique,
    Forearms,
    Glutes,
    Neck,
    Quads,
    Shoulders,
    Triceps,
    Hamstrings,
    Lats,
    #[serde(rename = "Lower Back")]
    LowerBack,
    Traps,
    #[serde(rename = "Full Body")]
    FullBody,
}

impl BodyPart {
    pub const ALL: [BodyPart; 16] = [
        BodyPart::Abs,
        BodyPart::Biceps,
        BodyPart::Calves,
        BodyPart::Chest,
        BodyPart::ExternalOblique,
        BodyPart::Forearms,
        BodyPart::Glutes,
        BodyPart::Neck,
        BodyPart::Quads,
        BodyPart::Shoulders,
        BodyPart::Triceps,
        BodyPart::Hamstrings,
        BodyPart::Lats,
        BodyPart::LowerBack,
        BodyPart::Traps,
        BodyPart::FullBody,
    ];

    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyPart::Abs => "Abs",
            BodyPart::Biceps => "Biceps",
            BodyPart::Calves => "Calves",
            BodyPart::Chest => "Chest",
            BodyPart::ExternalOblique => "External Oblique",
            BodyPart::Forearms => "Forearms",
            BodyPart::Glutes => "Glutes",
            BodyPart::Neck => "Neck",
            BodyPart::Quads => "Quads",
            BodyPart::Shoulders => "Shoulders",
            BodyPart::Triceps => "Triceps",
            BodyPart::Hamstrings => "Hamstrings",
            BodyPart::Lats => "Lats",
            BodyPart::LowerBack => "Lower Back",
            BodyPart::Traps => "Traps",
            BodyPart::FullBody => "Full Body",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|part| part.as_str() == name)
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseEntity {
    pub id: String,
    pub title: String,
    pub thumbnail_url: String,
    pub video_url: String,
    pub male_video_url: String,
    pub male_thumbnail_url: String,
    pub workout_countdown: Option<i64>,
    pub workout_reps: Option<i64>,
    pub average_reps: Option<i64>,
    pub average_countdown: Option<i64>,
    /// Seconds of rest before this exercise. Inside a workout this is the
    /// value attributed from the preceding rest item.
    pub rest_duration: i64,
    pub rest_speech: String,
    pub rest_speech_text: String,
    pub average_calories: Option<f64>,
    pub body_parts: Vec<String>,
    pub description: String,
    pub difficulty_level: String,
    pub common_mistakes: String,
    pub steps: Vec<String>,
    pub tips: String,
    pub model_id: String,
    #[serde(skip)]
    pub raw: Option<JsonObject>,
}

impl ExerciseEntity {
    /// Decodes an exercise. Never fails: every field has a fallback.
    pub fn from_json(obj: &JsonObject) -> Self {
        use schema::exercise::*;

        Self {
            id: ID.read(obj),
            title: TITLE.read(obj),
            thumbnail_url: THUMBNAIL_URL.read(obj),
            video_url: VIDEO_URL.read(obj),
            male_video_url: MALE_VIDEO_URL.read(obj),
            male_thumbnail_url: MALE_THUMBNAIL_URL.read(obj),
            workout_countdown: WORKOUT_COUNTDOWN.read(obj),
            workout_reps: WORKOUT_REPEATS.read(obj),
            average_reps: AVERAGE_REPS.read(obj),
            average_countdown: AVERAGE_COUNTDOWN.read(obj),
            rest_duration: REST_DURATION.read(obj),
            rest_speech: REST_SPEECH.read(obj),
            rest_speech_text: REST_SPEECH_TEXT.read(obj),
            average_calories: AVERAGE_CALORIES.read(obj),
            body_parts: BODY_PARTS.read(obj),
            description: DESCRIPTION.read(obj),
            difficulty_level: DIFFICULTY.read(obj),
            common_mistakes: COMMON_MISTAKES.read(obj),
            steps: STEPS.read(obj),
            tips: TIPS.read(obj),
            model_id: MODEL_ID.read(obj),
            raw: Some(obj.clone()),
        }
    }

    /// Replaces the captured raw object.
    pub(crate) fn with_raw(mut self, raw: JsonObject) -> Self {
        self.raw = Some(raw);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutEntity {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub category: Option<String>,
    pub description: String,
    pub total_minutes: Option<i64>,
    pub total_calories: Option<i64>,
    pub body_parts: Vec<String>,
    pub difficulty_level: Option<String>,
    /// Exercises in order, rest items already folded into `rest_duration`
    pub sequence: Vec<ExerciseEntity>,
    #[serde(skip)]
    pub raw: Option<JsonObject>,
}

impl WorkoutEntity {
    /// Decodes a workout, attributing rest items to the exercises that
    /// follow them.
    ///
    /// # Errors
    ///
    /// Fails when `sequence` is missing or is not an array of objects.
    pub fn from_json(obj: &JsonObject) -> Result<Self, SchemaError> {
        use schema::workout::*;

        let items = schema::required_object_array(obj, ENTITY, SEQUENCE)?;
        let sequence = crate::sequence::attribute_rest_durations(&items)
            .into_iter()
            .map(|item| {
                let original = item.original.clone();
                ExerciseEntity::from_json(&item.into_payload()).with_raw(original)
            })
            .collect();

        Ok(Self {
            id: ID.read(obj),
            title: TITLE.read(obj),
            image_url: IMAGE.read(obj),
            category: CATEGORY.read(obj),
            description: DESCRIPTION.read(obj),
            total_minutes: TOTAL_MINUTES.read(obj),
            total_calories: CALORIES.read(obj),
            body_parts: BODY_PARTS.read(obj),
            difficulty_level: DIFFICULTY.read(obj),
            sequence,
            raw: Some(obj.clone()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PlanCategory {
    pub description: String,
    /// Difficulty name -> level
    pub levels: BTreeMap<String, i64>,
    #[serde(skip)]
    pub raw: Option<JsonObject>,
}

impl PlanCategory {
    pub fn from_json(obj: &JsonObject) -> Self {
        use schema::plan::category::*;

        let levels = obj
            .get(LEVELS)
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .filter_map(|(name, v)| schema::as_lenient_int(v).map(|n| (name.clone(), n)))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            description: DESCRIPTION.read(obj),
            levels,
            raw: Some(obj.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutSummary {
    pub id: String,
    pub image_url: String,
    pub title: String,
    pub calories: Option<f64>,
    pub total_minutes: Option<i64>,
    #[serde(skip)]
    pub raw: Option<JsonObject>,
}

impl WorkoutSummary {
    pub fn from_json(obj: &JsonObject) -> Result<Self, SchemaError> {
        use schema::plan::summary::*;

        let id = match obj.get(ID) {
            Some(Value::String(id)) => id.clone(),
            None | Some(Value::Null) => {
                return Err(SchemaError::MissingField {
                    entity: ENTITY,
                    key: ID,
                })
            }
            Some(_) => {
                return Err(SchemaError::WrongType {
                    entity: ENTITY,
                    key: ID,
                    expected: "a string",
                })
            }
        };

        Ok(Self {
            id,
            image_url: IMAGE.read(obj),
            title: TITLE.read(obj),
            calories: CALORIES.read(obj),
            total_minutes: TOTAL_MINUTES.read(obj),
            raw: Some(obj.clone()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanDay {
    pub title: String,
    pub description: String,
    pub workouts: Option<Vec<WorkoutSummary>>,
    #[serde(skip)]
    pub raw: Option<JsonObject>,
}

impl PlanDay {
    pub fn from_json(obj: &JsonObject) -> Result<Self, SchemaError> {
        use schema::plan::day::*;

        let workouts = schema::optional_object_array(obj, ENTITY, WORKOUTS)?
            .map(|items| {
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| {
                        WorkoutSummary::from_json(item).map_err(|e| e.at_index(ENTITY, i))
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        Ok(Self {
            title: TITLE.read(obj),
            description: DESCRIPTION.read(obj),
            workouts,
            raw: Some(obj.clone()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanLevel {
    pub title: String,
    pub description: String,
    /// Day name -> day
    pub days: BTreeMap<String, PlanDay>,
    #[serde(skip)]
    pub raw: Option<JsonObject>,
}

impl PlanLevel {
    pub fn from_json(obj: &JsonObject) -> Result<Self, SchemaError> {
        use schema::plan::level::*;

        let days = decode_named_objects(
            schema::required_object(obj, ENTITY, DAYS)?,
            "PlanLevel.days",
            PlanDay::from_json,
        )?;

        Ok(Self {
            title: TITLE.read(obj),
            description: DESCRIPTION.read(obj),
            days,
            raw: Some(obj.clone()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanEntity {
    pub id: String,
    pub image_url: String,
    pub title: String,
    pub category: PlanCategory,
    /// Level name -> level
    pub levels: BTreeMap<String, PlanLevel>,
    pub created_by: String,
    #[serde(skip)]
    pub raw: Option<JsonObject>,
}

impl PlanEntity {
    /// # Errors
    ///
    /// Fails when `levels`, any level's `days`, or any day's `workouts` is
    /// structurally malformed.
    pub fn from_json(obj: &JsonObject) -> Result<Self, SchemaError> {
        use schema::plan::*;

        let levels = decode_named_objects(
            schema::required_object(obj, ENTITY, LEVELS)?,
            "Plan.levels",
            PlanLevel::from_json,
        )?;

        let category = obj
            .get(CATEGORY)
            .and_then(Value::as_object)
            .map(PlanCategory::from_json)
            .unwrap_or_default();

        Ok(Self {
            id: ID.read(obj),
            image_url: IMAGE.read(obj),
            title: TITLE.read(obj),
            category,
            levels,
            created_by: CREATED_BY.read(obj),
            raw: Some(obj.clone()),
        })
    }
}

fn decode_named_objects<T>(
    map: &JsonObject,
    entity: &'static str,
    decode: impl Fn(&JsonObject) -> Result<T, SchemaError>,
) -> Result<BTreeMap<String, T>, SchemaError> {
    map.iter()
        .map(|(name, value)| {
            let obj = value
                .as_object()
                .ok_or_else(|| SchemaError::NotAnObject { entity }.at_key(entity, name))?;
            let decoded = decode(obj).map_err(|e| e.at_key(entity, name))?;
            Ok((name.clone(), decoded))
        })
        .collect()
}

/// A page of workouts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutsResponse {
    pub workouts: Vec<WorkoutEntity>,
    /// Pagination cursor, empty when the server sent none
    pub last_doc_id: String,
    #[serde(skip)]
    pub raw: Option<JsonObject>,
}

/// A page of exercises
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExercisesResponse {
    pub exercises: Vec<ExerciseEntity>,
    pub last_doc_id: String,
    #[serde(skip)]
    pub raw: Option<JsonObject>,
}

/// A page of plans
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlansResponse {
    pub plans: Vec<PlanEntity>,
    pub last_doc_id: String,
    #[serde(skip)]
    pub raw: Option<JsonObject>,
}

/// Reads the items of a list envelope: the type-specific key, then `items`.
fn list_items<'a>(
    body: &'a JsonObject,
    key: &'static str,
    entity: &'static str,
) -> Result<Vec<&'a JsonObject>, SchemaError> {
    let field = if body.contains_key(key) {
        key
    } else if body.contains_key(schema::list::ITEMS) {
        schema::list::ITEMS
    } else {
        key
    };
    schema::required_object_array(body, entity, field)
}

fn last_doc_id(body: &JsonObject) -> String {
    body.get(schema::list::LAST_DOC_ID)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Decodes every item or fails on the first one that does not.
fn decode_items<T>(
    items: Vec<&JsonObject>,
    entity: &'static str,
    decode: impl Fn(&JsonObject) -> Result<T, SchemaError>,
) -> Result<Vec<T>, SchemaError> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| decode(item).map_err(|e| e.at_index(entity, i)))
        .collect()
}

impl WorkoutsResponse {
    pub fn from_json(body: &JsonObject) -> Result<Self, SchemaError> {
        let items = list_items(body, "workouts", "WorkoutsResponse")?;
        Ok(Self {
            workouts: decode_items(items, "workouts", WorkoutEntity::from_json)?,
            last_doc_id: last_doc_id(body),
            raw: Some(body.clone()),
        })
    }
}

impl ExercisesResponse {
    pub fn from_json(body: &JsonObject) -> Result<Self, SchemaError> {
        let items = list_items(body, "exercises", "ExercisesResponse")?;
        Ok(Self {
            exercises: items.into_iter().map(ExerciseEntity::from_json).collect(),
            last_doc_id: last_doc_id(body),
            raw: Some(body.clone()),
        })
    }
}

impl PlansResponse {
    pub fn from_json(body: &JsonObject) -> Result<Self, SchemaError> {
        let items = list_items(body, "plans", "PlansResponse")?;
        Ok(Self {
            plans: decode_items(items, "plans", PlanEntity::from_json)?,
            last_doc_id: last_doc_id(body),
            raw: Some(body.clone()),
        })
    }
}
