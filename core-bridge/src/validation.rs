//! Input validation for bridge sessions
//!
//! Session credentials and user-supplied parameters end up inside scripts
//! evaluated by the embedded page, so they are screened before any payload is
//! assembled. Custom workout sequences are normalized here as well: bad
//! entries are dropped rather than failing the whole list.

use core_content::CharacterPolicy;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::ValidationError;

/// Policy applied by [`validate_input`].
pub const INPUT_POLICY: CharacterPolicy = CharacterPolicy::Strict;

/// Checks credentials and custom parameters before a session payload is built.
///
/// Credentials must be non-empty. Credentials, custom parameter keys and
/// string-valued custom parameters must not contain characters rejected by
/// [`INPUT_POLICY`]. Non-string values are not inspected.
pub fn validate_input(
    api_key: &str,
    company_name: &str,
    user_id: &str,
    custom_params: &Map<String, Value>,
) -> Result<(), ValidationError> {
    let result = check_input(api_key, company_name, user_id, custom_params);
    if let Err(error) = &result {
        warn!(field = error.field(), %error, "Session input rejected");
    }
    result
}

fn check_input(
    api_key: &str,
    company_name: &str,
    user_id: &str,
    custom_params: &Map<String, Value>,
) -> Result<(), ValidationError> {
    for (field, value) in [
        ("apiKey", api_key),
        ("companyName", company_name),
        ("userId", user_id),
    ] {
        check_value(field, value)?;
        if value.is_empty() {
            return Err(ValidationError::Empty {
                field: field.to_string(),
            });
        }
    }

    for (key, value) in custom_params {
        if let Some(found) = INPUT_POLICY.find_disallowed(key) {
            return Err(ValidationError::DisallowedKey {
                key: key.clone(),
                found,
            });
        }
        if let Value::String(text) = value {
            check_value(key, text)?;
        }
    }

    Ok(())
}

fn check_value(field: &str, value: &str) -> Result<(), ValidationError> {
    match INPUT_POLICY.find_disallowed(value) {
        Some(found) => Err(ValidationError::DisallowedCharacter {
            field: field.to_string(),
            found,
        }),
        None => Ok(()),
    }
}

/// One step of a host-defined custom workout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutSequenceExercise {
    pub exercise_id: String,
    pub reps: Option<i64>,
    pub duration: Option<i64>,
    pub include_rest_period: bool,
    pub rest_duration: i64,
}

impl WorkoutSequenceExercise {
    pub fn new(exercise_id: impl Into<String>) -> Self {
        Self {
            exercise_id: exercise_id.into(),
            reps: None,
            duration: None,
            include_rest_period: false,
            rest_duration: 0,
        }
    }

    pub fn reps(mut self, reps: i64) -> Self {
        self.reps = Some(reps);
        self
    }

    pub fn duration(mut self, seconds: i64) -> Self {
        self.duration = Some(seconds);
        self
    }

    /// Rest after this exercise, in seconds.
    pub fn rest(mut self, seconds: i64) -> Self {
        self.include_rest_period = true;
        self.rest_duration = seconds;
        self
    }

    /// Plain record sent to the page. `reps` and `duration` are omitted when unset.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("exerciseId".into(), Value::from(self.exercise_id.clone()));
        map.insert(
            "includeRestPeriod".into(),
            Value::from(self.include_rest_period),
        );
        map.insert("restDuration".into(), Value::from(self.rest_duration));
        if let Some(reps) = self.reps {
            map.insert("reps".into(), Value::from(reps));
        }
        if let Some(duration) = self.duration {
            map.insert("duration".into(), Value::from(duration));
        }
        map
    }

    fn rejection(&self) -> Option<String> {
        if self.exercise_id.trim().is_empty() {
            return Some("empty exercise id".to_string());
        }
        if let Some(found) = INPUT_POLICY.find_disallowed(&self.exercise_id) {
            return Some(format!("exercise id contains '{}'", found));
        }
        if self.reps.is_some_and(|reps| reps < 0) {
            return Some("negative reps".to_string());
        }
        if self.duration.is_some_and(|duration| duration < 0) {
            return Some("negative duration".to_string());
        }
        if self.rest_duration < 0 {
            return Some("negative rest duration".to_string());
        }
        None
    }
}

/// Converts a custom workout into the records sent to the page.
///
/// Invalid entries are skipped with a warning; order is preserved. Fails only
/// when nothing survives.
pub fn normalize_workout_exercises(
    exercises: &[WorkoutSequenceExercise],
) -> Result<Vec<Value>, ValidationError> {
    let mut normalized = Vec::with_capacity(exercises.len());

    for (index, exercise) in exercises.iter().enumerate() {
        match exercise.rejection() {
            Some(reason) => {
                warn!(index, exercise_id = %exercise.exercise_id, %reason, "Dropping custom workout exercise");
            }
            None => normalized.push(Value::Object(exercise.to_map())),
        }
    }

    if normalized.is_empty() {
        warn!(submitted = exercises.len(), "Custom workout has no valid exercises");
        return Err(ValidationError::NoValidExercises);
    }

    Ok(normalized)
}
