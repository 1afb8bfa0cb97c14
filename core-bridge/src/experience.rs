//! Experience factories
//!
//! Each factory validates the caller's input, assembles the session payload
//! and computes the page URL:
//!
//! ```text
//! payload = defaults  <- user details  <- custom params   (right side wins)
//! url     = {view base}/{endpoint}?style=..&loadingBackgroundColor=..&loadingTextColor=..
//! ```

use core_content::AdminContentType;
use core_runtime::config::{Credentials, DEFAULT_VIEW_BASE_URL};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ValidationError;
use crate::style::ViewStyle;
use crate::user::UserDetails;
use crate::validation::{normalize_workout_exercises, validate_input, WorkoutSequenceExercise};

/// Countdown used by [`ExperienceFactory::experience`] when none is given.
pub const DEFAULT_EXPERIENCE_COUNTDOWN: i64 = 60;

/// A validated page to open in a bridge session.
#[derive(Debug, Clone, PartialEq)]
pub struct Experience {
    /// Path below the view base URL, e.g. `workout/Fitness%20Lite`
    pub endpoint: String,
    /// Full page URL including style parameters
    pub url: String,
    pub payload: Map<String, Value>,
}

/// Per-call options shared by every factory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExperienceOptions {
    pub user: Option<UserDetails>,
    pub custom_params: Map<String, Value>,
    pub style: ViewStyle,
}

impl ExperienceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(mut self, user: UserDetails) -> Self {
        self.user = Some(user);
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.custom_params.insert(key.into(), value.into());
        self
    }

    pub fn custom_params(mut self, params: Map<String, Value>) -> Self {
        self.custom_params = params;
        self
    }

    pub fn style(mut self, style: ViewStyle) -> Self {
        self.style = style;
        self
    }
}

fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

fn data<const N: usize>(entries: [(&str, Value); N]) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// Builds [`Experience`]s for one set of credentials.
#[derive(Debug, Clone)]
pub struct ExperienceFactory {
    credentials: Credentials,
    view_base_url: String,
}

impl ExperienceFactory {
    pub fn new(credentials: Credentials, view_base_url: impl Into<String>) -> Self {
        let view_base_url = view_base_url.into().trim_end_matches('/').to_string();
        Self {
            credentials,
            view_base_url,
        }
    }

    /// Factory against the hosted experience site.
    pub fn with_default_base(credentials: Credentials) -> Self {
        Self::new(credentials, DEFAULT_VIEW_BASE_URL)
    }

    pub fn view_base_url(&self) -> &str {
        &self.view_base_url
    }

    fn build(
        &self,
        endpoint: String,
        defaults: Map<String, Value>,
        options: ExperienceOptions,
    ) -> Result<Experience, ValidationError> {
        let credentials = &self.credentials;
        validate_input(
            &credentials.api_key,
            &credentials.company_name,
            &credentials.user_id,
            &options.custom_params,
        )?;

        let mut payload = defaults;
        if let Some(user) = &options.user {
            user.merge_into(&mut payload);
        }
        payload.extend(options.custom_params);

        let url = options
            .style
            .apply_to(&format!("{}/{}", self.view_base_url, endpoint));
        debug!(%endpoint, keys = payload.len(), "Built experience");

        Ok(Experience {
            endpoint,
            url,
            payload,
        })
    }

    /// Free-form camera session driven by the host's exercise list.
    pub fn camera(
        &self,
        exercises: &[String],
        current_exercise: &str,
        options: ExperienceOptions,
    ) -> Result<Experience, ValidationError> {
        let defaults = data([
            ("exercises", Value::from(exercises.to_vec())),
            ("currentExercise", Value::from(current_exercise)),
        ]);
        self.build("camera".to_string(), defaults, options)
    }

    pub fn workout(
        &self,
        workout: &str,
        options: ExperienceOptions,
    ) -> Result<Experience, ValidationError> {
        self.build(
            format!("workout/{}", encode_segment(workout)),
            Map::new(),
            options,
        )
    }

    pub fn plan(&self, plan: &str, options: ExperienceOptions) -> Result<Experience, ValidationError> {
        self.build(format!("plan/{}", encode_segment(plan)), Map::new(), options)
    }

    pub fn challenge(
        &self,
        exercise: &str,
        countdown: i64,
        show_leaderboard: bool,
        options: ExperienceOptions,
    ) -> Result<Experience, ValidationError> {
        let defaults = data([
            ("exercise", Value::from(exercise)),
            ("countdown", Value::from(countdown)),
            ("showLeaderboard", Value::from(show_leaderboard)),
        ]);
        self.build("challenge".to_string(), defaults, options)
    }

    /// Named AI experience. `countdown` defaults to
    /// [`DEFAULT_EXPERIENCE_COUNTDOWN`] seconds.
    pub fn experience(
        &self,
        experience: &str,
        countdown: Option<i64>,
        options: ExperienceOptions,
    ) -> Result<Experience, ValidationError> {
        let defaults = data([(
            "countdown",
            Value::from(countdown.unwrap_or(DEFAULT_EXPERIENCE_COUNTDOWN)),
        )]);
        self.build(
            format!("experiences/{}", encode_segment(experience)),
            defaults,
            options,
        )
    }

    /// Leaderboard for `exercise`, optionally highlighting `username`.
    pub fn leaderboard(
        &self,
        exercise: &str,
        username: Option<&str>,
        options: ExperienceOptions,
    ) -> Result<Experience, ValidationError> {
        let endpoint = match username.filter(|name| !name.is_empty()) {
            Some(name) => format!("leaderboard/?username={}", encode_segment(name)),
            None => "leaderboard".to_string(),
        };
        self.build(endpoint, data([("exercise", Value::from(exercise))]), options)
    }

    pub fn category(
        &self,
        category: &str,
        options: ExperienceOptions,
    ) -> Result<Experience, ValidationError> {
        self.build(
            format!("category/{}", encode_segment(category)),
            Map::new(),
            options,
        )
    }

    /// Host-defined workout. Invalid steps are dropped; fails when none remain.
    pub fn custom_workout(
        &self,
        exercises: &[WorkoutSequenceExercise],
        options: ExperienceOptions,
    ) -> Result<Experience, ValidationError> {
        let sequence = normalize_workout_exercises(exercises)?;
        let defaults = data([("customWorkoutExercises", Value::Array(sequence))]);
        self.build("custom-workout".to_string(), defaults, options)
    }

    /// Content editor for workouts, plans or exercises.
    pub fn admin(
        &self,
        content_type: AdminContentType,
        content_id: Option<&str>,
        options: ExperienceOptions,
    ) -> Result<Experience, ValidationError> {
        let mut endpoint = format!("admin/{}", content_type.url_segment());
        if let Some(id) = content_id.filter(|id| !id.is_empty()) {
            endpoint.push('/');
            endpoint.push_str(&encode_segment(id));
        }
        self.build(endpoint, data([("isAdmin", Value::Bool(true))]), options)
    }
}
