//! Core service façade.
//!
//! [`KinestexService`] wires a [`KinestexConfig`] into the content client and
//! the bridge session factories so host applications have a single entry
//! point. Desktop hosts typically enable the `desktop-shims` feature, which
//! supplies the reqwest-backed `HttpClient`; mobile hosts inject their own
//! client through the config builder.
//!
//! ```ignore
//! use core_service::{ExperienceOptions, KinestexService};
//!
//! let service = KinestexService::from_credentials("api-key", "Acme", "user-1")?;
//! let workout = service.fetch_workout("Fitness Lite", None).await?;
//! let session = service.create_workout_session(&workout.id, ExperienceOptions::new())?;
//! session.attach(web_view).await?;
//! ```

pub mod error;

pub use error::{Result, ServiceError};

pub use core_bridge::{
    BridgeSession, Dispatch, Experience, ExperienceOptions, Gender, KinestexMessage, Lifestyle,
    SessionRegistry, SessionState, UserDetails, ViewStyle, WorkoutActivityAction,
    WorkoutSequenceExercise,
};
pub use core_content::{
    AdminContentType, BodyPart, ContentQuery, ContentResult, ContentType, ExerciseEntity,
    ExercisesResponse, ListFilter, PlanEntity, PlansResponse, WorkoutEntity, WorkoutsResponse,
};
pub use core_runtime::config::{BridgeTimings, KinestexConfig};

use core_bridge::ExperienceFactory;
use core_content::ContentClient;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct KinestexService {
    config: Arc<KinestexConfig>,
    content: Arc<ContentClient>,
    experiences: ExperienceFactory,
    registry: Arc<SessionRegistry>,
}

impl KinestexService {
    /// Creates a service whose sessions register with the process-wide registry.
    pub fn new(config: KinestexConfig) -> Self {
        Self::with_registry(config, SessionRegistry::global())
    }

    /// Creates a service with a host-owned session registry.
    pub fn with_registry(config: KinestexConfig, registry: Arc<SessionRegistry>) -> Self {
        let content = Arc::new(ContentClient::new(&config));
        let experiences =
            ExperienceFactory::new(config.credentials.clone(), config.view_base_url.clone());
        info!(
            company = %config.credentials.company_name,
            view_base_url = %config.view_base_url,
            content_base_url = %config.content_base_url,
            "KinesteX service initialized"
        );
        Self {
            config: Arc::new(config),
            content,
            experiences,
            registry,
        }
    }

    /// Builds a default configuration from credentials.
    ///
    /// Fails with `CapabilityMissing` unless the `desktop-shims` feature
    /// provides an HTTP client.
    pub fn from_credentials(
        api_key: impl Into<String>,
        company_name: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Result<Self> {
        let config = KinestexConfig::builder()
            .credentials(api_key, company_name, user_id)
            .build()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &KinestexConfig {
        &self.config
    }

    pub fn registry(&self) -> Arc<SessionRegistry> {
        Arc::clone(&self.registry)
    }

    // Content

    pub async fn fetch_content(&self, query: &ContentQuery) -> ContentResult {
        self.content.fetch_content(query).await
    }

    pub async fn fetch_workout(&self, id: &str, lang: Option<&str>) -> Result<WorkoutEntity> {
        Ok(self.content.fetch_workout(id, lang).await?)
    }

    pub async fn fetch_exercise(&self, id: &str, lang: Option<&str>) -> Result<ExerciseEntity> {
        Ok(self.content.fetch_exercise(id, lang).await?)
    }

    pub async fn fetch_plan(&self, id: &str, lang: Option<&str>) -> Result<PlanEntity> {
        Ok(self.content.fetch_plan(id, lang).await?)
    }

    pub async fn fetch_workouts(&self, filter: ListFilter) -> Result<WorkoutsResponse> {
        Ok(self.content.fetch_workouts(filter).await?)
    }

    pub async fn fetch_exercises(&self, filter: ListFilter) -> Result<ExercisesResponse> {
        Ok(self.content.fetch_exercises(filter).await?)
    }

    pub async fn fetch_plans(&self, filter: ListFilter) -> Result<PlansResponse> {
        Ok(self.content.fetch_plans(filter).await?)
    }

    // Sessions

    /// Opens a session for an already-built experience.
    pub fn open_session(&self, experience: Experience) -> Result<BridgeSession> {
        let session = BridgeSession::new(
            experience,
            self.config.credentials.clone(),
            self.config.timings,
            Arc::clone(&self.registry),
        )?;
        Ok(session)
    }

    pub fn create_camera_session(
        &self,
        exercises: &[String],
        current_exercise: &str,
        options: ExperienceOptions,
    ) -> Result<BridgeSession> {
        let experience = self
            .experiences
            .camera(exercises, current_exercise, options)?;
        self.open_session(experience)
    }

    pub fn create_workout_session(
        &self,
        workout: &str,
        options: ExperienceOptions,
    ) -> Result<BridgeSession> {
        self.open_session(self.experiences.workout(workout, options)?)
    }

    pub fn create_plan_session(
        &self,
        plan: &str,
        options: ExperienceOptions,
    ) -> Result<BridgeSession> {
        self.open_session(self.experiences.plan(plan, options)?)
    }

    pub fn create_challenge_session(
        &self,
        exercise: &str,
        countdown: i64,
        show_leaderboard: bool,
        options: ExperienceOptions,
    ) -> Result<BridgeSession> {
        let experience = self
            .experiences
            .challenge(exercise, countdown, show_leaderboard, options)?;
        self.open_session(experience)
    }

    pub fn create_experience_session(
        &self,
        experience: &str,
        countdown: Option<i64>,
        options: ExperienceOptions,
    ) -> Result<BridgeSession> {
        let experience = self
            .experiences
            .experience(experience, countdown, options)?;
        self.open_session(experience)
    }

    pub fn create_leaderboard_session(
        &self,
        exercise: &str,
        username: Option<&str>,
        options: ExperienceOptions,
    ) -> Result<BridgeSession> {
        let experience = self.experiences.leaderboard(exercise, username, options)?;
        self.open_session(experience)
    }

    pub fn create_category_session(
        &self,
        category: &str,
        options: ExperienceOptions,
    ) -> Result<BridgeSession> {
        self.open_session(self.experiences.category(category, options)?)
    }

    pub fn create_custom_workout_session(
        &self,
        exercises: &[WorkoutSequenceExercise],
        options: ExperienceOptions,
    ) -> Result<BridgeSession> {
        self.open_session(self.experiences.custom_workout(exercises, options)?)
    }

    pub fn create_admin_session(
        &self,
        content_type: AdminContentType,
        content_id: Option<&str>,
        options: ExperienceOptions,
    ) -> Result<BridgeSession> {
        let experience = self.experiences.admin(content_type, content_id, options)?;
        self.open_session(experience)
    }

    /// Posts `{<action>: <value>}` to the current session of the process-wide
    /// registry.
    pub fn send_action(action: &str, value: Value) -> Dispatch {
        SessionRegistry::global().send_action(action, value)
    }
}
