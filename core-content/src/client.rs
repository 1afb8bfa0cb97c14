//! Content API client

use bridge_traits::http::{HttpClient, HttpResponse};
use core_runtime::config::{Credentials, KinestexConfig};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::{ContentError, Result};
use crate::models::{
    ContentType, ExerciseEntity, ExercisesResponse, PlanEntity, PlansResponse, WorkoutEntity,
    WorkoutsResponse,
};
use crate::query::{ContentQuery, ListFilter};
use crate::schema::{JsonObject, SchemaError};

/// Outcome of [`ContentClient::fetch_content`]
#[derive(Debug, Clone, PartialEq)]
pub enum ContentResult {
    Workouts(WorkoutsResponse),
    Workout(WorkoutEntity),
    Plans(PlansResponse),
    Plan(PlanEntity),
    Exercises(ExercisesResponse),
    Exercise(ExerciseEntity),
    Error(ContentError),
    /// The body was a JSON object that did not decode into the expected type
    RawData {
        raw: JsonObject,
        message: String,
    },
}

impl ContentResult {
    /// Collapses raw-data results into [`ContentError::Decode`] so the raw
    /// body travels with the error.
    fn into_error(self) -> ContentError {
        match self {
            ContentResult::Error(e) => e,
            ContentResult::RawData { raw, message } => ContentError::Decode {
                message,
                raw: Some(raw),
            },
            other => ContentError::Decode {
                message: format!("Unexpected result variant: {}", variant_name(&other)),
                raw: None,
            },
        }
    }
}

fn variant_name(result: &ContentResult) -> &'static str {
    match result {
        ContentResult::Workouts(_) => "Workouts",
        ContentResult::Workout(_) => "Workout",
        ContentResult::Plans(_) => "Plans",
        ContentResult::Plan(_) => "Plan",
        ContentResult::Exercises(_) => "Exercises",
        ContentResult::Exercise(_) => "Exercise",
        ContentResult::Error(_) => "Error",
        ContentResult::RawData { .. } => "RawData",
    }
}

/// Fetches workouts, plans and exercises from the content API.
///
/// Every call is a live request; nothing is cached. Any number of fetches may
/// be in flight at once.
pub struct ContentClient {
    http_client: Arc<dyn HttpClient>,
    credentials: Credentials,
    base_url: String,
    default_lang: String,
    request_timeout: Option<Duration>,
}

impl ContentClient {
    pub fn new(config: &KinestexConfig) -> Self {
        Self {
            http_client: Arc::clone(&config.http_client),
            credentials: config.credentials.clone(),
            base_url: config.content_base_url.clone(),
            default_lang: config.default_lang.clone(),
            request_timeout: config.request_timeout,
        }
    }

    /// Creates a client from individual parts.
    pub fn with_parts(
        http_client: Arc<dyn HttpClient>,
        credentials: Credentials,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            credentials,
            base_url: base_url.into(),
            default_lang: core_runtime::config::DEFAULT_LANG.to_string(),
            request_timeout: None,
        }
    }

    /// Runs one content request and classifies the response.
    ///
    /// Never fails outright: validation, transport and decoding problems come
    /// back as [`ContentResult::Error`] or [`ContentResult::RawData`].
    #[instrument(skip(self, query), fields(content_type = %query.content_type, list = query.is_list()))]
    pub async fn fetch_content(&self, query: &ContentQuery) -> ContentResult {
        let prepared = query.to_request(&self.base_url, &self.default_lang, &self.credentials);
        let mut request = match prepared {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Rejected content query");
                return ContentResult::Error(e);
            }
        };
        if let Some(timeout) = self.request_timeout {
            request = request.timeout(timeout);
        }

        debug!(url = %request.url, "Requesting content");

        let response = match self.http_client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Content request failed");
                return ContentResult::Error(e.into());
            }
        };

        if !response.is_success() {
            let error = classify_failure(&response);
            warn!(status = response.status, error = %error, "Content API returned an error");
            return ContentResult::Error(error);
        }

        let result = decode_success(query.content_type, query.is_list(), &response.body);
        match &result {
            ContentResult::RawData { message, .. } => {
                warn!(%message, "Returning raw data for undecodable content")
            }
            ContentResult::Error(e) => warn!(error = %e, "Content body was not a JSON object"),
            _ => info!("Content decoded"),
        }
        result
    }

    pub async fn fetch_workout(&self, id: &str, lang: Option<&str>) -> Result<WorkoutEntity> {
        match self.fetch_single(ContentType::Workout, id, lang).await {
            ContentResult::Workout(workout) => Ok(workout),
            other => Err(other.into_error()),
        }
    }

    pub async fn fetch_exercise(&self, id: &str, lang: Option<&str>) -> Result<ExerciseEntity> {
        match self.fetch_single(ContentType::Exercise, id, lang).await {
            ContentResult::Exercise(exercise) => Ok(exercise),
            other => Err(other.into_error()),
        }
    }

    pub async fn fetch_plan(&self, id: &str, lang: Option<&str>) -> Result<PlanEntity> {
        match self.fetch_single(ContentType::Plan, id, lang).await {
            ContentResult::Plan(plan) => Ok(plan),
            other => Err(other.into_error()),
        }
    }

    pub async fn fetch_workouts(&self, filter: ListFilter) -> Result<WorkoutsResponse> {
        match self.fetch_list(ContentType::Workout, filter).await {
            ContentResult::Workouts(page) => Ok(page),
            other => Err(other.into_error()),
        }
    }

    pub async fn fetch_exercises(&self, filter: ListFilter) -> Result<ExercisesResponse> {
        match self.fetch_list(ContentType::Exercise, filter).await {
            ContentResult::Exercises(page) => Ok(page),
            other => Err(other.into_error()),
        }
    }

    pub async fn fetch_plans(&self, filter: ListFilter) -> Result<PlansResponse> {
        match self.fetch_list(ContentType::Plan, filter).await {
            ContentResult::Plans(page) => Ok(page),
            other => Err(other.into_error()),
        }
    }

    async fn fetch_single(
        &self,
        content_type: ContentType,
        id: &str,
        lang: Option<&str>,
    ) -> ContentResult {
        let mut query = ContentQuery::by_id(content_type, id);
        if let Some(lang) = lang {
            query = query.lang(lang);
        }
        self.fetch_content(&query).await
    }

    async fn fetch_list(&self, content_type: ContentType, filter: ListFilter) -> ContentResult {
        let query = ContentQuery::list(content_type).with_filter(filter);
        self.fetch_content(&query).await
    }
}

/// Maps a non-2xx response to `Api` when the body is a JSON object, else `Http`.
fn classify_failure(response: &HttpResponse) -> ContentError {
    match serde_json::from_slice::<Value>(&response.body) {
        Ok(Value::Object(body)) => {
            let message = ["message", "error"]
                .iter()
                .find_map(|key| body.get(*key).and_then(Value::as_str))
                .unwrap_or("Unknown error")
                .to_string();
            ContentError::Api {
                status: response.status,
                message,
            }
        }
        _ => ContentError::Http {
            status: response.status,
        },
    }
}

/// Decodes a 2xx body into the variant matching the request.
pub fn decode_success(content_type: ContentType, is_list: bool, body: &[u8]) -> ContentResult {
    let parse_failure =
        |detail: String| format!("Failed to parse {}: {}", content_type.as_str(), detail);

    let json = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            return ContentResult::Error(ContentError::Decode {
                message: parse_failure("expected a JSON object".to_string()),
                raw: None,
            })
        }
        Err(e) => {
            return ContentResult::Error(ContentError::Decode {
                message: parse_failure(e.to_string()),
                raw: None,
            })
        }
    };

    let decoded: std::result::Result<ContentResult, SchemaError> = match (content_type, is_list) {
        (ContentType::Workout, true) => {
            WorkoutsResponse::from_json(&json).map(ContentResult::Workouts)
        }
        (ContentType::Workout, false) => {
            WorkoutEntity::from_json(&json).map(ContentResult::Workout)
        }
        (ContentType::Plan, true) => PlansResponse::from_json(&json).map(ContentResult::Plans),
        (ContentType::Plan, false) => PlanEntity::from_json(&json).map(ContentResult::Plan),
        (ContentType::Exercise, true) => {
            ExercisesResponse::from_json(&json).map(ContentResult::Exercises)
        }
        (ContentType::Exercise, false) => {
            Ok(ContentResult::Exercise(ExerciseEntity::from_json(&json)))
        }
    };

    decoded.unwrap_or_else(|e| ContentResult::RawData {
        message: parse_failure(e.to_string()),
        raw: json,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: body.as_bytes().to_vec().into(),
        }
    }

    #[test]
    fn test_classify_structured_error() {
        let error = classify_failure(&response(404, r#"{"message": "Workout not found"}"#));
        assert_eq!(
            error,
            ContentError::Api {
                status: 404,
                message: "Workout not found".into()
            }
        );

        let error = classify_failure(&response(401, r#"{"error": "Invalid API key"}"#));
        assert!(matches!(
            error,
            ContentError::Api { status: 401, message } if message == "Invalid API key"
        ));
    }

    #[test]
    fn test_classify_object_without_message() {
        let error = classify_failure(&response(500, r#"{"code": 17}"#));
        assert!(matches!(error, ContentError::Api { message, .. } if message == "Unknown error"));
    }

    #[test]
    fn test_classify_plain_text_error() {
        assert_eq!(
            classify_failure(&response(502, "Bad Gateway")),
            ContentError::Http { status: 502 }
        );
    }

    #[test]
    fn test_decode_single_exercise() {
        let body = json!({"id": "squat", "title": "Squats"}).to_string();
        match decode_success(ContentType::Exercise, false, body.as_bytes()) {
            ContentResult::Exercise(exercise) => {
                assert_eq!(exercise.title, "Squats");
                assert_eq!(exercise.rest_duration, 10);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_decode_failure_returns_raw_data() {
        let body = json!({"id": "w1", "title": "Legs"}).to_string();
        match decode_success(ContentType::Workout, false, body.as_bytes()) {
            ContentResult::RawData { raw, message } => {
                assert_eq!(raw.get("title"), Some(&json!("Legs")));
                assert!(message.starts_with("Failed to parse Workout"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_decode_non_object_is_error() {
        assert!(matches!(
            decode_success(ContentType::Plan, true, b"[1, 2]"),
            ContentResult::Error(ContentError::Decode { raw: None, .. })
        ));
        assert!(matches!(
            decode_success(ContentType::Plan, true, b"<html>"),
            ContentResult::Error(ContentError::Decode { .. })
        ));
    }

    #[test]
    fn test_raw_data_converts_to_decode_error() {
        let mut raw = JsonObject::new();
        raw.insert("id".into(), json!("p1"));
        let error = ContentResult::RawData {
            raw: raw.clone(),
            message: "Failed to parse Plan".into(),
        }
        .into_error();
        assert_eq!(error.raw(), Some(&raw));
    }
}
