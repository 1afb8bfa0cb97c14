//! Scripts injected into the embedded page
//!
//! Every payload is rendered with `serde_json`, so user-provided strings are
//! escaped as JSON literals and never spliced into script source.

use core_runtime::config::Credentials;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// `postMessage` target for control messages.
pub const ANY_ORIGIN: &str = "*";

/// Actions the host can trigger in a running workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutActivityAction {
    Start,
}

impl WorkoutActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutActivityAction::Start => "start",
        }
    }
}

impl fmt::Display for WorkoutActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authentication payload: credentials overlaid with the session data.
///
/// Session data wins on key collisions.
pub fn auth_payload(credentials: &Credentials, data: &Map<String, Value>) -> Map<String, Value> {
    let mut payload = Map::new();
    payload.insert("key".into(), Value::from(credentials.api_key.clone()));
    payload.insert(
        "company".into(),
        Value::from(credentials.company_name.clone()),
    );
    payload.insert("userId".into(), Value::from(credentials.user_id.clone()));
    for (key, value) in data {
        payload.insert(key.clone(), value.clone());
    }
    payload
}

/// `window.postMessage(<payload>, <target>);`
pub fn post_message_script(payload: &Map<String, Value>, target_origin: &str) -> String {
    format!(
        "window.postMessage({}, {});",
        Value::Object(payload.clone()),
        Value::from(target_origin)
    )
}

/// Script delivering the auth payload, targeted at the page URL.
pub fn auth_script(credentials: &Credentials, data: &Map<String, Value>, page_url: &str) -> String {
    post_message_script(&auth_payload(credentials, data), page_url)
}

/// Script posting `{<key>: <value>}` to any origin.
pub fn control_script(key: &str, value: Value) -> String {
    let mut payload = Map::new();
    payload.insert(key.to_string(), value);
    post_message_script(&payload, ANY_ORIGIN)
}

pub fn current_exercise_script(exercise: &str) -> String {
    control_script("currentExercise", Value::from(exercise))
}

pub fn rest_speech_script(speech: &str) -> String {
    control_script("currentRestSpeech", Value::from(speech))
}

pub fn workout_action_script(action: WorkoutActivityAction) -> String {
    control_script("workout_activity_action", Value::from(action.as_str()))
}

/// Releases camera, media and timers held by the page before it is unloaded.
pub const CLEANUP_SCRIPT: &str = r#"(function() {
    window.postMessage({ 'currentExercise': 'Stop Camera' }, '*');

    document.querySelectorAll('video').forEach(function(video) {
        video.pause();
        video.src = '';
        video.load();
        video.remove();
    });
    document.querySelectorAll('audio').forEach(function(audio) {
        audio.pause();
        audio.src = '';
        audio.load();
        audio.remove();
    });
    if (window.stream) {
        window.stream.getTracks().forEach(function(track) {
            track.stop();
        });
        window.stream = null;
    }
    for (var id = setTimeout(function() {}, 0); id > 0; id--) {
        clearTimeout(id);
    }
    for (var id = setInterval(function() {}, 0); id > 0; id--) {
        clearInterval(id);
    }
    if (navigator.mediaSession) {
        navigator.mediaSession.metadata = null;
    }
    if (window.gc) window.gc();
})();"#;
