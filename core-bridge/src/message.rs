//! Inbound messages posted by the embedded page
//!
//! The page posts JSON text on the `listener` channel. Every body must be an
//! object with a string `type`; the type selects the variant and the whole
//! object travels along as the payload.

use bridge_traits::SCRIPT_MESSAGE_CHANNEL;
use serde_json::{Map, Value};

use crate::error::MessageError;

pub type MessagePayload = Map<String, Value>;

/// An event raised by the embedded experience.
#[derive(Debug, Clone, PartialEq)]
pub enum KinestexMessage {
    KinestexLaunched(MessagePayload),
    FinishedWorkout(MessagePayload),
    ErrorOccurred(MessagePayload),
    ExerciseCompleted(MessagePayload),
    ExitKinestex(MessagePayload),
    WorkoutOpened(MessagePayload),
    WorkoutStarted(MessagePayload),
    PlanUnlocked(MessagePayload),
    Mistake(MessagePayload),
    /// Posted as `successful_repeat`
    Reps(MessagePayload),
    LeftCameraFrame(MessagePayload),
    ReturnedCameraFrame(MessagePayload),
    WorkoutOverview(MessagePayload),
    ExerciseOverview(MessagePayload),
    WorkoutCompleted(MessagePayload),
    KinestexLoaded(MessagePayload),
    AllResourcesLoaded(MessagePayload),
    /// Any type not listed above
    CustomType(MessagePayload),
}

impl KinestexMessage {
    /// Decodes a message posted on `channel`.
    pub fn parse(channel: &str, body: &str) -> Result<Self, MessageError> {
        if channel != SCRIPT_MESSAGE_CHANNEL {
            return Err(MessageError::UnknownChannel(channel.to_string()));
        }

        let payload = match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return Err(MessageError::NotAnObject),
            Err(e) => return Err(MessageError::InvalidJson(e.to_string())),
        };

        let Some(kind) = payload
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_owned)
        else {
            return Err(MessageError::MissingType);
        };

        Ok(Self::from_type(&kind, payload))
    }

    /// Maps a `type` string to its variant. Matching is exact.
    pub fn from_type(kind: &str, payload: MessagePayload) -> Self {
        match kind {
            "kinestex_launched" => Self::KinestexLaunched(payload),
            "finished_workout" => Self::FinishedWorkout(payload),
            "error_occurred" => Self::ErrorOccurred(payload),
            "exercise_completed" => Self::ExerciseCompleted(payload),
            "exit_kinestex" => Self::ExitKinestex(payload),
            "workout_opened" => Self::WorkoutOpened(payload),
            "workout_started" => Self::WorkoutStarted(payload),
            "plan_unlocked" => Self::PlanUnlocked(payload),
            "mistake" => Self::Mistake(payload),
            "successful_repeat" => Self::Reps(payload),
            "left_camera_frame" => Self::LeftCameraFrame(payload),
            "returned_camera_frame" => Self::ReturnedCameraFrame(payload),
            "workout_overview" => Self::WorkoutOverview(payload),
            "exercise_overview" => Self::ExerciseOverview(payload),
            "workout_completed" => Self::WorkoutCompleted(payload),
            "kinestex_loaded" => Self::KinestexLoaded(payload),
            "all_resources_loaded" => Self::AllResourcesLoaded(payload),
            _ => Self::CustomType(payload),
        }
    }

    pub fn payload(&self) -> &MessagePayload {
        match self {
            Self::KinestexLaunched(p)
            | Self::FinishedWorkout(p)
            | Self::ErrorOccurred(p)
            | Self::ExerciseCompleted(p)
            | Self::ExitKinestex(p)
            | Self::WorkoutOpened(p)
            | Self::WorkoutStarted(p)
            | Self::PlanUnlocked(p)
            | Self::Mistake(p)
            | Self::Reps(p)
            | Self::LeftCameraFrame(p)
            | Self::ReturnedCameraFrame(p)
            | Self::WorkoutOverview(p)
            | Self::ExerciseOverview(p)
            | Self::WorkoutCompleted(p)
            | Self::KinestexLoaded(p)
            | Self::AllResourcesLoaded(p)
            | Self::CustomType(p) => p,
        }
    }

    /// The `type` string the page posted.
    pub fn message_type(&self) -> &str {
        self.payload()
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: Value) -> Result<KinestexMessage, MessageError> {
        KinestexMessage::parse("listener", &body.to_string())
    }

    #[test]
    fn test_known_types() {
        let cases = [
            ("kinestex_launched", "KinestexLaunched"),
            ("exit_kinestex", "ExitKinestex"),
            ("kinestex_loaded", "KinestexLoaded"),
            ("all_resources_loaded", "AllResourcesLoaded"),
        ];
        for (kind, variant) in cases {
            let message = parse(json!({"type": kind})).unwrap();
            assert!(format!("{:?}", message).starts_with(variant), "{kind}");
            assert_eq!(message.message_type(), kind);
        }
    }

    #[test]
    fn test_successful_repeat_maps_to_reps() {
        let message = parse(json!({"type": "successful_repeat", "value": 7})).unwrap();
        match message {
            KinestexMessage::Reps(payload) => assert_eq!(payload["value"], json!(7)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unknown_and_case_mismatch_are_custom() {
        assert!(matches!(
            parse(json!({"type": "stats_update", "data": {}})).unwrap(),
            KinestexMessage::CustomType(_)
        ));
        assert!(matches!(
            parse(json!({"type": "Mistake"})).unwrap(),
            KinestexMessage::CustomType(_)
        ));
    }

    #[test]
    fn test_payload_is_whole_object() {
        let message = parse(json!({"type": "mistake", "value": "knees in", "time": 12})).unwrap();
        assert_eq!(message.payload().len(), 3);
        assert_eq!(message.payload()["value"], json!("knees in"));
    }

    #[test]
    fn test_rejections() {
        assert_eq!(
            KinestexMessage::parse("other", r#"{"type":"mistake"}"#),
            Err(MessageError::UnknownChannel("other".into()))
        );
        assert!(matches!(
            KinestexMessage::parse("listener", "not json"),
            Err(MessageError::InvalidJson(_))
        ));
        assert_eq!(parse(json!(["type"])), Err(MessageError::NotAnObject));
        assert_eq!(parse(json!({"kind": "mistake"})), Err(MessageError::MissingType));
        assert_eq!(parse(json!({"type": 5})), Err(MessageError::MissingType));
    }
}
