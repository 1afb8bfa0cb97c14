//! Rest attribution for workout sequences
//!
//! The API models rest periods as pseudo-exercises with id `"Rest"` placed
//! before the exercise they precede. Clients want the rest folded into the
//! following exercise instead, so the walk below carries a pending rest value
//! forward:
//!
//! ```text
//! [Rest(15), Squat, Lunge, Rest, Plank]  ->  [Squat(15), Lunge(0), Plank(10)]
//! ```

use serde_json::Value;

use crate::schema::{as_lenient_int, JsonObject};

/// Id marking a rest pseudo-exercise
pub const REST_ITEM_ID: &str = "Rest";

/// Rest seconds used when a rest item has no integer `countdown`
pub const DEFAULT_REST_COUNTDOWN: i64 = 10;

const COUNTDOWN_KEY: &str = "countdown";
const REST_DURATION_KEY: &str = "rest_duration";

/// A non-rest sequence item together with the rest attributed to it.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributedItem<'a> {
    /// The item exactly as the server sent it
    pub original: &'a JsonObject,
    pub rest_duration: i64,
}

impl AttributedItem<'_> {
    /// Copy of the original item with `rest_duration` overwritten.
    pub fn into_payload(self) -> JsonObject {
        let mut payload = self.original.clone();
        payload.insert(REST_DURATION_KEY.to_string(), Value::from(self.rest_duration));
        payload
    }
}

fn is_rest_item(item: &JsonObject) -> bool {
    item.get("id").and_then(Value::as_str) == Some(REST_ITEM_ID)
}

/// Walks `items` in order and attributes each rest item's countdown to the
/// next non-rest item.
///
/// Rest items are not emitted. An item not preceded by a rest item gets 0;
/// consecutive rest items overwrite each other; a trailing rest item is
/// dropped.
pub fn attribute_rest_durations<'a>(items: &[&'a JsonObject]) -> Vec<AttributedItem<'a>> {
    let mut pending = 0;
    let mut attributed = Vec::with_capacity(items.len());

    for &item in items {
        if is_rest_item(item) {
            pending = item
                .get(COUNTDOWN_KEY)
                .and_then(as_lenient_int)
                .unwrap_or(DEFAULT_REST_COUNTDOWN);
        } else {
            attributed.push(AttributedItem {
                original: item,
                rest_duration: pending,
            });
            pending = 0;
        }
    }

    attributed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn objects(value: Value) -> Vec<JsonObject> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    fn attribute(value: Value) -> Vec<(String, i64)> {
        let owned = objects(value);
        let refs: Vec<&JsonObject> = owned.iter().collect();
        attribute_rest_durations(&refs)
            .into_iter()
            .map(|item| {
                (
                    item.original["id"].as_str().unwrap().to_string(),
                    item.rest_duration,
                )
            })
            .collect()
    }

    #[test]
    fn test_rest_attributed_to_next_exercise() {
        let result = attribute(json!([
            {"id": "Rest", "countdown": 15},
            {"id": "squat"},
            {"id": "lunge"},
            {"id": "Rest"},
            {"id": "plank"}
        ]));

        assert_eq!(
            result,
            vec![
                ("squat".to_string(), 15),
                ("lunge".to_string(), 0),
                ("plank".to_string(), 10)
            ]
        );
    }

    #[test]
    fn test_non_integer_countdown_defaults() {
        let result = attribute(json!([
            {"id": "Rest", "countdown": "thirty"},
            {"id": "squat"},
            {"id": "Rest", "countdown": 20.0},
            {"id": "plank"}
        ]));
        assert_eq!(result[0].1, 10);
        assert_eq!(result[1].1, 20);
    }

    #[test]
    fn test_consecutive_and_trailing_rest() {
        let result = attribute(json!([
            {"id": "Rest", "countdown": 5},
            {"id": "Rest", "countdown": 30},
            {"id": "squat"},
            {"id": "Rest", "countdown": 40}
        ]));
        assert_eq!(result, vec![("squat".to_string(), 30)]);
    }

    #[test]
    fn test_payload_overwrites_rest_duration() {
        let owned = objects(json!([{"id": "squat", "rest_duration": 99}]));
        let refs: Vec<&JsonObject> = owned.iter().collect();
        let item = attribute_rest_durations(&refs).remove(0);

        assert_eq!(item.original["rest_duration"], json!(99));
        assert_eq!(item.into_payload()["rest_duration"], json!(0));
    }
}
