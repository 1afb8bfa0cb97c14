//! Optional user profile forwarded to the embedded experience

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lifestyle {
    Sedentary,
    #[serde(rename = "Slightly Active")]
    SlightlyActive,
    Active,
    #[serde(rename = "Very Active")]
    VeryActive,
}

impl Lifestyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lifestyle::Sedentary => "Sedentary",
            Lifestyle::SlightlyActive => "Slightly Active",
            Lifestyle::Active => "Active",
            Lifestyle::VeryActive => "Very Active",
        }
    }
}

impl fmt::Display for Lifestyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Height in centimetres, weight in kilograms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDetails {
    pub age: u32,
    pub height: u32,
    pub weight: u32,
    pub gender: Gender,
    pub lifestyle: Lifestyle,
}

impl UserDetails {
    /// Writes the profile fields into a session payload, replacing existing keys.
    pub fn merge_into(&self, payload: &mut Map<String, Value>) {
        payload.insert("age".into(), Value::from(self.age));
        payload.insert("height".into(), Value::from(self.height));
        payload.insert("weight".into(), Value::from(self.weight));
        payload.insert("gender".into(), Value::from(self.gender.as_str()));
        payload.insert("lifestyle".into(), Value::from(self.lifestyle.as_str()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_into_payload() {
        let user = UserDetails {
            age: 31,
            height: 180,
            weight: 76,
            gender: Gender::Female,
            lifestyle: Lifestyle::SlightlyActive,
        };
        let mut payload = Map::new();
        payload.insert("age".into(), json!(1));
        payload.insert("exercise".into(), json!("squat"));

        user.merge_into(&mut payload);

        assert_eq!(
            Value::Object(payload),
            json!({
                "age": 31,
                "height": 180,
                "weight": 76,
                "gender": "Female",
                "lifestyle": "Slightly Active",
                "exercise": "squat"
            })
        );
    }

    #[test]
    fn test_lifestyle_wire_names() {
        assert_eq!(
            serde_json::to_value(Lifestyle::VeryActive).unwrap(),
            json!("Very Active")
        );
        assert_eq!(Gender::Unknown.to_string(), "Unknown");
    }
}
