//! Profile validation — presence checks over the submitted payload.
//!
//! The validator is a pure function of the payload: no type coercion, no
//! range checks, no side effects. A weight of "abc" passes; an absent or
//! empty weight does not.

use serde_json::Value;

use crate::error::ValidationError;

/// Required profile fields, in the order they are checked.
///
/// Order is a contract: the first missing or empty field in this list names
/// the 400 response, regardless of any later gaps.
pub const REQUIRED_FIELDS: [&str; 10] = [
    "email",
    "fitness_goal",
    "training_location",
    "weight",
    "fitness_level",
    "diet_level",
    "height",
    "age",
    "sleep_hours",
    "training_frequency",
];

/// A validated user profile. Request-scoped; never persisted.
#[derive(Debug, Clone)]
pub struct Profile {
    pub email: String,
    pub fitness_goal: String,
    pub training_location: String,
    pub weight: String,
    pub fitness_level: String,
    pub diet_level: String,
    pub height: String,
    pub age: String,
    pub sleep_hours: String,
    pub training_frequency: String,
    /// `None` is the explicit absence marker — never an empty string.
    pub equipment: Option<String>,
    pub additional_info: Option<String>,
}

impl Profile {
    /// Validate an untyped payload into a `Profile`.
    ///
    /// First-match-wins: the error names the first required field (in
    /// `REQUIRED_FIELDS` order) that is missing or falsy. A non-object
    /// payload validates as if every field were missing.
    pub fn validate(payload: &Value) -> Result<Self, ValidationError> {
        let empty = serde_json::Map::new();
        let map = payload.as_object().unwrap_or(&empty);

        for field in REQUIRED_FIELDS {
            if map.get(field).is_none_or(is_falsy) {
                return Err(ValidationError::new(field));
            }
        }

        let get = |name: &str| value_to_string(&map[name]);
        let get_opt = |name: &str| {
            map.get(name)
                .filter(|v| !v.is_null())
                .map(value_to_string)
        };

        Ok(Self {
            email: get("email"),
            fitness_goal: get("fitness_goal"),
            training_location: get("training_location"),
            weight: get("weight"),
            fitness_level: get("fitness_level"),
            diet_level: get("diet_level"),
            height: get("height"),
            age: get("age"),
            sleep_hours: get("sleep_hours"),
            training_frequency: get("training_frequency"),
            equipment: get_opt("equipment"),
            additional_info: get_opt("additional_info"),
        })
    }
}

/// Emptiness test for submitted values: null, false, zero, empty string,
/// empty array, and empty object all count as absent.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Render a submitted value the way it was typed: strings as-is, everything
/// else via its JSON representation (75 → "75", true → "true").
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
