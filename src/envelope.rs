//! The type-tagged wrapper written around every encoded value.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Key holding the type name.
pub const TYPE_KEY: &str = "_t";

/// Key holding the payload.
pub const VALUE_KEY: &str = "v";

/// A payload together with the canonical name of its type.
///
/// On the wire an envelope is the JSON object `{"_t": <type name>, "v": <payload>}`.
/// A missing `v` reads as `null`.
///
/// # Examples
///
/// ```rust
/// use serde_envelope::Envelope;
/// use serde_json::json;
///
/// let envelope = Envelope::new("int", json!(1));
/// assert_eq!(serde_json::to_string(&envelope).unwrap(), r#"{"_t":"int","v":1}"#);
/// ```
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Envelope {
    #[serde(rename = "_t")]
    pub type_name: String,
    #[serde(rename = "v", default)]
    pub value: JsonValue,
}

impl Envelope {
    pub fn new(type_name: impl Into<String>, value: JsonValue) -> Self {
        Envelope {
            type_name: type_name.into(),
            value,
        }
    }

    /// Reads an envelope out of an already parsed JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedPayload`] if `json` is not an object carrying a string `_t`.
    pub fn from_json(json: &JsonValue) -> Result<Envelope> {
        Envelope::deserialize(json).map_err(|e| Error::malformed("envelope", e))
    }

    /// The envelope as a JSON object, `_t` first.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        let mut object = serde_json::Map::with_capacity(2);
        object.insert(TYPE_KEY.to_string(), JsonValue::String(self.type_name.clone()));
        object.insert(VALUE_KEY.to_string(), self.value.clone());
        JsonValue::Object(object)
    }

    #[must_use]
    pub fn into_parts(self) -> (String, JsonValue) {
        (self.type_name, self.value)
    }
}
