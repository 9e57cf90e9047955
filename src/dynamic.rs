//! Open, dynamically typed slots.
//!
//! A [`Dynamic`] is the Rust type of an `any` position. Wherever it appears, in a `Vec`, as a
//! map value, or as a struct field, its content is written as a nested envelope so the decoder
//! can tell what it held. An empty slot is written as `null`.
//!
//! ```rust
//! use serde_envelope::{to_string, Dynamic};
//!
//! let items = vec![Dynamic::nil(), Dynamic::from("2")];
//! assert_eq!(
//!     to_string(&items).unwrap(),
//!     r#"{"_t":"[]any","v":[null,{"_t":"string","v":"2"}]}"#
//! );
//! ```

use crate::scope;
use crate::ser::ENVELOPE_TOKEN;
use crate::shape::Shape;
use crate::{Decoder, Encoder, Result, Tagged, Value};
use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

/// A value whose type is only known at runtime.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Dynamic(pub Value);

impl Dynamic {
    /// An empty slot.
    #[must_use]
    pub fn nil() -> Self {
        Dynamic(Value::Nil)
    }

    /// Wraps any tagged value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_envelope::Dynamic;
    ///
    /// let slot = Dynamic::new(vec![Some(1u8)]);
    /// assert_eq!(slot.shape().unwrap().name().unwrap(), "[]*uint8");
    /// ```
    pub fn new<T: Tagged>(value: T) -> Self {
        Dynamic(value.into_value())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    /// The shape of the held value, `None` when empty.
    #[must_use]
    pub fn shape(&self) -> Option<Shape> {
        self.0.shape()
    }

    #[must_use]
    pub fn value(&self) -> &Value {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> Value {
        self.0
    }

    /// Extracts the held value as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`](crate::Error::TypeMismatch) if the slot holds something else.
    pub fn downcast<T: Tagged>(self) -> Result<T> {
        T::from_value(self.0)
    }
}

impl From<Value> for Dynamic {
    fn from(value: Value) -> Self {
        Dynamic(value)
    }
}

impl From<&str> for Dynamic {
    fn from(value: &str) -> Self {
        Dynamic(Value::from(value))
    }
}

macro_rules! dynamic_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Dynamic {
                fn from(value: $ty) -> Self {
                    Dynamic(Value::from(value))
                }
            }
        )*
    };
}

dynamic_from!(bool, isize, i8, i16, i32, i64, usize, u8, u16, u32, u64, f32, f64, String);

impl Tagged for Dynamic {
    fn shape() -> Shape {
        Shape::Any
    }

    fn value_shape(&self) -> Option<Shape> {
        self.0.shape()
    }

    fn payload(&self, encoder: &Encoder) -> Result<JsonValue> {
        encoder.value_payload(&self.0)
    }

    fn into_value(self) -> Value {
        self.0
    }

    fn from_value(value: Value) -> Result<Self> {
        Ok(Dynamic(value))
    }
}

/// Writes the slot as a nested envelope using the encoder currently in scope.
impl Serialize for Dynamic {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let encoder = scope::current_encoder();
        match encoder.encode_value(&self.0) {
            Ok(Some(envelope)) => serializer.serialize_newtype_struct(ENVELOPE_TOKEN, &envelope),
            Ok(None) => serializer.serialize_none(),
            Err(e) => {
                scope::stash(e.clone());
                Err(ser::Error::custom(e))
            }
        }
    }
}

/// Reads a nested envelope, resolving its type through the decoder currently in scope.
///
/// Outside a decode call only the built-in type names resolve.
impl<'de> Deserialize<'de> for Dynamic {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let json = JsonValue::deserialize(deserializer)?;
        let (decoder, depth) = scope::current_decoder().unwrap_or_else(|| (Decoder::default(), 0));
        decoder
            .read_envelope(&json, depth)
            .map(Dynamic)
            .map_err(|e| {
                scope::stash(e.clone());
                de::Error::custom(e)
            })
    }
}
