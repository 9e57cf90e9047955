//! Decoded, self-describing values.
//!
//! Decoding an envelope cannot produce a monomorphic Rust type chosen at runtime, so the decoder
//! returns a [`Value`]: a sum type mirroring [`Shape`] whose leaves are typed scalars and
//! registered struct instances. Every non-nil value knows its own shape, which is what lets a
//! decoded value sit in an `any` slot and be encoded again unchanged.
//!
//! ## Usage Patterns
//!
//! ### Inspecting decoded data
//!
//! ```rust
//! use serde_envelope::{from_str, Registry, Value};
//!
//! let registry = Registry::new();
//! let value = from_str(r#"{"_t":"[]int32","v":[1,2,3]}"#, &registry).unwrap();
//!
//! if let Value::Sequence(_, items) = &value {
//!     assert_eq!(items.len(), 3);
//!     assert_eq!(items[0].as_i64(), Some(1));
//! }
//! ```
//!
//! ### Extracting a static type
//!
//! ```rust
//! use serde_envelope::{from_str, Registry, Tagged};
//!
//! let registry = Registry::new();
//! let value = from_str(r#"{"_t":"[]int32","v":[1,2,3]}"#, &registry).unwrap();
//!
//! let numbers = Vec::<i32>::from_value(value).unwrap();
//! assert_eq!(numbers, vec![1, 2, 3]);
//! ```

use crate::shape::Primitive;
use crate::tagged::Object;
use crate::{Error, Result, Shape, ValueMap};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::any::Any;
use std::fmt;

/// A typed leaf scalar.
///
/// Unlike a JSON number, a scalar remembers its exact width so that `int8` and `int64`
/// payloads decode back to the Rust types they were encoded from.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(isize),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Uint(usize),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Float32(f32),
    Float64(f64),
    String(String),
}

impl Scalar {
    #[must_use]
    pub fn kind(&self) -> Primitive {
        match self {
            Scalar::Bool(_) => Primitive::Bool,
            Scalar::Int(_) => Primitive::Int,
            Scalar::Int8(_) => Primitive::Int8,
            Scalar::Int16(_) => Primitive::Int16,
            Scalar::Int32(_) => Primitive::Int32,
            Scalar::Int64(_) => Primitive::Int64,
            Scalar::Uint(_) => Primitive::Uint,
            Scalar::Uint8(_) => Primitive::Uint8,
            Scalar::Uint16(_) => Primitive::Uint16,
            Scalar::Uint32(_) => Primitive::Uint32,
            Scalar::Uint64(_) => Primitive::Uint64,
            Scalar::Float32(_) => Primitive::Float32,
            Scalar::Float64(_) => Primitive::Float64,
            Scalar::String(_) => Primitive::String,
        }
    }

    /// Converts the scalar into its JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedShape`] for NaN and infinite floats, which JSON cannot carry.
    pub fn to_json(&self) -> Result<JsonValue> {
        Ok(match self {
            Scalar::Bool(v) => JsonValue::Bool(*v),
            Scalar::Int(v) => JsonValue::from(*v as i64),
            Scalar::Int8(v) => JsonValue::from(*v),
            Scalar::Int16(v) => JsonValue::from(*v),
            Scalar::Int32(v) => JsonValue::from(*v),
            Scalar::Int64(v) => JsonValue::from(*v),
            Scalar::Uint(v) => JsonValue::from(*v as u64),
            Scalar::Uint8(v) => JsonValue::from(*v),
            Scalar::Uint16(v) => JsonValue::from(*v),
            Scalar::Uint32(v) => JsonValue::from(*v),
            Scalar::Uint64(v) => JsonValue::from(*v),
            Scalar::Float32(v) => float32_to_json(*v)?,
            Scalar::Float64(v) => float64_to_json(*v)?,
            Scalar::String(v) => JsonValue::String(v.clone()),
        })
    }

    /// Reads a scalar of the given kind from a JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedPayload`] when the payload does not hold a value of `kind`.
    pub fn from_json(kind: Primitive, json: &JsonValue) -> Result<Scalar> {
        fn read<'a, T: Deserialize<'a>>(kind: Primitive, json: &'a JsonValue) -> Result<T> {
            T::deserialize(json).map_err(|e| Error::malformed(kind.name(), e))
        }

        Ok(match kind {
            Primitive::Bool => Scalar::Bool(read(kind, json)?),
            Primitive::Int => Scalar::Int(read(kind, json)?),
            Primitive::Int8 => Scalar::Int8(read(kind, json)?),
            Primitive::Int16 => Scalar::Int16(read(kind, json)?),
            Primitive::Int32 => Scalar::Int32(read(kind, json)?),
            Primitive::Int64 => Scalar::Int64(read(kind, json)?),
            Primitive::Uint => Scalar::Uint(read(kind, json)?),
            Primitive::Uint8 => Scalar::Uint8(read(kind, json)?),
            Primitive::Uint16 => Scalar::Uint16(read(kind, json)?),
            Primitive::Uint32 => Scalar::Uint32(read(kind, json)?),
            Primitive::Uint64 => Scalar::Uint64(read(kind, json)?),
            Primitive::Float32 => Scalar::Float32(read(kind, json)?),
            Primitive::Float64 => Scalar::Float64(read(kind, json)?),
            Primitive::String => Scalar::String(read(kind, json)?),
        })
    }

    /// Text form used when the scalar is a map key.
    #[must_use]
    pub fn to_key(&self) -> String {
        match self {
            Scalar::String(v) => v.clone(),
            other => other.to_string(),
        }
    }

    /// Parses a map key of the given kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Custom`] with the parse failure when `key` is not a valid `kind`.
    pub fn from_key(kind: Primitive, key: &str) -> Result<Scalar> {
        fn parse<T: std::str::FromStr>(kind: Primitive, key: &str) -> Result<T> {
            key.parse()
                .map_err(|_| Error::custom(format!("invalid {} map key {:?}", kind, key)))
        }

        Ok(match kind {
            Primitive::Bool => Scalar::Bool(parse(kind, key)?),
            Primitive::Int => Scalar::Int(parse(kind, key)?),
            Primitive::Int8 => Scalar::Int8(parse(kind, key)?),
            Primitive::Int16 => Scalar::Int16(parse(kind, key)?),
            Primitive::Int32 => Scalar::Int32(parse(kind, key)?),
            Primitive::Int64 => Scalar::Int64(parse(kind, key)?),
            Primitive::Uint => Scalar::Uint(parse(kind, key)?),
            Primitive::Uint8 => Scalar::Uint8(parse(kind, key)?),
            Primitive::Uint16 => Scalar::Uint16(parse(kind, key)?),
            Primitive::Uint32 => Scalar::Uint32(parse(kind, key)?),
            Primitive::Uint64 => Scalar::Uint64(parse(kind, key)?),
            Primitive::Float32 => Scalar::Float32(parse(kind, key)?),
            Primitive::Float64 => Scalar::Float64(parse(kind, key)?),
            Primitive::String => Scalar::String(key.to_string()),
        })
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(v) => write!(f, "{}", v),
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::Int8(v) => write!(f, "{}", v),
            Scalar::Int16(v) => write!(f, "{}", v),
            Scalar::Int32(v) => write!(f, "{}", v),
            Scalar::Int64(v) => write!(f, "{}", v),
            Scalar::Uint(v) => write!(f, "{}", v),
            Scalar::Uint8(v) => write!(f, "{}", v),
            Scalar::Uint16(v) => write!(f, "{}", v),
            Scalar::Uint32(v) => write!(f, "{}", v),
            Scalar::Uint64(v) => write!(f, "{}", v),
            Scalar::Float32(v) => write!(f, "{}", v),
            Scalar::Float64(v) => write!(f, "{}", v),
            Scalar::String(v) => f.write_str(v),
        }
    }
}

/// JSON numbers are `f64`; going through the shortest `f32` text keeps `11.1f32` as `11.1`
/// instead of `11.100000381469727`.
pub(crate) fn float32_to_json(v: f32) -> Result<JsonValue> {
    let widened: f64 = v.to_string().parse().unwrap_or(v as f64);
    float64_to_json(widened)
}

pub(crate) fn float64_to_json(v: f64) -> Result<JsonValue> {
    serde_json::Number::from_f64(v)
        .map(JsonValue::Number)
        .ok_or_else(|| Error::unsupported_shape(&format!("non-finite float {}", v)))
}

/// A decoded value.
///
/// # Examples
///
/// ```rust
/// use serde_envelope::{Primitive, Shape, Value};
///
/// let value = Value::Pointer(
///     Shape::Primitive(Primitive::Int32),
///     Some(Box::new(Value::from(7i32))),
/// );
/// assert_eq!(value.shape().unwrap().name().unwrap(), "*int32");
/// assert_eq!(value.deref().unwrap(), Value::from(7i32));
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    /// An empty `any` slot.
    #[default]
    Nil,
    Scalar(Scalar),
    /// A pointer: the pointee shape and, unless nil, the pointee.
    Pointer(Shape, Option<Box<Value>>),
    /// A sequence: the element shape and the elements.
    Sequence(Shape, Vec<Value>),
    /// A mapping: key shape, value shape and entries keyed by text.
    Mapping(Shape, Shape, ValueMap),
    /// A registered struct instance.
    Struct(Box<dyn Object>),
}

impl Value {
    /// Returns the shape of this value, or `None` for [`Value::Nil`].
    #[must_use]
    pub fn shape(&self) -> Option<Shape> {
        match self {
            Value::Nil => None,
            Value::Scalar(s) => Some(Shape::Primitive(s.kind())),
            Value::Pointer(inner, _) => Some(Shape::pointer(inner.clone())),
            Value::Sequence(element, _) => Some(Shape::sequence(element.clone())),
            Value::Mapping(key, value, _) => Some(Shape::mapping(key.clone(), value.clone())),
            Value::Struct(object) => Some(object.object_shape()),
        }
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Removes exactly one level of pointer indirection.
    ///
    /// A nil pointer dereferences to [`Value::Nil`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::DereferenceError`] if the value is not a pointer.
    #[allow(clippy::should_implement_trait)]
    pub fn deref(self) -> Result<Value> {
        match self {
            Value::Pointer(_, Some(inner)) => Ok(*inner),
            Value::Pointer(_, None) => Ok(Value::Nil),
            other => Err(Error::DereferenceError(other.describe())),
        }
    }

    #[must_use]
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Scalar(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Returns any integer scalar that fits in an `i64`.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self.as_scalar()? {
            Scalar::Int(v) => i64::try_from(*v).ok(),
            Scalar::Int8(v) => Some(i64::from(*v)),
            Scalar::Int16(v) => Some(i64::from(*v)),
            Scalar::Int32(v) => Some(i64::from(*v)),
            Scalar::Int64(v) => Some(*v),
            Scalar::Uint(v) => i64::try_from(*v).ok(),
            Scalar::Uint8(v) => Some(i64::from(*v)),
            Scalar::Uint16(v) => Some(i64::from(*v)),
            Scalar::Uint32(v) => Some(i64::from(*v)),
            Scalar::Uint64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self.as_scalar()? {
            Scalar::Float32(v) => Some(f64::from(*v)),
            Scalar::Float64(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(_, items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_mapping(&self) -> Option<&ValueMap> {
        match self {
            Value::Mapping(_, _, entries) => Some(entries),
            _ => None,
        }
    }

    /// Borrows the struct held by this value as `T`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde::{Deserialize, Serialize};
    /// use serde_envelope::{Tagged, Value};
    ///
    /// #[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
    /// struct Point { x: i32 }
    /// serde_envelope::tagged!(Point => "geo.Point");
    ///
    /// let value = Point { x: 3 }.into_value();
    /// assert_eq!(value.downcast_ref::<Point>(), Some(&Point { x: 3 }));
    /// ```
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Struct(object) => object.as_any().downcast_ref(),
            _ => None,
        }
    }

    /// Short description for error messages: the type name, or `nil`.
    pub(crate) fn describe(&self) -> String {
        self.shape()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "nil".to_string())
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}

macro_rules! value_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Scalar(Scalar::$variant(v))
                }
            }
        )*
    };
}

value_from_scalar! {
    bool => Bool,
    isize => Int,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    usize => Uint,
    u8 => Uint8,
    u16 => Uint16,
    u32 => Uint32,
    u64 => Uint64,
    f32 => Float32,
    f64 => Float64,
    String => String,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Scalar(Scalar::String(v.to_string()))
    }
}
