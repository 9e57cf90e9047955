//! Static shapes of Rust types.
//!
//! [`Tagged`] ties a Rust type to its [`Shape`]. It is implemented here for the primitive
//! types, `String`, `Option<T>` (a pointer), `Vec<T>` and `[T; N]` (sequences), `HashMap`, `BTreeMap`
//! and `IndexMap` keyed by a [`MapKey`] (a mapping), [`Dynamic`](crate::Dynamic) (an `any`
//! slot) and `chrono::DateTime<Utc>` (the struct `time.Time`). Structs opt in with the
//! [`tagged!`](crate::tagged) macro.
//!
//! | Rust type | Name |
//! |-----------|------|
//! | `bool` | `bool` |
//! | `isize`, `i8` .. `i64` | `int`, `int8` .. `int64` |
//! | `usize`, `u8` .. `u64` | `uint`, `uint8` .. `uint64` |
//! | `f32`, `f64` | `float32`, `float64` |
//! | `String` | `string` |
//! | `Option<T>` | `*T` |
//! | `Vec<T>`, `[T; N]` | `[]T` |
//! | `HashMap<K, V>` | `map[K]V` |
//! | `Dynamic` | `any` |

use crate::shape::Primitive;
use crate::value::Scalar;
use crate::{Encoder, Error, Result, Shape, Value};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;

/// A Rust type with a canonical shape.
///
/// The provided methods implement struct behaviour: a struct becomes a
/// [`Value::Struct`] and is recovered by downcasting. Primitive and container impls
/// override them.
///
/// # Examples
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use serde_envelope::Tagged;
///
/// #[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
/// struct Foo {}
/// serde_envelope::tagged!(Foo => "pkg.Foo");
///
/// assert_eq!(<Vec<Option<Foo>>>::shape().name().unwrap(), "[]*pkg.Foo");
/// ```
pub trait Tagged:
    Serialize + DeserializeOwned + Clone + PartialEq + fmt::Debug + Send + Sync + 'static
{
    /// The static shape of this type.
    fn shape() -> Shape;

    /// The shape of this particular value, `None` when there is nothing to encode.
    ///
    /// Only open slots differ from [`Tagged::shape`].
    fn value_shape(&self) -> Option<Shape> {
        Some(Self::shape())
    }

    /// The JSON payload of this value.
    ///
    /// # Errors
    ///
    /// Propagates [`Encoder`] failures.
    fn payload(&self, encoder: &Encoder) -> Result<JsonValue> {
        encoder.serialize_payload(self)
    }

    fn into_value(self) -> Value {
        Value::Struct(Box::new(self))
    }

    /// Recovers the static type from a decoded value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if `value` does not hold a `Self`.
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Struct(object) => {
                let found = object.object_shape().to_string();
                object
                    .into_any()
                    .downcast::<Self>()
                    .map(|boxed| *boxed)
                    .map_err(|_| mismatch::<Self>(&found))
            }
            other => Err(mismatch::<Self>(&other.describe())),
        }
    }
}

fn mismatch<T: Tagged>(found: &str) -> Error {
    Error::type_mismatch(&T::shape().to_string(), found)
}

/// Type-erased struct instance held by [`Value::Struct`].
pub trait Object: Any + fmt::Debug + Send + Sync {
    fn object_shape(&self) -> Shape;
    fn object_payload(&self, encoder: &Encoder) -> Result<JsonValue>;
    fn clone_object(&self) -> Box<dyn Object>;
    fn eq_object(&self, other: &dyn Object) -> bool;
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Tagged> Object for T {
    fn object_shape(&self) -> Shape {
        T::shape()
    }

    fn object_payload(&self, encoder: &Encoder) -> Result<JsonValue> {
        self.payload(encoder)
    }

    fn clone_object(&self) -> Box<dyn Object> {
        Box::new(self.clone())
    }

    fn eq_object(&self, other: &dyn Object) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .map_or(false, |other| self == other)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

impl Clone for Box<dyn Object> {
    fn clone(&self) -> Self {
        self.clone_object()
    }
}

impl PartialEq for dyn Object {
    fn eq(&self, other: &Self) -> bool {
        self.eq_object(other)
    }
}

/// Types usable as map keys: scalars with a plain-text form.
pub trait MapKey: Tagged + Eq + Hash + Ord {
    fn to_key(&self) -> String;

    /// # Errors
    ///
    /// Returns an error if `key` is not the text form of a `Self`.
    fn from_key(key: &str) -> Result<Self>;
}

macro_rules! tagged_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Tagged for $ty {
                fn shape() -> Shape {
                    Shape::Primitive(Primitive::$variant)
                }

                fn into_value(self) -> Value {
                    Value::Scalar(Scalar::$variant(self))
                }

                fn from_value(value: Value) -> Result<Self> {
                    match value {
                        Value::Scalar(Scalar::$variant(v)) => Ok(v),
                        other => Err(mismatch::<Self>(&other.describe())),
                    }
                }
            }
        )*
    };
}

tagged_scalar! {
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

macro_rules! map_key {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl MapKey for $ty {
                fn to_key(&self) -> String {
                    self.to_string()
                }

                fn from_key(key: &str) -> Result<Self> {
                    Self::from_value(Value::Scalar(Scalar::from_key(Primitive::$variant, key)?))
                }
            }
        )*
    };
}

map_key! {
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
    String => String,
}

impl<T: Tagged> Tagged for Option<T> {
    fn shape() -> Shape {
        Shape::pointer(T::shape())
    }

    fn into_value(self) -> Value {
        Value::Pointer(T::shape(), self.map(|v| Box::new(v.into_value())))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Pointer(_, None) | Value::Nil => Ok(None),
            Value::Pointer(_, Some(inner)) => T::from_value(*inner).map(Some),
            other => Err(mismatch::<Self>(&other.describe())),
        }
    }
}

impl<T: Tagged> Tagged for Vec<T> {
    fn shape() -> Shape {
        Shape::sequence(T::shape())
    }

    fn into_value(self) -> Value {
        Value::Sequence(T::shape(), self.into_iter().map(T::into_value).collect())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Sequence(_, items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch::<Self>(&other.describe())),
        }
    }
}

/// Arrays share the slice name; the length is checked when extracting.
impl<T: Tagged, const N: usize> Tagged for [T; N]
where
    [T; N]: Serialize + DeserializeOwned,
{
    fn shape() -> Shape {
        Shape::sequence(T::shape())
    }

    fn into_value(self) -> Value {
        Value::Sequence(T::shape(), self.into_iter().map(T::into_value).collect())
    }

    fn from_value(value: Value) -> Result<Self> {
        let items = Vec::<T>::from_value(value)?;
        let len = items.len();
        items.try_into().map_err(|_| {
            Error::type_mismatch(
                &format!("[{}]{}", N, T::shape()),
                &format!("[{}]{}", len, T::shape()),
            )
        })
    }
}

macro_rules! tagged_map {
    ($($map:ident),* $(,)?) => {
        $(
            impl<K: MapKey, V: Tagged> Tagged for $map<K, V> {
                fn shape() -> Shape {
                    Shape::mapping(K::shape(), V::shape())
                }

                fn into_value(self) -> Value {
                    let entries = self
                        .into_iter()
                        .map(|(k, v)| (k.to_key(), v.into_value()))
                        .collect();
                    Value::Mapping(K::shape(), V::shape(), entries)
                }

                fn from_value(value: Value) -> Result<Self> {
                    match value {
                        Value::Mapping(_, _, entries) => entries
                            .into_iter()
                            .map(|(k, v)| Ok((K::from_key(&k)?, V::from_value(v)?)))
                            .collect(),
                        other => Err(mismatch::<Self>(&other.describe())),
                    }
                }
            }
        )*
    };
}

tagged_map!(HashMap, BTreeMap, IndexMap);

/// Timestamps travel as `time.Time` with an RFC 3339 payload, and are registered like a struct.
impl Tagged for DateTime<Utc> {
    fn shape() -> Shape {
        Shape::structure("time.Time")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
    struct Foo {
        a: i32,
    }
    crate::tagged!(Foo => "pkg.Foo");

    #[test]
    fn test_static_names() {
        assert_eq!(isize::shape().name().unwrap(), "int");
        assert_eq!(u8::shape().name().unwrap(), "uint8");
        assert_eq!(<Option<String>>::shape().name().unwrap(), "*string");
        assert_eq!(
            <HashMap<String, Vec<Option<Foo>>>>::shape().name().unwrap(),
            "map[string][]*pkg.Foo"
        );
        assert_eq!(
            <BTreeMap<i32, Option<Vec<Foo>>>>::shape().name().unwrap(),
            "map[int32]*[]pkg.Foo"
        );
        assert_eq!(<DateTime<Utc>>::shape().name().unwrap(), "time.Time");
    }

    #[test]
    fn test_value_conversions() {
        let original = vec![Some(Foo { a: 1 }), None];
        let value = original.clone().into_value();
        assert_eq!(
            value.shape().unwrap().name().unwrap(),
            "[]*pkg.Foo"
        );
        assert_eq!(<Vec<Option<Foo>>>::from_value(value).unwrap(), original);
    }

    #[test]
    fn test_map_conversions() {
        let mut original = BTreeMap::new();
        original.insert(7u16, "seven".to_string());
        let value = original.clone().into_value();
        assert_eq!(
            value.as_mapping().and_then(|m| m.get("7")),
            Some(&Value::from("seven"))
        );
        assert_eq!(<BTreeMap<u16, String>>::from_value(value).unwrap(), original);
    }

    #[test]
    fn test_array_conversions() {
        assert_eq!(<[u8; 3]>::shape().name().unwrap(), "[]uint8");

        let value = [1u8, 2, 3].into_value();
        assert_eq!(<[u8; 3]>::from_value(value.clone()).unwrap(), [1, 2, 3]);
        assert_eq!(
            <[u8; 2]>::from_value(value).unwrap_err(),
            Error::type_mismatch("[2]uint8", "[3]uint8")
        );
    }

    #[test]
    fn test_mismatch() {
        let err = i32::from_value(Value::from("x")).unwrap_err();
        assert_eq!(err, Error::type_mismatch("int32", "string"));

        let err = Foo::from_value(Value::from(1i64)).unwrap_err();
        assert_eq!(err, Error::type_mismatch("pkg.Foo", "int64"));
    }

    #[test]
    fn test_object_equality() {
        let a: Box<dyn Object> = Box::new(Foo { a: 1 });
        let b: Box<dyn Object> = Box::new(Foo { a: 1 });
        let c: Box<dyn Object> = Box::new(Foo { a: 2 });
        assert!(a == b);
        assert!(a != c);
        assert!(a.clone() == a);
    }
}
