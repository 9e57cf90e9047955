//! Envelope encoding.
//!
//! The [`Encoder`] turns a value into an [`Envelope`]: the canonical name of the value's
//! static type plus a JSON payload. The payload is produced by [`PayloadSerializer`], a serde
//! serializer that builds a `serde_json::Value` with a few rules of its own:
//!
//! - **Nested `any` slots**: a [`Dynamic`](crate::Dynamic) becomes its own envelope
//! - **Map keys**: must be scalars, are written as text and emitted in sorted order
//! - **Default omission**: with [`EncodeOptions::omit_defaults`], struct fields holding
//!   `null`, `false`, `0` or `""` are dropped
//! - **Fixed-size arrays**: written like slices
//! - **Unsupported kinds**: enums, tuple structs, unit values and 128-bit integers fail with
//!   [`Error::UnsupportedShape`]
//!
//! ## Usage
//!
//! Most users should use the functions in the crate root:
//!
//! ```rust
//! use serde_envelope::{to_string, to_string_with_options, EncodeOptions};
//!
//! assert_eq!(to_string(&1isize).unwrap(), r#"{"_t":"int","v":1}"#);
//! assert_eq!(to_string(&None::<String>).unwrap(), "");
//! ```
//!
//! ## Direct Encoder Usage
//!
//! ```rust
//! use serde_envelope::{EncodeOptions, Encoder};
//! use std::collections::HashMap;
//!
//! let encoder = Encoder::new(EncodeOptions::new());
//!
//! let mut scores = HashMap::new();
//! scores.insert("b".to_string(), 2u8);
//! scores.insert("a".to_string(), 1u8);
//!
//! let envelope = encoder.encode(&scores).unwrap().unwrap();
//! assert_eq!(envelope.type_name, "map[string]uint8");
//! assert_eq!(envelope.value.to_string(), r#"{"a":1,"b":2}"#);
//! ```

use crate::scope;
use crate::value::{float32_to_json, float64_to_json};
use crate::{EncodeOptions, Envelope, Error, Result, Shape, Tagged, Value};
use serde::ser::{self, Impossible, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Newtype-struct name marking a nested envelope, which is copied into the payload as is.
pub(crate) const ENVELOPE_TOKEN: &str = "$serde_envelope::Envelope";

/// Wraps values in envelopes.
///
/// An encoder holds only its options; it is cheap to clone and can be shared across threads.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Encoder {
    options: EncodeOptions,
}

impl Encoder {
    pub fn new(options: EncodeOptions) -> Self {
        Encoder { options }
    }

    #[must_use]
    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    /// Encodes a statically typed value.
    ///
    /// Returns `Ok(None)` when there is nothing to encode: a `None`, an empty
    /// [`Dynamic`](crate::Dynamic), or any value whose payload is `null`.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedMapKey`] if a map in the value is keyed by a non-scalar
    /// - [`Error::UnsupportedShape`] for enums, tuple structs, unit values, 128-bit integers
    ///   and non-finite floats
    pub fn encode<T: Tagged>(&self, value: &T) -> Result<Option<Envelope>> {
        let Some(shape) = value.value_shape() else {
            return Ok(None);
        };
        let type_name = shape.name()?;
        let payload = value.payload(self)?;
        Ok(self.wrap(type_name, payload))
    }

    /// Encodes a decoded [`Value`], typically to send it back out unchanged.
    ///
    /// # Errors
    ///
    /// Same as [`Encoder::encode`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_envelope::{Encoder, Primitive, Shape, Value};
    ///
    /// let value = Value::Sequence(Shape::Any, vec![Value::Nil, Value::from("2")]);
    /// let envelope = Encoder::default().encode_value(&value).unwrap().unwrap();
    ///
    /// assert_eq!(envelope.type_name, "[]any");
    /// assert_eq!(envelope.value.to_string(), r#"[null,{"_t":"string","v":"2"}]"#);
    /// ```
    pub fn encode_value(&self, value: &Value) -> Result<Option<Envelope>> {
        let Some(shape) = value.shape() else {
            return Ok(None);
        };
        let type_name = shape.name()?;
        let payload = self.value_payload(value)?;
        Ok(self.wrap(type_name, payload))
    }

    fn wrap(&self, type_name: String, payload: JsonValue) -> Option<Envelope> {
        if payload.is_null() {
            return None;
        }
        log::trace!("encoded envelope {}", type_name);
        Some(Envelope::new(type_name, payload))
    }

    /// Serializes `value` into a payload with this encoder's options.
    ///
    /// `Dynamic` slots reached along the way are written by this encoder too.
    ///
    /// # Errors
    ///
    /// Same as [`Encoder::encode`].
    pub fn serialize_payload<T: ?Sized + Serialize>(&self, value: &T) -> Result<JsonValue> {
        let _guard = scope::enter_encoder(self);
        scope::take_stashed();
        value
            .serialize(PayloadSerializer::new(&self.options))
            .map_err(|e| scope::take_stashed().unwrap_or(e))
    }

    /// The payload of a decoded [`Value`].
    ///
    /// # Errors
    ///
    /// Same as [`Encoder::encode`].
    pub fn value_payload(&self, value: &Value) -> Result<JsonValue> {
        match value {
            Value::Nil | Value::Pointer(_, None) => Ok(JsonValue::Null),
            Value::Scalar(scalar) => scalar.to_json(),
            Value::Pointer(_, Some(inner)) => self.value_payload(inner),
            Value::Sequence(element, items) => {
                let items = items
                    .iter()
                    .map(|item| self.slot_payload(element, item))
                    .collect::<Result<Vec<_>>>()?;
                Ok(JsonValue::Array(items))
            }
            Value::Mapping(key, element, entries) => {
                if !key.is_map_key() {
                    return Err(Error::unsupported_map_key(&format!(
                        "map keys cannot be {}",
                        key.kind()
                    )));
                }
                let mut object = Map::with_capacity(entries.len());
                for (k, item) in entries.sorted() {
                    object.insert(k.clone(), self.slot_payload(element, item)?);
                }
                Ok(JsonValue::Object(object))
            }
            Value::Struct(object) => object.object_payload(self),
        }
    }

    /// Payload of a container element: a nested envelope when the element shape is `any`.
    fn slot_payload(&self, shape: &Shape, item: &Value) -> Result<JsonValue> {
        if shape.is_any() {
            Ok(self
                .encode_value(item)?
                .map_or(JsonValue::Null, |envelope| envelope.to_json()))
        } else {
            self.value_payload(item)
        }
    }
}

/// The payload serializer.
///
/// Produces a `serde_json::Value` from anything implementing `Serialize`.
#[derive(Clone, Copy, Debug)]
pub struct PayloadSerializer {
    omit_defaults: bool,
}

impl PayloadSerializer {
    pub fn new(options: &EncodeOptions) -> Self {
        PayloadSerializer {
            omit_defaults: options.omit_defaults,
        }
    }
}

fn unsupported(what: &str) -> Error {
    Error::unsupported_shape(&format!("cannot encode {}", what))
}

impl ser::Serializer for PayloadSerializer {
    type Ok = JsonValue;
    type Error = Error;

    type SerializeSeq = SeqSerializer;
    type SerializeTuple = SeqSerializer;
    type SerializeTupleStruct = Impossible<JsonValue, Error>;
    type SerializeTupleVariant = Impossible<JsonValue, Error>;
    type SerializeMap = MapSerializer;
    type SerializeStruct = StructSerializer;
    type SerializeStructVariant = Impossible<JsonValue, Error>;

    fn serialize_bool(self, v: bool) -> Result<JsonValue> {
        Ok(JsonValue::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<JsonValue> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<JsonValue> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<JsonValue> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<JsonValue> {
        Ok(JsonValue::from(v))
    }

    fn serialize_i128(self, _v: i128) -> Result<JsonValue> {
        Err(unsupported("128-bit integers"))
    }

    fn serialize_u8(self, v: u8) -> Result<JsonValue> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<JsonValue> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<JsonValue> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<JsonValue> {
        Ok(JsonValue::from(v))
    }

    fn serialize_u128(self, _v: u128) -> Result<JsonValue> {
        Err(unsupported("128-bit integers"))
    }

    fn serialize_f32(self, v: f32) -> Result<JsonValue> {
        float32_to_json(v)
    }

    fn serialize_f64(self, v: f64) -> Result<JsonValue> {
        float64_to_json(v)
    }

    fn serialize_char(self, v: char) -> Result<JsonValue> {
        Ok(JsonValue::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<JsonValue> {
        Ok(JsonValue::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<JsonValue> {
        Ok(JsonValue::Array(v.iter().map(|b| JsonValue::from(*b)).collect()))
    }

    fn serialize_none(self) -> Result<JsonValue> {
        Ok(JsonValue::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<JsonValue>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<JsonValue> {
        Err(unsupported("unit values"))
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<JsonValue> {
        Err(unsupported(&format!("unit struct {}", name)))
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<JsonValue> {
        Err(unsupported(&format!("enum {}", name)))
    }

    fn serialize_newtype_struct<T>(self, name: &'static str, value: &T) -> Result<JsonValue>
    where
        T: ?Sized + Serialize,
    {
        if name == ENVELOPE_TOKEN {
            return serde_json::to_value(value).map_err(Error::custom);
        }
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<JsonValue>
    where
        T: ?Sized + Serialize,
    {
        Err(unsupported(&format!("enum {}", name)))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(SeqSerializer {
            ser: self,
            elements: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    /// Fixed-size arrays arrive here.
    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(unsupported(&format!("tuple struct {}", name)))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(unsupported(&format!("enum {}", name)))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(MapSerializer {
            ser: self,
            entries: Vec::with_capacity(len.unwrap_or(0)),
            current_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<Self::SerializeStruct> {
        Ok(StructSerializer {
            ser: self,
            fields: Map::with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(unsupported(&format!("enum {}", name)))
    }
}

pub struct SeqSerializer {
    ser: PayloadSerializer,
    elements: Vec<JsonValue>,
}

impl ser::SerializeSeq for SeqSerializer {
    type Ok = JsonValue;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.elements.push(value.serialize(self.ser)?);
        Ok(())
    }

    fn end(self) -> Result<JsonValue> {
        Ok(JsonValue::Array(self.elements))
    }
}

impl ser::SerializeTuple for SeqSerializer {
    type Ok = JsonValue;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<JsonValue> {
        ser::SerializeSeq::end(self)
    }
}

pub struct MapSerializer {
    ser: PayloadSerializer,
    entries: Vec<(String, JsonValue)>,
    current_key: Option<String>,
}

impl ser::SerializeMap for MapSerializer {
    type Ok = JsonValue;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.current_key = Some(key.serialize(MapKeySerializer)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.entries.push((key, value.serialize(self.ser)?));
        Ok(())
    }

    fn end(mut self) -> Result<JsonValue> {
        self.entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(JsonValue::Object(self.entries.into_iter().collect()))
    }
}

pub struct StructSerializer {
    ser: PayloadSerializer,
    fields: Map<String, JsonValue>,
}

impl ser::SerializeStruct for StructSerializer {
    type Ok = JsonValue;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let value = value.serialize(self.ser)?;
        if self.ser.omit_defaults && is_default(&value) {
            return Ok(());
        }
        self.fields.insert(key.to_string(), value);
        Ok(())
    }

    fn end(self) -> Result<JsonValue> {
        Ok(JsonValue::Object(self.fields))
    }
}

/// `null`, `false`, zero and the empty string. Containers are always kept.
fn is_default(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::Bool(b) => !b,
        JsonValue::Number(n) => n.as_f64() == Some(0.0),
        JsonValue::String(s) => s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => false,
    }
}

/// Writes map keys as text. Anything that is not a scalar is rejected.
struct MapKeySerializer;

fn key_rejected(kind: &str) -> Error {
    Error::unsupported_map_key(&format!("map keys cannot be {}", kind))
}

impl ser::Serializer for MapKeySerializer {
    type Ok = String;
    type Error = Error;

    type SerializeSeq = Impossible<String, Error>;
    type SerializeTuple = Impossible<String, Error>;
    type SerializeTupleStruct = Impossible<String, Error>;
    type SerializeTupleVariant = Impossible<String, Error>;
    type SerializeMap = Impossible<String, Error>;
    type SerializeStruct = Impossible<String, Error>;
    type SerializeStructVariant = Impossible<String, Error>;

    fn serialize_bool(self, v: bool) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i8(self, v: i8) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i16(self, v: i16) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i32(self, v: i32) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i64(self, v: i64) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i128(self, _v: i128) -> Result<String> {
        Err(unsupported("128-bit integers"))
    }

    fn serialize_u8(self, v: u8) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u16(self, v: u16) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u32(self, v: u32) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u64(self, v: u64) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u128(self, _v: u128) -> Result<String> {
        Err(unsupported("128-bit integers"))
    }

    fn serialize_f32(self, v: f32) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_f64(self, v: f64) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_char(self, v: char) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<String> {
        Err(key_rejected("slices"))
    }

    fn serialize_none(self) -> Result<String> {
        Err(key_rejected("pointers"))
    }

    fn serialize_some<T>(self, _value: &T) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        Err(key_rejected("pointers"))
    }

    fn serialize_unit(self) -> Result<String> {
        Err(key_rejected("unit values"))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String> {
        Err(key_rejected("structs"))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<String> {
        Err(key_rejected("enums"))
    }

    fn serialize_newtype_struct<T>(self, name: &'static str, value: &T) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        if name == ENVELOPE_TOKEN {
            return Err(key_rejected("any"));
        }
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        Err(key_rejected("enums"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(key_rejected("slices"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(key_rejected("tuples"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(key_rejected("structs"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(key_rejected("enums"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(key_rejected("maps"))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(key_rejected("structs"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(key_rejected("enums"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dynamic;
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use std::collections::{BTreeMap, HashMap};

    #[derive(Serialize, Deserialize, Clone, PartialEq, Debug, Default)]
    #[serde(default)]
    struct Sample {
        name: String,
        count: u32,
        ratio: f32,
        flag: bool,
        tags: Vec<String>,
        #[serde(skip)]
        cache: i32,
        #[serde(rename = "opt")]
        maybe: Option<i64>,
    }
    crate::tagged!(Sample => "pkg.Sample");

    #[derive(Serialize, Deserialize, Clone, PartialEq, Debug, Eq, Hash, PartialOrd, Ord)]
    struct Key {
        id: i32,
    }

    #[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
    struct KeyedByStruct {
        entries: HashMap<Key, i32>,
    }
    crate::tagged!(KeyedByStruct => "pkg.KeyedByStruct");

    #[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
    enum Color {
        Red,
    }

    #[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
    struct Painted {
        color: Color,
    }
    crate::tagged!(Painted => "pkg.Painted");

    #[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
    struct Rgb {
        channels: [u8; 3],
    }
    crate::tagged!(Rgb => "pkg.Rgb");

    #[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
    struct Counter {
        hits: u128,
    }
    crate::tagged!(Counter => "pkg.Counter");

    fn payload<T: Tagged>(value: &T) -> JsonValue {
        Encoder::default().encode(value).unwrap().unwrap().value
    }

    #[test]
    fn test_struct_fields_in_declaration_order() {
        let sample = Sample {
            name: "n".to_string(),
            count: 2,
            cache: 9,
            ..Sample::default()
        };
        let envelope = Encoder::default().encode(&sample).unwrap().unwrap();
        assert_eq!(envelope.type_name, "pkg.Sample");
        assert_eq!(
            envelope.value.to_string(),
            r#"{"name":"n","count":2,"ratio":0.0,"flag":false,"tags":[],"opt":null}"#
        );
    }

    #[test]
    fn test_omit_defaults() {
        let encoder = Encoder::new(EncodeOptions::compact());
        let sample = Sample {
            count: 3,
            ratio: 11.1,
            ..Sample::default()
        };
        let envelope = encoder.encode(&sample).unwrap().unwrap();
        assert_eq!(envelope.value, json!({"count": 3, "ratio": 11.1, "tags": []}));
    }

    #[test]
    fn test_root_values_are_never_omitted() {
        let encoder = Encoder::new(EncodeOptions::compact());
        let envelope = encoder.encode(&0i32).unwrap().unwrap();
        assert_eq!(envelope.value, json!(0));
    }

    #[test]
    fn test_nil_roots() {
        let encoder = Encoder::default();
        assert_eq!(encoder.encode(&None::<Sample>).unwrap(), None);
        assert_eq!(encoder.encode(&Dynamic::nil()).unwrap(), None);
    }

    #[test]
    fn test_map_keys_sorted_and_textual() {
        let mut map = HashMap::new();
        map.insert(10i32, true);
        map.insert(2i32, false);
        map.insert(-1i32, true);
        assert_eq!(payload(&map).to_string(), r#"{"-1":true,"10":true,"2":false}"#);
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(payload(&Vec::<Sample>::new()), json!([]));
        assert_eq!(payload(&BTreeMap::<String, Sample>::new()), json!({}));
    }

    #[test]
    fn test_any_values_in_maps() {
        let mut map = BTreeMap::new();
        map.insert("1".to_string(), Dynamic::nil());
        map.insert("2".to_string(), Dynamic::nil());
        let envelope = Encoder::default().encode(&map).unwrap().unwrap();
        assert_eq!(envelope.type_name, "map[string]any");
        assert_eq!(envelope.value.to_string(), r#"{"1":null,"2":null}"#);
    }

    #[test]
    fn test_nested_envelope_keeps_field_order() {
        let inner = Sample {
            name: "z".to_string(),
            count: 1,
            ..Sample::default()
        };
        let items = vec![Dynamic::new(inner)];
        let envelope = Encoder::new(EncodeOptions::compact())
            .encode(&items)
            .unwrap()
            .unwrap();
        assert_eq!(
            envelope.value.to_string(),
            r#"[{"_t":"pkg.Sample","v":{"name":"z","count":1,"tags":[]}}]"#
        );
    }

    #[test]
    fn test_struct_keys_rejected() {
        let mut entries = HashMap::new();
        entries.insert(Key { id: 1 }, 1);
        let err = Encoder::default()
            .encode(&KeyedByStruct { entries })
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedMapKey(msg) if msg.contains("structs")));
    }

    #[test]
    fn test_enums_rejected() {
        let err = Encoder::default()
            .encode(&Painted { color: Color::Red })
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedShape(_)));
    }

    #[test]
    fn test_arrays_written_as_slices() {
        let envelope = Encoder::default()
            .encode(&Rgb { channels: [1, 2, 3] })
            .unwrap()
            .unwrap();
        assert_eq!(envelope.value, json!({"channels": [1, 2, 3]}));

        let envelope = Encoder::default().encode(&[Some(1i8), None]).unwrap().unwrap();
        assert_eq!(envelope.type_name, "[]*int8");
        assert_eq!(envelope.value, json!([1, null]));
    }

    #[test]
    fn test_wide_integers_rejected() {
        let err = Encoder::default().encode(&Counter { hits: 1 }).unwrap_err();
        assert!(matches!(err, Error::UnsupportedShape(msg) if msg.contains("128-bit")));
    }

    #[test]
    fn test_non_finite_float_rejected() {
        let err = Encoder::default().encode(&f64::INFINITY).unwrap_err();
        assert!(matches!(err, Error::UnsupportedShape(_)));
    }

    #[test]
    fn test_nested_slot_error_keeps_variant() {
        let bad = Value::Mapping(
            Shape::structure("pkg.Key"),
            Shape::Any,
            crate::ValueMap::new(),
        );
        let err = Encoder::default()
            .encode(&vec![Dynamic::from(bad)])
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedMapKey(_)));
    }

    #[test]
    fn test_float32_shortest_form() {
        assert_eq!(payload(&vec![11.1f32, 0.5]).to_string(), "[11.1,0.5]");
    }
}
