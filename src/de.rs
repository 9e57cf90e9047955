//! Envelope decoding.
//!
//! The [`Decoder`] reads an envelope's type name against a [`Registry`], then walks the payload
//! along the parsed [`Shape`], producing a [`Value`]:
//!
//! - **Pointers** (`*T`): `null` becomes a nil pointer, anything else the pointee
//! - **Sequences** (`[]T`): the payload must be a JSON array
//! - **Mappings** (`map[K]V`): the payload must be a JSON object whose keys parse as `K`
//! - **Leaves**: primitives are read directly, structs by their registered descriptor
//! - **`any` slots**: each item is itself an envelope and is decoded recursively
//!
//! ## Usage
//!
//! Most users should use the functions in the crate root:
//!
//! ```rust
//! use serde_envelope::{from_str, from_str_as, Registry, Value};
//!
//! let registry = Registry::new();
//!
//! let n: isize = from_str_as(r#"{"_t":"int","v":1}"#, &registry).unwrap();
//! assert_eq!(n, 1);
//!
//! let slots = from_str(r#"{"_t":"[]any","v":[null,{"_t":"string","v":"2"}]}"#, &registry).unwrap();
//! assert_eq!(slots.as_sequence().unwrap()[0], Value::Nil);
//! assert_eq!(slots.as_sequence().unwrap()[1].as_str(), Some("2"));
//! ```

use crate::value::Scalar;
use crate::{DecodeOptions, Envelope, Error, Registry, Result, Shape, Tagged, Value, ValueMap};
use serde_json::Value as JsonValue;

/// Unwraps envelopes using the types known to a [`Registry`].
///
/// Decoders hold a registry handle and their options; they are cheap to clone and can be
/// shared across threads.
#[derive(Clone, Debug, Default)]
pub struct Decoder {
    registry: Registry,
    options: DecodeOptions,
}

impl Decoder {
    pub fn new(registry: Registry) -> Self {
        Self::with_options(registry, DecodeOptions::default())
    }

    pub fn with_options(registry: Registry, options: DecodeOptions) -> Self {
        Decoder { registry, options }
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Decodes an envelope into a [`Value`].
    ///
    /// A `null` payload decodes to [`Value::Nil`].
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidTypeName`] if the type name breaks the naming grammar
    /// - [`Error::TypeNotFound`] if a leaf type is not registered
    /// - [`Error::MalformedPayload`] if the payload does not fit the type
    /// - [`Error::RecursionLimit`] if nesting exceeds [`DecodeOptions::max_depth`]
    pub fn decode(&self, envelope: &Envelope) -> Result<Value> {
        self.decode_at(envelope, 0)
    }

    /// Decodes an envelope and extracts it as `T`.
    ///
    /// # Errors
    ///
    /// Everything [`Decoder::decode`] returns, plus [`Error::TypeMismatch`] when the envelope
    /// holds something other than a `T`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_envelope::{Decoder, Envelope, Registry};
    /// use serde_json::json;
    ///
    /// let decoder = Decoder::new(Registry::new());
    /// let envelope = Envelope::new("*[]byte", json!([1, 2]));
    ///
    /// let bytes: Option<Vec<u8>> = decoder.decode_as(&envelope).unwrap();
    /// assert_eq!(bytes, Some(vec![1, 2]));
    /// ```
    pub fn decode_as<T: Tagged>(&self, envelope: &Envelope) -> Result<T> {
        T::from_value(self.decode(envelope)?)
    }

    /// Decodes an envelope given as parsed JSON; `null` decodes to [`Value::Nil`].
    ///
    /// # Errors
    ///
    /// Same as [`Decoder::decode`], plus [`Error::MalformedPayload`] if `json` is not an envelope.
    pub fn decode_json(&self, json: &JsonValue) -> Result<Value> {
        self.read_envelope(json, 0)
    }

    /// Parses a type name against this decoder's registry.
    ///
    /// # Errors
    ///
    /// See [`Shape::parse`].
    pub fn parse_type_name(&self, name: &str) -> Result<Shape> {
        Shape::parse(name, self.options.max_depth, |leaf| {
            self.registry.lookup(leaf).map(|d| d.shape().clone())
        })
    }

    pub(crate) fn read_envelope(&self, json: &JsonValue, depth: usize) -> Result<Value> {
        if json.is_null() {
            return Ok(Value::Nil);
        }
        self.decode_at(&Envelope::from_json(json)?, depth)
    }

    fn decode_at(&self, envelope: &Envelope, depth: usize) -> Result<Value> {
        if depth > self.options.max_depth {
            return Err(Error::RecursionLimit(self.options.max_depth));
        }
        if envelope.value.is_null() {
            return Ok(Value::Nil);
        }

        let shape = self.parse_type_name(&envelope.type_name)?;
        log::trace!("decoding envelope {}", envelope.type_name);
        self.read(&shape, &envelope.value, depth)
    }

    /// Reads `json` as a payload of `shape`.
    pub(crate) fn read(&self, shape: &Shape, json: &JsonValue, depth: usize) -> Result<Value> {
        match shape {
            Shape::Primitive(kind) => Scalar::from_json(*kind, json).map(Value::Scalar),
            Shape::Pointer(inner) => {
                if json.is_null() {
                    return Ok(Value::Pointer((**inner).clone(), None));
                }
                let pointee = self.read(inner, json, depth)?;
                Ok(Value::Pointer((**inner).clone(), Some(Box::new(pointee))))
            }
            Shape::Sequence(element) => self.read_sequence(shape, element, json, depth),
            Shape::Mapping(key, element) => self.read_mapping(shape, key, element, json, depth),
            Shape::Struct(name) => self.registry.lookup(name)?.decode_at(json, self, depth),
            Shape::Any => self.read_envelope(json, depth + 1),
        }
    }

    fn read_sequence(
        &self,
        shape: &Shape,
        element: &Shape,
        json: &JsonValue,
        depth: usize,
    ) -> Result<Value> {
        let items = match json {
            JsonValue::Array(items) => items,
            JsonValue::Null => return Ok(Value::Sequence(element.clone(), Vec::new())),
            other => {
                return Err(Error::malformed_slice(
                    &shape.to_string(),
                    format!("expected an array, found {}", json_kind(other)),
                ))
            }
        };

        let mut values = Vec::with_capacity(items.len());
        for item in items {
            let value = self.read(element, item, depth).map_err(|e| {
                rewrap(e, element, |msg| Error::malformed_slice(&shape.to_string(), msg))
            })?;
            values.push(value);
        }
        Ok(Value::Sequence(element.clone(), values))
    }

    fn read_mapping(
        &self,
        shape: &Shape,
        key: &Shape,
        element: &Shape,
        json: &JsonValue,
        depth: usize,
    ) -> Result<Value> {
        let entries = match json {
            JsonValue::Object(entries) => entries,
            JsonValue::Null => {
                return Ok(Value::Mapping(key.clone(), element.clone(), ValueMap::new()))
            }
            other => {
                return Err(Error::malformed_map(
                    &shape.to_string(),
                    format!("expected an object, found {}", json_kind(other)),
                ))
            }
        };
        let Shape::Primitive(kind) = key else {
            return Err(Error::unsupported_map_key(&format!(
                "map keys cannot be {}",
                key.kind()
            )));
        };

        let mut values = ValueMap::with_capacity(entries.len());
        for (k, item) in entries {
            Scalar::from_key(*kind, k).map_err(|e| Error::malformed_map(&shape.to_string(), e))?;
            let value = self.read(element, item, depth).map_err(|e| {
                rewrap(e, element, |msg| Error::malformed_map(&shape.to_string(), msg))
            })?;
            values.insert(k.clone(), value);
        }
        Ok(Value::Mapping(key.clone(), element.clone(), values))
    }
}

/// Payload errors of plain elements are reported against the enclosing container. Errors from
/// nested envelopes already name their own type and pass through.
fn rewrap(error: Error, element: &Shape, container: impl FnOnce(String) -> Error) -> Error {
    match error {
        Error::MalformedPayload { msg, .. } if !element.is_any() => container(msg),
        other => other,
    }
}

fn json_kind(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Primitive;
    use crate::Dynamic;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
    struct Foo {
        a: i32,
    }
    crate::tagged!(Foo => "pkg.Foo");

    #[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
    struct Bag {
        items: Vec<Dynamic>,
    }
    crate::tagged!(Bag => "pkg.Bag");

    fn decoder() -> Decoder {
        let registry = Registry::new();
        registry.register::<Foo>().unwrap();
        registry.register::<Bag>().unwrap();
        Decoder::new(registry)
    }

    fn decode(type_name: &str, payload: JsonValue) -> Result<Value> {
        decoder().decode(&Envelope::new(type_name, payload))
    }

    #[test]
    fn test_primitive() {
        assert_eq!(decode("int", json!(1)).unwrap(), Value::from(1isize));
        assert_eq!(decode("rune", json!(65)).unwrap(), Value::from(65i32));
    }

    #[test]
    fn test_null_payload_is_nil() {
        assert_eq!(decode("*pkg.Foo", JsonValue::Null).unwrap(), Value::Nil);
        assert_eq!(decode("pkg.Unknown", JsonValue::Null).unwrap(), Value::Nil);
    }

    #[test]
    fn test_pointer_flag() {
        let value = decode("*pkg.Foo", json!({"a": 2})).unwrap();
        assert_eq!(value.shape().unwrap().name().unwrap(), "*pkg.Foo");
        let inner = value.deref().unwrap();
        assert_eq!(inner.downcast_ref::<Foo>(), Some(&Foo { a: 2 }));
        assert!(matches!(inner.deref(), Err(Error::DereferenceError(_))));
    }

    #[test]
    fn test_sequence_with_nil_pointers() {
        let value = decode("[]*pkg.Foo", json!([{"a": 1}, null])).unwrap();
        let items = value.as_sequence().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1], Value::Pointer(Shape::structure("pkg.Foo"), None));
    }

    #[test]
    fn test_nested_maps() {
        let value = decode(
            "map[string]map[int8][]string",
            json!({"outer": {"-3": ["a", "b"]}}),
        )
        .unwrap();
        let inner = value.as_mapping().unwrap().get("outer").unwrap();
        let list = inner.as_mapping().unwrap().get("-3").unwrap();
        assert_eq!(list.as_sequence().unwrap()[1].as_str(), Some("b"));
    }

    #[test]
    fn test_any_slots() {
        let value = decode(
            "map[string]any",
            json!({"x": {"_t": "[]pkg.Foo", "v": [{"a": 7}]}, "y": null}),
        )
        .unwrap();
        let entries = value.as_mapping().unwrap();
        assert_eq!(entries.get("y"), Some(&Value::Nil));
        let foos = <Vec<Foo>>::from_value(entries.get("x").unwrap().clone()).unwrap();
        assert_eq!(foos, vec![Foo { a: 7 }]);
    }

    #[test]
    fn test_any_fields_inside_structs() {
        let value = decode(
            "pkg.Bag",
            json!({"items": [{"_t": "pkg.Foo", "v": {"a": 1}}, null]}),
        )
        .unwrap();
        let bag = value.downcast_ref::<Bag>().unwrap();
        assert_eq!(bag.items[0].clone().downcast::<Foo>().unwrap(), Foo { a: 1 });
        assert!(bag.items[1].is_nil());
    }

    #[test]
    fn test_malformed_payloads() {
        let err = decode("[]string", json!("nope")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "error unmarshalling slice []string: expected an array, found string"
        );

        let err = decode("[]string", json!([234])).unwrap_err();
        assert!(matches!(err, Error::MalformedPayload { context, .. } if context == "slice []string"));

        let err = decode("map[string]int", json!([1])).unwrap_err();
        assert!(matches!(err, Error::MalformedPayload { context, .. } if context == "map map[string]int"));

        let err = decode("map[uint8]int", json!({"300": 1})).unwrap_err();
        assert!(matches!(err, Error::MalformedPayload { context, .. } if context == "map map[uint8]int"));

        let err = decode("pkg.Foo", json!({"a": "x"})).unwrap_err();
        assert!(matches!(err, Error::MalformedPayload { context, .. } if context == "pkg.Foo"));
    }

    #[test]
    fn test_type_errors() {
        assert_eq!(
            decode("[]pkg.Bar", json!([])).unwrap_err(),
            Error::TypeNotFound("pkg.Bar".to_string())
        );
        assert!(matches!(
            decode("map[string", json!({})),
            Err(Error::InvalidTypeName { .. })
        ));
        assert!(matches!(
            decode("map[pkg.Foo]int", json!({})),
            Err(Error::UnsupportedMapKey(_))
        ));
    }

    #[test]
    fn test_nested_envelope_errors_pass_through() {
        let err = decode("[]any", json!([{"_t": "int8", "v": 1000}])).unwrap_err();
        assert!(matches!(err, Error::MalformedPayload { context, .. } if context == "int8"));
    }

    #[test]
    fn test_null_containers_are_empty() {
        let value = decoder()
            .read(
                &Shape::sequence(Shape::Primitive(Primitive::Int)),
                &JsonValue::Null,
                0,
            )
            .unwrap();
        assert_eq!(value.as_sequence().map(<[Value]>::len), Some(0));
    }

    #[test]
    fn test_recursion_limit() {
        let decoder = Decoder::with_options(Registry::new(), DecodeOptions::new().with_max_depth(2));
        let mut json = json!({"_t": "int", "v": 1});
        for _ in 0..3 {
            json = json!({"_t": "[]any", "v": [json]});
        }
        assert_eq!(decoder.decode_json(&json), Err(Error::RecursionLimit(2)));

        let name = format!("{}int", "*".repeat(3));
        assert_eq!(
            decoder.parse_type_name(&name),
            Err(Error::RecursionLimit(2))
        );
    }
}
