//! Type registry consulted by the decoder.
//!
//! Encoding never needs a registry: the static type of the value names itself. Decoding does,
//! because a type name read off the wire has to be turned back into something that can
//! deserialize a payload. A [`Registry`] maps every leaf name (a primitive, `any`, or a
//! registered struct) to a [`Descriptor`] that knows how.
//!
//! A fresh registry already knows the primitives, `any`, and the aliases `byte` (`uint8`),
//! `rune` (`int32`) and `interface` (`any`). Structs are added with [`Registry::register`].
//!
//! ## Examples
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_envelope::{from_str_as, Registry};
//!
//! #[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
//! struct Foo { a: i32 }
//! serde_envelope::tagged!(Foo => "pkg.Foo");
//!
//! let registry = Registry::new();
//! registry.register::<Foo>().unwrap();
//!
//! let foo: Option<Foo> = from_str_as(r#"{"_t":"*pkg.Foo","v":{"a":1}}"#, &registry).unwrap();
//! assert_eq!(foo, Some(Foo { a: 1 }));
//! ```

use crate::scope;
use crate::shape::{Primitive, ANY};
use crate::{Decoder, Error, Result, Shape, Tagged, Value};
use parking_lot::RwLock;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Older type names accepted on decode.
const ALIASES: [(&str, Shape); 3] = [
    ("byte", Shape::Primitive(Primitive::Uint8)),
    ("rune", Shape::Primitive(Primitive::Int32)),
    ("interface", Shape::Any),
];

type DecodeFn = fn(&JsonValue, &Decoder, usize) -> Result<Value>;

/// How to decode one leaf type name.
#[derive(Clone)]
pub struct Descriptor {
    name: String,
    shape: Shape,
    decode: Option<DecodeFn>,
}

impl Descriptor {
    fn builtin(name: &str, shape: Shape) -> Self {
        Descriptor {
            name: name.to_string(),
            shape,
            decode: None,
        }
    }

    /// The name this descriptor is registered under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The shape decoded values take. For aliases this is the shape of the target type.
    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Decodes a payload of this type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedPayload`] when the payload does not fit the type, or any error
    /// raised by a nested `any` slot.
    pub fn decode(&self, payload: &JsonValue, decoder: &Decoder) -> Result<Value> {
        self.decode_at(payload, decoder, 0)
    }

    pub(crate) fn decode_at(
        &self,
        payload: &JsonValue,
        decoder: &Decoder,
        depth: usize,
    ) -> Result<Value> {
        match self.decode {
            Some(decode) => decode(payload, decoder, depth),
            None => decoder.read(&self.shape, payload, depth),
        }
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .finish()
    }
}

/// Deserializes a registered struct, letting its `any` fields see `decoder`.
fn decode_struct<T: Tagged>(payload: &JsonValue, decoder: &Decoder, depth: usize) -> Result<Value> {
    let _guard = scope::enter_decoder(decoder, depth + 1);
    scope::take_stashed();
    T::deserialize(payload).map(T::into_value).map_err(|e| {
        scope::take_stashed().unwrap_or_else(|| Error::malformed(&T::shape().to_string(), e))
    })
}

/// Like [`decode_struct`], but fields missing from the payload take their value from
/// `T::default()`.
fn decode_defaulted_struct<T: Tagged + Default>(
    payload: &JsonValue,
    decoder: &Decoder,
    depth: usize,
) -> Result<Value> {
    if !payload.is_object() {
        return decode_struct::<T>(payload, decoder, depth);
    }
    let mut filled = serde_json::to_value(T::default())
        .map_err(|e| Error::malformed(&T::shape().to_string(), e))?;
    fill_missing(&mut filled, payload);
    decode_struct::<T>(&filled, decoder, depth)
}

/// Overlays `payload` on `defaults`. Objects present on both sides are merged key by key so
/// nested structs get their omitted fields back too.
fn fill_missing(defaults: &mut JsonValue, payload: &JsonValue) {
    match (defaults, payload) {
        (JsonValue::Object(base), JsonValue::Object(given)) => {
            for (key, value) in given {
                match base.get_mut(key) {
                    Some(slot) => fill_missing(slot, value),
                    None => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (slot, value) => *slot = value.clone(),
    }
}

/// A shared, thread-safe map from type names to [`Descriptor`]s.
///
/// Cloning a registry yields another handle to the same entries.
#[derive(Clone)]
pub struct Registry {
    entries: Arc<RwLock<HashMap<String, Descriptor>>>,
}

impl Registry {
    /// Creates a registry that knows the primitives, `any` and the built-in aliases.
    #[must_use]
    pub fn new() -> Self {
        let mut entries = HashMap::with_capacity(Primitive::ALL.len() + ALIASES.len() + 1);
        for primitive in Primitive::ALL {
            entries.insert(
                primitive.name().to_string(),
                Descriptor::builtin(primitive.name(), Shape::Primitive(primitive)),
            );
        }
        entries.insert(ANY.to_string(), Descriptor::builtin(ANY, Shape::Any));
        for (alias, shape) in ALIASES {
            entries.insert(alias.to_string(), Descriptor::builtin(alias, shape));
        }

        Registry {
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    /// Registers the struct type `T` under its canonical name.
    ///
    /// Registering the same name again replaces the earlier entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegistration`] if `T` is not a struct: primitives, `Option`,
    /// `Vec`, maps and `Dynamic` are already understood from their names.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_envelope::{Error, Registry};
    ///
    /// let registry = Registry::new();
    /// assert!(matches!(
    ///     registry.register::<Vec<i32>>(),
    ///     Err(Error::InvalidRegistration(name)) if name == "[]int32"
    /// ));
    /// ```
    pub fn register<T: Tagged>(&self) -> Result<()> {
        self.insert(T::shape(), decode_struct::<T>)
    }

    fn insert(&self, shape: Shape, decode: DecodeFn) -> Result<()> {
        let name = match &shape {
            Shape::Struct(name) => name.to_string(),
            other => return Err(Error::InvalidRegistration(other.to_string())),
        };

        log::debug!("registering envelope type {}", name);
        let descriptor = Descriptor {
            name: name.clone(),
            shape,
            decode: Some(decode),
        };
        self.entries.write().insert(name, descriptor);
        Ok(())
    }

    /// Registers `T` like [`Registry::register`], filling fields absent from a payload with
    /// their value in `T::default()`.
    ///
    /// Use it for structs written with [`EncodeOptions::omit_defaults`](crate::EncodeOptions)
    /// that do not carry `#[serde(default)]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegistration`] if `T` is not a struct.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde::{Deserialize, Serialize};
    /// use serde_envelope::{from_str_as, Registry};
    ///
    /// #[derive(Serialize, Deserialize, Clone, PartialEq, Debug, Default)]
    /// struct Plain { name: String, count: u32 }
    /// serde_envelope::tagged!(Plain => "pkg.Plain");
    ///
    /// let registry = Registry::new();
    /// registry.register_defaulted::<Plain>().unwrap();
    ///
    /// let plain: Plain = from_str_as(r#"{"_t":"pkg.Plain","v":{"name":"a"}}"#, &registry).unwrap();
    /// assert_eq!(plain, Plain { name: "a".to_string(), count: 0 });
    /// ```
    pub fn register_defaulted<T: Tagged + Default>(&self) -> Result<()> {
        self.insert(T::shape(), decode_defaulted_struct::<T>)
    }

    /// Looks up the descriptor for a leaf type name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeNotFound`] if nothing is registered under `name`.
    pub fn lookup(&self, name: &str) -> Result<Descriptor> {
        self.entries
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::TypeNotFound(name.to_string()))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// All registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dynamic;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use std::thread;

    #[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
    struct Foo {
        a: i32,
    }
    crate::tagged!(Foo => "pkg.Foo");

    #[test]
    fn test_seeded_leaves() {
        let registry = Registry::new();
        for primitive in Primitive::ALL {
            assert_eq!(
                registry.lookup(primitive.name()).unwrap().shape(),
                &Shape::Primitive(primitive)
            );
        }
        assert_eq!(registry.lookup("any").unwrap().shape(), &Shape::Any);
        assert_eq!(registry.len(), 18);
    }

    #[test]
    fn test_aliases() {
        let registry = Registry::new();
        assert_eq!(
            registry.lookup("byte").unwrap().shape(),
            &Shape::Primitive(Primitive::Uint8)
        );
        assert_eq!(
            registry.lookup("rune").unwrap().shape(),
            &Shape::Primitive(Primitive::Int32)
        );
        assert_eq!(registry.lookup("interface").unwrap().shape(), &Shape::Any);
    }

    #[test]
    fn test_register_struct() {
        let registry = Registry::new();
        assert_eq!(
            registry.lookup("pkg.Foo").unwrap_err(),
            Error::TypeNotFound("pkg.Foo".to_string())
        );

        registry.register::<Foo>().unwrap();
        let descriptor = registry.lookup("pkg.Foo").unwrap();
        assert_eq!(descriptor.name(), "pkg.Foo");

        let decoder = Decoder::new(registry.clone());
        let value = descriptor.decode(&json!({"a": 5}), &decoder).unwrap();
        assert_eq!(value.downcast_ref::<Foo>(), Some(&Foo { a: 5 }));
    }

    #[test]
    fn test_register_rejects_non_structs() {
        let registry = Registry::new();
        assert_eq!(
            registry.register::<i32>(),
            Err(Error::InvalidRegistration("int32".to_string()))
        );
        assert_eq!(
            registry.register::<Option<Foo>>(),
            Err(Error::InvalidRegistration("*pkg.Foo".to_string()))
        );
        assert_eq!(
            registry.register::<HashMap<String, Foo>>(),
            Err(Error::InvalidRegistration("map[string]pkg.Foo".to_string()))
        );
        assert_eq!(
            registry.register::<Dynamic>(),
            Err(Error::InvalidRegistration("any".to_string()))
        );
    }

    #[test]
    fn test_struct_payload_errors_keep_type_name() {
        let registry = Registry::new();
        registry.register::<Foo>().unwrap();
        let decoder = Decoder::new(registry.clone());

        let err = registry
            .lookup("pkg.Foo")
            .unwrap()
            .decode(&json!({"a": "x"}), &decoder)
            .unwrap_err();
        assert!(matches!(err, Error::MalformedPayload { context, .. } if context == "pkg.Foo"));
    }

    #[derive(Serialize, Deserialize, Clone, PartialEq, Debug, Default)]
    struct Inner {
        level: u8,
        label: String,
    }

    #[derive(Serialize, Deserialize, Clone, PartialEq, Debug, Default)]
    struct Plain {
        name: String,
        count: u32,
        inner: Inner,
    }
    crate::tagged!(Plain => "pkg.Plain");

    #[test]
    fn test_defaulted_registration_fills_missing_fields() {
        let payload = json!({"name": "a", "inner": {"label": "x"}});

        let strict = Registry::new();
        strict.register::<Plain>().unwrap();
        let err = Decoder::new(strict).read(&Plain::shape(), &payload, 0).unwrap_err();
        assert!(matches!(err, Error::MalformedPayload { msg, .. } if msg.contains("count")));

        let registry = Registry::new();
        registry.register_defaulted::<Plain>().unwrap();
        let value = Decoder::new(registry)
            .read(&Plain::shape(), &payload, 0)
            .unwrap();
        assert_eq!(
            value.downcast_ref::<Plain>(),
            Some(&Plain {
                name: "a".to_string(),
                count: 0,
                inner: Inner {
                    level: 0,
                    label: "x".to_string(),
                },
            })
        );
    }

    #[test]
    fn test_defaulted_registration_rejects_non_structs() {
        assert_eq!(
            Registry::new().register_defaulted::<Vec<Foo>>(),
            Err(Error::InvalidRegistration("[]pkg.Foo".to_string()))
        );
    }

    #[test]
    fn test_time_is_registered_like_a_struct() {
        let registry = Registry::new();
        assert!(!registry.contains("time.Time"));
        registry.register::<DateTime<Utc>>().unwrap();
        assert!(registry.contains("time.Time"));
    }

    #[test]
    fn test_clones_share_entries_across_threads() {
        let registry = Registry::new();
        let handle = registry.clone();
        thread::spawn(move || handle.register::<Foo>())
            .join()
            .unwrap()
            .unwrap();
        assert!(registry.contains("pkg.Foo"));
    }
}
