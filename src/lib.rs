//! # serde_envelope
//!
//! Type-tagged JSON envelopes for Serde.
//!
//! ## What is an envelope?
//!
//! Plain JSON forgets types: `1` could have been an `i8` or a `u64`, `{}` any struct at all.
//! An envelope keeps the type next to the payload:
//!
//! ```text
//! {"_t": "map[string]*pkg.Foo", "v": {"a": {"x": 1}, "b": null}}
//! ```
//!
//! The type name is derived from the static Rust type and is enough to rebuild the value on
//! the other side, including pointers (`Option`), slices (`Vec`) and maps. Only slots typed as
//! [`Dynamic`] carry envelopes of their own, so a `Vec<Dynamic>` can mix values of different
//! types.
//!
//! ## Key Features
//!
//! - **Canonical type names**: `int`, `*pkg.Foo`, `[]any`, `map[string][]uint8`, parsed back
//!   by a recursive-descent reader
//! - **Serde Compatible**: structs keep `#[derive(Serialize, Deserialize)]`, `rename` and `skip`
//! - **Any-typed slots**: [`Dynamic`] fields, elements and map values round-trip their own type
//! - **Explicit registry**: decoding resolves struct names through a [`Registry`] the caller fills
//!
//! ## Quick Start
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_envelope::{from_str_as, to_string, Registry};
//!
//! #[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
//! struct Foo {}
//! serde_envelope::tagged!(Foo => "pkg.Foo");
//!
//! let json = to_string(&Some(Foo {})).unwrap();
//! assert_eq!(json, r#"{"_t":"*pkg.Foo","v":{}}"#);
//!
//! let registry = Registry::new();
//! registry.register::<Foo>().unwrap();
//!
//! let back: Option<Foo> = from_str_as(&json, &registry).unwrap();
//! assert_eq!(back, Some(Foo {}));
//! ```
//!
//! ### Any-Typed Slots
//!
//! ```rust
//! use serde_envelope::{from_str, to_string, Dynamic, Registry, Value};
//!
//! let slots = vec![Dynamic::nil(), Dynamic::from("2")];
//! let json = to_string(&slots).unwrap();
//! assert_eq!(json, r#"{"_t":"[]any","v":[null,{"_t":"string","v":"2"}]}"#);
//!
//! let value = from_str(&json, &Registry::new()).unwrap();
//! assert_eq!(value.as_sequence().unwrap()[1], Value::from("2"));
//! ```
//!
//! ## Wire Format
//!
//! See the [`format`] module for the complete wire format.
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - Encoding and decoding a struct
//! - **`any_slots.rs`** - Mixing types in `Dynamic` slots
//! - **`registry.rs`** - Registering types and handling decode errors
//!
//! Run any example with: `cargo run --example <name>`

pub mod de;
pub mod dynamic;
pub mod envelope;
pub mod error;
pub mod format;
pub mod macros;
pub mod map;
pub mod options;
pub mod registry;
mod scope;
pub mod ser;
pub mod shape;
pub mod tagged;
pub mod value;

pub use de::Decoder;
pub use dynamic::Dynamic;
pub use envelope::Envelope;
pub use error::{Error, Result};
pub use map::ValueMap;
pub use options::{DecodeOptions, EncodeOptions};
pub use registry::{Descriptor, Registry};
pub use ser::{Encoder, PayloadSerializer};
pub use shape::{Primitive, Shape};
pub use tagged::{MapKey, Object, Tagged};
pub use value::{Scalar, Value};

use std::io;

/// Encode any tagged value as envelope JSON text.
///
/// Nil values (`None`, an empty [`Dynamic`]) encode to the empty string.
///
/// # Examples
///
/// ```rust
/// use serde_envelope::to_string;
///
/// assert_eq!(to_string(&1isize).unwrap(), r#"{"_t":"int","v":1}"#);
/// assert_eq!(to_string(&vec![Some(1.5f32)]).unwrap(), r#"{"_t":"[]*float32","v":[1.5]}"#);
/// ```
///
/// # Errors
///
/// Returns an error if the value's type cannot be named or its payload cannot be written,
/// e.g. a map keyed by a struct.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T: Tagged>(value: &T) -> Result<String> {
    to_string_with_options(value, EncodeOptions::default())
}

/// Encode any tagged value as envelope JSON text with custom options.
///
/// # Examples
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use serde_envelope::{to_string_with_options, EncodeOptions};
///
/// #[derive(Serialize, Deserialize, Clone, PartialEq, Debug, Default)]
/// #[serde(default)]
/// struct Point { x: i32, y: i32 }
/// serde_envelope::tagged!(Point => "geo.Point");
///
/// let json = to_string_with_options(&Point { x: 0, y: 2 }, EncodeOptions::compact()).unwrap();
/// assert_eq!(json, r#"{"_t":"geo.Point","v":{"y":2}}"#);
/// ```
///
/// # Errors
///
/// Same as [`to_string`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T: Tagged>(value: &T, options: EncodeOptions) -> Result<String> {
    let bytes = to_vec_with_options(value, options)?;
    String::from_utf8(bytes).map_err(|e| Error::custom(e.to_string()))
}

/// Encode any tagged value as envelope JSON bytes.
///
/// # Errors
///
/// Same as [`to_string`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec<T: Tagged>(value: &T) -> Result<Vec<u8>> {
    to_vec_with_options(value, EncodeOptions::default())
}

/// Encode any tagged value as envelope JSON bytes with custom options.
///
/// # Errors
///
/// Same as [`to_string`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec_with_options<T: Tagged>(value: &T, options: EncodeOptions) -> Result<Vec<u8>> {
    let mut buffer = Vec::with_capacity(128);
    to_writer_with_options(&mut buffer, value, options)?;
    Ok(buffer)
}

/// Encode any tagged value to a writer.
///
/// # Examples
///
/// ```rust
/// use serde_envelope::to_writer;
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &true).unwrap();
/// assert_eq!(buffer, br#"{"_t":"bool","v":true}"#);
/// ```
///
/// # Errors
///
/// Returns an error if encoding fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: Tagged,
{
    to_writer_with_options(writer, value, EncodeOptions::default())
}

/// Encode any tagged value to a writer with custom options.
///
/// # Errors
///
/// Returns an error if encoding fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(writer: W, value: &T, options: EncodeOptions) -> Result<()>
where
    W: io::Write,
    T: Tagged,
{
    let Some(envelope) = Encoder::new(options).encode(value)? else {
        return Ok(());
    };
    serde_json::to_writer(writer, &envelope).map_err(|e| Error::io(&e.to_string()))
}

/// Decode envelope JSON text into a [`Value`].
///
/// Empty input and `null` decode to [`Value::Nil`].
///
/// # Examples
///
/// ```rust
/// use serde_envelope::{from_str, Registry, Value};
///
/// let registry = Registry::new();
/// assert_eq!(from_str(r#"{"_t":"int","v":1}"#, &registry).unwrap(), Value::from(1isize));
/// assert_eq!(from_str("", &registry).unwrap(), Value::Nil);
/// ```
///
/// # Errors
///
/// Returns an error if the input is not an envelope, names a type the registry does not know,
/// or carries a payload that does not fit its type.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str(s: &str, registry: &Registry) -> Result<Value> {
    from_str_with_options(s, registry, DecodeOptions::default())
}

/// Decode envelope JSON text into a [`Value`] with custom options.
///
/// # Errors
///
/// Same as [`from_str`], plus [`Error::RecursionLimit`] when nesting exceeds the limit.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str_with_options(s: &str, registry: &Registry, options: DecodeOptions) -> Result<Value> {
    if s.trim().is_empty() {
        return Ok(Value::Nil);
    }
    let json: serde_json::Value =
        serde_json::from_str(s).map_err(|e| Error::malformed("envelope", e))?;
    Decoder::with_options(registry.clone(), options).decode_json(&json)
}

/// Decode envelope JSON bytes into a [`Value`].
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8, or for any reason [`from_str`] fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice(v: &[u8], registry: &Registry) -> Result<Value> {
    let s = std::str::from_utf8(v).map_err(|e| Error::custom(e.to_string()))?;
    from_str(s, registry)
}

/// Decode envelope JSON from an I/O stream into a [`Value`].
///
/// # Examples
///
/// ```rust
/// use serde_envelope::{from_reader, Registry};
/// use std::io::Cursor;
///
/// let cursor = Cursor::new(br#"{"_t":"[]string","v":["a"]}"#);
/// let value = from_reader(cursor, &Registry::new()).unwrap();
/// assert_eq!(value.as_sequence().unwrap()[0].as_str(), Some("a"));
/// ```
///
/// # Errors
///
/// Returns an error if reading from the reader fails, or for any reason [`from_str`] fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R: io::Read>(mut reader: R, registry: &Registry) -> Result<Value> {
    let mut string = String::new();
    reader
        .read_to_string(&mut string)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_str(&string, registry)
}

/// Decode envelope JSON text and extract it as `T`.
///
/// # Errors
///
/// Same as [`from_str`], plus [`Error::TypeMismatch`] if the envelope holds something other
/// than a `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str_as<T: Tagged>(s: &str, registry: &Registry) -> Result<T> {
    T::from_value(from_str(s, registry)?)
}

/// Decode envelope JSON bytes and extract them as `T`.
///
/// # Errors
///
/// Same as [`from_str_as`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice_as<T: Tagged>(v: &[u8], registry: &Registry) -> Result<T> {
    T::from_value(from_slice(v, registry)?)
}
