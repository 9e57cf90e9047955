//! Envelope Wire Format
//!
//! This module documents the envelope format as implemented by this library.
//!
//! # Overview
//!
//! An envelope is a JSON object with exactly two keys:
//!
//! ```text
//! {"_t": "<type name>", "v": <payload>}
//! ```
//!
//! `_t` is written first. A missing `v` is read as `null`, and a `null` payload means the
//! envelope holds nothing. The root of an encoded document is always an envelope, even for a
//! bare primitive; a nil root is written as empty output.
//!
//! # Type Names
//!
//! ## Grammar
//!
//! ```text
//! name    = pointer | slice | map | leaf
//! pointer = "*" name
//! slice   = "[]" name
//! map     = "map[" leaf "]" name
//! leaf    = primitive | "any" | struct-name
//! ```
//!
//! Names are read left to right. The key of a `map[` is split off at the `]` matching its
//! opening bracket. Only primitive keys are allowed.
//!
//! ## Primitives
//!
//! | Rust | Name |
//! |------|------|
//! | `bool` | `bool` |
//! | `isize` | `int` |
//! | `i8`, `i16`, `i32`, `i64` | `int8`, `int16`, `int32`, `int64` |
//! | `usize` | `uint` |
//! | `u8`, `u16`, `u32`, `u64` | `uint8`, `uint16`, `uint32`, `uint64` |
//! | `f32`, `f64` | `float32`, `float64` |
//! | `String` | `string` |
//!
//! The decoder also accepts `byte` for `uint8`, `rune` for `int32` and `interface` for `any`.
//!
//! ## Composites
//!
//! | Rust | Name |
//! |------|------|
//! | `Option<T>` | `*T` |
//! | `Vec<T>`, `[T; N]` | `[]T` |
//! | `HashMap<K, V>`, `BTreeMap<K, V>`, `IndexMap<K, V>` | `map[K]V` |
//! | `Dynamic` | `any` |
//! | `chrono::DateTime<Utc>` | `time.Time` |
//! | struct declared with `tagged!` | the declared name |
//!
//! # Payloads
//!
//! ## Primitives
//!
//! Plain JSON booleans, numbers and strings. `float32` values are written in their shortest
//! `f32` form, so `11.1f32` is `11.1`. NaN and infinities cannot be encoded.
//!
//! ## Pointers
//!
//! The pointee's payload, or `null` for `None`.
//!
//! ## Slices
//!
//! A JSON array; an empty slice is `[]`. A `null` array decodes as an empty slice.
//!
//! ## Maps
//!
//! A JSON object. Keys are the text form of the key (`"1"`, `"true"`, `"-4"`) and are written
//! in sorted order. An empty map is `{}`.
//!
//! ## Structs
//!
//! A JSON object with one entry per serialized field, in declaration order, named after the
//! serde field name. Skipped fields are absent. With
//! [`EncodeOptions::omit_defaults`](crate::EncodeOptions) fields holding `null`, `false`, `0`
//! or `""` are left out as well. Such structs decode again when they carry `#[serde(default)]`
//! or are registered with [`Registry::register_defaulted`](crate::Registry::register_defaulted).
//!
//! ## Any Slots
//!
//! Each element, map value or field whose type is `any` is written as a nested envelope, or as
//! `null` when empty:
//!
//! ```text
//! {"_t":"[]any","v":[null,{"_t":"string","v":"2"}]}
//! {"_t":"map[string]any","v":{"1":null,"2":null}}
//! ```
//!
//! # Errors
//!
//! | Condition | Error |
//! |-----------|-------|
//! | map keyed by a pointer, struct, slice, map or `any` | [`UnsupportedMapKey`](crate::Error::UnsupportedMapKey) |
//! | enum, tuple struct, unit, 128-bit integer or non-finite float | [`UnsupportedShape`](crate::Error::UnsupportedShape) |
//! | empty name, unterminated `map[` | [`InvalidTypeName`](crate::Error::InvalidTypeName) |
//! | leaf name not in the registry | [`TypeNotFound`](crate::Error::TypeNotFound) |
//! | payload does not fit its type | [`MalformedPayload`](crate::Error::MalformedPayload) |
//! | nesting deeper than [`DecodeOptions::max_depth`](crate::DecodeOptions) | [`RecursionLimit`](crate::Error::RecursionLimit) |
