//! Type shapes and their canonical names.
//!
//! A [`Shape`] is the structural classification of a Rust type as seen by the codec:
//! a primitive, a pointer (`Option<T>`), a sequence (`Vec<T>`), a mapping, a registered
//! struct, or an open `any` slot. Every shape has exactly one canonical name:
//!
//! | Shape | Name |
//! |-------|------|
//! | primitive | `int`, `uint8`, `float64`, `string`, ... |
//! | pointer to `T` | `*` + name(`T`) |
//! | sequence of `T` | `[]` + name(`T`) |
//! | mapping `K` to `V` | `map[` + name(`K`) + `]` + name(`V`) |
//! | struct | its registered name, e.g. `pkg.Foo` |
//! | any slot | `any` |
//!
//! Names are read back with [`Shape::parse`], a left-to-right recursive descent over the
//! same grammar.
//!
//! ## Examples
//!
//! ```rust
//! use serde_envelope::{Primitive, Shape};
//!
//! let shape = Shape::mapping(
//!     Shape::Primitive(Primitive::String),
//!     Shape::sequence(Shape::pointer(Shape::structure("pkg.Foo"))),
//! );
//! assert_eq!(shape.name().unwrap(), "map[string][]*pkg.Foo");
//! ```

use crate::{Error, Result};
use std::borrow::Cow;
use std::fmt;

/// The token naming an open, dynamically typed slot.
pub const ANY: &str = "any";

/// Leaf scalar kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    String,
}

impl Primitive {
    pub const ALL: [Primitive; 14] = [
        Primitive::Bool,
        Primitive::Int,
        Primitive::Int8,
        Primitive::Int16,
        Primitive::Int32,
        Primitive::Int64,
        Primitive::Uint,
        Primitive::Uint8,
        Primitive::Uint16,
        Primitive::Uint32,
        Primitive::Uint64,
        Primitive::Float32,
        Primitive::Float64,
        Primitive::String,
    ];

    /// Returns the canonical name of this primitive.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_envelope::Primitive;
    ///
    /// assert_eq!(Primitive::Int.name(), "int");
    /// assert_eq!(Primitive::Float32.name(), "float32");
    /// ```
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::Int => "int",
            Primitive::Int8 => "int8",
            Primitive::Int16 => "int16",
            Primitive::Int32 => "int32",
            Primitive::Int64 => "int64",
            Primitive::Uint => "uint",
            Primitive::Uint8 => "uint8",
            Primitive::Uint16 => "uint16",
            Primitive::Uint32 => "uint32",
            Primitive::Uint64 => "uint64",
            Primitive::Float32 => "float32",
            Primitive::Float64 => "float64",
            Primitive::String => "string",
        }
    }

    /// Looks up a primitive by its canonical name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Primitive::ALL.into_iter().find(|p| p.name() == name)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Structural classification of a type.
///
/// [`Display`](fmt::Display) writes the name without validating it; use [`Shape::name`]
/// to get a name that is guaranteed to parse back.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    Primitive(Primitive),
    Pointer(Box<Shape>),
    Sequence(Box<Shape>),
    Mapping(Box<Shape>, Box<Shape>),
    Struct(Cow<'static, str>),
    Any,
}

impl Shape {
    #[must_use]
    pub fn pointer(inner: Shape) -> Self {
        Shape::Pointer(Box::new(inner))
    }

    #[must_use]
    pub fn sequence(element: Shape) -> Self {
        Shape::Sequence(Box::new(element))
    }

    #[must_use]
    pub fn mapping(key: Shape, value: Shape) -> Self {
        Shape::Mapping(Box::new(key), Box::new(value))
    }

    #[must_use]
    pub fn structure(name: impl Into<Cow<'static, str>>) -> Self {
        Shape::Struct(name.into())
    }

    #[must_use]
    pub fn is_any(&self) -> bool {
        matches!(self, Shape::Any)
    }

    /// Only scalar shapes can be written as plain-text object keys.
    #[must_use]
    pub fn is_map_key(&self) -> bool {
        matches!(self, Shape::Primitive(_))
    }

    /// Returns the canonical name of this shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedMapKey`] if any mapping in the shape is keyed by a
    /// pointer, struct, sequence, mapping or `any`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_envelope::{Error, Primitive, Shape};
    ///
    /// let ok = Shape::pointer(Shape::Primitive(Primitive::Int));
    /// assert_eq!(ok.name().unwrap(), "*int");
    ///
    /// let bad = Shape::mapping(Shape::structure("pkg.Key"), Shape::Any);
    /// assert!(matches!(bad.name(), Err(Error::UnsupportedMapKey(_))));
    /// ```
    pub fn name(&self) -> Result<String> {
        self.validate()?;
        Ok(self.to_string())
    }

    fn validate(&self) -> Result<()> {
        match self {
            Shape::Pointer(inner) | Shape::Sequence(inner) => inner.validate(),
            Shape::Mapping(key, value) => {
                if !key.is_map_key() {
                    return Err(Error::unsupported_map_key(&format!(
                        "map keys cannot be {}",
                        key.kind()
                    )));
                }
                value.validate()
            }
            Shape::Primitive(_) | Shape::Struct(_) | Shape::Any => Ok(()),
        }
    }

    /// Short description of the outermost kind, used in error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Primitive(_) => "primitives",
            Shape::Pointer(_) => "pointers",
            Shape::Sequence(_) => "slices",
            Shape::Mapping(_, _) => "maps",
            Shape::Struct(_) => "structs",
            Shape::Any => "any",
        }
    }

    /// Parses a canonical type name back into a shape.
    ///
    /// Prefixes are consumed left to right: `*`, then `[]`, then `map[K]`. Whatever remains is
    /// a leaf and is handed to `resolve`, which typically consults a [`Registry`](crate::Registry).
    /// Map keys are split at the `]` matching the opening bracket, so keys may themselves
    /// contain brackets.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidTypeName`] for an empty name or unterminated map key
    /// - [`Error::UnsupportedMapKey`] for a non-scalar key
    /// - [`Error::RecursionLimit`] when nesting exceeds `max_depth`
    /// - whatever `resolve` returns for unknown leaves
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_envelope::{Primitive, Shape};
    ///
    /// let shape = Shape::parse("*[]map[string]int", 16, |leaf| {
    ///     Ok(Shape::Primitive(Primitive::from_name(leaf).unwrap()))
    /// })
    /// .unwrap();
    ///
    /// assert_eq!(shape.to_string(), "*[]map[string]int");
    /// ```
    pub fn parse<F>(name: &str, max_depth: usize, mut resolve: F) -> Result<Shape>
    where
        F: FnMut(&str) -> Result<Shape>,
    {
        Parser {
            name,
            max_depth,
            resolve: &mut resolve,
        }
        .parse(name, 0)
    }
}

struct Parser<'a> {
    name: &'a str,
    max_depth: usize,
    resolve: &'a mut dyn FnMut(&str) -> Result<Shape>,
}

impl Parser<'_> {
    fn parse(&mut self, rest: &str, depth: usize) -> Result<Shape> {
        if depth > self.max_depth {
            return Err(Error::RecursionLimit(self.max_depth));
        }
        if rest.is_empty() {
            return Err(Error::invalid_type_name(self.name, "missing type"));
        }

        if let Some(inner) = rest.strip_prefix('*') {
            return Ok(Shape::pointer(self.parse(inner, depth + 1)?));
        }
        if let Some(element) = rest.strip_prefix("[]") {
            return Ok(Shape::sequence(self.parse(element, depth + 1)?));
        }
        if let Some(tail) = rest.strip_prefix("map[") {
            let close = matching_bracket(tail)
                .ok_or_else(|| Error::invalid_type_name(self.name, "unterminated map key"))?;
            let key = self.parse(&tail[..close], depth + 1)?;
            if !key.is_map_key() {
                return Err(Error::unsupported_map_key(&format!(
                    "map keys cannot be {} in {}",
                    key.kind(),
                    self.name
                )));
            }
            let value = self.parse(&tail[close + 1..], depth + 1)?;
            return Ok(Shape::mapping(key, value));
        }

        (self.resolve)(rest)
    }
}

/// Byte offset of the `]` closing an already opened `[`.
fn matching_bracket(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in s.bytes().enumerate() {
        match b {
            b'[' => depth += 1,
            b']' if depth == 0 => return Some(i),
            b']' => depth -= 1,
            _ => {}
        }
    }
    None
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Primitive(p) => f.write_str(p.name()),
            Shape::Pointer(inner) => write!(f, "*{}", inner),
            Shape::Sequence(element) => write!(f, "[]{}", element),
            Shape::Mapping(key, value) => write!(f, "map[{}]{}", key, value),
            Shape::Struct(name) => f.write_str(name),
            Shape::Any => f.write_str(ANY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str) -> Result<Shape> {
        match name {
            ANY => Ok(Shape::Any),
            "pkg.Foo" => Ok(Shape::structure("pkg.Foo")),
            other => Primitive::from_name(other)
                .map(Shape::Primitive)
                .ok_or_else(|| Error::TypeNotFound(other.to_string())),
        }
    }

    #[test]
    fn test_primitive_names_round_trip() {
        for p in Primitive::ALL {
            assert_eq!(Primitive::from_name(p.name()), Some(p));
        }
        assert_eq!(Primitive::from_name("byte"), None);
    }

    #[test]
    fn test_nested_names() {
        let shape = Shape::pointer(Shape::sequence(Shape::pointer(Shape::structure("pkg.Foo"))));
        assert_eq!(shape.name().unwrap(), "*[]*pkg.Foo");

        let shape = Shape::mapping(
            Shape::Primitive(Primitive::String),
            Shape::mapping(Shape::Primitive(Primitive::Int32), Shape::Any),
        );
        assert_eq!(shape.name().unwrap(), "map[string]map[int32]any");
    }

    #[test]
    fn test_repeated_pointers() {
        let shape = Shape::pointer(Shape::pointer(Shape::pointer(Shape::Primitive(
            Primitive::Bool,
        ))));
        assert_eq!(shape.name().unwrap(), "***bool");
    }

    #[test]
    fn test_rejects_non_scalar_keys() {
        for key in [
            Shape::pointer(Shape::Primitive(Primitive::Int)),
            Shape::structure("pkg.Foo"),
            Shape::sequence(Shape::Primitive(Primitive::Int)),
            Shape::Any,
        ] {
            let shape = Shape::mapping(key, Shape::Primitive(Primitive::Int));
            assert!(matches!(shape.name(), Err(Error::UnsupportedMapKey(_))));
        }
    }

    #[test]
    fn test_rejection_inside_nested_shape() {
        let shape = Shape::sequence(Shape::mapping(
            Shape::structure("pkg.Foo"),
            Shape::Primitive(Primitive::Int),
        ));
        assert!(matches!(shape.name(), Err(Error::UnsupportedMapKey(_))));
    }

    #[test]
    fn test_parse_inverts_name() {
        for name in [
            "int",
            "*int",
            "[]pkg.Foo",
            "*[]*pkg.Foo",
            "map[string]pkg.Foo",
            "map[string]*[]pkg.Foo",
            "map[string]map[string]string",
            "[]map[string]string",
            "[]any",
            "map[uint8]any",
        ] {
            let shape = Shape::parse(name, 32, leaf).unwrap();
            assert_eq!(shape.name().unwrap(), name);
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Shape::parse("", 32, leaf),
            Err(Error::InvalidTypeName { .. })
        ));
        assert!(matches!(
            Shape::parse("map[string", 32, leaf),
            Err(Error::InvalidTypeName { .. })
        ));
        assert!(matches!(
            Shape::parse("[]", 32, leaf),
            Err(Error::InvalidTypeName { .. })
        ));
        assert!(matches!(
            Shape::parse("map[*int]string", 32, leaf),
            Err(Error::UnsupportedMapKey(_))
        ));
        assert!(matches!(
            Shape::parse("map[[]int]string", 32, leaf),
            Err(Error::UnsupportedMapKey(_))
        ));
        assert_eq!(
            Shape::parse("[]pkg.Bar", 32, leaf),
            Err(Error::TypeNotFound("pkg.Bar".to_string()))
        );
    }

    #[test]
    fn test_parse_depth_limit() {
        let name = format!("{}int", "*".repeat(10));
        assert!(Shape::parse(&name, 10, leaf).is_ok());
        assert_eq!(
            Shape::parse(&name, 9, leaf),
            Err(Error::RecursionLimit(9))
        );
    }
}
