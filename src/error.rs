//! Error types for envelope encoding and decoding.
//!
//! Every failure in this crate is structural and deterministic: a value whose shape cannot be
//! named, a type name that cannot be parsed, a payload that does not fit the type it claims.
//! Errors are returned to the caller and never logged or retried.
//!
//! ## Error Categories
//!
//! - **Naming**: [`Error::UnsupportedMapKey`], [`Error::UnsupportedShape`]
//! - **Registration**: [`Error::InvalidRegistration`], [`Error::TypeNotFound`]
//! - **Parsing**: [`Error::InvalidTypeName`], [`Error::MalformedPayload`]
//! - **Conversion**: [`Error::TypeMismatch`], [`Error::DereferenceError`]
//!
//! ## Examples
//!
//! ```rust
//! use serde_envelope::{from_str, Error, Registry};
//!
//! let registry = Registry::new();
//! let result = from_str(r#"{"_t":"pkg.Missing","v":{}}"#, &registry);
//!
//! assert!(matches!(result, Err(Error::TypeNotFound(name)) if name == "pkg.Missing"));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur while encoding or decoding envelopes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A map key whose shape cannot be written as a plain JSON object key.
    #[error("unsupported map key: {0}")]
    UnsupportedMapKey(String),

    /// A value kind outside primitive, pointer, slice, map and struct.
    #[error("unsupported shape: {0}")]
    UnsupportedShape(String),

    /// Only struct types can be registered.
    #[error("invalid registration of {0}: only struct types can be registered")]
    InvalidRegistration(String),

    /// A leaf type name that has no entry in the registry.
    #[error("type not found in registry: {0}")]
    TypeNotFound(String),

    /// A type name that does not follow the naming grammar.
    #[error("invalid type name {name:?}: {msg}")]
    InvalidTypeName { name: String, msg: String },

    /// The payload does not fit the type it was tagged with.
    #[error("error unmarshalling {context}: {msg}")]
    MalformedPayload { context: String, msg: String },

    /// A value expected to be a pointer was not one.
    #[error("could not remove pointer: {0}")]
    DereferenceError(String),

    /// A decoded value does not match the requested Rust type.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Nesting deeper than the configured decode limit.
    #[error("recursion limit of {0} exceeded")]
    RecursionLimit(usize),

    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Custom error
    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Creates an [`Error::InvalidTypeName`] for a name that breaks the grammar.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_envelope::Error;
    ///
    /// let err = Error::invalid_type_name("map[string", "unterminated map key");
    /// assert!(err.to_string().contains("unterminated"));
    /// ```
    pub fn invalid_type_name(name: &str, msg: &str) -> Self {
        Error::InvalidTypeName {
            name: name.to_string(),
            msg: msg.to_string(),
        }
    }

    /// Creates a payload error for a sequence tagged with `type_name`.
    pub fn malformed_slice<T: fmt::Display>(type_name: &str, msg: T) -> Self {
        Error::MalformedPayload {
            context: format!("slice {}", type_name),
            msg: msg.to_string(),
        }
    }

    /// Creates a payload error for a mapping tagged with `type_name`.
    pub fn malformed_map<T: fmt::Display>(type_name: &str, msg: T) -> Self {
        Error::MalformedPayload {
            context: format!("map {}", type_name),
            msg: msg.to_string(),
        }
    }

    /// Creates a payload error for anything that is neither a sequence nor a mapping.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_envelope::Error;
    ///
    /// let err = Error::malformed("string", "invalid type: integer `234`, expected a string");
    /// assert_eq!(
    ///     err.to_string(),
    ///     "error unmarshalling string: invalid type: integer `234`, expected a string"
    /// );
    /// ```
    pub fn malformed<T: fmt::Display>(context: &str, msg: T) -> Self {
        Error::MalformedPayload {
            context: context.to_string(),
            msg: msg.to_string(),
        }
    }

    /// Creates a type mismatch error for a failed typed extraction.
    pub fn type_mismatch(expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Creates an unsupported shape error.
    pub fn unsupported_shape(msg: &str) -> Self {
        Error::UnsupportedShape(msg.to_string())
    }

    /// Creates an unsupported map key error.
    pub fn unsupported_map_key(msg: &str) -> Self {
        Error::UnsupportedMapKey(msg.to_string())
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_envelope::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reader/writer failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
