//! Configuration options for encoding and decoding.
//!
//! - [`EncodeOptions`]: controls how payloads are written
//! - [`DecodeOptions`]: limits applied while reading envelopes back
//!
//! ## Examples
//!
//! ```rust
//! use serde_envelope::{to_string_with_options, EncodeOptions};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, Clone, PartialEq, Debug, Default)]
//! #[serde(default)]
//! struct Data { x: i32, y: i32 }
//! serde_envelope::tagged!(Data => "demo.Data");
//!
//! let data = Data { x: 1, y: 0 };
//!
//! // Drop fields holding their default value
//! let options = EncodeOptions::new().with_omit_defaults(true);
//! let json = to_string_with_options(&data, options).unwrap();
//! assert_eq!(json, r#"{"_t":"demo.Data","v":{"x":1}}"#);
//! ```

/// Default nesting limit for [`DecodeOptions`].
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Configuration options for encoding.
///
/// Omission of default-valued struct fields is opt-in. Structs encoded with
/// `omit_defaults` decode again when they carry `#[serde(default)]` or are registered with
/// [`Registry::register_defaulted`](crate::Registry::register_defaulted).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    pub omit_defaults: bool,
}

impl EncodeOptions {
    /// Creates default options: every field is written.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_envelope::EncodeOptions;
    ///
    /// let options = EncodeOptions::new();
    /// assert!(!options.omit_defaults);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options that drop default-valued struct fields.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_envelope::EncodeOptions;
    ///
    /// assert!(EncodeOptions::compact().omit_defaults);
    /// ```
    #[must_use]
    pub fn compact() -> Self {
        EncodeOptions {
            omit_defaults: true,
        }
    }

    /// Sets whether struct fields holding `0`, `""`, `false` or `null` are dropped.
    #[must_use]
    pub fn with_omit_defaults(mut self, omit_defaults: bool) -> Self {
        self.omit_defaults = omit_defaults;
        self
    }
}

/// Configuration options for decoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodeOptions {
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DecodeOptions {
    /// Creates default options.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_envelope::DecodeOptions;
    ///
    /// assert_eq!(DecodeOptions::new().max_depth, 128);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the deepest type-name or envelope nesting the decoder accepts.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_envelope::DecodeOptions;
    ///
    /// let options = DecodeOptions::new().with_max_depth(16);
    /// assert_eq!(options.max_depth, 16);
    /// ```
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
