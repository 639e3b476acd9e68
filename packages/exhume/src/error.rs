//! Error types for exhume.
//!
//! Uses the dual-error pattern: `FormatError`, `RegistrationError` and
//! `ConversionError` describe failures of the value layer and are returned
//! directly by constructors, while `ExhumeError` wraps everything that can
//! end a parse.

use thiserror::Error;

use crate::value::ValueKind;

/// Error raised by a handler callback.
///
/// Any error type can be returned from a callback with `?` or `.into()`.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Malformed `Path` or `PathExpression` text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Nothing to parse.
    #[error("Path text cannot be empty")]
    Empty,

    /// A concrete path must be rooted.
    #[error("Path '{0}' must start with '/'")]
    MissingLeadingSeparator(String),

    /// Paths and expressions never end with a separator.
    #[error("Path '{0}' must not end with '/'")]
    TrailingSeparator(String),

    /// Two separators with nothing in between.
    #[error("Path '{0}' contains an empty segment")]
    EmptySegment(String),

    /// An element name given on its own contains the separator.
    #[error("Element name '{0}' must not contain '/'")]
    SeparatorInName(String),

    /// An expression must end with an element name.
    #[error("Path expression '{0}' must end with an element name, not a wildcard")]
    TrailingWildcard(String),

    /// `*` or `**` directly followed by another wildcard.
    #[error("Path expression '{0}' contains consecutive wildcards")]
    ConsecutiveWildcards(String),
}

/// Invalid handler binding, detected before any parsing happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// An absolute leaf pattern was combined with a root path.
    #[error("Leaf expression '{leaf}' cannot be absolute when using root path '{root}'")]
    AbsoluteLeaf { root: String, leaf: String },

    /// No conversion exists for the declared value type.
    #[error(
        "Unsupported value type '{0}'. Expected one of: string, integer, float, decimal, boolean, date"
    )]
    UnsupportedValueType(String),

    /// The binding's pattern text is malformed.
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] FormatError),
}

/// Element text that does not conform to the requested type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot convert '{text}' to {kind}: {reason}")]
pub struct ConversionError {
    /// The conversion that was attempted.
    pub kind: ValueKind,
    /// The accumulated element text.
    pub text: String,
    /// Why the text was rejected.
    pub reason: String,
}

impl ConversionError {
    /// Create a conversion error for `text`.
    pub fn new(kind: ValueKind, text: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            reason: reason.into(),
        }
    }
}

/// Main error type for dispatching a parse.
#[derive(Debug, Error)]
pub enum ExhumeError {
    /// Malformed path text.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Invalid handler binding.
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    /// Element text could not be converted for an end handler.
    #[error("Conversion failed at {path}: {source}")]
    Conversion {
        path: String,
        #[source]
        source: ConversionError,
    },

    /// A handler callback returned an error.
    #[error("Handler failed at {path}: {source}")]
    Handler {
        path: String,
        #[source]
        source: HandlerError,
    },

    /// The document nests deeper than the configured limit.
    #[error("Element depth limit of {limit} exceeded at <{element}>")]
    DepthLimit { limit: usize, element: String },

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Names, namespaces or character data were not valid UTF-8.
    #[error("Invalid UTF-8 in XML input: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON output could not be written.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for exhume operations.
pub type Result<T> = std::result::Result<T, ExhumeError>;
