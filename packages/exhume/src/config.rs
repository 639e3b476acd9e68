//! Configuration constants and parse options.

use regex::Regex;
use std::sync::LazyLock;

/// Separator between path segments.
pub const SEPARATOR: char = '/';

/// Particle matching exactly one path segment.
pub const SINGLE_LEVEL_WILDCARD: &str = "*";

/// Particle matching zero or more consecutive path segments.
pub const MULTI_LEVEL_WILDCARD: &str = "**";

/// Default maximum element nesting depth.
///
/// Protects the name and text stacks against pathologically deep documents.
/// Real-world data files rarely exceed a few dozen levels.
pub const DEFAULT_MAX_DEPTH: usize = 1_024;

/// Integer grammar: optional sign followed by decimal digits.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
pub(crate) static INTEGER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+$").expect("valid regex"));

/// Decimal or exponential numeric literal.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
pub(crate) static NUMBER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?([0-9]+\.?[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?$").expect("valid regex")
});

/// Date pattern: YYYY-MM-DD.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
pub(crate) static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid regex"));

/// Options controlling how a document is fed to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Resolve namespace URIs for elements and attributes.
    ///
    /// When disabled, events report no namespace and attributes can only
    /// be looked up by qualified name.
    pub namespace_aware: bool,

    /// Maximum element nesting depth before the parse is aborted.
    pub max_depth: usize,
}

impl ParseOptions {
    /// Create options with namespace resolution disabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            namespace_aware: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Enable or disable namespace resolution.
    #[must_use]
    pub fn with_namespaces(mut self, enabled: bool) -> Self {
        self.namespace_aware = enabled;
        self
    }

    /// Set the maximum element nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::new()
    }
}
