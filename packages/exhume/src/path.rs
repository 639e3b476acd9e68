//! Concrete element paths observed while parsing.
//!
//! A [`Path`] is the fully resolved hierarchy of open elements, written as
//! `/Inventory/Books/Book`. It is the key the dispatcher uses to look up
//! handlers.
//!
//! # Examples
//!
//! ```
//! use exhume::Path;
//!
//! let path = Path::parse("/Inventory/Books/Book").unwrap();
//! assert_eq!(path.segments(), ["Inventory", "Books", "Book"]);
//! assert_eq!(path.leaf(), "Book");
//! assert_eq!(path.to_string(), "/Inventory/Books/Book");
//!
//! assert!(Path::parse("Inventory/Books").is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::config::SEPARATOR;
use crate::error::FormatError;

/// Rooted, non-empty sequence of element names.
///
/// Equality and hashing are structural over the segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// Parse the canonical `/a/b/c` form.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] if the text does not start with `/`, ends
    /// with `/`, or contains an empty segment.
    pub fn parse(text: &str) -> Result<Self, FormatError> {
        if text.is_empty() {
            return Err(FormatError::Empty);
        }
        let Some(rest) = text.strip_prefix(SEPARATOR) else {
            return Err(FormatError::MissingLeadingSeparator(text.to_string()));
        };
        if text.ends_with(SEPARATOR) {
            return Err(FormatError::TrailingSeparator(text.to_string()));
        }

        let segments: Vec<String> = rest.split(SEPARATOR).map(String::from).collect();
        if segments.iter().any(String::is_empty) {
            return Err(FormatError::EmptySegment(text.to_string()));
        }

        Ok(Self { segments })
    }

    /// Build a path from already separated element names.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] if there are no names, or if a name is
    /// empty or contains the separator.
    pub fn from_segments<I, S>(names: I) -> Result<Self, FormatError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = names.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(FormatError::Empty);
        }
        if let Some(name) = segments.iter().find(|s| s.contains(SEPARATOR)) {
            return Err(FormatError::SeparatorInName(name.clone()));
        }
        if segments.iter().any(String::is_empty) {
            return Err(FormatError::EmptySegment(join(&segments)));
        }
        Ok(Self { segments })
    }

    /// Snapshot of the dispatcher's name stack.
    ///
    /// The stack only ever holds names reported by the XML parser, which are
    /// never empty, so no validation is repeated here.
    pub(crate) fn from_stack(stack: &[String]) -> Self {
        debug_assert!(!stack.is_empty(), "path built from an empty name stack");
        Self {
            segments: stack.to_vec(),
        }
    }

    /// The element names from the document root down.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Name of the innermost element.
    #[must_use]
    pub fn leaf(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }

    /// Number of segments (1 for the document element).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// The enclosing path, or `None` for the document element.
    #[must_use]
    pub fn parent(&self) -> Option<Path> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }
}

fn join(segments: &[String]) -> String {
    let mut out = String::new();
    for segment in segments {
        out.push(SEPARATOR);
        out.push_str(segment);
    }
    out
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "{SEPARATOR}{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Path {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
