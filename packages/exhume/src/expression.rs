//! Path expressions: the patterns handlers are bound to.
//!
//! # Supported Forms
//!
//! 1. **Absolute**: `/Inventory/Books/Book/Price` matches exactly that path.
//! 2. **Relative**: `Book/Price` matches any path ending in `Book/Price`.
//! 3. **Wildcards**: `*` matches exactly one element, `**` matches zero or
//!    more elements, in either form (`/Inventory/*/Book`, `Inventory/**/Price`).
//!
//! # Examples
//!
//! ```
//! use exhume::{Path, PathExpression};
//!
//! let expr = PathExpression::compile("Book/Price").unwrap();
//! assert!(expr.matches(&Path::parse("/Inventory/Books/Book/Price").unwrap()));
//! assert!(!expr.matches(&Path::parse("/Inventory/DVDs/DVD/Price").unwrap()));
//!
//! let scoped = PathExpression::compile_scoped("/Inventory/DVDs/DVD", "Price").unwrap();
//! assert_eq!(scoped.to_string(), "/Inventory/DVDs/DVD/Price");
//! ```

use std::fmt;
use std::str::FromStr;

use crate::config::{MULTI_LEVEL_WILDCARD, SEPARATOR, SINGLE_LEVEL_WILDCARD};
use crate::error::{FormatError, RegistrationError};
use crate::path::Path;

/// One segment of a path expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Particle {
    /// A literal element name.
    Name(String),
    /// `*`: any single element.
    AnyOne,
    /// `**`: any run of zero or more elements.
    AnyMany,
}

impl Particle {
    fn parse(part: &str) -> Self {
        match part {
            SINGLE_LEVEL_WILDCARD => Particle::AnyOne,
            MULTI_LEVEL_WILDCARD => Particle::AnyMany,
            name => Particle::Name(name.to_string()),
        }
    }

    /// Check whether this particle is `*` or `**`.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        !matches!(self, Particle::Name(_))
    }

    fn as_str(&self) -> &str {
        match self {
            Particle::Name(name) => name,
            Particle::AnyOne => SINGLE_LEVEL_WILDCARD,
            Particle::AnyMany => MULTI_LEVEL_WILDCARD,
        }
    }
}

/// Compiled pattern over element hierarchies.
///
/// Two expressions are equal exactly when their canonical string forms are
/// equal: particle names never contain the separator and the wildcard tokens
/// always parse to wildcards, so structural equality coincides with it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathExpression {
    particles: Vec<Particle>,
    absolute: bool,
}

impl PathExpression {
    /// Compile an expression.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] if the text is empty, ends with `/`, has an
    /// empty segment, ends with a wildcard, or has two adjacent wildcards.
    pub fn compile(text: &str) -> Result<Self, FormatError> {
        if text.is_empty() {
            return Err(FormatError::Empty);
        }
        if text.ends_with(SEPARATOR) {
            return Err(FormatError::TrailingSeparator(text.to_string()));
        }

        let (absolute, rest) = match text.strip_prefix(SEPARATOR) {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        let mut particles = Vec::new();
        for part in rest.split(SEPARATOR) {
            if part.is_empty() {
                return Err(FormatError::EmptySegment(text.to_string()));
            }
            particles.push(Particle::parse(part));
        }

        if particles.last().is_some_and(Particle::is_wildcard) {
            return Err(FormatError::TrailingWildcard(text.to_string()));
        }
        if particles
            .windows(2)
            .any(|pair| pair[0].is_wildcard() && pair[1].is_wildcard())
        {
            return Err(FormatError::ConsecutiveWildcards(text.to_string()));
        }

        Ok(Self {
            particles,
            absolute,
        })
    }

    /// Compile `leaf` underneath a root path.
    ///
    /// An empty `root` is the same as [`PathExpression::compile`]. Otherwise
    /// `leaf` must be relative and is joined to `root` with a single
    /// separator.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::AbsoluteLeaf`] for an absolute leaf under
    /// a non-empty root, and [`RegistrationError::Pattern`] if the combined
    /// text is malformed.
    pub fn compile_scoped(root: &str, leaf: &str) -> Result<Self, RegistrationError> {
        if leaf.is_empty() {
            return Err(FormatError::Empty.into());
        }
        if root.is_empty() {
            return Ok(Self::compile(leaf)?);
        }
        if leaf.starts_with(SEPARATOR) {
            return Err(RegistrationError::AbsoluteLeaf {
                root: root.to_string(),
                leaf: leaf.to_string(),
            });
        }

        let base = root.trim_end_matches(SEPARATOR);
        let expression = format!("{base}{SEPARATOR}{leaf}");
        Ok(Self::compile(&expression)?)
    }

    /// Check whether the expression matches a concrete path.
    ///
    /// Absolute expressions must cover the whole path; relative expressions
    /// must cover some tail of it, aligned on segment boundaries.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        match_particles(&self.particles, path.segments(), !self.absolute)
    }

    /// Whether the expression is anchored at the document root.
    #[must_use]
    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    /// The compiled particles in order.
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Whether any particle is a wildcard.
    #[must_use]
    pub fn has_wildcards(&self) -> bool {
        self.particles.iter().any(Particle::is_wildcard)
    }
}

/// Match `particles` against `segments`, anchored at both ends unless
/// `floating`, in which case the match may start at any segment.
///
/// Tracks the set of segment positions reachable after each particle, so
/// the cost is particles times segments regardless of how many `**` the
/// expression holds.
fn match_particles(particles: &[Particle], segments: &[String], floating: bool) -> bool {
    let n = segments.len();
    let mut reach = vec![false; n + 1];
    if floating {
        reach[..n].fill(true);
    } else {
        reach[0] = true;
    }

    let mut next = vec![false; n + 1];
    for particle in particles {
        next.fill(false);
        match particle {
            Particle::Name(name) => {
                for (j, segment) in segments.iter().enumerate() {
                    next[j + 1] = reach[j] && segment == name;
                }
            }
            Particle::AnyOne => next[1..].copy_from_slice(&reach[..n]),
            Particle::AnyMany => {
                let mut seen = false;
                for (slot, &reached) in next.iter_mut().zip(&reach) {
                    seen |= reached;
                    *slot = seen;
                }
            }
        }
        std::mem::swap(&mut reach, &mut next);
        if !reach.contains(&true) {
            return false;
        }
    }
    reach[n]
}

impl fmt::Display for PathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.absolute {
            write!(f, "{SEPARATOR}")?;
        }
        for (i, particle) in self.particles.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            f.write_str(particle.as_str())?;
        }
        Ok(())
    }
}

impl FromStr for PathExpression {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}
