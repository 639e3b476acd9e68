//! Handler sets: bundles of bindings registered together.

use std::fmt;

use super::handler::{EndHandler, HandlerResult, StartHandler};
use crate::error::RegistrationError;
use crate::event::{EndOfElement, StartOfElement};
use crate::expression::PathExpression;
use crate::value::{FromElementValue, Value, ValueKind};

type ValueFn<'h> = Box<dyn FnMut(Value) -> HandlerResult + 'h>;

enum Target<'h> {
    Start(StartHandler<'h>),
    End(EndHandler<'h>),
    /// Conversion named at runtime, resolved on registration.
    NamedEnd {
        type_name: String,
        callback: ValueFn<'h>,
    },
}

struct Binding<'h> {
    pattern: String,
    target: Target<'h>,
}

/// A binding whose pattern is compiled and whose conversion is resolved.
pub(crate) enum ResolvedBinding<'h> {
    Start(PathExpression, StartHandler<'h>),
    End(PathExpression, EndHandler<'h>),
}

/// A bundle of start and end bindings, optionally scoped under a root path.
///
/// Patterns are compiled when the set is registered with a
/// [`Dispatcher`](crate::Dispatcher), so a malformed set is rejected before
/// any parsing happens.
///
/// # Examples
///
/// ```
/// use exhume::{Dispatcher, HandlerSet};
///
/// let xml = "<Inventory><DVDs><DVD><Price>8</Price></DVD><DVD><Price>4</Price></DVD></DVDs></Inventory>";
///
/// let mut total = 0;
/// let mut dispatcher = Dispatcher::new();
/// dispatcher
///     .register(HandlerSet::rooted("/Inventory/DVDs/DVD").on_end("Price", |price: i64| {
///         total += price;
///         Ok(())
///     }))
///     .unwrap();
/// dispatcher.parse_str(xml).unwrap();
/// drop(dispatcher);
///
/// assert_eq!(total, 12);
/// ```
pub struct HandlerSet<'h> {
    root: String,
    bindings: Vec<Binding<'h>>,
}

impl<'h> HandlerSet<'h> {
    /// Create an empty, unscoped set.
    #[must_use]
    pub fn new() -> Self {
        Self::rooted("")
    }

    /// Create an empty set whose patterns are relative to `root`.
    #[must_use]
    pub fn rooted(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            bindings: Vec::new(),
        }
    }

    /// The root path prefix, empty when unscoped.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether the set has no bindings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bind a callback to element starts.
    #[must_use]
    pub fn on_start<F>(self, pattern: impl Into<String>, callback: F) -> Self
    where
        F: FnMut(&StartOfElement) -> HandlerResult + 'h,
    {
        self.with(pattern, Target::Start(StartHandler::new(callback)))
    }

    /// Bind a callback to element ends, receiving the text converted to `T`.
    #[must_use]
    pub fn on_end<T, F>(self, pattern: impl Into<String>, callback: F) -> Self
    where
        T: FromElementValue,
        F: FnMut(T) -> HandlerResult + 'h,
    {
        self.with(pattern, Target::End(EndHandler::typed(callback)))
    }

    /// Bind a callback to element ends, receiving the whole event.
    #[must_use]
    pub fn on_end_element<F>(self, pattern: impl Into<String>, callback: F) -> Self
    where
        F: FnMut(&EndOfElement) -> HandlerResult + 'h,
    {
        self.with(pattern, Target::End(EndHandler::element(callback)))
    }

    /// Bind a callback to element ends with the conversion named at runtime.
    ///
    /// `type_name` is resolved through [`ValueKind::from_name`] when the set
    /// is registered; an unknown name fails registration.
    #[must_use]
    pub fn on_end_value<F>(
        self,
        pattern: impl Into<String>,
        type_name: impl Into<String>,
        callback: F,
    ) -> Self
    where
        F: FnMut(Value) -> HandlerResult + 'h,
    {
        self.with(
            pattern,
            Target::NamedEnd {
                type_name: type_name.into(),
                callback: Box::new(callback),
            },
        )
    }

    fn with(mut self, pattern: impl Into<String>, target: Target<'h>) -> Self {
        self.bindings.push(Binding {
            pattern: pattern.into(),
            target,
        });
        self
    }

    /// Compile every pattern and resolve every conversion.
    ///
    /// Fails on the first invalid binding, leaving nothing half-registered.
    pub(crate) fn resolve(self) -> Result<Vec<ResolvedBinding<'h>>, RegistrationError> {
        let root = self.root;
        self.bindings
            .into_iter()
            .map(|binding| -> Result<ResolvedBinding<'h>, RegistrationError> {
                let expression = PathExpression::compile_scoped(&root, &binding.pattern)?;
                Ok(match binding.target {
                    Target::Start(handler) => ResolvedBinding::Start(expression, handler),
                    Target::End(handler) => ResolvedBinding::End(expression, handler),
                    Target::NamedEnd {
                        type_name,
                        callback,
                    } => {
                        let kind = ValueKind::from_name(&type_name)?;
                        ResolvedBinding::End(expression, EndHandler::dynamic(kind, callback))
                    }
                })
            })
            .collect()
    }
}

impl Default for HandlerSet<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HandlerSet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let patterns: Vec<&str> = self.bindings.iter().map(|b| b.pattern.as_str()).collect();
        f.debug_struct("HandlerSet")
            .field("root", &self.root)
            .field("patterns", &patterns)
            .finish()
    }
}
