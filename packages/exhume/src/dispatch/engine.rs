//! Dispatcher state machine.

use crate::config::ParseOptions;
use crate::error::{ExhumeError, RegistrationError, Result};
use crate::event::{Attributes, ElementName, EndOfElement, StartOfElement};
use crate::path::Path;
use crate::registry::{
    EndHandler, HandlerRegistry, HandlerSet, InvokeError, ResolvedBinding, StartHandler,
};

/// Counters for the most recent parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Elements opened.
    pub elements: usize,
    /// Start handler invocations.
    pub start_invocations: usize,
    /// End handler invocations.
    pub end_invocations: usize,
}

/// Drives handler invocation from a stream of element events.
///
/// The dispatcher tracks the open elements as a stack of names, with a
/// parallel stack of text buffers. On every open and close it looks up the
/// handlers whose expressions match the current path and invokes them in
/// registration order.
///
/// Path segments are qualified names as written in the document, so a
/// prefixed element `<inv:Book>` is addressed as `inv:Book`.
///
/// One dispatcher handles one parse at a time; it may be reused for further
/// parses, each starting from empty stacks.
pub struct Dispatcher<'h> {
    options: ParseOptions,
    start_handlers: HandlerRegistry<StartHandler<'h>>,
    end_handlers: HandlerRegistry<EndHandler<'h>>,
    names: Vec<String>,
    values: Vec<String>,
    stats: ParseStats,
}

impl<'h> Dispatcher<'h> {
    /// Create a dispatcher with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(ParseOptions::default())
    }

    /// Create a dispatcher with the given options.
    #[must_use]
    pub fn with_options(options: ParseOptions) -> Self {
        Self {
            options,
            start_handlers: HandlerRegistry::new(),
            end_handlers: HandlerRegistry::new(),
            names: Vec::new(),
            values: Vec::new(),
            stats: ParseStats::default(),
        }
    }

    /// Create a dispatcher with the given options and register every set.
    ///
    /// # Errors
    ///
    /// Returns the first [`RegistrationError`] encountered.
    pub fn with_handlers<I>(
        options: ParseOptions,
        sets: I,
    ) -> std::result::Result<Self, RegistrationError>
    where
        I: IntoIterator<Item = HandlerSet<'h>>,
    {
        let mut dispatcher = Self::with_options(options);
        for set in sets {
            dispatcher.register(set)?;
        }
        Ok(dispatcher)
    }

    /// Register all bindings of a handler set.
    ///
    /// The whole set is validated first; if any binding is invalid nothing
    /// from the set is registered.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistrationError`] for an absolute leaf under a root
    /// path, an unknown value type name, or a malformed pattern.
    pub fn register(&mut self, set: HandlerSet<'h>) -> std::result::Result<(), RegistrationError> {
        let root = set.root().to_string();
        for binding in set.resolve()? {
            match binding {
                ResolvedBinding::Start(expression, handler) => {
                    tracing::debug!(
                        expression = %expression,
                        root = %root,
                        "Registered start handler"
                    );
                    self.start_handlers.register(expression, handler);
                }
                ResolvedBinding::End(expression, handler) => {
                    tracing::debug!(
                        expression = %expression,
                        root = %root,
                        kind = ?handler.kind(),
                        "Registered end handler"
                    );
                    self.end_handlers.register(expression, handler);
                }
            }
        }
        Ok(())
    }

    /// The options this dispatcher parses with.
    #[must_use]
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Registry of start handlers.
    #[must_use]
    pub fn start_registry(&self) -> &HandlerRegistry<StartHandler<'h>> {
        &self.start_handlers
    }

    /// Registry of end handlers.
    #[must_use]
    pub fn end_registry(&self) -> &HandlerRegistry<EndHandler<'h>> {
        &self.end_handlers
    }

    /// Counters for the most recent parse.
    #[must_use]
    pub fn stats(&self) -> ParseStats {
        self.stats
    }

    /// Current nesting depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.names.len()
    }

    /// Reset per-parse state.
    pub(crate) fn begin(&mut self) {
        self.names.clear();
        self.values.clear();
        self.stats = ParseStats::default();
    }

    /// Log the outcome of a parse.
    pub(crate) fn finish(&mut self, succeeded: bool) {
        tracing::debug!(
            succeeded,
            elements = self.stats.elements,
            start_invocations = self.stats.start_invocations,
            end_invocations = self.stats.end_invocations,
            start_scans = self.start_handlers.scan_count(),
            end_scans = self.end_handlers.scan_count(),
            "Parse finished"
        );
        if !self.names.is_empty() {
            tracing::debug!(open = self.names.len(), "Parse ended with open elements");
        }
    }

    /// Handle an element start.
    ///
    /// `attributes` is only called when at least one start handler matches.
    pub(crate) fn start_element<F>(&mut self, name: ElementName, attributes: F) -> Result<()>
    where
        F: FnOnce() -> Result<Attributes>,
    {
        if self.names.len() >= self.options.max_depth {
            return Err(ExhumeError::DepthLimit {
                limit: self.options.max_depth,
                element: name.qualified,
            });
        }

        self.names.push(name.qualified.clone());
        self.values.push(String::new());
        self.stats.elements += 1;

        if self.start_handlers.is_empty() {
            return Ok(());
        }

        let path = Path::from_stack(&self.names);
        let ids = self.start_handlers.handlers_for(&path);
        if ids.is_empty() {
            return Ok(());
        }

        let event = StartOfElement::new(path, name, attributes()?);
        for &id in ids.iter() {
            if let Some(handler) = self.start_handlers.handler_mut(id) {
                handler
                    .invoke(&event)
                    .map_err(|err| invoke_failure(err, event.path()))?;
                self.stats.start_invocations += 1;
            }
        }
        Ok(())
    }

    /// Handle character data.
    ///
    /// Text outside the document element has no accumulator and is dropped.
    pub(crate) fn characters(&mut self, text: &str) {
        if let Some(value) = self.values.last_mut() {
            value.push_str(text);
        }
    }

    /// Handle an element end.
    pub(crate) fn end_element(&mut self, name: ElementName) -> Result<()> {
        let Some(value) = self.values.pop() else {
            // Unbalanced input is reported by the parser itself.
            return Ok(());
        };
        let result = self.dispatch_end(name, value);
        self.names.pop();
        result
    }

    fn dispatch_end(&mut self, name: ElementName, value: String) -> Result<()> {
        if self.end_handlers.is_empty() {
            return Ok(());
        }

        let path = Path::from_stack(&self.names);
        let ids = self.end_handlers.handlers_for(&path);
        if ids.is_empty() {
            return Ok(());
        }

        let event = EndOfElement::new(path, name, value);
        for &id in ids.iter() {
            if let Some(handler) = self.end_handlers.handler_mut(id) {
                handler
                    .invoke(&event)
                    .map_err(|err| invoke_failure(err, event.path()))?;
                self.stats.end_invocations += 1;
            }
        }
        Ok(())
    }
}

fn invoke_failure(err: InvokeError, path: &Path) -> ExhumeError {
    match err {
        InvokeError::Conversion(source) => ExhumeError::Conversion {
            path: path.to_string(),
            source,
        },
        InvokeError::Handler(source) => ExhumeError::Handler {
            path: path.to_string(),
            source,
        },
    }
}

impl Default for Dispatcher<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dispatcher<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("options", &self.options)
            .field("start_handlers", &self.start_handlers)
            .field("end_handlers", &self.end_handlers)
            .field("depth", &self.names.len())
            .finish()
    }
}
