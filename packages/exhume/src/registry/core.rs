//! Handler registry mapping path expressions to handlers.

use std::collections::HashMap;
use std::rc::Rc;

use crate::expression::PathExpression;
use crate::path::Path;

/// Position of a handler in registration order.
pub type HandlerId = usize;

/// Registry mapping path expressions to handlers.
///
/// Several handlers may share one expression. Lookups by concrete path are
/// memoized: the first lookup of a path evaluates every distinct expression
/// once, later lookups of an equal path reuse the result.
pub struct HandlerRegistry<H> {
    expressions: Vec<PathExpression>,
    expression_index: HashMap<PathExpression, usize>,
    /// Handlers in registration order, tagged with their expression.
    handlers: Vec<(usize, H)>,
    cache: HashMap<Path, Rc<[HandlerId]>>,
    scans: usize,
}

impl<H> HandlerRegistry<H> {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            expressions: Vec::new(),
            expression_index: HashMap::new(),
            handlers: Vec::new(),
            cache: HashMap::new(),
            scans: 0,
        }
    }

    /// Register a handler for an expression.
    ///
    /// Never fails; duplicate expressions accumulate handlers. Any cached
    /// lookups are discarded since they may now be incomplete.
    pub fn register(&mut self, expression: PathExpression, handler: H) -> HandlerId {
        let slot = match self.expression_index.get(&expression) {
            Some(&slot) => slot,
            None => {
                let slot = self.expressions.len();
                self.expression_index.insert(expression.clone(), slot);
                self.expressions.push(expression);
                slot
            }
        };
        self.handlers.push((slot, handler));
        self.cache.clear();
        self.handlers.len() - 1
    }

    /// Ids of all handlers whose expression matches `path`, in registration
    /// order.
    pub fn handlers_for(&mut self, path: &Path) -> Rc<[HandlerId]> {
        if let Some(cached) = self.cache.get(path) {
            return Rc::clone(cached);
        }

        self.scans += 1;
        let matched: Vec<bool> = self
            .expressions
            .iter()
            .map(|expression| expression.matches(path))
            .collect();
        let ids: Rc<[HandlerId]> = self
            .handlers
            .iter()
            .enumerate()
            .filter(|(_, (slot, _))| matched[*slot])
            .map(|(id, _)| id)
            .collect();

        tracing::trace!(
            path = %path,
            expressions = self.expressions.len(),
            matched = ids.len(),
            "Handler cache miss"
        );

        self.cache.insert(path.clone(), Rc::clone(&ids));
        ids
    }

    /// Get a handler for invocation.
    pub fn handler_mut(&mut self, id: HandlerId) -> Option<&mut H> {
        self.handlers.get_mut(id).map(|(_, handler)| handler)
    }

    /// Expression a handler was registered under.
    #[must_use]
    pub fn expression_of(&self, id: HandlerId) -> Option<&PathExpression> {
        self.handlers
            .get(id)
            .map(|(slot, _)| &self.expressions[*slot])
    }

    /// Check if no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Distinct expressions, in order of first registration.
    #[must_use]
    pub fn expressions(&self) -> &[PathExpression] {
        &self.expressions
    }

    /// Number of full expression scans performed, i.e. cache misses.
    #[must_use]
    pub fn scan_count(&self) -> usize {
        self.scans
    }
}

impl<H> Default for HandlerRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> std::fmt::Debug for HandlerRegistry<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("expressions", &self.expressions)
            .field("handlers", &self.handlers.len())
            .field("cached_paths", &self.cache.len())
            .field("scans", &self.scans)
            .finish()
    }
}
