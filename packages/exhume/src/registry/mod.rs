//! Handler registry system for path-addressed dispatch.
//!
//! Handlers are bound to path expressions through a [`HandlerSet`] and
//! stored in a [`HandlerRegistry`], which answers "which handlers apply to
//! this path" with a memoized lookup.

mod core;
mod handler;
mod types;

pub use self::core::{HandlerId, HandlerRegistry};
pub(crate) use handler::InvokeError;
pub use handler::{EndHandler, HandlerResult, StartHandler};
pub(crate) use types::ResolvedBinding;
pub use types::HandlerSet;
