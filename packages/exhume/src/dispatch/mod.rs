//! Path-tracking dispatch of element events to registered handlers.
//!
//! [`Dispatcher`] owns the open-element stack and the text accumulators;
//! the XML source adapters feed it tokens from quick-xml.

mod engine;
mod source;

pub use engine::{Dispatcher, ParseStats};
