//! exhume - Path-addressed handlers over a streaming XML parse.
//!
//! Callers bind callbacks to element paths such as
//! `/Inventory/Books/Book/Title` and receive element starts (with
//! attributes) and element ends (with the accumulated text, optionally
//! converted to a typed value) while the document streams past. No tree is
//! ever built.
//!
//! # Example
//!
//! ```
//! use exhume::{Dispatcher, HandlerSet};
//!
//! let xml = r#"<Inventory>
//!     <Books>
//!         <Book onSale="true"><Title>Chinatown</Title><Price>10</Price></Book>
//!         <Book><Title>Pi</Title><Price>17</Price></Book>
//!     </Books>
//! </Inventory>"#;
//!
//! let mut titles = Vec::new();
//! let mut total = 0;
//! let mut dispatcher = Dispatcher::new();
//! dispatcher
//!     .register(
//!         HandlerSet::rooted("/Inventory/Books/Book")
//!             .on_end("Title", |title: String| {
//!                 titles.push(title);
//!                 Ok(())
//!             })
//!             .on_end("Price", |price: i64| {
//!                 total += price;
//!                 Ok(())
//!             }),
//!     )
//!     .unwrap();
//! dispatcher.parse_str(xml).unwrap();
//! drop(dispatcher);
//!
//! assert_eq!(titles, ["Chinatown", "Pi"]);
//! assert_eq!(total, 27);
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Constants, grammar checks and [`ParseOptions`]
//! - [`error`]: Error types and Result alias
//! - [`path`]: Concrete element paths
//! - [`expression`]: Path patterns and matching
//! - [`value`]: Conversion of element text to typed values
//! - [`event`]: Start and end element events
//! - [`registry`]: Handler sets and the memoized handler registry
//! - [`dispatch`]: The dispatcher and its quick-xml driver
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod expression;
pub mod path;
pub mod registry;
pub mod value;

// Re-export commonly used items
pub use config::ParseOptions;
pub use dispatch::{Dispatcher, ParseStats};
pub use error::{
    ConversionError, ExhumeError, FormatError, HandlerError, RegistrationError, Result,
};
pub use event::{Attribute, Attributes, ElementName, EndOfElement, StartOfElement};
pub use expression::{Particle, PathExpression};
pub use path::Path;
pub use registry::{HandlerRegistry, HandlerResult, HandlerSet};
pub use value::{FromElementValue, Value, ValueKind};
