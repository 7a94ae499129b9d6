//! Configurable markup constructs.
//!
//! Each configured `(taxonomy, kind)` pair becomes a markup construct named
//! `taxonomy:kind`. The [`MarkupRegistry`] maps those names to
//! [`HandlerFactory`] values; every occurrence found by the parser gets a
//! fresh [`MarkupHandler`] from its factory.
//!
//! # Lifecycle
//!
//! 1. **Registration**: a [`MarkupRegistryBuilder`] is populated once, before
//!    any document is parsed, and frozen into a [`MarkupRegistry`].
//! 2. **Dispatch**: the frozen registry is shared read-only between parser
//!    workers. [`MarkupRegistry::dispatch`] runs the handler for one
//!    occurrence against the worker's catalog partition.
//!
//! # Handler Styles
//!
//! - [`SectionHandler`]: registers the object and emits an anchor plus a
//!   titled section built from the content.
//! - [`AnnotateHandler`]: emits a placeholder that later appends the kind to
//!   the next section's title.
//!
//! # Example
//!
//! ```
//! use pieces_markup::markup::{
//!     MarkupContext, MarkupDescriptor, MarkupOccurrence, MarkupRegistry, SectionHandler,
//! };
//! use pieces_markup::{SourceLocation, Taxonomies, Taxonomy};
//!
//! let mut builder = MarkupRegistry::builder();
//! builder
//!     .register(MarkupDescriptor::new("unit", "parameter"), SectionHandler::factory)
//!     .unwrap();
//! let registry = builder.build();
//!
//! let mut taxonomies = Taxonomies::new();
//! taxonomies.insert(Taxonomy::new("unit", ["parameter"]));
//!
//! let occurrence = MarkupOccurrence::new("unit:parameter", SourceLocation::new("index", 4))
//!     .with_arguments(["MyParam"]);
//! let mut ctx = MarkupContext::new("index", &registry, &mut taxonomies);
//! let nodes = registry.dispatch(&occurrence, &mut ctx).unwrap();
//!
//! assert_eq!(nodes.len(), 2);
//! assert!(taxonomies.resolve_reference("unit", "MyParam").is_some());
//! ```

mod builtin;
mod context;
mod descriptor;
mod handler;
mod occurrence;
mod registry;

pub use builtin::{AnnotateHandler, SectionHandler, factory_for};
pub use context::MarkupContext;
pub use descriptor::MarkupDescriptor;
pub use handler::{HandlerFactory, MarkupHandler};
pub use occurrence::MarkupOccurrence;
pub use registry::{MarkupRegistry, MarkupRegistryBuilder};
