//! Configurable markup extensions backed by taxonomy catalogs.
//!
//! Taxonomies and their kinds come from configuration. Every
//! `(taxonomy, kind)` pair becomes a markup construct `taxonomy:kind`
//! whose handler registers named objects into the taxonomy's [`Catalog`].
//! Catalogs feed alphabetical indices ([`Taxonomy::build_index`]) and
//! name lookups ([`Taxonomy::resolve_reference`]).
//!
//! Markup that edits content appearing later in the document (such as
//! annotating the next section title) leaves a placeholder in the tree.
//! The [`DeferredEditPass`] resolves placeholders once the tree is complete.
//!
//! # Example
//!
//! ```
//! use pieces_config::{HandlerStyle, TaxonomyDeclaration};
//! use pieces_markup::{Engine, SourceDocument};
//!
//! let mut engine = Engine::new(&[
//!     TaxonomyDeclaration::new("unit", ["parameter"]),
//!     TaxonomyDeclaration::new("pieces", ["fafafa"]).with_handler(HandlerStyle::Annotate),
//! ])
//! .unwrap();
//!
//! let output = engine.build(&[SourceDocument::new(
//!     "index",
//!     ".. unit:parameter:: MyParam\n\n   Some content.\n\n.. pieces:fafafa::\n\nBar\n===\n",
//! )]);
//!
//! let tree = output.tree("index").unwrap();
//! assert_eq!(tree.section_titles(), vec!["MyParam parameter", "Bar fafafa"]);
//! assert!(engine.resolve_reference("unit", "MyParam").is_some());
//! ```

mod anchor;
mod catalog;
mod deferred;
mod engine;
mod error;
pub mod markup;
mod reader;
mod taxonomy;
mod tree;
mod warning;

pub use anchor::{make_id, object_anchor};
pub use catalog::{Catalog, RegisteredObject};
pub use deferred::{
    DeferredEdit, DeferredEditPass, EditKind, Resolution, ResolveReport, TargetPredicate,
};
pub use engine::{BuildOutput, Engine, EngineBuilder, ProcessedDocument, SourceDocument};
pub use error::{CatalogError, ConfigurationError, MarkupError, RegistryError, TaxonomyError};
pub use reader::{ParsedDocument, parse_document};
pub use taxonomy::{IndexGroup, Taxonomies, Taxonomy};
pub use tree::{DocumentTree, Node, NodeKind};
pub use warning::{BuildWarning, SourceLocation};
