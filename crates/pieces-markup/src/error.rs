//! Error types for catalogs, taxonomies, the markup registry and handlers.

/// Catalog invariant violation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// The anchor is already used by another object of the same document.
    #[error("duplicate anchor '{anchor_id}' in document '{document_id}'")]
    DuplicateAnchor {
        /// Document owning both objects.
        document_id: String,
        /// Colliding anchor.
        anchor_id: String,
    },
}

/// Error raised when registering an object into a taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaxonomyError {
    /// The kind is not declared by the taxonomy.
    #[error("kind '{kind}' is not declared by taxonomy '{taxonomy}'")]
    UnknownKind {
        /// Taxonomy name.
        taxonomy: String,
        /// Offending kind.
        kind: String,
    },
    /// The catalog rejected the object.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Error raised while populating the markup registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A handler is already registered under this markup name.
    #[error("markup '{0}' is registered more than once")]
    DuplicateMarkupName(String),
    /// The markup name is not of the form `taxonomy:kind`.
    #[error("invalid markup name '{0}' (expected 'taxonomy:kind')")]
    InvalidMarkupName(String),
}

/// Recoverable error for a single markup occurrence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkupError {
    /// No handler is registered under this markup name.
    #[error("unknown markup '{0}'")]
    UnknownMarkup(String),
    /// The handler refers to a taxonomy absent from the build.
    #[error("unknown taxonomy '{0}'")]
    UnknownTaxonomy(String),
    /// The markup requires an argument that was not given.
    #[error("markup '{0}' requires an argument")]
    MissingArgument(String),
    /// Registering the object failed.
    #[error(transparent)]
    Taxonomy(#[from] TaxonomyError),
}

/// Build-fatal configuration error, raised before any document is parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// The markup registry could not be populated.
    #[error("configuration error: {0}")]
    Registry(#[from] RegistryError),
    /// Two declarations share a taxonomy name.
    #[error("configuration error: taxonomy '{0}' is declared more than once")]
    DuplicateTaxonomy(String),
    /// A custom handler refers to a taxonomy that is not declared.
    #[error("configuration error: handler for '{markup}' refers to undeclared taxonomy '{taxonomy}'")]
    UnknownTaxonomy {
        /// Markup name of the handler.
        markup: String,
        /// Undeclared taxonomy.
        taxonomy: String,
    },
}
