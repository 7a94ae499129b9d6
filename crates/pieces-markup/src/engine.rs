//! Build engine.
//!
//! [`Engine`] ties the pieces together:
//!
//! 1. Configuration: taxonomies are declared and one markup construct per
//!    `(taxonomy, kind)` is registered. Errors here are fatal and surface as
//!    [`ConfigurationError`] before any document is read.
//! 2. Parse: each document is read into its own tree against an empty
//!    catalog partition. Documents are independent, so [`Engine::build`]
//!    reads them in parallel.
//! 3. Resolve: the [`DeferredEditPass`] runs on each finished tree.
//! 4. Commit: partitions are merged into the engine's taxonomies, replacing
//!    whatever the same documents registered before.

use std::collections::HashSet;

use pieces_config::TaxonomyDeclaration;
use rayon::prelude::*;

use crate::catalog::RegisteredObject;
use crate::deferred::{DeferredEditPass, ResolveReport};
use crate::error::ConfigurationError;
use crate::markup::{
    HandlerFactory, MarkupDescriptor, MarkupRegistry, MarkupRegistryBuilder, factory_for,
};
use crate::reader::{ParsedDocument, parse_document};
use crate::taxonomy::{Taxonomies, Taxonomy};
use crate::tree::DocumentTree;
use crate::warning::BuildWarning;

/// Source text of one document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceDocument {
    /// Document identifier (e.g. path without extension).
    pub id: String,
    /// Document text.
    pub text: String,
}

impl SourceDocument {
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// One document after parsing and resolution.
#[derive(Clone, Debug)]
pub struct ProcessedDocument {
    /// Resolved tree, free of placeholders.
    pub tree: DocumentTree,
    /// Warnings for skipped markup occurrences, in source order.
    pub warnings: Vec<BuildWarning>,
    /// Deferred edit outcomes.
    pub report: ResolveReport,
    partition: Taxonomies,
}

impl ProcessedDocument {
    #[must_use]
    pub fn document_id(&self) -> &str {
        &self.tree.document_id
    }

    /// Objects registered by this document alone.
    #[must_use]
    pub fn partition(&self) -> &Taxonomies {
        &self.partition
    }
}

/// Result of [`Engine::build`].
#[derive(Clone, Debug, Default)]
pub struct BuildOutput {
    /// Processed documents in input order.
    pub documents: Vec<ProcessedDocument>,
}

impl BuildOutput {
    /// Warnings of all documents, grouped by document in input order.
    pub fn warnings(&self) -> impl Iterator<Item = &BuildWarning> {
        self.documents.iter().flat_map(|d| d.warnings.iter())
    }

    /// Tree of `document_id`.
    #[must_use]
    pub fn tree(&self, document_id: &str) -> Option<&DocumentTree> {
        self.documents
            .iter()
            .find(|d| d.document_id() == document_id)
            .map(|d| &d.tree)
    }

    /// Number of applied deferred edits.
    #[must_use]
    pub fn resolved(&self) -> usize {
        self.documents.iter().map(|d| d.report.resolved()).sum()
    }

    /// Number of dropped deferred edits.
    #[must_use]
    pub fn orphaned(&self) -> usize {
        self.documents.iter().map(|d| d.report.orphaned()).sum()
    }
}

/// Configures an [`Engine`].
///
/// All registration happens here; the built engine's registry is immutable.
#[derive(Default)]
pub struct EngineBuilder {
    taxonomies: Taxonomies,
    registry: MarkupRegistryBuilder,
    pass: DeferredEditPass,
}

impl EngineBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a taxonomy and register its kinds with the built-in handler
    /// style of the declaration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::DuplicateTaxonomy`] if the taxonomy is
    /// already declared and [`ConfigurationError::Registry`] if a markup name
    /// is invalid or taken.
    pub fn declare(
        &mut self,
        declaration: &TaxonomyDeclaration,
    ) -> Result<&mut Self, ConfigurationError> {
        if self.taxonomies.get(&declaration.name).is_some() {
            return Err(ConfigurationError::DuplicateTaxonomy(
                declaration.name.clone(),
            ));
        }

        let factory = factory_for(declaration.handler);
        for kind in &declaration.kinds {
            self.registry
                .register(MarkupDescriptor::new(&declaration.name, kind), factory)?;
        }
        self.taxonomies.insert(Taxonomy::new(
            declaration.name.clone(),
            declaration.kinds.iter().cloned(),
        ));

        tracing::debug!(
            taxonomy = %declaration.name,
            kinds = declaration.kinds.len(),
            handler = ?declaration.handler,
            "Declared taxonomy"
        );
        Ok(self)
    }

    /// Register a custom handler for a declared taxonomy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownTaxonomy`] if the descriptor's
    /// taxonomy is not declared and [`ConfigurationError::Registry`] if the
    /// markup name is invalid or taken.
    pub fn handler<F>(
        &mut self,
        descriptor: MarkupDescriptor,
        factory: F,
    ) -> Result<&mut Self, ConfigurationError>
    where
        F: HandlerFactory + 'static,
    {
        if self.taxonomies.get(&descriptor.taxonomy).is_none() {
            return Err(ConfigurationError::UnknownTaxonomy {
                markup: descriptor.markup_name,
                taxonomy: descriptor.taxonomy,
            });
        }
        self.registry.register(descriptor, factory)?;
        Ok(self)
    }

    /// Replace the deferred-edit pass.
    pub fn deferred_pass(&mut self, pass: DeferredEditPass) -> &mut Self {
        self.pass = pass;
        self
    }

    /// Freeze the configuration.
    #[must_use]
    pub fn build(self) -> Engine {
        Engine {
            taxonomies: self.taxonomies,
            registry: self.registry.build(),
            pass: self.pass,
        }
    }
}

/// Multi-document build engine.
#[derive(Debug)]
pub struct Engine {
    taxonomies: Taxonomies,
    registry: MarkupRegistry,
    pass: DeferredEditPass,
}

impl Engine {
    /// Create an engine from taxonomy declarations.
    ///
    /// An empty slice yields an engine without taxonomies.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if the declarations conflict.
    pub fn new(declarations: &[TaxonomyDeclaration]) -> Result<Self, ConfigurationError> {
        let mut builder = Self::builder();
        for declaration in declarations {
            builder.declare(declaration)?;
        }
        Ok(builder.build())
    }

    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Committed taxonomies.
    #[must_use]
    pub fn taxonomies(&self) -> &Taxonomies {
        &self.taxonomies
    }

    #[must_use]
    pub fn registry(&self) -> &MarkupRegistry {
        &self.registry
    }

    /// Look up a committed object by exact name.
    #[must_use]
    pub fn resolve_reference(&self, taxonomy: &str, name: &str) -> Option<&RegisteredObject> {
        self.taxonomies.resolve_reference(taxonomy, name)
    }

    /// Parse and resolve one document without committing it.
    #[must_use]
    pub fn process_document(&self, document_id: &str, source: &str) -> ProcessedDocument {
        let mut partition = self.taxonomies.empty_partition();
        let ParsedDocument { mut tree, warnings } =
            parse_document(document_id, source, &self.registry, &mut partition);
        let report = self.pass.run(&mut tree);

        ProcessedDocument {
            tree,
            warnings,
            report,
            partition,
        }
    }

    /// Replace the document's committed objects with the ones in `document`.
    ///
    /// Returns the number of objects added.
    pub fn commit(&mut self, document: &ProcessedDocument) -> usize {
        let document_id = document.document_id().to_owned();
        let removed = self.taxonomies.remove_document(&document_id);
        let added = self
            .taxonomies
            .merge(&document.partition, &HashSet::from([document_id]));

        tracing::debug!(
            document = %document.document_id(),
            removed,
            added,
            "Committed document"
        );
        added
    }

    /// Process `documents` in parallel and commit them in input order.
    ///
    /// Committed state does not depend on the order in which workers finish.
    pub fn build(&mut self, documents: &[SourceDocument]) -> BuildOutput {
        let processed: Vec<ProcessedDocument> = documents
            .par_iter()
            .map(|document| self.process_document(&document.id, &document.text))
            .collect();

        for document in &processed {
            self.commit(document);
        }

        let output = BuildOutput {
            documents: processed,
        };
        tracing::info!(
            documents = output.documents.len(),
            objects = self.object_count(),
            warnings = output.warnings().count(),
            orphaned = output.orphaned(),
            "Build finished"
        );
        output
    }

    /// Process and commit a single changed document.
    pub fn rebuild_document(&mut self, document_id: &str, source: &str) -> ProcessedDocument {
        let document = self.process_document(document_id, source);
        self.commit(&document);
        document
    }

    /// Drop everything `document_id` registered. Idempotent.
    pub fn remove_document(&mut self, document_id: &str) -> usize {
        self.taxonomies.remove_document(document_id)
    }

    /// Total number of committed objects.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.taxonomies.iter().map(|t| t.catalog().len()).sum()
    }
}
