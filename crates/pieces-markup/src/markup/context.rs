//! Markup processing context.

use super::{MarkupOccurrence, MarkupRegistry};
use crate::catalog::RegisteredObject;
use crate::error::MarkupError;
use crate::reader::parse_block;
use crate::taxonomy::{Taxonomies, Taxonomy};
use crate::tree::Node;
use crate::warning::BuildWarning;

/// Context handed to markup handlers for one document.
///
/// Holds the document's own catalog partition, so handlers running for
/// different documents never share mutable state.
pub struct MarkupContext<'a> {
    document_id: &'a str,
    registry: &'a MarkupRegistry,
    taxonomies: &'a mut Taxonomies,
    warnings: Vec<BuildWarning>,
}

impl<'a> MarkupContext<'a> {
    /// Create a context writing into `taxonomies` on behalf of `document_id`.
    ///
    /// `registry` is used to read markup nested in content blocks.
    pub fn new(
        document_id: &'a str,
        registry: &'a MarkupRegistry,
        taxonomies: &'a mut Taxonomies,
    ) -> Self {
        Self {
            document_id,
            registry,
            taxonomies,
            warnings: Vec::new(),
        }
    }

    /// Document being parsed.
    #[must_use]
    pub fn document_id(&self) -> &str {
        self.document_id
    }

    /// Look up a taxonomy by name.
    #[must_use]
    pub fn taxonomy(&self, name: &str) -> Option<&Taxonomy> {
        self.taxonomies.get(name)
    }

    /// Register an object of `kind` named `name` into `taxonomy`.
    ///
    /// # Errors
    ///
    /// Returns [`MarkupError::UnknownTaxonomy`] if the taxonomy is absent and
    /// [`MarkupError::Taxonomy`] if the taxonomy rejects the object.
    pub fn register(
        &mut self,
        taxonomy: &str,
        kind: &str,
        name: &str,
    ) -> Result<RegisteredObject, MarkupError> {
        let target = self
            .taxonomies
            .get_mut(taxonomy)
            .ok_or_else(|| MarkupError::UnknownTaxonomy(taxonomy.to_owned()))?;
        Ok(target.register_object(kind, name, self.document_id)?)
    }

    /// Read the occurrence's content block as document text.
    ///
    /// Nested markup is dispatched like top-level markup and registers into
    /// the same partition. Failures of nested occurrences are collected as
    /// warnings (see [`take_warnings`](Self::take_warnings)).
    pub fn parse_content(&mut self, occurrence: &MarkupOccurrence) -> Vec<Node> {
        let (nodes, warnings) = parse_block(
            self.document_id,
            &occurrence.content,
            occurrence.content_line,
            self.registry,
            &mut *self.taxonomies,
        );
        self.warnings.extend(warnings);
        nodes
    }

    /// Warnings collected from nested content since the last call.
    pub fn take_warnings(&mut self) -> Vec<BuildWarning> {
        std::mem::take(&mut self.warnings)
    }
}
