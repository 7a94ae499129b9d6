//! Taxonomies: named groups of kinds, each with a catalog.
//!
//! A [`Taxonomy`] is declared once from configuration and is read-only
//! afterwards except for its catalog. [`Taxonomies`] holds every taxonomy of
//! a build and knows how to hand out empty partitions to parallel workers
//! and merge them back.

use std::collections::HashSet;

use crate::anchor::object_anchor;
use crate::catalog::{Catalog, RegisteredObject};
use crate::error::TaxonomyError;

/// One group of the alphabetical index.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct IndexGroup {
    /// Case-normalized first letter shared by the entries.
    pub letter: String,
    /// Entries sorted by display name.
    pub entries: Vec<RegisteredObject>,
}

/// A named grouping of kinds with its own catalog.
#[derive(Clone, Debug)]
pub struct Taxonomy {
    name: String,
    kinds: Vec<String>,
    catalog: Catalog,
}

impl Taxonomy {
    /// Create a taxonomy declaring `kinds` (declaration order is kept).
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut declared: Vec<String> = Vec::new();
        for kind in kinds {
            let kind = kind.into();
            if !declared.contains(&kind) {
                declared.push(kind);
            }
        }
        Self {
            name: name.into(),
            kinds: declared,
            catalog: Catalog::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared kinds in declaration order.
    #[must_use]
    pub fn kinds(&self) -> &[String] {
        &self.kinds
    }

    #[must_use]
    pub fn declares(&self, kind: &str) -> bool {
        self.kinds.iter().any(|k| k == kind)
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Copy of this taxonomy with an empty catalog.
    #[must_use]
    pub fn empty_partition(&self) -> Self {
        Self {
            name: self.name.clone(),
            kinds: self.kinds.clone(),
            catalog: Catalog::new(),
        }
    }

    /// Register an object of `kind` named `name` from `document_id`.
    ///
    /// The anchor depends only on taxonomy, kind and name.
    ///
    /// # Errors
    ///
    /// Returns [`TaxonomyError::UnknownKind`] for undeclared kinds and
    /// [`TaxonomyError::Catalog`] on anchor collisions within the document.
    pub fn register_object(
        &mut self,
        kind: &str,
        name: &str,
        document_id: &str,
    ) -> Result<RegisteredObject, TaxonomyError> {
        if !self.declares(kind) {
            return Err(TaxonomyError::UnknownKind {
                taxonomy: self.name.clone(),
                kind: kind.to_owned(),
            });
        }

        let object = RegisteredObject {
            name: name.to_owned(),
            kind: kind.to_owned(),
            document_id: document_id.to_owned(),
            anchor_id: object_anchor(&self.name, kind, name),
            sequence: self.catalog.next_sequence(),
        };
        let added = self.catalog.add(object)?;
        Ok(added.clone())
    }

    /// Group the catalog by first letter; entries are in catalog order.
    ///
    /// Pure function of the catalog contents.
    #[must_use]
    pub fn build_index(&self) -> Vec<IndexGroup> {
        let mut groups: Vec<IndexGroup> = Vec::new();
        for object in self.catalog.iter(None) {
            let letter = object.group_letter();
            match groups.last_mut() {
                Some(group) if group.letter == letter => group.entries.push(object.clone()),
                _ => groups.push(IndexGroup {
                    letter,
                    entries: vec![object.clone()],
                }),
            }
        }
        groups
    }

    /// Exact-name lookup across all kinds.
    ///
    /// Kinds are searched in declaration order, so the first declared kind
    /// wins when a name exists under several kinds.
    #[must_use]
    pub fn resolve_reference(&self, name: &str) -> Option<&RegisteredObject> {
        self.kinds.iter().find_map(|kind| {
            self.catalog
                .iter(Some(kind.as_str()))
                .into_iter()
                .find(|o| o.name == name)
        })
    }

    pub(crate) fn remove_document(&mut self, document_id: &str) -> usize {
        self.catalog.remove_by_document(document_id)
    }

    pub(crate) fn merge(&mut self, other: &Taxonomy, documents: &HashSet<String>) -> usize {
        self.catalog.merge(&other.catalog, documents)
    }
}

/// Every taxonomy of a build, in declaration order.
#[derive(Clone, Debug, Default)]
pub struct Taxonomies {
    items: Vec<Taxonomy>,
}

impl Taxonomies {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a taxonomy. Returns `false` (and keeps the existing one) if the
    /// name is taken.
    pub fn insert(&mut self, taxonomy: Taxonomy) -> bool {
        if self.get(taxonomy.name()).is_some() {
            return false;
        }
        self.items.push(taxonomy);
        true
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Taxonomy> {
        self.items.iter().find(|t| t.name == name)
    }

    #[must_use]
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Taxonomy> {
        self.items.iter_mut().find(|t| t.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Taxonomy> {
        self.items.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Same taxonomies with empty catalogs, for one worker.
    #[must_use]
    pub fn empty_partition(&self) -> Self {
        Self {
            items: self.items.iter().map(Taxonomy::empty_partition).collect(),
        }
    }

    /// Merge a worker partition, copying only objects of `documents`.
    ///
    /// Taxonomies unknown to `self` are ignored. Returns the number of
    /// copied objects.
    pub fn merge(&mut self, partition: &Taxonomies, documents: &HashSet<String>) -> usize {
        let mut copied = 0;
        for other in &partition.items {
            if let Some(taxonomy) = self.get_mut(other.name()) {
                copied += taxonomy.merge(other, documents);
            }
        }
        copied
    }

    /// Remove every object registered from `document_id`.
    pub fn remove_document(&mut self, document_id: &str) -> usize {
        self.items
            .iter_mut()
            .map(|t| t.remove_document(document_id))
            .sum()
    }

    /// Resolve `name` within the taxonomy `taxonomy`.
    #[must_use]
    pub fn resolve_reference(&self, taxonomy: &str, name: &str) -> Option<&RegisteredObject> {
        self.get(taxonomy)?.resolve_reference(name)
    }
}
