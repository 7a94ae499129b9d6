//! Catalog of registered objects.
//!
//! A [`Catalog`] is an append-only store of [`RegisteredObject`]s with
//! per-document removal and a deterministic merge. Parallel builds give
//! each worker its own catalog and merge them afterwards; since iteration
//! is ordered by `(group letter, case-folded name, name, sequence, document)`,
//! the result does not depend on the order in which workers finish.

use std::collections::{HashMap, HashSet};

use crate::error::CatalogError;

/// An object registered by a markup occurrence.
///
/// Identity is `(kind, name, document_id)`. Objects are never mutated once
/// they are in a catalog.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RegisteredObject {
    /// Object name (display name in indices).
    pub name: String,
    /// Kind within the owning taxonomy.
    pub kind: String,
    /// Document the object was registered from.
    pub document_id: String,
    /// Jump target, unique within the document.
    pub anchor_id: String,
    /// Catalog insertion order, kept as-is across merges.
    pub sequence: u64,
}

impl RegisteredObject {
    /// Case-normalized first character of the name.
    ///
    /// Returns an empty string for an empty name.
    #[must_use]
    pub fn group_letter(&self) -> String {
        group_letter(&self.name)
    }

    fn sort_key(&self) -> (String, String, &str, u64, &str) {
        (
            self.group_letter(),
            self.name.to_lowercase(),
            self.name.as_str(),
            self.sequence,
            self.document_id.as_str(),
        )
    }
}

/// Case-normalized first character of `name`.
pub(crate) fn group_letter(name: &str) -> String {
    name.chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default()
}

/// Append-only store of registered objects.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    entries: Vec<RegisteredObject>,
    /// `(document_id, anchor_id)` -> index into `entries`.
    anchors: HashMap<(String, String), usize>,
    next_sequence: u64,
}

impl Catalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence number the next new object should carry.
    #[must_use]
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    /// Append an object.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateAnchor`] if the object's document
    /// already has an object with the same anchor.
    pub fn add(&mut self, object: RegisteredObject) -> Result<&RegisteredObject, CatalogError> {
        let key = (object.document_id.clone(), object.anchor_id.clone());
        if self.anchors.contains_key(&key) {
            return Err(CatalogError::DuplicateAnchor {
                document_id: key.0,
                anchor_id: key.1,
            });
        }

        self.next_sequence = self.next_sequence.max(object.sequence.saturating_add(1));
        let idx = self.entries.len();
        self.anchors.insert(key, idx);
        self.entries.push(object);
        Ok(&self.entries[idx])
    }

    /// Remove every object registered from `document_id`.
    ///
    /// Returns the number of removed objects. Removing an unknown document
    /// is a no-op.
    pub fn remove_by_document(&mut self, document_id: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|o| o.document_id != document_id);
        let removed = before - self.entries.len();
        if removed > 0 {
            self.reindex();
        }
        removed
    }

    /// Copy objects from `other` whose document is in `documents`.
    ///
    /// Sequence numbers are preserved. Objects already present (same document
    /// and anchor) are skipped, so merging the same partition twice changes
    /// nothing. Returns the number of copied objects.
    pub fn merge(&mut self, other: &Catalog, documents: &HashSet<String>) -> usize {
        let mut copied = 0;
        for object in other
            .entries
            .iter()
            .filter(|o| documents.contains(&o.document_id))
        {
            let key = (object.document_id.clone(), object.anchor_id.clone());
            if let Some(&idx) = self.anchors.get(&key) {
                if self.entries[idx] != *object {
                    tracing::warn!(
                        document = %object.document_id,
                        anchor = %object.anchor_id,
                        kept = %self.entries[idx].name,
                        dropped = %object.name,
                        "Anchor collision while merging catalogs, keeping existing object"
                    );
                }
                continue;
            }
            self.next_sequence = self.next_sequence.max(object.sequence.saturating_add(1));
            self.anchors.insert(key, self.entries.len());
            self.entries.push(object.clone());
            copied += 1;
        }
        copied
    }

    /// Objects ordered by group letter, then name ignoring case, then
    /// `(name, sequence, document)`, optionally restricted to one kind.
    #[must_use]
    pub fn iter(&self, kind: Option<&str>) -> Vec<&RegisteredObject> {
        let mut objects: Vec<_> = self
            .entries
            .iter()
            .filter(|o| kind.is_none_or(|k| o.kind == k))
            .collect();
        objects.sort_by_cached_key(|&o| o.sort_key());
        objects
    }

    /// Documents that registered at least one object, sorted.
    #[must_use]
    pub fn documents(&self) -> Vec<&str> {
        let mut docs: Vec<_> = self
            .entries
            .iter()
            .map(|o| o.document_id.as_str())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        docs.sort_unstable();
        docs
    }

    /// Look up an object by document and anchor.
    #[must_use]
    pub fn get(&self, document_id: &str, anchor_id: &str) -> Option<&RegisteredObject> {
        self.anchors
            .get(&(document_id.to_owned(), anchor_id.to_owned()))
            .map(|&idx| &self.entries[idx])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn reindex(&mut self) {
        self.anchors = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, o)| ((o.document_id.clone(), o.anchor_id.clone()), i))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn object(name: &str, kind: &str, doc: &str, sequence: u64) -> RegisteredObject {
        RegisteredObject {
            name: name.to_owned(),
            kind: kind.to_owned(),
            document_id: doc.to_owned(),
            anchor_id: format!("{kind}-{}", name.to_lowercase()),
            sequence,
        }
    }

    fn names(catalog: &Catalog) -> Vec<(String, String)> {
        catalog
            .iter(None)
            .into_iter()
            .map(|o| (o.name.clone(), o.document_id.clone()))
            .collect()
    }

    fn docs(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn test_add_and_get() {
        let mut catalog = Catalog::new();
        catalog.add(object("Foo", "parameter", "index", 0)).unwrap();

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.next_sequence(), 1);
        assert_eq!(
            catalog.get("index", "parameter-foo").map(|o| o.name.as_str()),
            Some("Foo")
        );
    }

    #[test]
    fn test_duplicate_anchor_same_document() {
        let mut catalog = Catalog::new();
        catalog.add(object("Foo", "parameter", "index", 0)).unwrap();

        let err = catalog
            .add(object("foo", "parameter", "index", 1))
            .unwrap_err();

        assert_eq!(
            err,
            CatalogError::DuplicateAnchor {
                document_id: "index".to_owned(),
                anchor_id: "parameter-foo".to_owned(),
            }
        );
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_same_anchor_different_documents() {
        let mut catalog = Catalog::new();
        catalog.add(object("Foo", "parameter", "a", 0)).unwrap();
        catalog.add(object("Foo", "parameter", "b", 1)).unwrap();
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_iter_ordering() {
        let mut catalog = Catalog::new();
        catalog.add(object("beta", "parameter", "index", 0)).unwrap();
        catalog.add(object("Alpha", "parameter", "index", 1)).unwrap();
        catalog.add(object("apple", "thing", "index", 2)).unwrap();

        assert_eq!(
            names(&catalog),
            vec![
                ("Alpha".to_owned(), "index".to_owned()),
                ("apple".to_owned(), "index".to_owned()),
                ("beta".to_owned(), "index".to_owned()),
            ]
        );
    }

    #[test]
    fn test_iter_ignores_case_within_group() {
        let mut catalog = Catalog::new();
        catalog.add(object("Azure", "parameter", "index", 0)).unwrap();
        catalog.add(object("apple", "parameter", "index", 1)).unwrap();
        catalog.add(object("APPLE", "thing", "index", 2)).unwrap();

        let names: Vec<_> = names(&catalog).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["APPLE", "apple", "Azure"]);
    }

    #[test]
    fn test_max_sequence_does_not_overflow() {
        let mut catalog = Catalog::new();
        catalog.add(object("Last", "parameter", "a", u64::MAX)).unwrap();
        assert_eq!(catalog.next_sequence(), u64::MAX);

        let mut worker = Catalog::new();
        worker.add(object("Other", "parameter", "b", u64::MAX)).unwrap();
        let mut main = Catalog::new();
        assert_eq!(main.merge(&worker, &docs(&["b"])), 1);
        assert_eq!(main.next_sequence(), u64::MAX);
    }

    #[test]
    fn test_iter_kind_filter() {
        let mut catalog = Catalog::new();
        catalog.add(object("Foo", "parameter", "index", 0)).unwrap();
        catalog.add(object("Bar", "thing", "index", 1)).unwrap();

        let kinds: Vec<_> = catalog
            .iter(Some("thing"))
            .into_iter()
            .map(|o| o.name.as_str())
            .collect();
        assert_eq!(kinds, vec!["Bar"]);
    }

    #[test]
    fn test_same_name_ordered_by_sequence() {
        let mut catalog = Catalog::new();
        catalog.add(object("Foo", "parameter", "z", 0)).unwrap();
        catalog.add(object("Foo", "parameter", "a", 1)).unwrap();

        let order: Vec<_> = catalog
            .iter(None)
            .into_iter()
            .map(|o| o.document_id.as_str())
            .collect();
        assert_eq!(order, vec!["z", "a"]);
    }

    #[test]
    fn test_remove_by_document() {
        let mut catalog = Catalog::new();
        catalog.add(object("Foo", "parameter", "a", 0)).unwrap();
        catalog.add(object("Bar", "parameter", "b", 1)).unwrap();
        catalog.add(object("Baz", "parameter", "a", 2)).unwrap();

        assert_eq!(catalog.remove_by_document("a"), 2);
        assert_eq!(catalog.remove_by_document("a"), 0);
        assert_eq!(catalog.documents(), vec!["b"]);
        assert!(catalog.get("a", "parameter-foo").is_none());
        assert!(catalog.get("b", "parameter-bar").is_some());

        // The anchor is free again after removal.
        catalog.add(object("Foo", "parameter", "a", 3)).unwrap();
    }

    #[test]
    fn test_merge_filters_documents_and_keeps_sequence() {
        let mut worker = Catalog::new();
        worker.add(object("Foo", "parameter", "a", 7)).unwrap();
        worker.add(object("Bar", "parameter", "b", 8)).unwrap();

        let mut main = Catalog::new();
        let copied = main.merge(&worker, &docs(&["a"]));

        assert_eq!(copied, 1);
        assert_eq!(main.len(), 1);
        assert_eq!(main.get("a", "parameter-foo").unwrap().sequence, 7);
        assert_eq!(main.next_sequence(), 8);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut worker = Catalog::new();
        worker.add(object("Foo", "parameter", "a", 0)).unwrap();

        let mut main = Catalog::new();
        main.merge(&worker, &docs(&["a"]));
        let copied = main.merge(&worker, &docs(&["a"]));

        assert_eq!(copied, 0);
        assert_eq!(main.len(), 1);
    }

    #[test]
    fn test_merge_order_independent() {
        let mut ab = Catalog::new();
        ab.add(object("Zeta", "parameter", "a", 0)).unwrap();
        ab.add(object("alpha", "parameter", "b", 0)).unwrap();
        ab.add(object("Azure", "parameter", "b", 1)).unwrap();
        let mut c = Catalog::new();
        c.add(object("Mu", "parameter", "c", 0)).unwrap();
        c.add(object("Alpha", "parameter", "c", 1)).unwrap();

        let mut first = Catalog::new();
        first.merge(&ab, &docs(&["a", "b"]));
        first.merge(&c, &docs(&["c"]));

        let mut second = Catalog::new();
        second.merge(&c, &docs(&["c"]));
        second.merge(&ab, &docs(&["a", "b"]));

        assert_eq!(names(&first), names(&second));
        assert_eq!(
            names(&first)
                .into_iter()
                .map(|(n, _)| n)
                .collect::<Vec<_>>(),
            vec!["Alpha", "alpha", "Azure", "Mu", "Zeta"]
        );
    }

    #[test]
    fn test_group_letter() {
        assert_eq!(object("beta", "k", "d", 0).group_letter(), "B");
        assert_eq!(object("Éclair", "k", "d", 0).group_letter(), "É");
        assert_eq!(group_letter(""), "");
    }
}
