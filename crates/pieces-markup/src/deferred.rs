//! Deferred structural edits.
//!
//! Some markup needs to edit a node that the parser has not produced yet
//! (typically the next section header). Such markup emits a placeholder
//! node carrying a [`DeferredEdit`]. Once a document's tree is complete,
//! [`DeferredEditPass::run`] resolves every placeholder:
//!
//! 1. Placeholders are visited depth-first, left to right.
//! 2. For each one, the following siblings (same parent, no descent) are
//!    scanned for the first node matching the pass's target predicate.
//! 3. A match receives the edit; no match means the edit is orphaned.
//! 4. The placeholder is removed in both cases.
//!
//! A tree without placeholders is left untouched, so running the pass twice
//! is the same as running it once.

use crate::tree::{DocumentTree, Node, NodeKind};
use crate::warning::SourceLocation;

/// Kind of structural edit a placeholder requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(rename_all = "SCREAMING_SNAKE_CASE")
)]
pub enum EditKind {
    /// Append the payload to the title of the next section.
    AnnotateNextSectionTitle,
}

/// Edit recorded at parse time and applied by [`DeferredEditPass`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DeferredEdit {
    /// What to do with the target.
    pub edit_kind: EditKind,
    /// Edit data (for title annotation: the text to append).
    pub payload: String,
    /// Anchor id to attach to the target, if the markup registered an object.
    pub anchor_id: Option<String>,
    /// Where the markup occurrence was found.
    pub origin: SourceLocation,
}

impl DeferredEdit {
    /// Create an edit annotating the next section title with `payload`.
    #[must_use]
    pub fn annotate_next_section_title(payload: impl Into<String>, origin: SourceLocation) -> Self {
        Self {
            edit_kind: EditKind::AnnotateNextSectionTitle,
            payload: payload.into(),
            anchor_id: None,
            origin,
        }
    }

    /// Attach an anchor id to carry over to the target.
    #[must_use]
    pub fn with_anchor(mut self, anchor_id: impl Into<String>) -> Self {
        self.anchor_id = Some(anchor_id.into());
        self
    }

    /// Apply this edit to `target`.
    ///
    /// Returns `false` if the target cannot take the edit.
    fn apply(&self, target: &mut Node) -> bool {
        match self.edit_kind {
            EditKind::AnnotateNextSectionTitle => {
                if !target.append_to_title(&self.payload) {
                    return false;
                }
                if let Some(anchor_id) = &self.anchor_id {
                    target.add_id(anchor_id.as_str());
                }
                true
            }
        }
    }
}

/// How a single placeholder was resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The edit was applied to a following sibling.
    Resolved(DeferredEdit),
    /// No qualifying sibling followed the placeholder; the edit was dropped.
    Orphaned(DeferredEdit),
}

/// Outcome of one pass over a document tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolveReport {
    /// Resolutions in placeholder encounter order.
    pub resolutions: Vec<Resolution>,
}

impl ResolveReport {
    /// Number of edits applied.
    #[must_use]
    pub fn resolved(&self) -> usize {
        self.resolutions
            .iter()
            .filter(|r| matches!(r, Resolution::Resolved(_)))
            .count()
    }

    /// Number of edits dropped for lack of a target.
    #[must_use]
    pub fn orphaned(&self) -> usize {
        self.resolutions
            .iter()
            .filter(|r| matches!(r, Resolution::Orphaned(_)))
            .count()
    }

    /// Whether the pass found no placeholders.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolutions.is_empty()
    }
}

/// Predicate selecting the node a deferred edit applies to.
pub type TargetPredicate = fn(&Node) -> bool;

/// Second pass resolving placeholders in a fully-built document tree.
///
/// The target search is restricted to following siblings. A different
/// predicate can be supplied with [`with_target`](Self::with_target);
/// the search scope itself stays sibling-only.
#[derive(Clone, Copy, Debug)]
pub struct DeferredEditPass {
    target: TargetPredicate,
}

impl Default for DeferredEditPass {
    fn default() -> Self {
        Self::new()
    }
}

impl DeferredEditPass {
    /// Create a pass targeting section nodes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            target: Node::is_section,
        }
    }

    /// Use a custom target predicate.
    #[must_use]
    pub fn with_target(mut self, target: TargetPredicate) -> Self {
        self.target = target;
        self
    }

    /// Resolve every placeholder in `tree`.
    ///
    /// Always leaves the tree without placeholders.
    pub fn run(&self, tree: &mut DocumentTree) -> ResolveReport {
        let mut report = ResolveReport::default();
        self.resolve_children(&mut tree.children, &mut report);

        tracing::debug!(
            document = %tree.document_id,
            resolved = report.resolved(),
            orphaned = report.orphaned(),
            "Resolved deferred edits"
        );
        report
    }

    fn resolve_children(&self, children: &mut Vec<Node>, report: &mut ResolveReport) {
        let mut i = 0;
        while i < children.len() {
            if !children[i].is_placeholder() {
                self.resolve_children(&mut children[i].children, report);
                i += 1;
                continue;
            }

            let NodeKind::Placeholder(edit) = children.remove(i).kind else {
                unreachable!("checked by is_placeholder");
            };

            // After removal the following siblings start at `i`.
            let applied = children[i..]
                .iter_mut()
                .find(|node| (self.target)(&**node))
                .is_some_and(|target| edit.apply(target));

            if applied {
                report.resolutions.push(Resolution::Resolved(edit));
            } else {
                tracing::debug!(
                    origin = %edit.origin,
                    payload = %edit.payload,
                    "Deferred edit has no following target, dropping"
                );
                report.resolutions.push(Resolution::Orphaned(edit));
            }
        }
    }
}
