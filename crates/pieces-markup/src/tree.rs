//! Document tree.
//!
//! A document is an ordered forest of [`Node`]s. Each node carries a
//! [`NodeKind`] tag and its children. Placeholders for deferred edits are an
//! ordinary node variant so the resolve pass can find them with a plain
//! traversal.

use crate::deferred::DeferredEdit;

/// Node variant.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(tag = "type", rename_all = "snake_case")
)]
pub enum NodeKind {
    /// Structural section. Its first child is normally a [`NodeKind::Title`].
    Section {
        /// Anchor ids targeting this section.
        ids: Vec<String>,
    },
    /// Section title; the text lives in [`NodeKind::Text`] children.
    Title,
    /// Paragraph of inline children.
    Paragraph,
    /// Inline text.
    Text {
        /// Literal text.
        text: String,
    },
    /// Jump target for intra-document links.
    Anchor {
        /// Anchor id.
        id: String,
    },
    /// Pending structural edit, removed by the deferred-edit pass.
    Placeholder(DeferredEdit),
}

/// Tree node.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Node {
    /// Node variant.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub kind: NodeKind,
    /// Child nodes in document order.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Vec::is_empty"))]
    pub children: Vec<Node>,
}

impl Node {
    /// Create a node without children.
    #[must_use]
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    /// Create a section with the given ids and title text.
    #[must_use]
    pub fn section(ids: Vec<String>, title: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Section { ids },
            children: vec![Self::title(title)],
        }
    }

    /// Create a title node holding a single text child.
    #[must_use]
    pub fn title(text: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Title,
            children: vec![Self::text(text)],
        }
    }

    /// Create a paragraph holding a single text child.
    #[must_use]
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Paragraph,
            children: vec![Self::text(text)],
        }
    }

    /// Create a text node.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(NodeKind::Text { text: text.into() })
    }

    /// Create an anchor node.
    #[must_use]
    pub fn anchor(id: impl Into<String>) -> Self {
        Self::new(NodeKind::Anchor { id: id.into() })
    }

    /// Create a placeholder node for a deferred edit.
    #[must_use]
    pub fn placeholder(edit: DeferredEdit) -> Self {
        Self::new(NodeKind::Placeholder(edit))
    }

    /// Append a child and return `self` (builder style).
    #[must_use]
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn is_section(&self) -> bool {
        matches!(self.kind, NodeKind::Section { .. })
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self.kind, NodeKind::Placeholder(_))
    }

    /// Concatenated text of this node and its descendants.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let NodeKind::Text { text } = &self.kind {
            out.push_str(text);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// Title node of a section, if any.
    #[must_use]
    pub fn section_title(&self) -> Option<&Node> {
        if !self.is_section() {
            return None;
        }
        self.children
            .iter()
            .find(|c| matches!(c.kind, NodeKind::Title))
    }

    /// Title text of a section; `None` for other nodes and untitled sections.
    #[must_use]
    pub fn title_text(&self) -> Option<String> {
        self.section_title().map(Node::text_content)
    }

    /// Append `suffix` to a section's title, separated by a single space.
    ///
    /// A section without a title gets one. Returns `false` for non-sections.
    pub fn append_to_title(&mut self, suffix: &str) -> bool {
        if !self.is_section() {
            return false;
        }

        let idx = match self
            .children
            .iter()
            .position(|c| matches!(c.kind, NodeKind::Title))
        {
            Some(idx) => idx,
            None => {
                self.children.insert(0, Node::new(NodeKind::Title));
                0
            }
        };
        let title = &mut self.children[idx];
        let needs_space = !title.text_content().is_empty();

        if let Some(Node {
            kind: NodeKind::Text { text },
            ..
        }) = title.children.last_mut()
        {
            if needs_space {
                text.push(' ');
            }
            text.push_str(suffix);
        } else {
            let text = if needs_space {
                format!(" {suffix}")
            } else {
                suffix.to_owned()
            };
            title.children.push(Node::text(text));
        }
        true
    }

    /// Add an anchor id to a section. Returns `false` for non-sections.
    pub fn add_id(&mut self, id: impl Into<String>) -> bool {
        match &mut self.kind {
            NodeKind::Section { ids } => {
                let id = id.into();
                if !ids.contains(&id) {
                    ids.push(id);
                }
                true
            }
            _ => false,
        }
    }

    /// Visit this node and its descendants depth-first, in document order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// Parsed tree of one document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DocumentTree {
    /// Document identifier.
    pub document_id: String,
    /// Top-level nodes in document order.
    pub children: Vec<Node>,
}

impl DocumentTree {
    /// Create an empty tree for a document.
    #[must_use]
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            children: Vec::new(),
        }
    }

    /// Visit every node depth-first, in document order.
    pub fn walk<'a>(&'a self, mut visit: impl FnMut(&'a Node)) {
        for node in &self.children {
            node.walk(&mut visit);
        }
    }

    /// Number of placeholder nodes anywhere in the tree.
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        let mut count = 0;
        self.walk(|node| {
            if node.is_placeholder() {
                count += 1;
            }
        });
        count
    }

    /// Titles of all sections in document order.
    #[must_use]
    pub fn section_titles(&self) -> Vec<String> {
        let mut titles = Vec::new();
        self.walk(|node| {
            if let Some(title) = node.title_text() {
                titles.push(title);
            }
        });
        titles
    }

    /// Find the section carrying `id`.
    #[must_use]
    pub fn find_section(&self, id: &str) -> Option<&Node> {
        let mut found = None;
        self.walk(|node| {
            if found.is_none()
                && let NodeKind::Section { ids } = &node.kind
                && ids.iter().any(|i| i == id)
            {
                found = Some(node);
            }
        });
        found
    }

    /// Whether any node (anchor or section) declares `id`.
    #[must_use]
    pub fn has_target(&self, id: &str) -> bool {
        let mut found = false;
        self.walk(|node| match &node.kind {
            NodeKind::Anchor { id: anchor } if anchor == id => found = true,
            NodeKind::Section { ids } if ids.iter().any(|i| i == id) => found = true,
            _ => {}
        });
        found
    }
}
