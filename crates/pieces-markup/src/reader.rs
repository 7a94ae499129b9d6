//! Line reader for a reStructuredText-like subset.
//!
//! Recognized constructs:
//!
//! - **Section headers**: a title line followed by an underline made of one
//!   repeated punctuation character, at least as long as the title. Levels
//!   follow the order in which underline characters first appear.
//! - **Markup**: `.. name:: arguments` followed by an indented content block.
//!   The occurrence is dispatched through the [`MarkupRegistry`] and the
//!   returned nodes are spliced in at its position. Handlers may read the
//!   content block with this same reader, so markup nests.
//! - **Comments**: any other `..` block.
//! - **Paragraphs**: runs of non-blank lines.
//!
//! Failing markup is reported as a [`BuildWarning`] and produces no nodes;
//! the rest of the document is still read.

use crate::anchor::make_id;
use crate::markup::{MarkupContext, MarkupOccurrence, MarkupRegistry};
use crate::taxonomy::Taxonomies;
use crate::tree::{DocumentTree, Node};
use crate::warning::{BuildWarning, SourceLocation};

/// Characters allowed in header underlines.
const UNDERLINE_CHARS: &str = "=-~^\"'`*+#:._";

/// Result of reading one document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedDocument {
    /// Tree with placeholders still in place.
    pub tree: DocumentTree,
    /// Warnings in source order.
    pub warnings: Vec<BuildWarning>,
}

/// Read `source` into a tree, registering objects into `taxonomies`.
pub fn parse_document(
    document_id: &str,
    source: &str,
    registry: &MarkupRegistry,
    taxonomies: &mut Taxonomies,
) -> ParsedDocument {
    let lines: Vec<&str> = source.lines().collect();
    let mut reader = Reader::new(document_id, 1, registry, taxonomies);
    reader.read(&lines);
    reader.finish()
}

/// Read a markup content block whose first line is `first_line` in the
/// document.
///
/// Headers inside the block get their own levels; they never close sections
/// of the enclosing document.
pub(crate) fn parse_block<S: AsRef<str>>(
    document_id: &str,
    lines: &[S],
    first_line: usize,
    registry: &MarkupRegistry,
    taxonomies: &mut Taxonomies,
) -> (Vec<Node>, Vec<BuildWarning>) {
    let lines: Vec<&str> = lines.iter().map(AsRef::as_ref).collect();
    let mut reader = Reader::new(document_id, first_line, registry, taxonomies);
    reader.read(&lines);
    let parsed = reader.finish();
    (parsed.tree.children, parsed.warnings)
}

/// Split lines into paragraphs at blank lines.
///
/// Lines are trimmed and joined with `\n`.
fn paragraphs<S: AsRef<str>>(lines: &[S]) -> Vec<Node> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in lines {
        let line = line.as_ref().trim();
        if line.is_empty() {
            if !current.is_empty() {
                out.push(Node::paragraph(current.join("\n")));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        out.push(Node::paragraph(current.join("\n")));
    }
    out
}

struct OpenSection {
    level: usize,
    node: Node,
}

struct Reader<'a> {
    document_id: &'a str,
    /// Source line of `lines[0]`.
    first_line: usize,
    registry: &'a MarkupRegistry,
    taxonomies: &'a mut Taxonomies,
    /// Underline characters by level.
    levels: Vec<char>,
    /// Sections not closed yet, outermost first.
    open: Vec<OpenSection>,
    root: Vec<Node>,
    warnings: Vec<BuildWarning>,
}

impl<'a> Reader<'a> {
    fn new(
        document_id: &'a str,
        first_line: usize,
        registry: &'a MarkupRegistry,
        taxonomies: &'a mut Taxonomies,
    ) -> Self {
        Self {
            document_id,
            first_line,
            registry,
            taxonomies,
            levels: Vec::new(),
            open: Vec::new(),
            root: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn read(&mut self, lines: &[&str]) {
        let mut pos = 0;
        while pos < lines.len() {
            let line = lines[pos];

            if line.trim().is_empty() {
                pos += 1;
            } else if let Some(underline) = header_underline(line, lines.get(pos + 1).copied()) {
                self.open_section(line.trim(), underline);
                pos += 2;
            } else if let Some(head) = explicit_markup(line) {
                let end = block_end(lines, pos + 1);
                // Anything that is not `name:: args` is a comment.
                if let Some((name, arguments)) = markup_head(head) {
                    self.run_markup(name, arguments, &lines[pos + 1..end], self.first_line + pos);
                }
                pos = end;
            } else {
                let end = paragraph_end(lines, pos);
                for node in paragraphs(&lines[pos..end]) {
                    self.push(node);
                }
                pos = end;
            }
        }
    }

    fn finish(mut self) -> ParsedDocument {
        self.close_sections(0);
        ParsedDocument {
            tree: DocumentTree {
                document_id: self.document_id.to_owned(),
                children: self.root,
            },
            warnings: self.warnings,
        }
    }

    fn open_section(&mut self, title: &str, underline: char) {
        let level = if let Some(level) = self.levels.iter().position(|&c| c == underline) {
            level
        } else {
            self.levels.push(underline);
            self.levels.len() - 1
        };

        self.close_sections(level);
        self.open.push(OpenSection {
            level,
            node: Node::section(vec![make_id(title)], title),
        });
    }

    /// Close open sections at `level` or deeper.
    fn close_sections(&mut self, level: usize) {
        while let Some(section) = self.open.pop_if(|s| s.level >= level) {
            self.push(section.node);
        }
    }

    fn push(&mut self, node: Node) {
        match self.open.last_mut() {
            Some(section) => section.node.children.push(node),
            None => self.root.push(node),
        }
    }

    fn run_markup(&mut self, name: &str, arguments: &str, body: &[&str], line: usize) {
        let leading_blank = body.iter().take_while(|l| l.trim().is_empty()).count();
        let occurrence = MarkupOccurrence::new(name, SourceLocation::new(self.document_id, line))
            .with_arguments(arguments.split_whitespace())
            .with_content(content_block(body))
            .with_content_line(line + 1 + leading_blank);

        let mut ctx = MarkupContext::new(self.document_id, self.registry, &mut *self.taxonomies);
        let result = self.registry.dispatch(&occurrence, &mut ctx);
        let nested = ctx.take_warnings();
        match result {
            Ok(nodes) => {
                for node in nodes {
                    self.push(node);
                }
            }
            Err(err) => {
                tracing::warn!(
                    location = %occurrence.location,
                    markup = %occurrence.name,
                    error = %err,
                    "Markup failed"
                );
                self.warnings
                    .push(BuildWarning::new(occurrence.location, err.to_string()));
            }
        }
        self.warnings.extend(nested);
    }
}

/// Underline character if `line` is a header title underlined by `next`.
fn header_underline(line: &str, next: Option<&str>) -> Option<char> {
    if line.starts_with(char::is_whitespace) || explicit_markup(line).is_some() {
        return None;
    }
    let underline = next?;
    if explicit_markup(underline).is_some() {
        return None;
    }
    let underline = underline.trim_end();
    let ch = underline.chars().next()?;
    if !UNDERLINE_CHARS.contains(ch) || !underline.chars().all(|c| c == ch) {
        return None;
    }
    (underline.chars().count() >= line.trim().chars().count()).then_some(ch)
}

/// Text after the `..` marker of an explicit markup line.
fn explicit_markup(line: &str) -> Option<&str> {
    if line.trim_end() == ".." {
        Some("")
    } else {
        line.strip_prefix(".. ")
    }
}

/// Split `name:: arguments`. Names cannot contain whitespace.
fn markup_head(head: &str) -> Option<(&str, &str)> {
    let (name, arguments) = head.split_once("::")?;
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return None;
    }
    Some((name, arguments))
}

/// End of an indented block starting at `start`.
fn block_end(lines: &[&str], start: usize) -> usize {
    lines[start.min(lines.len())..]
        .iter()
        .position(|line| !line.trim().is_empty() && !line.starts_with(char::is_whitespace))
        .map_or(lines.len(), |offset| start + offset)
}

/// End of a paragraph starting at `start`.
fn paragraph_end(lines: &[&str], start: usize) -> usize {
    let mut end = start + 1;
    while end < lines.len() {
        let line = lines[end];
        if line.trim().is_empty()
            || explicit_markup(line).is_some()
            || header_underline(line, lines.get(end + 1).copied()).is_some()
        {
            break;
        }
        end += 1;
    }
    end
}

/// Dedent an indented block and strip surrounding blank lines.
fn content_block(body: &[&str]) -> Vec<String> {
    let Some(first) = body.iter().position(|l| !l.trim().is_empty()) else {
        return Vec::new();
    };
    let last = body
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .unwrap_or(first);
    let body = &body[first..=last];

    let indent = body
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    body.iter()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                line.get(indent..)
                    .unwrap_or_else(|| line.trim_start())
                    .trim_end()
                    .to_owned()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::{AnnotateHandler, MarkupDescriptor, SectionHandler};
    use crate::taxonomy::Taxonomy;
    use crate::tree::NodeKind;
    use pretty_assertions::assert_eq;

    fn setup() -> (MarkupRegistry, Taxonomies) {
        let mut builder = MarkupRegistry::builder();
        builder
            .register(MarkupDescriptor::new("unit", "parameter"), SectionHandler::factory)
            .unwrap()
            .register(MarkupDescriptor::new("pieces", "fafafa"), AnnotateHandler::factory)
            .unwrap();
        let mut taxonomies = Taxonomies::new();
        taxonomies.insert(Taxonomy::new("unit", ["parameter"]));
        taxonomies.insert(Taxonomy::new("pieces", ["fafafa"]));
        (builder.build(), taxonomies)
    }

    fn parse(source: &str) -> (ParsedDocument, Taxonomies) {
        let (registry, mut taxonomies) = setup();
        let parsed = parse_document("index", source, &registry, &mut taxonomies);
        (parsed, taxonomies)
    }

    #[test]
    fn test_paragraphs() {
        let nodes = paragraphs(&["one", "  two", "", "", "three"]);
        assert_eq!(
            nodes,
            vec![Node::paragraph("one\ntwo"), Node::paragraph("three")]
        );
    }

    #[test]
    fn test_sections_nest_by_first_appearance() {
        let source = "Title\n=====\n\nIntro text.\n\nChild\n-----\n\nBody.\n\nSibling\n=======\n";
        let (parsed, _) = parse(source);

        assert_eq!(
            parsed.tree.children,
            vec![
                Node::section(vec!["title".to_owned()], "Title")
                    .with_child(Node::paragraph("Intro text."))
                    .with_child(
                        Node::section(vec!["child".to_owned()], "Child")
                            .with_child(Node::paragraph("Body."))
                    ),
                Node::section(vec!["sibling".to_owned()], "Sibling"),
            ]
        );
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_short_underline_is_paragraph() {
        let (parsed, _) = parse("Long title\n===\n");
        assert_eq!(parsed.tree.children, vec![Node::paragraph("Long title\n===")]);
    }

    #[test]
    fn test_section_markup() {
        let source = "Test\n====\n\n.. unit:parameter:: MyParam\n\n   Some content.\n";
        let (parsed, taxonomies) = parse(source);

        assert_eq!(
            parsed.tree.children,
            vec![
                Node::section(vec!["test".to_owned()], "Test")
                    .with_child(Node::anchor("unit-parameter-myparam"))
                    .with_child(
                        Node::section(vec![], "MyParam parameter")
                            .with_child(Node::paragraph("Some content."))
                    ),
            ]
        );
        let object = taxonomies.resolve_reference("unit", "MyParam").unwrap();
        assert_eq!(object.document_id, "index");
    }

    #[test]
    fn test_markup_content_keeps_relative_indent() {
        let source = ".. unit:parameter:: Rate\n\n      first\n        second\n\n      third\nAfter.\n";
        let (parsed, _) = parse(source);

        let section = &parsed.tree.children[1];
        assert_eq!(section.title_text(), Some("Rate parameter".to_owned()));
        assert_eq!(
            section.children[1..].to_vec(),
            vec![Node::paragraph("first\nsecond"), Node::paragraph("third")]
        );
        assert_eq!(parsed.tree.children[2], Node::paragraph("After."));
    }

    #[test]
    fn test_annotate_markup_leaves_placeholder() {
        let (parsed, _) = parse(".. pieces:fafafa::\n\nBar\n===\n");

        assert_eq!(parsed.tree.placeholder_count(), 1);
        assert!(parsed.tree.children[0].is_placeholder());
        assert!(parsed.tree.children[1].is_section());
    }

    #[test]
    fn test_comments_are_skipped() {
        let source = ".. a comment\n   spanning lines\n..\n\n.. _label:\n\nText.\n";
        let (parsed, _) = parse(source);

        assert_eq!(parsed.tree.children, vec![Node::paragraph("Text.")]);
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_unknown_markup_warns_and_continues() {
        let source = ".. note:: careful\n\nText.\n";
        let (parsed, _) = parse(source);

        assert_eq!(parsed.tree.children, vec![Node::paragraph("Text.")]);
        assert_eq!(
            parsed.warnings,
            vec![BuildWarning::new(
                SourceLocation::new("index", 1),
                "unknown markup 'note'"
            )]
        );
    }

    #[test]
    fn test_missing_argument_warns() {
        let (parsed, taxonomies) = parse("Intro\n=====\n\n.. unit:parameter::\n");

        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.warnings[0].location, SourceLocation::new("index", 4));
        assert_eq!(
            parsed.warnings[0].message,
            "markup 'unit:parameter' requires an argument"
        );
        assert!(taxonomies.get("unit").unwrap().catalog().is_empty());
    }

    #[test]
    fn test_duplicate_object_in_document_warns() {
        let source = ".. unit:parameter:: A\n\n.. unit:parameter:: A\n";
        let (parsed, taxonomies) = parse(source);

        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.warnings[0].location.line, 3);
        assert_eq!(taxonomies.get("unit").unwrap().catalog().len(), 1);
        let anchors = parsed
            .tree
            .children
            .iter()
            .filter(|n| matches!(n.kind, NodeKind::Anchor { .. }))
            .count();
        assert_eq!(anchors, 1);
    }

    #[test]
    fn test_markup_inside_paragraph_run_splits_it() {
        let (parsed, _) = parse("Text\n.. unit:parameter:: A\n");
        assert_eq!(parsed.tree.children[0], Node::paragraph("Text"));
        assert_eq!(parsed.tree.children.len(), 3);
    }

    #[test]
    fn test_content_block() {
        assert_eq!(
            content_block(&["", "   a", "     b", "", "   c", ""]),
            vec!["a", "  b", "", "c"]
        );
        assert!(content_block(&["", "  "]).is_empty());
    }

    #[test]
    fn test_comment_marker_is_not_underline() {
        let (parsed, _) = parse("Hi\n..\n");
        assert_eq!(parsed.tree.children, vec![Node::paragraph("Hi")]);
        assert!(parsed.tree.section_titles().is_empty());
    }

    #[test]
    fn test_nested_markup_in_content() {
        let source = "\
.. unit:parameter:: Outer

   Intro.

   .. unit:parameter:: Inner

      Body.

   .. note:: careful
";
        let (parsed, taxonomies) = parse(source);

        assert_eq!(
            parsed.tree.children,
            vec![
                Node::anchor("unit-parameter-outer"),
                Node::section(vec![], "Outer parameter")
                    .with_child(Node::paragraph("Intro."))
                    .with_child(Node::anchor("unit-parameter-inner"))
                    .with_child(
                        Node::section(vec![], "Inner parameter")
                            .with_child(Node::paragraph("Body."))
                    ),
            ]
        );
        assert!(taxonomies.resolve_reference("unit", "Inner").is_some());
        assert_eq!(
            parsed.warnings,
            vec![BuildWarning::new(
                SourceLocation::new("index", 9),
                "unknown markup 'note'"
            )]
        );
    }
}
