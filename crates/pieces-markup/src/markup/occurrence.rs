//! Markup occurrences supplied by the parser.

use crate::warning::SourceLocation;

/// One occurrence of a markup construct found while parsing.
///
/// The parser hands over the markup name, the whitespace-separated
/// arguments, the (dedented) content lines and the source location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkupOccurrence {
    /// Markup name (`taxonomy:kind`).
    pub name: String,
    /// Arguments in order.
    pub arguments: Vec<String>,
    /// Content block lines.
    pub content: Vec<String>,
    /// Where the occurrence starts.
    pub location: SourceLocation,
    /// Source line of the first content line.
    pub content_line: usize,
}

impl MarkupOccurrence {
    /// Create an occurrence without arguments or content.
    #[must_use]
    pub fn new(name: impl Into<String>, location: SourceLocation) -> Self {
        let content_line = location.line + 1;
        Self {
            name: name.into(),
            arguments: Vec::new(),
            content: Vec::new(),
            location,
            content_line,
        }
    }

    /// Set the arguments.
    #[must_use]
    pub fn with_arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments = arguments.into_iter().map(Into::into).collect();
        self
    }

    /// Set the content lines.
    #[must_use]
    pub fn with_content<I, S>(mut self, content: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content = content.into_iter().map(Into::into).collect();
        self
    }

    /// Set the source line of the first content line.
    #[must_use]
    pub fn with_content_line(mut self, line: usize) -> Self {
        self.content_line = line;
        self
    }

    /// All arguments joined by single spaces.
    ///
    /// The final argument absorbs whitespace, so `.. unit:parameter:: Max
    /// Rate` names the object `Max Rate`.
    #[must_use]
    pub fn argument_text(&self) -> String {
        self.arguments.join(" ")
    }
}
