//! Built-in handler styles.

use pieces_config::HandlerStyle;

use super::{MarkupContext, MarkupDescriptor, MarkupHandler, MarkupOccurrence};
use crate::deferred::DeferredEdit;
use crate::error::MarkupError;
use crate::tree::Node;

/// Factory function for a built-in handler style.
#[must_use]
pub fn factory_for(style: HandlerStyle) -> fn(&MarkupDescriptor) -> Box<dyn MarkupHandler> {
    match style {
        HandlerStyle::Section => SectionHandler::factory,
        HandlerStyle::Annotate => AnnotateHandler::factory,
    }
}

/// Immediate handler: declares an object and renders it as a section.
///
/// `.. unit:parameter:: MyParam` followed by an indented content block
/// becomes an anchor `unit-parameter-myparam` and a section titled
/// `MyParam parameter` holding the content block, read as document text
/// so that nested markup is dispatched too.
#[derive(Debug)]
pub struct SectionHandler {
    descriptor: MarkupDescriptor,
}

impl SectionHandler {
    #[must_use]
    pub fn new(descriptor: MarkupDescriptor) -> Self {
        Self { descriptor }
    }

    /// [`HandlerFactory`](super::HandlerFactory) for this style.
    #[must_use]
    pub fn factory(descriptor: &MarkupDescriptor) -> Box<dyn MarkupHandler> {
        Box::new(Self::new(descriptor.clone()))
    }
}

impl MarkupHandler for SectionHandler {
    fn run(
        &mut self,
        occurrence: &MarkupOccurrence,
        ctx: &mut MarkupContext<'_>,
    ) -> Result<Vec<Node>, MarkupError> {
        let name = occurrence.argument_text();
        if name.is_empty() {
            return Err(MarkupError::MissingArgument(
                self.descriptor.markup_name.clone(),
            ));
        }

        let object = ctx.register(&self.descriptor.taxonomy, &self.descriptor.kind, &name)?;

        let mut section = Node::section(Vec::new(), format!("{name} {}", self.descriptor.kind));
        section.children.extend(ctx.parse_content(occurrence));

        Ok(vec![Node::anchor(object.anchor_id), section])
    }
}

/// Deferred handler: appends the kind to the title of the next section.
///
/// `.. pieces:fafafa::` directly before a `Bar` header turns its title into
/// `Bar fafafa`. With an argument, the object is registered as well and its
/// anchor is attached to that section once the edit resolves. Content
/// lines are ignored.
#[derive(Debug)]
pub struct AnnotateHandler {
    descriptor: MarkupDescriptor,
}

impl AnnotateHandler {
    #[must_use]
    pub fn new(descriptor: MarkupDescriptor) -> Self {
        Self { descriptor }
    }

    /// [`HandlerFactory`](super::HandlerFactory) for this style.
    #[must_use]
    pub fn factory(descriptor: &MarkupDescriptor) -> Box<dyn MarkupHandler> {
        Box::new(Self::new(descriptor.clone()))
    }
}

impl MarkupHandler for AnnotateHandler {
    fn run(
        &mut self,
        occurrence: &MarkupOccurrence,
        ctx: &mut MarkupContext<'_>,
    ) -> Result<Vec<Node>, MarkupError> {
        let mut edit = DeferredEdit::annotate_next_section_title(
            self.descriptor.kind.clone(),
            occurrence.location.clone(),
        );

        let name = occurrence.argument_text();
        if !name.is_empty() {
            let object =
                ctx.register(&self.descriptor.taxonomy, &self.descriptor.kind, &name)?;
            edit = edit.with_anchor(object.anchor_id);
        }

        Ok(vec![Node::placeholder(edit)])
    }
}
