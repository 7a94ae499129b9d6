//! Markup handler traits.

use super::{MarkupContext, MarkupDescriptor, MarkupOccurrence};
use crate::error::MarkupError;
use crate::tree::Node;

/// Handler for one markup occurrence.
///
/// A fresh handler is created per occurrence, so implementations may keep
/// per-occurrence state in `self`.
///
/// # Thread Safety
///
/// Handlers are `Send` only. Each parser worker creates its own handlers
/// from the shared [`HandlerFactory`].
///
/// # Example
///
/// ```
/// use pieces_markup::markup::{MarkupContext, MarkupHandler, MarkupOccurrence};
/// use pieces_markup::{MarkupError, Node};
///
/// struct Banner;
///
/// impl MarkupHandler for Banner {
///     fn run(
///         &mut self,
///         occurrence: &MarkupOccurrence,
///         _ctx: &mut MarkupContext<'_>,
///     ) -> Result<Vec<Node>, MarkupError> {
///         Ok(vec![Node::paragraph(occurrence.argument_text())])
///     }
/// }
/// ```
pub trait MarkupHandler: Send {
    /// Process the occurrence and return the nodes to splice into the tree
    /// at its position.
    ///
    /// Handlers register objects through `ctx`; a returned error is reported
    /// as a build warning and the occurrence produces no nodes.
    fn run(
        &mut self,
        occurrence: &MarkupOccurrence,
        ctx: &mut MarkupContext<'_>,
    ) -> Result<Vec<Node>, MarkupError>;
}

/// Creates handlers for a registered markup construct.
///
/// Factories are shared between parser workers and must be `Send + Sync`.
/// Any `Fn(&MarkupDescriptor) -> Box<dyn MarkupHandler>` is a factory.
pub trait HandlerFactory: Send + Sync {
    /// Create a handler bound to `descriptor`.
    fn create(&self, descriptor: &MarkupDescriptor) -> Box<dyn MarkupHandler>;
}

impl<F> HandlerFactory for F
where
    F: Fn(&MarkupDescriptor) -> Box<dyn MarkupHandler> + Send + Sync,
{
    fn create(&self, descriptor: &MarkupDescriptor) -> Box<dyn MarkupHandler> {
        self(descriptor)
    }
}
