//! Markup registry.

use std::collections::HashMap;

use super::{HandlerFactory, MarkupContext, MarkupDescriptor, MarkupOccurrence};
use crate::error::{MarkupError, RegistryError};
use crate::tree::Node;

struct Registration {
    descriptor: MarkupDescriptor,
    factory: Box<dyn HandlerFactory>,
}

/// Mutable registry populated during configuration.
///
/// Frozen into a [`MarkupRegistry`] with [`build`](Self::build) before any
/// document is parsed.
#[derive(Default)]
pub struct MarkupRegistryBuilder {
    registrations: Vec<Registration>,
    by_name: HashMap<String, usize>,
}

impl MarkupRegistryBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler factory under `descriptor.markup_name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidMarkupName`] if the descriptor is not
    /// a well-formed `taxonomy:kind` pair and
    /// [`RegistryError::DuplicateMarkupName`] if the name is already taken.
    pub fn register<F>(
        &mut self,
        descriptor: MarkupDescriptor,
        factory: F,
    ) -> Result<&mut Self, RegistryError>
    where
        F: HandlerFactory + 'static,
    {
        descriptor.validate()?;
        if self.by_name.contains_key(&descriptor.markup_name) {
            return Err(RegistryError::DuplicateMarkupName(descriptor.markup_name));
        }

        tracing::trace!(markup = %descriptor.markup_name, "Registered markup");
        self.by_name
            .insert(descriptor.markup_name.clone(), self.registrations.len());
        self.registrations.push(Registration {
            descriptor,
            factory: Box::new(factory),
        });
        Ok(self)
    }

    /// Whether a handler is registered under `markup_name`.
    #[must_use]
    pub fn contains(&self, markup_name: &str) -> bool {
        self.by_name.contains_key(markup_name)
    }

    /// Freeze the registry.
    #[must_use]
    pub fn build(self) -> MarkupRegistry {
        MarkupRegistry {
            registrations: self.registrations,
            by_name: self.by_name,
        }
    }
}

/// Immutable mapping from markup names to handler factories.
///
/// Safe to share between parser workers.
pub struct MarkupRegistry {
    registrations: Vec<Registration>,
    by_name: HashMap<String, usize>,
}

impl std::fmt::Debug for MarkupRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.registrations.iter().map(|r| &r.descriptor.markup_name))
            .finish()
    }
}

impl MarkupRegistry {
    /// Start populating a new registry.
    #[must_use]
    pub fn builder() -> MarkupRegistryBuilder {
        MarkupRegistryBuilder::new()
    }

    /// Descriptor registered under `markup_name`.
    #[must_use]
    pub fn descriptor(&self, markup_name: &str) -> Option<&MarkupDescriptor> {
        self.by_name
            .get(markup_name)
            .map(|&idx| &self.registrations[idx].descriptor)
    }

    /// Registered descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &MarkupDescriptor> {
        self.registrations.iter().map(|r| &r.descriptor)
    }

    /// Whether a handler is registered under `markup_name`.
    #[must_use]
    pub fn contains(&self, markup_name: &str) -> bool {
        self.by_name.contains_key(markup_name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Run a fresh handler for `occurrence`.
    ///
    /// # Errors
    ///
    /// Returns [`MarkupError::UnknownMarkup`] if nothing is registered under
    /// the occurrence's name; otherwise whatever the handler returns.
    pub fn dispatch(
        &self,
        occurrence: &MarkupOccurrence,
        ctx: &mut MarkupContext<'_>,
    ) -> Result<Vec<Node>, MarkupError> {
        let registration = self
            .by_name
            .get(&occurrence.name)
            .map(|&idx| &self.registrations[idx])
            .ok_or_else(|| MarkupError::UnknownMarkup(occurrence.name.clone()))?;

        let mut handler = registration.factory.create(&registration.descriptor);
        handler.run(occurrence, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::{MarkupHandler, SectionHandler};
    use crate::taxonomy::{Taxonomies, Taxonomy};
    use crate::warning::SourceLocation;
    use pretty_assertions::assert_eq;

    struct Echo {
        kind: String,
    }

    impl MarkupHandler for Echo {
        fn run(
            &mut self,
            occurrence: &MarkupOccurrence,
            _ctx: &mut MarkupContext<'_>,
        ) -> Result<Vec<Node>, MarkupError> {
            Ok(vec![Node::paragraph(format!(
                "{} {}",
                self.kind,
                occurrence.argument_text()
            ))])
        }
    }

    fn echo(descriptor: &MarkupDescriptor) -> Box<dyn MarkupHandler> {
        Box::new(Echo {
            kind: descriptor.kind.clone(),
        })
    }

    fn occurrence(name: &str, argument: &str) -> MarkupOccurrence {
        MarkupOccurrence::new(name, SourceLocation::new("index", 1)).with_arguments([argument])
    }

    #[test]
    fn test_register_and_dispatch() {
        let mut builder = MarkupRegistry::builder();
        builder
            .register(MarkupDescriptor::new("unit", "parameter"), echo)
            .unwrap();
        let registry = builder.build();
        let mut taxonomies = Taxonomies::new();
        let mut ctx = MarkupContext::new("index", &registry, &mut taxonomies);

        let nodes = registry
            .dispatch(&occurrence("unit:parameter", "x"), &mut ctx)
            .unwrap();

        assert_eq!(nodes, vec![Node::paragraph("parameter x")]);
    }

    #[test]
    fn test_duplicate_markup_name() {
        let mut builder = MarkupRegistry::builder();
        builder
            .register(MarkupDescriptor::new("unit", "parameter"), echo)
            .unwrap();

        let err = builder
            .register(MarkupDescriptor::new("unit", "parameter"), SectionHandler::factory)
            .err();

        assert_eq!(
            err,
            Some(RegistryError::DuplicateMarkupName(
                "unit:parameter".to_owned()
            ))
        );
        assert_eq!(builder.build().len(), 1);
    }

    #[test]
    fn test_invalid_markup_name() {
        let mut builder = MarkupRegistry::builder();
        let err = builder
            .register(MarkupDescriptor::new("unit", ""), echo)
            .err();

        assert_eq!(
            err,
            Some(RegistryError::InvalidMarkupName("unit:".to_owned()))
        );
        assert!(builder.build().is_empty());
    }

    #[test]
    fn test_dispatch_unknown_markup() {
        let registry = MarkupRegistry::builder().build();
        let mut taxonomies = Taxonomies::new();
        let mut ctx = MarkupContext::new("index", &registry, &mut taxonomies);

        assert_eq!(
            registry.dispatch(&occurrence("unit:parameter", "x"), &mut ctx),
            Err(MarkupError::UnknownMarkup("unit:parameter".to_owned()))
        );
    }

    #[test]
    fn test_closure_factory() {
        let mut builder = MarkupRegistry::builder();
        builder
            .register(
                MarkupDescriptor::new("unit", "parameter"),
                |descriptor: &MarkupDescriptor| -> Box<dyn MarkupHandler> {
                    Box::new(Echo {
                        kind: descriptor.kind.to_uppercase(),
                    })
                },
            )
            .unwrap();
        let registry = builder.build();
        let mut taxonomies = Taxonomies::new();
        taxonomies.insert(Taxonomy::new("unit", ["parameter"]));
        let mut ctx = MarkupContext::new("index", &registry, &mut taxonomies);

        let nodes = registry
            .dispatch(&occurrence("unit:parameter", "x"), &mut ctx)
            .unwrap();

        assert_eq!(nodes, vec![Node::paragraph("PARAMETER x")]);
    }

    #[test]
    fn test_descriptors_in_registration_order() {
        let mut builder = MarkupRegistry::builder();
        builder
            .register(MarkupDescriptor::new("unit", "parameter"), echo)
            .unwrap()
            .register(MarkupDescriptor::new("other", "thing"), echo)
            .unwrap();
        let registry = builder.build();

        let names: Vec<_> = registry
            .descriptors()
            .map(|d| d.markup_name.as_str())
            .collect();
        assert_eq!(names, vec!["unit:parameter", "other:thing"]);
        assert_eq!(
            registry.descriptor("other:thing"),
            Some(&MarkupDescriptor::new("other", "thing"))
        );
    }
}
