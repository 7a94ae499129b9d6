//! Markup descriptors.

use crate::error::RegistryError;

/// Identifies one configured markup construct.
///
/// `markup_name` is always `"<taxonomy>:<kind>"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MarkupDescriptor {
    /// Name matched against occurrences.
    pub markup_name: String,
    /// Taxonomy objects are registered into.
    pub taxonomy: String,
    /// Kind of the registered objects.
    pub kind: String,
}

impl MarkupDescriptor {
    /// Create a descriptor for `taxonomy:kind`.
    #[must_use]
    pub fn new(taxonomy: impl Into<String>, kind: impl Into<String>) -> Self {
        let taxonomy = taxonomy.into();
        let kind = kind.into();
        Self {
            markup_name: format!("{taxonomy}:{kind}"),
            taxonomy,
            kind,
        }
    }

    /// Parse a `taxonomy:kind` markup name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidMarkupName`] unless the name has
    /// exactly one `:` with non-empty parts on both sides.
    pub fn parse(markup_name: &str) -> Result<Self, RegistryError> {
        match markup_name.split_once(':') {
            Some((taxonomy, kind))
                if !taxonomy.is_empty() && !kind.is_empty() && !kind.contains(':') =>
            {
                Ok(Self::new(taxonomy, kind))
            }
            _ => Err(RegistryError::InvalidMarkupName(markup_name.to_owned())),
        }
    }

    /// Whether the name is well-formed and free of whitespace.
    pub(crate) fn validate(&self) -> Result<(), RegistryError> {
        let valid = |s: &str| !s.is_empty() && !s.contains(':') && !s.contains(char::is_whitespace);
        if valid(&self.taxonomy)
            && valid(&self.kind)
            && self.markup_name == format!("{}:{}", self.taxonomy, self.kind)
        {
            Ok(())
        } else {
            Err(RegistryError::InvalidMarkupName(self.markup_name.clone()))
        }
    }
}
