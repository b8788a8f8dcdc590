//! Revision selection and required-extension checks.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use glx_core::{
    CapabilityName, Catalog, ContextAttributes, ContextId, GlxError, GlxResult, RevisionTag,
};

use crate::handle::Handle;
use crate::provider::{RenderingContext, Surface};
use crate::registry::ExtensionRegistry;

/// Options for [`acquire`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquireOptions {
    /// Extensions that must be available, implicitly or by activation.
    pub required_extensions: Vec<CapabilityName>,
    /// Passed through to the surface untouched.
    pub context_attributes: ContextAttributes,
    /// Fail instead of falling back to WebGL 1.
    pub force_modern: bool,
    /// Never try WebGL 2.
    pub force_legacy: bool,
    /// Catalog to resolve against. Defaults to the bundled WebGL catalog.
    #[serde(skip)]
    pub catalog: Option<Arc<Catalog>>,
}

impl AcquireOptions {
    /// Default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required extension.
    #[must_use]
    pub fn require(mut self, name: impl Into<CapabilityName>) -> Self {
        self.required_extensions.push(name.into());
        self
    }

    /// Require WebGL 2.
    #[must_use]
    pub fn force_modern(mut self) -> Self {
        self.force_modern = true;
        self
    }

    /// Skip WebGL 2.
    #[must_use]
    pub fn force_legacy(mut self) -> Self {
        self.force_legacy = true;
        self
    }

    /// Set the context attributes.
    #[must_use]
    pub fn with_attributes(mut self, attributes: ContextAttributes) -> Self {
        self.context_attributes = attributes;
        self
    }

    /// Resolve against a specific catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<Catalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }
}

/// Acquire a handle from a surface.
///
/// Failures are also reported through `tracing::error!`, so callers that
/// only want to degrade gracefully can just check for `Err`.
///
/// # Errors
///
/// - [`GlxError::UnavailableRevision`] if WebGL 2 was forced but unavailable.
/// - [`GlxError::NoContext`] if no revision is available.
/// - [`GlxError::MissingCapability`] for the first unsatisfiable required extension.
pub fn acquire(surface: &mut dyn Surface, options: &AcquireOptions) -> GlxResult<Handle> {
    let catalog = options.catalog.clone().unwrap_or_else(Catalog::webgl);
    Negotiator::new(catalog)
        .negotiate(surface, options)
        .inspect_err(|e| tracing::error!("GLX context acquisition failed: {e}"))
}

/// Picks a revision and assembles the handle.
#[derive(Debug, Clone)]
pub struct Negotiator {
    catalog: Arc<Catalog>,
}

impl Negotiator {
    /// Negotiator resolving against `catalog`.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// Run negotiation once.
    ///
    /// # Errors
    ///
    /// See [`acquire`].
    pub fn negotiate(
        &self,
        surface: &mut dyn Surface,
        options: &AcquireOptions,
    ) -> GlxResult<Handle> {
        let (mut context, revision) = Self::select_revision(surface, options)?;
        tracing::debug!(%revision, "Selected context revision");

        let implicit = match revision {
            RevisionTag::Modern => self.catalog.implicit_extensions().to_vec(),
            RevisionTag::Legacy => Vec::new(),
        };
        let mut registry = ExtensionRegistry::build(context.as_mut(), implicit);

        for name in &options.required_extensions {
            if !registry.ensure(context.as_mut(), name) {
                return Err(GlxError::MissingCapability(name.clone()));
            }
        }

        Ok(Handle::new(
            context,
            revision,
            registry,
            Arc::clone(&self.catalog),
        ))
    }

    fn select_revision(
        surface: &mut dyn Surface,
        options: &AcquireOptions,
    ) -> GlxResult<(Box<dyn RenderingContext>, RevisionTag)> {
        let attributes = &options.context_attributes;

        if !options.force_legacy {
            if let Some(context) = surface.request_context(ContextId::Webgl2, attributes) {
                return Ok((context, RevisionTag::Modern));
            }
        }
        if options.force_modern {
            return Err(GlxError::UnavailableRevision(RevisionTag::Modern));
        }

        RevisionTag::Legacy
            .context_ids()
            .iter()
            .find_map(|&id| surface.request_context(id, attributes))
            .map(|context| (context, RevisionTag::Legacy))
            .ok_or(GlxError::NoContext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_accumulates_requirements() {
        let options = AcquireOptions::new()
            .require("OES_texture_float")
            .require("WEBGL_lose_context")
            .force_modern();
        assert_eq!(options.required_extensions.len(), 2);
        assert!(options.force_modern);
        assert!(!options.force_legacy);
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: AcquireOptions =
            serde_json::from_str(r#"{"required_extensions": ["EXT_frag_depth"], "force_legacy": true}"#)
                .expect("parse");
        assert_eq!(options.required_extensions, vec![CapabilityName::from("EXT_frag_depth")]);
        assert!(options.force_legacy);
        assert!(options.catalog.is_none());
        assert_eq!(options.context_attributes, ContextAttributes::default());
    }
}
