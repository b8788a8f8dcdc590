//! Extension registry: activated extensions plus the implicit set.

use std::collections::{HashMap, HashSet};
use std::fmt;

use glx_core::CapabilityName;

use crate::provider::{Extension, RenderingContext};

/// Extensions available to one handle.
///
/// Built once from the context. Implicit extensions are present without
/// activation and are never activated against the context. Every other name
/// is activated at most once, whether it succeeded or not. Only advertised
/// extensions appear in [`supported_names`](Self::supported_names); an
/// unlisted one that was activated on demand is usable but stays unlisted.
pub struct ExtensionRegistry {
    implicit: Vec<CapabilityName>,
    advertised: Vec<CapabilityName>,
    active: HashMap<CapabilityName, Box<dyn Extension>>,
    attempted: HashSet<CapabilityName>,
}

impl ExtensionRegistry {
    /// Activate every extension the context advertises.
    pub fn build(context: &mut dyn RenderingContext, implicit: Vec<CapabilityName>) -> Self {
        let mut registry = Self {
            implicit,
            advertised: Vec::new(),
            active: HashMap::new(),
            attempted: HashSet::new(),
        };

        for name in context.supported_extensions() {
            if registry.is_implicit(name.as_str()) {
                tracing::trace!("Skipping activation of implicit extension {name}");
                continue;
            }
            if registry.attempted.contains(&name) {
                continue;
            }
            if registry.activate(context, &name) {
                registry.advertised.push(name);
            } else {
                tracing::warn!("Advertised extension {name} failed to activate, omitting");
            }
        }

        tracing::debug!(
            implicit = registry.implicit.len(),
            active = registry.active.len(),
            "Extension registry built"
        );
        registry
    }

    /// Make sure `name` is available, activating it if it was never tried.
    ///
    /// Used for required extensions the context did not advertise.
    pub fn ensure(&mut self, context: &mut dyn RenderingContext, name: &CapabilityName) -> bool {
        if self.has(name.as_str()) {
            return true;
        }
        if self.attempted.contains(name) {
            return false;
        }
        self.activate(context, name)
    }

    fn activate(&mut self, context: &mut dyn RenderingContext, name: &CapabilityName) -> bool {
        if !self.attempted.insert(name.clone()) {
            return self.active.contains_key(name);
        }
        match context.activate_extension(name.as_str()) {
            Some(extension) => {
                tracing::trace!("Activated extension {name}");
                self.active.insert(name.clone(), extension);
                true
            }
            None => false,
        }
    }

    /// Whether the extension is implicit or activated.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.is_implicit(name) || self.active.contains_key(name)
    }

    /// Whether the extension is folded into the context's core.
    #[must_use]
    pub fn is_implicit(&self, name: &str) -> bool {
        self.implicit.iter().any(|c| c == name)
    }

    /// Activated extension object. Implicit extensions have none.
    pub fn extension_mut(&mut self, name: &str) -> Option<&mut (dyn Extension + 'static)> {
        self.active.get_mut(name).map(|extension| &mut **extension)
    }

    /// Whether an activated extension object exists for `name`.
    #[must_use]
    pub fn is_active(&self, name: &str) -> bool {
        self.active.contains_key(name)
    }

    /// Whether an activated extension exposes `method`.
    #[must_use]
    pub fn has_method(&self, name: &str, method: &str) -> bool {
        self.active
            .get(name)
            .is_some_and(|extension| extension.has_method(method))
    }

    /// Implicit extensions first, then the advertised ones that activated,
    /// in the order the context listed them.
    #[must_use]
    pub fn supported_names(&self) -> Vec<CapabilityName> {
        self.implicit
            .iter()
            .chain(self.advertised.iter())
            .cloned()
            .collect()
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("implicit", &self.implicit)
            .field("advertised", &self.advertised)
            .finish_non_exhaustive()
    }
}
