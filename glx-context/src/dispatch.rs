//! Dispatch table construction.
//!
//! Every catalog operation is resolved exactly once, in this order:
//!
//! 1. the context exposes the operation itself → [`DispatchEntry::NativeForward`];
//! 2. the catalog names an extension method for it and that extension is
//!    active and exposes the method → [`DispatchEntry::ExtensionForward`];
//! 3. otherwise → [`DispatchEntry::Unsupported`], which only fails when called.
//!
//! Native wins even when an extension could also provide the operation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use glx_core::{CapabilityName, Catalog, OperationName, OperationSpec, QueryKind, RevisionTag};

use crate::provider::RenderingContext;
use crate::registry::ExtensionRegistry;

/// How one operation is executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchEntry {
    /// Forward to the context's operation of the same name.
    NativeForward,
    /// Forward to a method on an activated extension.
    ExtensionForward {
        /// Extension holding the method.
        capability: CapabilityName,
        /// Method on the extension object.
        method: String,
    },
    /// Fail with `UnsupportedOperation` when invoked.
    Unsupported {
        /// Extension that would have provided the operation, when it is not
        /// already available.
        capability: Option<CapabilityName>,
    },
}

impl DispatchEntry {
    /// The entry's kind.
    #[must_use]
    pub fn kind(&self) -> DispatchKind {
        match self {
            Self::NativeForward => DispatchKind::Native,
            Self::ExtensionForward { .. } => DispatchKind::Extension,
            Self::Unsupported { .. } => DispatchKind::Unsupported,
        }
    }
}

/// Kind tag of a [`DispatchEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchKind {
    /// Native forward.
    Native,
    /// Extension forward.
    Extension,
    /// Unsupported stub.
    Unsupported,
}

/// A resolved operation: the entry plus the query-default specialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOperation {
    /// How the call is executed.
    pub entry: DispatchEntry,
    /// Set on WebGL 1 handles for `getParameter`-style queries, whose
    /// WebGL 2-only parameters are answered from the catalog defaults.
    pub defaulted_query: Option<QueryKind>,
}

/// Immutable operation → resolution map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchTable {
    entries: BTreeMap<OperationName, ResolvedOperation>,
}

impl DispatchTable {
    /// Resolve every catalog operation against a context and its registry.
    #[must_use]
    pub fn build(
        catalog: &Catalog,
        context: &dyn RenderingContext,
        registry: &ExtensionRegistry,
        revision: RevisionTag,
    ) -> Self {
        let entries: BTreeMap<_, _> = catalog
            .operations()
            .iter()
            .map(|op| {
                let resolved = ResolvedOperation {
                    entry: resolve(op, context, registry),
                    defaulted_query: match revision {
                        RevisionTag::Legacy => QueryKind::for_operation(op.name.as_str()),
                        RevisionTag::Modern => None,
                    },
                };
                (op.name.clone(), resolved)
            })
            .collect();

        let table = Self { entries };
        tracing::debug!(
            %revision,
            native = table.count(DispatchKind::Native),
            extension = table.count(DispatchKind::Extension),
            unsupported = table.count(DispatchKind::Unsupported),
            "Dispatch table built"
        );
        table
    }

    /// Resolution for one operation.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ResolvedOperation> {
        self.entries.get(name)
    }

    /// Kind for one operation.
    #[must_use]
    pub fn kind(&self, name: &str) -> Option<DispatchKind> {
        self.get(name).map(|resolved| resolved.entry.kind())
    }

    /// Number of resolved operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of operations of a given kind.
    #[must_use]
    pub fn count(&self, kind: DispatchKind) -> usize {
        self.entries
            .values()
            .filter(|resolved| resolved.entry.kind() == kind)
            .count()
    }

    /// All resolutions, ordered by operation name.
    pub fn iter(&self) -> impl Iterator<Item = (&OperationName, &ResolvedOperation)> {
        self.entries.iter()
    }

    /// Split into the underlying map.
    #[must_use]
    pub fn into_entries(self) -> BTreeMap<OperationName, ResolvedOperation> {
        self.entries
    }
}

fn resolve(
    op: &OperationSpec,
    context: &dyn RenderingContext,
    registry: &ExtensionRegistry,
) -> DispatchEntry {
    if context.has_operation(op.name.as_str()) {
        return DispatchEntry::NativeForward;
    }
    match &op.extension {
        Some(binding) if registry.has_method(binding.capability.as_str(), &binding.method) => {
            DispatchEntry::ExtensionForward {
                capability: binding.capability.clone(),
                method: binding.method.clone(),
            }
        }
        // An extension that is already available but lacks the method would
        // not unlock anything, so it is not named.
        binding => DispatchEntry::Unsupported {
            capability: binding
                .as_ref()
                .filter(|b| !registry.has(b.capability.as_str()))
                .map(|b| b.capability.clone()),
        },
    }
}
