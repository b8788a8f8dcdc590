//! Serializable summary of a negotiated handle.

use serde::{Deserialize, Serialize};

use glx_core::{CapabilityName, OperationName, RevisionTag};

use crate::dispatch::{DispatchEntry, DispatchKind};
use crate::handle::Handle;

/// Number of operations per dispatch kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindCounts {
    /// Native forwards.
    pub native: usize,
    /// Extension forwards.
    pub extension: usize,
    /// Unsupported stubs.
    pub unsupported: usize,
}

/// Resolution of one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationReport {
    /// Operation name.
    pub name: OperationName,
    /// Dispatch kind.
    pub kind: DispatchKind,
    /// Extension used, or the one that would unlock an unsupported operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capability: Option<CapabilityName>,
    /// Extension method used for extension forwards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

/// Snapshot of what negotiation produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
    /// Selected revision.
    pub revision: RevisionTag,
    /// Catalog version resolved against.
    pub catalog_version: String,
    /// Drawing buffer size at report time.
    pub drawing_buffer: (u32, u32),
    /// Supported extensions, implicit first.
    pub supported_extensions: Vec<CapabilityName>,
    /// Operations per kind.
    pub counts: KindCounts,
    /// Every operation, ordered by name.
    pub operations: Vec<OperationReport>,
}

impl DispatchReport {
    pub(crate) fn new(handle: &Handle) -> Self {
        let mut counts = KindCounts::default();
        let mut operations = Vec::new();

        for name in handle.operations() {
            let Some(resolved) = handle.resolution(name.as_str()) else {
                continue;
            };
            let (capability, method) = match &resolved.entry {
                DispatchEntry::NativeForward => (None, None),
                DispatchEntry::ExtensionForward { capability, method } => {
                    (Some(capability.clone()), Some(method.clone()))
                }
                DispatchEntry::Unsupported { capability } => (capability.clone(), None),
            };
            let kind = resolved.entry.kind();
            match kind {
                DispatchKind::Native => counts.native += 1,
                DispatchKind::Extension => counts.extension += 1,
                DispatchKind::Unsupported => counts.unsupported += 1,
            }
            operations.push(OperationReport {
                name: name.clone(),
                kind,
                capability,
                method,
            });
        }

        Self {
            revision: handle.revision(),
            catalog_version: handle.catalog().version().to_string(),
            drawing_buffer: (handle.drawing_buffer_width(), handle.drawing_buffer_height()),
            supported_extensions: handle.supported_extensions(),
            counts,
            operations,
        }
    }

    /// Operations of one kind.
    pub fn of_kind(&self, kind: DispatchKind) -> impl Iterator<Item = &OperationReport> {
        self.operations.iter().filter(move |op| op.kind == kind)
    }
}
