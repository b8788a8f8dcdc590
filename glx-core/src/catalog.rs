//! The capability catalog: immutable, versioned lookup tables.
//!
//! The catalog answers three questions for the negotiator and the dispatch
//! builder:
//!
//! - which logical operations exist, and where each one comes from;
//! - which extension method backs an operation when the context lacks it;
//! - which constants and query defaults belong to each revision.
//!
//! It never changes after construction. Handles share it through an [`Arc`].

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::schema::{CatalogDocument, DefaultValue};
use crate::{CapabilityName, CatalogError, OperationName, RevisionTag, Value};

const BUNDLED_WEBGL: &str = include_str!("../catalog/webgl.json");

/// Where an operation natively lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationOrigin {
    /// Core operation of the given revision (and every later one).
    Native(RevisionTag),
    /// Only reachable through an extension.
    Extension,
}

/// Extension method that can stand in for an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionBinding {
    /// Extension providing the method.
    pub capability: CapabilityName,
    /// Method name on the extension object.
    pub method: String,
}

/// Catalog entry for one logical operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationSpec {
    /// Logical name exposed on handles.
    pub name: OperationName,
    /// Native origin.
    pub origin: OperationOrigin,
    /// Extension fallback, if any.
    pub extension: Option<ExtensionBinding>,
}

impl OperationSpec {
    /// Whether a context of `revision` is expected to expose this natively.
    #[must_use]
    pub fn is_native_in(&self, revision: RevisionTag) -> bool {
        matches!(self.origin, OperationOrigin::Native(since) if since <= revision)
    }
}

/// Query operations whose WebGL 2-only parameters get defaults on WebGL 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    /// `getParameter(pname)`.
    Parameter,
    /// `getProgramParameter(program, pname)`.
    Program,
    /// `getTexParameter(target, pname)`.
    Texture,
}

impl QueryKind {
    /// All query kinds.
    pub const ALL: [Self; 3] = [Self::Parameter, Self::Program, Self::Texture];

    /// Operation name of the query.
    #[must_use]
    pub const fn operation(self) -> &'static str {
        match self {
            Self::Parameter => "getParameter",
            Self::Program => "getProgramParameter",
            Self::Texture => "getTexParameter",
        }
    }

    /// Position of the parameter id in the argument list.
    #[must_use]
    pub const fn parameter_index(self) -> usize {
        match self {
            Self::Parameter => 0,
            Self::Program | Self::Texture => 1,
        }
    }

    /// Query kind for an operation name.
    #[must_use]
    pub fn for_operation(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.operation() == name)
    }
}

/// Validated, immutable capability catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    version: String,
    operations: Vec<OperationSpec>,
    index: HashMap<OperationName, usize>,
    implicit: Vec<CapabilityName>,
    by_method: HashMap<(CapabilityName, String), OperationName>,
    legacy_enums: BTreeMap<String, u32>,
    modern_enums: BTreeMap<String, u32>,
    extension_enums: BTreeMap<String, u32>,
    defaults: HashMap<QueryKind, HashMap<u32, Value>>,
}

impl Catalog {
    /// The bundled WebGL catalog, parsed once per process.
    ///
    /// # Panics
    ///
    /// Panics if the bundled document is invalid, which the test suite rules out.
    #[must_use]
    pub fn webgl() -> Arc<Self> {
        static WEBGL: OnceLock<Arc<Catalog>> = OnceLock::new();
        Arc::clone(WEBGL.get_or_init(|| {
            Arc::new(Self::from_json(BUNDLED_WEBGL).expect("bundled WebGL catalog is valid"))
        }))
    }

    /// Parse and validate a catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or fails validation.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(json)?;
        Self::from_document(document)
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid catalog.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Validate a document and build lookup indexes.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate operations, empty extension bindings,
    /// or defaults that name unknown constants.
    pub fn from_document(document: CatalogDocument) -> Result<Self, CatalogError> {
        let CatalogDocument {
            version,
            implicit_extensions,
            operations: lists,
            mut extension_operations,
            enums,
            parameter_defaults,
        } = document;

        for (name, (capability, method)) in &extension_operations {
            if capability.as_str().is_empty() || method.is_empty() {
                return Err(CatalogError::EmptyCapability(name.to_string()));
            }
        }

        let native = lists
            .legacy
            .into_iter()
            .map(|name| (name, OperationOrigin::Native(RevisionTag::Legacy)))
            .chain(
                lists
                    .modern
                    .into_iter()
                    .map(|name| (name, OperationOrigin::Native(RevisionTag::Modern))),
            );

        let mut operations = Vec::new();
        let mut index = HashMap::new();
        for (name, origin) in native {
            if index.contains_key(&name) {
                return Err(CatalogError::DuplicateOperation(name.to_string()));
            }
            let extension = extension_operations
                .remove(&name)
                .map(|(capability, method)| ExtensionBinding { capability, method });
            index.insert(name.clone(), operations.len());
            operations.push(OperationSpec {
                name,
                origin,
                extension,
            });
        }
        // Whatever is left is reachable only through its extension.
        for (name, (capability, method)) in extension_operations {
            index.insert(name.clone(), operations.len());
            operations.push(OperationSpec {
                name,
                origin: OperationOrigin::Extension,
                extension: Some(ExtensionBinding { capability, method }),
            });
        }

        let by_method = operations
            .iter()
            .filter_map(|op| {
                op.extension
                    .as_ref()
                    .map(|b| ((b.capability.clone(), b.method.clone()), op.name.clone()))
            })
            .collect();

        let mut seen = HashSet::new();
        let implicit = implicit_extensions
            .into_iter()
            .filter(|name| seen.insert(name.clone()))
            .collect();

        let mut catalog = Self {
            version,
            operations,
            index,
            implicit,
            by_method,
            legacy_enums: enums.legacy,
            modern_enums: enums.modern,
            extension_enums: enums.extension,
            defaults: HashMap::new(),
        };

        let tables = [
            (QueryKind::Parameter, parameter_defaults.parameter),
            (QueryKind::Program, parameter_defaults.program),
            (QueryKind::Texture, parameter_defaults.texture),
        ];
        for (kind, table) in tables {
            let mut resolved = HashMap::with_capacity(table.len());
            for (key, default) in table {
                let id = catalog
                    .lookup_constant(&key)
                    .ok_or(CatalogError::UnknownConstant(key))?;
                let value = match default {
                    DefaultValue::Literal(value) => value,
                    DefaultValue::Enum { name } => catalog
                        .lookup_constant(&name)
                        .map(Value::from)
                        .ok_or(CatalogError::UnknownConstant(name))?,
                };
                resolved.insert(id, value);
            }
            catalog.defaults.insert(kind, resolved);
        }

        tracing::debug!(
            version = %catalog.version,
            operations = catalog.operations.len(),
            implicit = catalog.implicit.len(),
            "Loaded capability catalog"
        );

        Ok(catalog)
    }

    /// Catalog version string.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Every operation, in catalog order (legacy, modern, extension-only).
    #[must_use]
    pub fn operations(&self) -> &[OperationSpec] {
        &self.operations
    }

    /// Look up one operation.
    #[must_use]
    pub fn operation(&self, name: &str) -> Option<&OperationSpec> {
        self.index.get(name).map(|&i| &self.operations[i])
    }

    /// Extension fallback for an operation.
    #[must_use]
    pub fn extension_binding(&self, name: &str) -> Option<&ExtensionBinding> {
        self.operation(name).and_then(|op| op.extension.as_ref())
    }

    /// Logical operation behind an extension method, e.g.
    /// `(OES_vertex_array_object, createVertexArrayOES)` → `createVertexArray`.
    #[must_use]
    pub fn operation_for_extension_method(
        &self,
        capability: &str,
        method: &str,
    ) -> Option<&OperationName> {
        self.by_method
            .get(&(CapabilityName::from(capability), method.to_string()))
    }

    /// Extensions folded into WebGL 2 core, in reporting order.
    #[must_use]
    pub fn implicit_extensions(&self) -> &[CapabilityName] {
        &self.implicit
    }

    /// Whether `name` is folded into WebGL 2 core.
    #[must_use]
    pub fn is_implicit(&self, name: &str) -> bool {
        self.implicit.iter().any(|c| c == name)
    }

    /// Constants visible on a handle of `revision`.
    ///
    /// WebGL 1 handles see WebGL 1 and extension constants; WebGL 2 handles
    /// additionally see the WebGL 2 table.
    pub fn constants_for(&self, revision: RevisionTag) -> impl Iterator<Item = (&str, u32)> {
        let modern = match revision {
            RevisionTag::Modern => Some(&self.modern_enums),
            RevisionTag::Legacy => None,
        };
        self.legacy_enums
            .iter()
            .chain(modern.into_iter().flatten())
            .chain(self.extension_enums.iter())
            .map(|(name, value)| (name.as_str(), *value))
    }

    /// Default answer for a WebGL 2-only query parameter.
    #[must_use]
    pub fn parameter_default(&self, kind: QueryKind, id: u32) -> Option<&Value> {
        self.defaults.get(&kind).and_then(|table| table.get(&id))
    }

    fn lookup_constant(&self, name: &str) -> Option<u32> {
        self.legacy_enums
            .get(name)
            .or_else(|| self.modern_enums.get(name))
            .or_else(|| self.extension_enums.get(name))
            .copied()
    }
}
