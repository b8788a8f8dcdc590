//! Serialized form of the capability catalog.
//!
//! This is the versioned document shipped as `catalog/webgl.json`. It is
//! deliberately close to the tables the catalog is authored from; names are
//! resolved and validated when it is turned into a [`Catalog`](crate::Catalog).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{CapabilityName, OperationName, Value};

/// Operation names native to each revision.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationLists {
    /// Operations every WebGL 1 context exposes.
    #[serde(default)]
    pub legacy: Vec<OperationName>,
    /// Operations added by WebGL 2.
    #[serde(default)]
    pub modern: Vec<OperationName>,
}

/// Constant tables, keyed by constant name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnumTables {
    /// WebGL 1 constants.
    #[serde(default)]
    pub legacy: BTreeMap<String, u32>,
    /// Constants added by WebGL 2.
    #[serde(default)]
    pub modern: BTreeMap<String, u32>,
    /// Constants defined by extensions (suffixed names).
    #[serde(default)]
    pub extension: BTreeMap<String, u32>,
}

/// A parameter default: a literal, or a reference to a named constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    /// `{"enum": "LEQUAL"}`.
    Enum {
        /// Constant name.
        #[serde(rename = "enum")]
        name: String,
    },
    /// Any literal value.
    Literal(Value),
}

/// Defaults answered on WebGL 1 for WebGL 2-only queries, keyed by constant name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultTables {
    /// `getParameter` defaults.
    #[serde(default)]
    pub parameter: BTreeMap<String, DefaultValue>,
    /// `getProgramParameter` defaults.
    #[serde(default)]
    pub program: BTreeMap<String, DefaultValue>,
    /// `getTexParameter` defaults.
    #[serde(default)]
    pub texture: BTreeMap<String, DefaultValue>,
}

/// Complete catalog document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDocument {
    /// Catalog version string.
    pub version: String,
    /// Extensions folded into WebGL 2 core, in reporting order.
    #[serde(default)]
    pub implicit_extensions: Vec<CapabilityName>,
    /// Native operation lists.
    #[serde(default)]
    pub operations: OperationLists,
    /// `operation -> [extension, method]`.
    #[serde(default)]
    pub extension_operations: BTreeMap<OperationName, (CapabilityName, String)>,
    /// Constant tables.
    #[serde(default)]
    pub enums: EnumTables,
    /// Query defaults.
    #[serde(default)]
    pub parameter_defaults: DefaultTables,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_value_distinguishes_enum_refs_from_literals() {
        let refs: Vec<DefaultValue> =
            serde_json::from_str(r#"[{"enum": "LEQUAL"}, 1000, false, {"object": 2}]"#)
                .expect("parse");
        assert_eq!(
            refs[0],
            DefaultValue::Enum {
                name: "LEQUAL".into()
            }
        );
        assert_eq!(refs[1], DefaultValue::Literal(Value::Int(1000)));
        assert_eq!(refs[2], DefaultValue::Literal(Value::Bool(false)));
        assert_eq!(refs[3], DefaultValue::Literal(Value::Object { object: 2 }));
    }

    #[test]
    fn minimal_document_parses() {
        let doc: CatalogDocument = serde_json::from_str(r#"{"version": "0"}"#).expect("parse");
        assert!(doc.operations.legacy.is_empty());
        assert!(doc.extension_operations.is_empty());
    }
}
