//! Dynamic argument and result values carried across the dispatch table.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A value passed to or returned from a forwarded operation.
///
/// Dispatch is by name, so arguments travel as a small dynamic type rather
/// than per-operation signatures. GL objects (buffers, programs, textures,
/// queries, ...) are opaque ids owned by the provider.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// `null` / no result.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer, including GL enums and sizes.
    Int(i64),
    /// Floating point.
    Float(f64),
    /// String (shader source, info logs, ...).
    Text(String),
    /// Sequence of values. Providers pass it on as a plain array and leave
    /// element conversion to the receiving operation.
    List(Vec<Value>),
    /// Provider-owned GL object.
    Object {
        /// Provider specific object id.
        object: u64,
    },
    /// Numeric buffer with a fixed element type, for uploads such as
    /// `bufferData` that need raw typed memory.
    Typed(TypedArray),
}

/// Element-typed numeric buffer.
///
/// Serialized as a single-key object naming the element type, e.g.
/// `{"float32": [0.0, 1.0]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypedArray {
    /// `Float32Array`.
    Float32(Vec<f32>),
    /// `Int32Array`.
    Int32(Vec<i32>),
    /// `Uint32Array`.
    Uint32(Vec<u32>),
    /// `Uint16Array`.
    Uint16(Vec<u16>),
    /// `Uint8Array`.
    Uint8(Vec<u8>),
}

impl TypedArray {
    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Float32(v) => v.len(),
            Self::Int32(v) => v.len(),
            Self::Uint32(v) => v.len(),
            Self::Uint16(v) => v.len(),
            Self::Uint8(v) => v.len(),
        }
    }

    /// Whether the buffer has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element type name as used in serialized form.
    #[must_use]
    pub fn element_type(&self) -> &'static str {
        match self {
            Self::Float32(_) => "float32",
            Self::Int32(_) => "int32",
            Self::Uint32(_) => "uint32",
            Self::Uint16(_) => "uint16",
            Self::Uint8(_) => "uint8",
        }
    }
}

impl Value {
    /// Integer view, accepting integral floats.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    /// View as a GL enum.
    #[must_use]
    pub fn as_enum(&self) -> Option<u32> {
        self.as_i64().and_then(|v| u32::try_from(v).ok())
    }

    /// Float view, widening integers.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Boolean view.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// String view.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Object id view.
    #[must_use]
    pub fn as_object(&self) -> Option<u64> {
        match self {
            Self::Object { object } => Some(*object),
            _ => None,
        }
    }

    /// Typed buffer view.
    #[must_use]
    pub fn as_typed(&self) -> Option<&TypedArray> {
        match self {
            Self::Typed(v) => Some(v),
            _ => None,
        }
    }

    /// Whether this is `Null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v:?}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Object { object } => write!(f, "#{object}"),
            Self::Typed(v) => write!(f, "{}[{}]", v.element_type(), v.len()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<TypedArray> for Value {
    fn from(v: TypedArray) -> Self {
        Self::Typed(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
