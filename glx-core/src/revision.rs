//! Context revisions and the context ids that produce them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Major revision of the rendering context backing a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevisionTag {
    /// WebGL 1, reached through `webgl` or `experimental-webgl`.
    Legacy,
    /// WebGL 2, reached through `webgl2`.
    Modern,
}

impl RevisionTag {
    /// Numeric context version (1 or 2).
    #[must_use]
    pub const fn version(self) -> u8 {
        match self {
            Self::Legacy => 1,
            Self::Modern => 2,
        }
    }

    /// Context ids that yield this revision, in request order.
    #[must_use]
    pub const fn context_ids(self) -> &'static [ContextId] {
        match self {
            Self::Legacy => &[ContextId::Webgl, ContextId::ExperimentalWebgl],
            Self::Modern => &[ContextId::Webgl2],
        }
    }
}

impl fmt::Display for RevisionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WebGL {}", self.version())
    }
}

/// Context id string passed to `HTMLCanvasElement.getContext`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContextId {
    /// `"webgl2"`.
    #[serde(rename = "webgl2")]
    Webgl2,
    /// `"webgl"`.
    #[serde(rename = "webgl")]
    Webgl,
    /// `"experimental-webgl"`, the pre-standard name for WebGL 1.
    #[serde(rename = "experimental-webgl")]
    ExperimentalWebgl,
}

impl ContextId {
    /// The id string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Webgl2 => "webgl2",
            Self::Webgl => "webgl",
            Self::ExperimentalWebgl => "experimental-webgl",
        }
    }

    /// Revision a context of this id provides.
    #[must_use]
    pub const fn revision(self) -> RevisionTag {
        match self {
            Self::Webgl2 => RevisionTag::Modern,
            Self::Webgl | Self::ExperimentalWebgl => RevisionTag::Legacy,
        }
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
