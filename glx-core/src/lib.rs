//! # Saorsa GLX Core
//!
//! Shared vocabulary for the version-unifying WebGL access layer.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 glx-core                    │
//! ├──────────────────────┬──────────────────────┤
//! │  Names & Revisions   │  Capability Catalog  │
//! │  - RevisionTag       │  - Operation lists   │
//! │  - ContextId         │  - Extension methods │
//! │  - Capability/Op     │  - Implicit set      │
//! │                      │  - Enum tables       │
//! ├──────────────────────┤  - Parameter defaults│
//! │  Values & Attributes │                      │
//! └──────────────────────┴──────────────────────┘
//! ```
//!
//! The catalog is static, versioned data. Nothing in this crate talks to a
//! rendering context; see `glx-context` for negotiation and dispatch.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod attributes;
pub mod catalog;
pub mod error;
pub mod names;
pub mod revision;
pub mod schema;
pub mod value;

pub use attributes::{ContextAttributes, PowerPreference};
pub use catalog::{Catalog, ExtensionBinding, OperationOrigin, OperationSpec, QueryKind};
pub use error::{CatalogError, GlxError, GlxResult};
pub use names::{CapabilityName, OperationName};
pub use revision::{ContextId, RevisionTag};
pub use schema::{CatalogDocument, DefaultValue};
pub use value::{TypedArray, Value};

/// GLX core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
