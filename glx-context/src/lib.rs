//! # Saorsa GLX Context
//!
//! One handle over WebGL 1 and WebGL 2.
//!
//! Callers ask for a context plus a list of required extensions. At
//! acquisition time the negotiator picks a revision, the registry activates
//! every advertised extension, and the dispatch builder resolves every
//! catalog operation once:
//!
//! ```text
//! ┌──────────────┐   ┌────────────────────┐   ┌────────────────────┐
//! │ AcquireOpts  │──▶│ Negotiator         │──▶│ ExtensionRegistry  │
//! │ - required   │   │ webgl2 → webgl →   │   │ implicit + active  │
//! │ - force flags│   │ experimental-webgl │   └─────────┬──────────┘
//! └──────────────┘   └────────────────────┘             │
//!                                                       ▼
//!                    ┌────────────────────┐   ┌────────────────────┐
//!                    │ Handle             │◀──│ DispatchTable      │
//!                    │ invoke / constants │   │ native → extension │
//!                    │ extensions / hooks │   │ → unsupported stub │
//!                    └────────────────────┘   └────────────────────┘
//! ```
//!
//! Nothing is renegotiated after acquisition.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod dispatch;
pub mod handle;
pub mod negotiate;
pub mod provider;
pub mod registry;
pub mod report;
#[cfg(feature = "simulated")]
pub mod simulated;
#[cfg(feature = "wasm")]
pub mod web;

pub use dispatch::{DispatchEntry, DispatchKind, DispatchTable, ResolvedOperation};
pub use handle::{instrument, ExtensionRef, Handle, Next};
pub use negotiate::{acquire, AcquireOptions, Negotiator};
pub use provider::{Extension, RenderingContext, Surface};
pub use registry::ExtensionRegistry;
pub use report::{DispatchReport, KindCounts, OperationReport};

pub use glx_core::{
    CapabilityName, Catalog, ContextAttributes, ContextId, GlxError, GlxResult, OperationName,
    RevisionTag, TypedArray, Value,
};
