//! Scriptable in-memory surface.
//!
//! Stands in for a browser canvas when none is available: tests, the probe
//! CLI, and native builds. A [`SurfaceProfile`] says which context ids the
//! surface grants and which extensions it advertises; everything the
//! handle does to the surface is appended to a shared [`CallLog`].

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use glx_core::{
    CapabilityName, Catalog, ContextAttributes, ContextId, GlxError, GlxResult, OperationName,
    RevisionTag, Value,
};

use crate::provider::{Extension, RenderingContext, Surface};

/// What a simulated surface offers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceProfile {
    /// Context ids the surface grants.
    pub contexts: Vec<ContextId>,
    /// Initial drawing buffer width.
    pub width: u32,
    /// Initial drawing buffer height.
    pub height: u32,
    /// Extensions advertised by `getSupportedExtensions`, in order.
    pub extensions: Vec<CapabilityName>,
    /// Extensions that activate on request but are not advertised.
    pub unlisted_extensions: Vec<CapabilityName>,
    /// Advertised extensions whose activation returns nothing.
    pub broken_extensions: Vec<CapabilityName>,
    /// Method lists overriding the catalog's, per extension.
    pub extension_methods: BTreeMap<CapabilityName, Vec<String>>,
    /// Native operations added on top of the revision's catalog list.
    pub extra_operations: Vec<OperationName>,
    /// Native operations removed from the revision's catalog list.
    pub missing_operations: Vec<OperationName>,
    /// Answers for `getParameter`, keyed by parameter id.
    pub parameters: BTreeMap<u32, Value>,
}

impl Default for SurfaceProfile {
    fn default() -> Self {
        Self {
            contexts: Vec::new(),
            width: 300,
            height: 150,
            extensions: Vec::new(),
            unlisted_extensions: Vec::new(),
            broken_extensions: Vec::new(),
            extension_methods: BTreeMap::new(),
            extra_operations: Vec::new(),
            missing_operations: Vec::new(),
            parameters: BTreeMap::new(),
        }
    }
}

impl SurfaceProfile {
    /// A WebGL 2 capable browser.
    #[must_use]
    pub fn modern() -> Self {
        Self {
            contexts: vec![ContextId::Webgl2, ContextId::Webgl, ContextId::ExperimentalWebgl],
            extensions: names(&[
                "EXT_color_buffer_float",
                "EXT_texture_filter_anisotropic",
                "OES_texture_float_linear",
                "WEBGL_compressed_texture_s3tc",
                "WEBGL_debug_renderer_info",
                "WEBGL_lose_context",
                "WEBGL_multi_draw",
            ]),
            parameters: common_parameters(),
            ..Self::default()
        }
    }

    /// A WebGL 1 only browser with the usual extensions.
    #[must_use]
    pub fn legacy() -> Self {
        Self {
            contexts: vec![ContextId::Webgl, ContextId::ExperimentalWebgl],
            extensions: names(&[
                "ANGLE_instanced_arrays",
                "EXT_blend_minmax",
                "EXT_texture_filter_anisotropic",
                "OES_element_index_uint",
                "OES_texture_float",
                "OES_vertex_array_object",
                "WEBGL_depth_texture",
                "WEBGL_lose_context",
            ]),
            parameters: common_parameters(),
            ..Self::default()
        }
    }

    /// Parse a profile from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a profile.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn names(list: &[&str]) -> Vec<CapabilityName> {
    list.iter().copied().map(CapabilityName::from).collect()
}

fn common_parameters() -> BTreeMap<u32, Value> {
    BTreeMap::from([
        (3379, Value::Int(4096)),                     // MAX_TEXTURE_SIZE
        (34921, Value::Int(16)),                      // MAX_VERTEX_ATTRIBS
        (34930, Value::Int(16)),                      // MAX_TEXTURE_IMAGE_UNITS
        (7936, Value::from("Saorsa")),                // VENDOR
        (7937, Value::from("Saorsa Simulated GL")),   // RENDERER
    ])
}

/// One thing the handle did to a simulated surface.
#[derive(Debug, Clone, PartialEq)]
pub enum CallRecord {
    /// `getContext(id)`.
    RequestContext(ContextId),
    /// `getExtension(name)`.
    Activate(CapabilityName),
    /// A native or extension call.
    Invoke {
        /// Extension the method lives on; `None` for native calls.
        extension: Option<CapabilityName>,
        /// Method name.
        method: String,
        /// Arguments as passed.
        args: Vec<Value>,
    },
}

/// Shared, append-only record of surface activity.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<CallRecord>>>);

impl CallLog {
    fn push(&self, record: CallRecord) {
        self.0.borrow_mut().push(record);
    }

    /// Every record so far.
    #[must_use]
    pub fn records(&self) -> Vec<CallRecord> {
        self.0.borrow().clone()
    }

    /// Extensions activated, in order.
    #[must_use]
    pub fn activations(&self) -> Vec<CapabilityName> {
        self.0
            .borrow()
            .iter()
            .filter_map(|record| match record {
                CallRecord::Activate(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Context ids requested, in order.
    #[must_use]
    pub fn requested_contexts(&self) -> Vec<ContextId> {
        self.0
            .borrow()
            .iter()
            .filter_map(|record| match record {
                CallRecord::RequestContext(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Arguments of every call to `method`, native or extension, in order.
    #[must_use]
    pub fn calls_to(&self, method: &str) -> Vec<Vec<Value>> {
        self.0
            .borrow()
            .iter()
            .filter_map(|record| match record {
                CallRecord::Invoke {
                    method: m, args, ..
                } if m == method => Some(args.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of provider invocations of any kind.
    #[must_use]
    pub fn invocation_count(&self) -> usize {
        self.0
            .borrow()
            .iter()
            .filter(|record| matches!(record, CallRecord::Invoke { .. }))
            .count()
    }
}

/// Canvas stand-in returned by [`RenderingContext::canvas`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedCanvas {
    /// Context id the canvas was opened with.
    pub context_id: ContextId,
    /// Attributes requested for the context.
    pub attributes: ContextAttributes,
}

/// A surface driven by a [`SurfaceProfile`].
#[derive(Debug)]
pub struct SimulatedSurface {
    profile: SurfaceProfile,
    catalog: Arc<Catalog>,
    log: CallLog,
    size: Rc<Cell<(u32, u32)>>,
    granted: bool,
}

impl SimulatedSurface {
    /// Surface resolving native operations from the bundled catalog.
    #[must_use]
    pub fn new(profile: SurfaceProfile) -> Self {
        Self::with_catalog(profile, Catalog::webgl())
    }

    /// Surface resolving native operations from `catalog`.
    #[must_use]
    pub fn with_catalog(profile: SurfaceProfile, catalog: Arc<Catalog>) -> Self {
        let size = Rc::new(Cell::new((profile.width, profile.height)));
        Self {
            profile,
            catalog,
            log: CallLog::default(),
            size,
            granted: false,
        }
    }

    /// The shared call log.
    #[must_use]
    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    /// Resize the drawing buffer, as a canvas resize would.
    pub fn resize(&self, width: u32, height: u32) {
        self.size.set((width, height));
    }
}

impl Surface for SimulatedSurface {
    fn request_context(
        &mut self,
        id: ContextId,
        attributes: &ContextAttributes,
    ) -> Option<Box<dyn RenderingContext>> {
        self.log.push(CallRecord::RequestContext(id));
        if self.granted || !self.profile.contexts.contains(&id) {
            return None;
        }
        self.granted = true;
        tracing::debug!("Simulated surface granted {id}");
        Some(Box::new(SimulatedContext::new(
            &self.profile,
            &self.catalog,
            id,
            *attributes,
            self.log.clone(),
            Rc::clone(&self.size),
        )))
    }
}

struct SimulatedContext {
    canvas: SimulatedCanvas,
    operations: HashSet<OperationName>,
    advertised: Vec<CapabilityName>,
    activatable: HashSet<CapabilityName>,
    methods: BTreeMap<CapabilityName, Vec<String>>,
    parameters: BTreeMap<u32, Value>,
    log: CallLog,
    size: Rc<Cell<(u32, u32)>>,
    next_object: Rc<Cell<u64>>,
}

impl SimulatedContext {
    fn new(
        profile: &SurfaceProfile,
        catalog: &Catalog,
        id: ContextId,
        attributes: ContextAttributes,
        log: CallLog,
        size: Rc<Cell<(u32, u32)>>,
    ) -> Self {
        let revision: RevisionTag = id.revision();
        let mut operations: HashSet<OperationName> = catalog
            .operations()
            .iter()
            .filter(|op| op.is_native_in(revision))
            .map(|op| op.name.clone())
            .collect();
        operations.extend(profile.extra_operations.iter().cloned());
        for name in &profile.missing_operations {
            operations.remove(name);
        }

        let activatable = profile
            .extensions
            .iter()
            .chain(&profile.unlisted_extensions)
            .filter(|name| !profile.broken_extensions.contains(*name))
            .cloned()
            .collect();

        let mut methods: BTreeMap<CapabilityName, Vec<String>> = BTreeMap::new();
        for op in catalog.operations() {
            if let Some(binding) = &op.extension {
                methods
                    .entry(binding.capability.clone())
                    .or_default()
                    .push(binding.method.clone());
            }
        }
        for (name, list) in &profile.extension_methods {
            methods.insert(name.clone(), list.clone());
        }

        Self {
            canvas: SimulatedCanvas {
                context_id: id,
                attributes,
            },
            operations,
            advertised: profile.extensions.clone(),
            activatable,
            methods,
            parameters: profile.parameters.clone(),
            log,
            size,
            next_object: Rc::new(Cell::new(1)),
        }
    }
}

impl RenderingContext for SimulatedContext {
    fn has_operation(&self, name: &str) -> bool {
        self.operations.contains(name)
    }

    fn invoke(&mut self, name: &str, args: &[Value]) -> GlxResult<Value> {
        self.log.push(CallRecord::Invoke {
            extension: None,
            method: name.to_string(),
            args: args.to_vec(),
        });
        if !self.has_operation(name) {
            return Err(GlxError::Provider {
                operation: name.to_string(),
                message: "not a function".to_string(),
            });
        }
        Ok(match name {
            "getParameter" => args
                .first()
                .and_then(Value::as_enum)
                .and_then(|id| self.parameters.get(&id).cloned())
                .unwrap_or_default(),
            "getError" => Value::Int(0),
            "isContextLost" => Value::Bool(false),
            _ => answer(name, &self.next_object),
        })
    }

    fn supported_extensions(&self) -> Vec<CapabilityName> {
        self.advertised.clone()
    }

    fn activate_extension(&mut self, name: &str) -> Option<Box<dyn Extension>> {
        let name = CapabilityName::from(name);
        self.log.push(CallRecord::Activate(name.clone()));
        if !self.activatable.contains(&name) {
            return None;
        }
        let methods = self.methods.get(&name).cloned().unwrap_or_default();
        Some(Box::new(SimulatedExtension {
            name,
            methods,
            log: self.log.clone(),
            next_object: Rc::clone(&self.next_object),
        }))
    }

    fn canvas(&self) -> Option<&dyn Any> {
        Some(&self.canvas)
    }

    fn drawing_buffer_width(&self) -> u32 {
        self.size.get().0
    }

    fn drawing_buffer_height(&self) -> u32 {
        self.size.get().1
    }
}

struct SimulatedExtension {
    name: CapabilityName,
    methods: Vec<String>,
    log: CallLog,
    next_object: Rc<Cell<u64>>,
}

impl Extension for SimulatedExtension {
    fn name(&self) -> &str {
        self.name.as_str()
    }

    fn has_method(&self, method: &str) -> bool {
        self.methods.iter().any(|m| m == method)
    }

    fn invoke(&mut self, method: &str, args: &[Value]) -> GlxResult<Value> {
        self.log.push(CallRecord::Invoke {
            extension: Some(self.name.clone()),
            method: method.to_string(),
            args: args.to_vec(),
        });
        if !self.has_method(method) {
            return Err(GlxError::Provider {
                operation: format!("{}.{method}", self.name),
                message: "not a function".to_string(),
            });
        }
        Ok(answer(method, &self.next_object))
    }
}

// `create*` calls hand out fresh objects; everything else returns null.
fn answer(method: &str, next_object: &Cell<u64>) -> Value {
    if method.starts_with("create") {
        let object = next_object.get();
        next_object.set(object + 1);
        Value::Object { object }
    } else {
        Value::Null
    }
}
