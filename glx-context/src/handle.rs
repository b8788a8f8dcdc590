//! The unified handle returned by [`acquire`](crate::acquire).

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use glx_core::{
    CapabilityName, Catalog, GlxError, GlxResult, OperationName, RevisionTag, Value,
};

use crate::dispatch::{DispatchEntry, DispatchKind, DispatchTable, ResolvedOperation};
use crate::provider::{Extension, RenderingContext};
use crate::registry::ExtensionRegistry;
use crate::report::DispatchReport;

/// The wrapped implementation handed to a decorator.
pub type Next<'a> = dyn FnMut(&[Value]) -> GlxResult<Value> + 'a;

type Decorator = Box<dyn FnMut(&mut Next<'_>, &[Value]) -> GlxResult<Value>>;

struct HandleCore {
    context: Box<dyn RenderingContext>,
    registry: ExtensionRegistry,
    revision: RevisionTag,
    catalog: Arc<Catalog>,
}

impl HandleCore {
    fn execute(
        &mut self,
        name: &OperationName,
        resolved: &ResolvedOperation,
        args: &[Value],
    ) -> GlxResult<Value> {
        if let Some(kind) = resolved.defaulted_query {
            let default = args
                .get(kind.parameter_index())
                .and_then(Value::as_enum)
                .and_then(|id| self.catalog.parameter_default(kind, id));
            if let Some(default) = default {
                tracing::trace!("{name}: answering WebGL 2 parameter from defaults");
                return Ok(default.clone());
            }
        }

        match &resolved.entry {
            DispatchEntry::NativeForward => {
                tracing::trace!("{name}: native forward ({} args)", args.len());
                self.context.invoke(name.as_str(), args)
            }
            DispatchEntry::ExtensionForward { capability, method } => {
                tracing::trace!("{name}: forward to {capability}.{method}");
                match self.registry.extension_mut(capability.as_str()) {
                    Some(extension) => extension.invoke(method, args),
                    None => Err(GlxError::UnsupportedOperation {
                        operation: name.clone(),
                        capability: Some(capability.clone()),
                    }),
                }
            }
            DispatchEntry::Unsupported { capability } => Err(GlxError::UnsupportedOperation {
                operation: name.clone(),
                capability: capability.clone(),
            }),
        }
    }
}

struct Binding {
    name: OperationName,
    resolved: ResolvedOperation,
    decorators: Vec<Decorator>,
}

impl Binding {
    fn call(&mut self, core: &mut HandleCore, args: &[Value]) -> GlxResult<Value> {
        call_layered(&mut self.decorators, core, &self.name, &self.resolved, args)
    }
}

// The last installed decorator is outermost.
fn call_layered(
    decorators: &mut [Decorator],
    core: &mut HandleCore,
    name: &OperationName,
    resolved: &ResolvedOperation,
    args: &[Value],
) -> GlxResult<Value> {
    match decorators.split_last_mut() {
        None => core.execute(name, resolved, args),
        Some((outer, inner)) => {
            let mut next =
                |args: &[Value]| call_layered(&mut *inner, &mut *core, name, resolved, args);
            outer(&mut next, args)
        }
    }
}

/// A negotiated WebGL handle with one uniform operation surface.
///
/// The revision, the registry and every operation's resolution are fixed at
/// construction. Only instrumentation can change how a call is executed.
pub struct Handle {
    core: HandleCore,
    bindings: BTreeMap<OperationName, Binding>,
    constants: BTreeMap<String, u32>,
}

impl Handle {
    pub(crate) fn new(
        context: Box<dyn RenderingContext>,
        revision: RevisionTag,
        registry: ExtensionRegistry,
        catalog: Arc<Catalog>,
    ) -> Self {
        let table = DispatchTable::build(&catalog, context.as_ref(), &registry, revision);
        let bindings = table
            .into_entries()
            .into_iter()
            .map(|(name, resolved)| {
                let binding = Binding {
                    name: name.clone(),
                    resolved,
                    decorators: Vec::new(),
                };
                (name, binding)
            })
            .collect();
        let constants = catalog
            .constants_for(revision)
            .map(|(name, value)| (name.to_string(), value))
            .collect();

        Self {
            core: HandleCore {
                context,
                registry,
                revision,
                catalog,
            },
            bindings,
            constants,
        }
    }

    /// Revision chosen at acquisition.
    #[must_use]
    pub fn revision(&self) -> RevisionTag {
        self.core.revision
    }

    /// Catalog the handle was built from.
    #[must_use]
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.core.catalog
    }

    /// The context's canvas, read live.
    #[must_use]
    pub fn canvas(&self) -> Option<&dyn Any> {
        self.core.context.canvas()
    }

    /// Drawing buffer width, read live.
    #[must_use]
    pub fn drawing_buffer_width(&self) -> u32 {
        self.core.context.drawing_buffer_width()
    }

    /// Drawing buffer height, read live.
    #[must_use]
    pub fn drawing_buffer_height(&self) -> u32 {
        self.core.context.drawing_buffer_height()
    }

    /// Invoke an operation by name.
    ///
    /// # Errors
    ///
    /// - [`GlxError::UnknownOperation`] if the catalog has no such operation.
    /// - [`GlxError::UnsupportedOperation`] if it resolved to the stub.
    /// - Whatever the provider or an installed decorator returns.
    pub fn invoke(&mut self, name: &str, args: &[Value]) -> GlxResult<Value> {
        let binding = self
            .bindings
            .get_mut(name)
            .ok_or_else(|| GlxError::UnknownOperation(OperationName::from(name)))?;
        binding.call(&mut self.core, args)
    }

    /// `getParameter(pname)`.
    ///
    /// # Errors
    ///
    /// See [`Handle::invoke`].
    pub fn get_parameter(&mut self, pname: u32) -> GlxResult<Value> {
        self.invoke("getParameter", &[Value::from(pname)])
    }

    /// `getProgramParameter(program, pname)`.
    ///
    /// # Errors
    ///
    /// See [`Handle::invoke`].
    pub fn get_program_parameter(&mut self, program: &Value, pname: u32) -> GlxResult<Value> {
        self.invoke("getProgramParameter", &[program.clone(), Value::from(pname)])
    }

    /// `getTexParameter(target, pname)`.
    ///
    /// # Errors
    ///
    /// See [`Handle::invoke`].
    pub fn get_tex_parameter(&mut self, target: u32, pname: u32) -> GlxResult<Value> {
        self.invoke("getTexParameter", &[Value::from(target), Value::from(pname)])
    }

    /// Every operation present on the handle, ordered by name.
    pub fn operations(&self) -> impl Iterator<Item = &OperationName> {
        self.bindings.keys()
    }

    /// How an operation was resolved.
    #[must_use]
    pub fn dispatch_kind(&self, name: &str) -> Option<DispatchKind> {
        self.bindings
            .get(name)
            .map(|binding| binding.resolved.entry.kind())
    }

    /// Full resolution of an operation.
    #[must_use]
    pub fn resolution(&self, name: &str) -> Option<&ResolvedOperation> {
        self.bindings.get(name).map(|binding| &binding.resolved)
    }

    /// Whether calling the operation can reach an implementation.
    #[must_use]
    pub fn is_supported(&self, name: &str) -> bool {
        self.dispatch_kind(name)
            .is_some_and(|kind| kind != DispatchKind::Unsupported)
    }

    /// A constant visible on this revision.
    #[must_use]
    pub fn constant(&self, name: &str) -> Option<u32> {
        self.constants.get(name).copied()
    }

    /// Whether the constant exists on this revision.
    #[must_use]
    pub fn has_constant(&self, name: &str) -> bool {
        self.constants.contains_key(name)
    }

    /// Number of constants merged onto the handle.
    #[must_use]
    pub fn constant_count(&self) -> usize {
        self.constants.len()
    }

    /// Whether an extension is implicit or active.
    #[must_use]
    pub fn has_extension(&self, name: &str) -> bool {
        self.core.registry.has(name)
    }

    /// Look up an extension.
    ///
    /// Implicit extensions return the handle itself.
    pub fn get_extension(&mut self, name: &str) -> Option<ExtensionRef<'_>> {
        if self.core.registry.is_implicit(name) {
            return Some(ExtensionRef::Handle {
                capability: CapabilityName::from(name),
                handle: self,
            });
        }
        self.core
            .registry
            .extension_mut(name)
            .map(ExtensionRef::Activated)
    }

    /// Implicit extensions first, then the advertised ones that activated.
    ///
    /// Required extensions the context never listed are usable through
    /// [`has_extension`](Self::has_extension) but are not listed here.
    #[must_use]
    pub fn supported_extensions(&self) -> Vec<CapabilityName> {
        self.core.registry.supported_names()
    }

    /// Wrap one operation with a decorator.
    ///
    /// The decorator receives the wrapped implementation and the call
    /// arguments. Decorators stack; the most recent one runs first.
    ///
    /// # Errors
    ///
    /// Returns [`GlxError::UnknownOperation`] if the operation does not exist.
    pub fn instrument<F>(&mut self, name: &str, decorator: F) -> GlxResult<()>
    where
        F: FnMut(&mut Next<'_>, &[Value]) -> GlxResult<Value> + 'static,
    {
        let binding = self
            .bindings
            .get_mut(name)
            .ok_or_else(|| GlxError::UnknownOperation(OperationName::from(name)))?;
        binding.decorators.push(Box::new(decorator));
        tracing::debug!(
            "Instrumented {name} ({} decorators)",
            binding.decorators.len()
        );
        Ok(())
    }

    /// Summary of the negotiated state.
    #[must_use]
    pub fn dispatch_report(&self) -> DispatchReport {
        DispatchReport::new(self)
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("revision", &self.core.revision)
            .field("catalog", &self.core.catalog.version())
            .field("registry", &self.core.registry)
            .field("operations", &self.bindings.len())
            .finish_non_exhaustive()
    }
}

/// Instrument an operation on something that should be a [`Handle`].
///
/// # Errors
///
/// - [`GlxError::InvalidHandle`] if `target` is not a handle.
/// - [`GlxError::UnknownOperation`] if the operation does not exist.
pub fn instrument<F>(target: &mut dyn Any, name: &str, decorator: F) -> GlxResult<()>
where
    F: FnMut(&mut Next<'_>, &[Value]) -> GlxResult<Value> + 'static,
{
    let Some(handle) = target.downcast_mut::<Handle>() else {
        tracing::error!("Cannot instrument {name}: not a GLX context handle");
        return Err(GlxError::InvalidHandle);
    };
    handle.instrument(name, decorator)
}

/// Result of [`Handle::get_extension`].
pub enum ExtensionRef<'a> {
    /// Implicit extension: the handle itself stands in for the extension.
    Handle {
        /// The handle.
        handle: &'a mut Handle,
        /// Extension that was asked for.
        capability: CapabilityName,
    },
    /// Activated extension object.
    Activated(&'a mut (dyn Extension + 'static)),
}

impl ExtensionRef<'_> {
    /// Extension name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Handle { capability, .. } => capability.as_str(),
            Self::Activated(extension) => extension.name(),
        }
    }

    /// Whether this is the handle standing in for an implicit extension.
    #[must_use]
    pub fn is_handle(&self) -> bool {
        matches!(self, Self::Handle { .. })
    }

    /// The handle, for implicit extensions.
    #[must_use]
    pub fn as_handle(&self) -> Option<&Handle> {
        match self {
            Self::Handle { handle, .. } => Some(&**handle),
            Self::Activated(_) => None,
        }
    }

    /// Call an extension method.
    ///
    /// For implicit extensions the suffixed method name is mapped back to
    /// its core operation (`createVertexArrayOES` → `createVertexArray`) and
    /// dispatched through the handle.
    ///
    /// # Errors
    ///
    /// Returns whatever the extension or the handle's dispatch returns.
    pub fn invoke(&mut self, method: &str, args: &[Value]) -> GlxResult<Value> {
        match self {
            Self::Handle { handle, capability } => {
                let operation = handle
                    .catalog()
                    .operation_for_extension_method(capability.as_str(), method)
                    .map_or_else(|| method.to_string(), ToString::to_string);
                handle.invoke(&operation, args)
            }
            Self::Activated(extension) => extension.invoke(method, args),
        }
    }
}

impl fmt::Debug for ExtensionRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handle { capability, .. } => {
                f.debug_tuple("ExtensionRef::Handle").field(capability).finish()
            }
            Self::Activated(extension) => f
                .debug_tuple("ExtensionRef::Activated")
                .field(&extension.name())
                .finish(),
        }
    }
}
