//! The narrow interface GLX needs from a native context.
//!
//! A [`Surface`] hands out at most one [`RenderingContext`]. The context is
//! queried by name only: "do you have operation X", "invoke operation X".
//! Extensions are activated once and then invoked the same way.

use std::any::Any;

use glx_core::{CapabilityName, ContextAttributes, ContextId, GlxResult, Value};

/// Something a context can be created on (a canvas, or a stand-in).
pub trait Surface {
    /// Request a context of the given id.
    ///
    /// Returns `None` if the id is unsupported or the surface already handed
    /// out a context.
    fn request_context(
        &mut self,
        id: ContextId,
        attributes: &ContextAttributes,
    ) -> Option<Box<dyn RenderingContext>>;
}

/// A native WebGL context, accessed by operation name.
pub trait RenderingContext {
    /// Whether the context exposes a callable with this exact name.
    fn has_operation(&self, name: &str) -> bool;

    /// Invoke a native operation.
    ///
    /// # Errors
    ///
    /// Returns [`GlxError::Provider`](glx_core::GlxError::Provider) if the
    /// native call fails.
    fn invoke(&mut self, name: &str, args: &[Value]) -> GlxResult<Value>;

    /// Extension names the context advertises, in its own order.
    fn supported_extensions(&self) -> Vec<CapabilityName>;

    /// Activate an extension. `None` means it is not actually available.
    fn activate_extension(&mut self, name: &str) -> Option<Box<dyn Extension>>;

    /// The surface the context draws into.
    fn canvas(&self) -> Option<&dyn Any>;

    /// Current drawing buffer width in pixels.
    fn drawing_buffer_width(&self) -> u32;

    /// Current drawing buffer height in pixels.
    fn drawing_buffer_height(&self) -> u32;
}

/// An activated extension object.
pub trait Extension {
    /// Extension name.
    fn name(&self) -> &str;

    /// Whether the extension object exposes this method.
    fn has_method(&self, method: &str) -> bool;

    /// Invoke an extension method.
    ///
    /// # Errors
    ///
    /// Returns [`GlxError::Provider`](glx_core::GlxError::Provider) if the
    /// call fails.
    fn invoke(&mut self, method: &str, args: &[Value]) -> GlxResult<Value>;
}
