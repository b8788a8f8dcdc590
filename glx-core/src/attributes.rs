//! Context creation attributes passed through to the surface.

use serde::{Deserialize, Serialize};

/// GPU power preference hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PowerPreference {
    /// Let the user agent decide.
    #[default]
    Default,
    /// Prefer an integrated / low power GPU.
    LowPower,
    /// Prefer a discrete / high performance GPU.
    HighPerformance,
}

impl PowerPreference {
    /// DOM string for the preference.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::LowPower => "low-power",
            Self::HighPerformance => "high-performance",
        }
    }
}

/// `WebGLContextAttributes`, forwarded untouched to the surface.
///
/// Defaults follow the WebGL specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ContextAttributes {
    /// Drawing buffer has an alpha channel.
    pub alpha: bool,
    /// Drawing buffer has a depth buffer.
    pub depth: bool,
    /// Drawing buffer has a stencil buffer.
    pub stencil: bool,
    /// Request multisample anti-aliasing.
    pub antialias: bool,
    /// Colors are premultiplied by alpha.
    pub premultiplied_alpha: bool,
    /// Keep buffer contents after compositing.
    pub preserve_drawing_buffer: bool,
    /// GPU selection hint.
    pub power_preference: PowerPreference,
    /// Fail on software or otherwise slow implementations.
    pub fail_if_major_performance_caveat: bool,
    /// Allow presentation desynchronized from the event loop.
    pub desynchronized: bool,
}

impl Default for ContextAttributes {
    fn default() -> Self {
        Self {
            alpha: true,
            depth: true,
            stencil: false,
            antialias: true,
            premultiplied_alpha: true,
            preserve_drawing_buffer: false,
            power_preference: PowerPreference::Default,
            fail_if_major_performance_caveat: false,
            desynchronized: false,
        }
    }
}
