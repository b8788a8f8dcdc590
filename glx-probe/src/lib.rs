//! # Saorsa GLX Probe
//!
//! Negotiates a GLX handle against a simulated surface and reports what it
//! resolved: the revision, the supported extensions and how every catalog
//! operation is dispatched.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p glx-probe -- --preset legacy --require OES_texture_float
//! cargo run -p glx-probe -- --profile glx-probe/profiles/mobile-webgl1.json --format json
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `ProbeConfig` - Surface source, catalog override and acquisition options
//! - `run` - Loads the inputs, acquires a handle and collects a `ProbeOutcome`
//! - `render` - Text or JSON output

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod probe;
mod render;

pub use probe::{run, ProbeError, ProbeOutcome};
pub use render::{render, TextReport};

use std::ffi::OsString;
use std::path::PathBuf;

use clap::parser::ValueSource;
use clap::{CommandFactory, FromArgMatches, Parser, ValueEnum};
use glx_context::simulated::SurfaceProfile;
use glx_context::{AcquireOptions, CapabilityName};

/// Command-line arguments for glx-probe.
#[derive(Debug, Clone, Parser)]
#[command(name = "glx-probe")]
#[command(about = "Probe GLX capability negotiation against a simulated surface")]
#[command(version)]
pub struct CliArgs {
    /// Surface profile JSON file. Wins over `--preset`; the environment
    /// value only applies when no preset is given either.
    #[arg(long, env = "GLX_PROFILE")]
    pub profile: Option<PathBuf>,

    /// Built-in surface profile, used when no profile file is given
    #[arg(long, value_enum)]
    pub preset: Option<Preset>,

    /// Capability catalog JSON file replacing the bundled one
    #[arg(long, env = "GLX_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Extension that must be available (repeatable)
    #[arg(long = "require", value_name = "EXT")]
    pub require: Vec<String>,

    /// Fail instead of falling back to WebGL 1
    #[arg(long)]
    pub force_modern: bool,

    /// Never request WebGL 2
    #[arg(long)]
    pub force_legacy: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// List every operation's resolution
    #[arg(long)]
    pub show_operations: bool,
}

impl CliArgs {
    /// Parse the process arguments, exiting with usage on error.
    #[must_use]
    pub fn parse_resolved() -> Self {
        Self::try_parse_resolved_from(std::env::args_os()).unwrap_or_else(|err| err.exit())
    }

    /// Parse arguments and settle the surface source.
    ///
    /// A profile taken from `GLX_PROFILE` is a fallback: an explicit
    /// `--preset` drops it.
    ///
    /// # Errors
    ///
    /// Returns the clap error for invalid arguments.
    pub fn try_parse_resolved_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command().try_get_matches_from(args)?;
        let mut parsed = Self::from_arg_matches(&matches)?;
        if parsed.preset.is_some()
            && matches.value_source("profile") == Some(ValueSource::EnvVariable)
        {
            parsed.profile = None;
        }
        Ok(parsed)
    }
}

/// Built-in surface profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// WebGL 2 capable browser.
    Modern,
    /// WebGL 1 only browser.
    Legacy,
    /// A surface that grants no context at all.
    #[value(name = "none")]
    Empty,
}

impl Preset {
    /// The profile this preset stands for.
    #[must_use]
    pub fn profile(self) -> SurfaceProfile {
        match self {
            Self::Modern => SurfaceProfile::modern(),
            Self::Legacy => SurfaceProfile::legacy(),
            Self::Empty => SurfaceProfile::default(),
        }
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human readable summary.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Where the simulated surface comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceSource {
    /// A built-in preset.
    Preset(Preset),
    /// A profile JSON file.
    File(PathBuf),
}

/// Probe configuration.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Surface to negotiate against.
    pub surface: SurfaceSource,
    /// Catalog override; `None` uses the bundled catalog.
    pub catalog: Option<PathBuf>,
    /// Acquisition options. The catalog is attached by [`run`].
    pub options: AcquireOptions,
    /// Output format.
    pub format: OutputFormat,
    /// Include every operation's resolution in the output.
    pub show_operations: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ProbeConfig {
    /// Probe the modern preset with default options.
    #[must_use]
    pub fn new() -> Self {
        Self {
            surface: SurfaceSource::Preset(Preset::Modern),
            catalog: None,
            options: AcquireOptions::new(),
            format: OutputFormat::Text,
            show_operations: false,
        }
    }
}

impl From<CliArgs> for ProbeConfig {
    fn from(args: CliArgs) -> Self {
        let surface = match (args.profile, args.preset) {
            (Some(path), _) => SurfaceSource::File(path),
            (None, preset) => SurfaceSource::Preset(preset.unwrap_or(Preset::Modern)),
        };
        let options = AcquireOptions {
            required_extensions: args.require.into_iter().map(CapabilityName::from).collect(),
            force_modern: args.force_modern,
            force_legacy: args.force_legacy,
            ..AcquireOptions::default()
        };
        Self {
            surface,
            catalog: args.catalog,
            options,
            format: args.format,
            show_operations: args.show_operations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ProbeConfig {
        let argv = std::iter::once("glx-probe").chain(args.iter().copied());
        ProbeConfig::from(CliArgs::try_parse_resolved_from(argv).expect("valid arguments"))
    }

    #[test]
    fn defaults_to_modern_preset() {
        let config = parse(&[]);
        assert_eq!(config.surface, SurfaceSource::Preset(Preset::Modern));
        assert_eq!(config.format, OutputFormat::Text);
        assert!(config.options.required_extensions.is_empty());
        assert!(!config.show_operations);
    }

    #[test]
    fn repeated_require_accumulates() {
        let config = parse(&[
            "--preset",
            "legacy",
            "--require",
            "OES_texture_float",
            "--require",
            "WEBGL_lose_context",
            "--force-legacy",
            "--format",
            "json",
        ]);
        assert_eq!(config.surface, SurfaceSource::Preset(Preset::Legacy));
        assert_eq!(
            config.options.required_extensions,
            vec![
                CapabilityName::from("OES_texture_float"),
                CapabilityName::from("WEBGL_lose_context")
            ]
        );
        assert!(config.options.force_legacy);
        assert_eq!(config.format, OutputFormat::Json);
    }

    #[test]
    fn none_preset_is_empty_surface() {
        let config = parse(&["--preset", "none"]);
        assert_eq!(config.surface, SurfaceSource::Preset(Preset::Empty));
        assert!(Preset::Empty.profile().contexts.is_empty());
    }

    #[test]
    fn profile_flag_wins_over_preset() {
        let config = parse(&["--profile", "a.json", "--preset", "legacy"]);
        assert_eq!(config.surface, SurfaceSource::File(PathBuf::from("a.json")));
    }
}
