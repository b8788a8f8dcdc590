//! Loading inputs and running one negotiation.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use glx_context::simulated::{SimulatedSurface, SurfaceProfile};
use glx_context::{acquire, CapabilityName, Catalog, ContextId, DispatchReport, GlxError, RevisionTag};
use glx_core::CatalogError;

use crate::{ProbeConfig, SurfaceSource};

/// Errors from a probe run.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The profile file could not be read.
    #[error("failed to read profile {}: {source}", .path.display())]
    ProfileRead {
        /// Profile path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The profile file is not a valid surface profile.
    #[error("invalid profile {}: {source}", .path.display())]
    ProfileParse {
        /// Profile path.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },
    /// The catalog file could not be loaded.
    #[error("failed to load catalog {}: {source}", .path.display())]
    Catalog {
        /// Catalog path.
        path: PathBuf,
        /// Underlying error.
        source: CatalogError,
    },
    /// Negotiation failed.
    #[error("negotiation failed: {0}")]
    Negotiation(#[from] GlxError),
}

/// Everything a probe run learned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    /// Context ids requested from the surface, in order.
    pub requested_contexts: Vec<ContextId>,
    /// Extensions the registry tried to activate, in order.
    pub activations: Vec<CapabilityName>,
    /// Extensions available without activation on the chosen revision.
    pub implicit_extensions: Vec<CapabilityName>,
    /// The handle's dispatch report.
    pub report: DispatchReport,
}

/// Load the catalog and profile, then acquire a handle.
///
/// # Errors
///
/// Returns an error if an input file cannot be loaded or negotiation fails.
pub fn run(config: &ProbeConfig) -> Result<ProbeOutcome, ProbeError> {
    let catalog = load_catalog(config)?;
    let profile = load_profile(&config.surface)?;
    tracing::debug!(
        contexts = profile.contexts.len(),
        extensions = profile.extensions.len(),
        "Loaded surface profile"
    );

    let mut surface = SimulatedSurface::with_catalog(profile, Arc::clone(&catalog));
    let options = config.options.clone().with_catalog(Arc::clone(&catalog));
    let handle = acquire(&mut surface, &options)?;
    tracing::info!("Negotiated {} handle", handle.revision());

    let implicit_extensions = match handle.revision() {
        RevisionTag::Modern => catalog.implicit_extensions().to_vec(),
        RevisionTag::Legacy => Vec::new(),
    };
    let log = surface.log();
    Ok(ProbeOutcome {
        requested_contexts: log.requested_contexts(),
        activations: log.activations(),
        implicit_extensions,
        report: handle.dispatch_report(),
    })
}

fn load_catalog(config: &ProbeConfig) -> Result<Arc<Catalog>, ProbeError> {
    let Some(path) = &config.catalog else {
        return Ok(Catalog::webgl());
    };
    tracing::info!("Loading catalog from {}", path.display());
    Catalog::from_path(path)
        .map(Arc::new)
        .map_err(|source| ProbeError::Catalog {
            path: path.clone(),
            source,
        })
}

fn load_profile(source: &SurfaceSource) -> Result<SurfaceProfile, ProbeError> {
    match source {
        SurfaceSource::Preset(preset) => Ok(preset.profile()),
        SurfaceSource::File(path) => {
            let json = fs::read_to_string(path).map_err(|source| ProbeError::ProfileRead {
                path: path.clone(),
                source,
            })?;
            SurfaceProfile::from_json(&json).map_err(|source| ProbeError::ProfileParse {
                path: path.clone(),
                source,
            })
        }
    }
}
