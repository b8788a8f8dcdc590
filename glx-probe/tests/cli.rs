//! Integration tests for the probe pipeline: arguments → config → outcome → output.

use std::io::Write;
use std::path::PathBuf;

use glx_context::{CapabilityName, ContextId, DispatchKind, GlxError, RevisionTag};
use glx_probe::{render, run, CliArgs, OutputFormat, ProbeConfig, ProbeError};
use tempfile::NamedTempFile;

fn config(args: &[&str]) -> ProbeConfig {
    let argv = std::iter::once("glx-probe").chain(args.iter().copied());
    ProbeConfig::from(CliArgs::try_parse_resolved_from(argv).expect("valid arguments"))
}

fn bundled_profile(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("profiles")
        .join(name)
        .display()
        .to_string()
}

fn temp_json(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file
}

// ==========================================================================
// Bundled profiles
// ==========================================================================

#[test]
fn test_desktop_profile_negotiates_modern() {
    let outcome = run(&config(&["--profile", &bundled_profile("desktop-webgl2.json")]))
        .expect("probe");
    assert_eq!(outcome.report.revision, RevisionTag::Modern);
    assert_eq!(outcome.report.drawing_buffer, (1920, 1080));
    assert_eq!(outcome.requested_contexts, vec![ContextId::Webgl2]);
    assert!(!outcome.implicit_extensions.is_empty());
}

#[test]
fn test_mobile_profile_omits_broken_extension() {
    let outcome = run(&config(&["--profile", &bundled_profile("mobile-webgl1.json")]))
        .expect("probe");
    assert_eq!(outcome.report.revision, RevisionTag::Legacy);
    assert!(outcome
        .activations
        .contains(&CapabilityName::from("OES_texture_float")));
    assert!(!outcome
        .report
        .supported_extensions
        .contains(&CapabilityName::from("OES_texture_float")));
}

#[test]
fn test_mobile_profile_requiring_broken_extension_fails() {
    let err = run(&config(&[
        "--profile",
        &bundled_profile("mobile-webgl1.json"),
        "--require",
        "OES_texture_float",
    ]))
    .expect_err("missing capability");
    assert!(matches!(
        err,
        ProbeError::Negotiation(GlxError::MissingCapability(ref name)) if name == "OES_texture_float"
    ));
}

#[test]
fn test_prefixed_profile_activates_unlisted_requirement() {
    let outcome = run(&config(&[
        "--profile",
        &bundled_profile("legacy-prefixed.json"),
        "--require",
        "ANGLE_instanced_arrays",
        "--show-operations",
    ]))
    .expect("probe");
    assert_eq!(
        outcome.requested_contexts.last(),
        Some(&ContextId::ExperimentalWebgl)
    );
    let kind = |name: &str| {
        outcome
            .report
            .operations
            .iter()
            .find(|op| op.name == name)
            .map(|op| op.kind)
    };
    // The profile trims the extension to a single method.
    assert_eq!(kind("drawArraysInstanced"), Some(DispatchKind::Extension));
    assert_eq!(kind("vertexAttribDivisor"), Some(DispatchKind::Unsupported));
}

// ==========================================================================
// Temporary inputs
// ==========================================================================

#[test]
fn test_profile_file_from_tempfile() {
    let profile = temp_json(r#"{"contexts": ["webgl"], "extensions": ["WEBGL_lose_context"]}"#);
    let path = profile.path().display().to_string();
    let outcome = run(&config(&["--profile", &path, "--require", "WEBGL_lose_context"]))
        .expect("probe");
    assert_eq!(outcome.report.revision, RevisionTag::Legacy);
    assert_eq!(
        outcome.report.supported_extensions,
        vec![CapabilityName::from("WEBGL_lose_context")]
    );
}

#[test]
fn test_invalid_profile_is_reported() {
    let profile = temp_json(r#"{"contexts": ["webgl3"]}"#);
    let path = profile.path().display().to_string();
    let err = run(&config(&["--profile", &path])).expect_err("invalid profile");
    assert!(matches!(err, ProbeError::ProfileParse { .. }));
}

#[test]
fn test_custom_catalog_replaces_bundled_one() {
    let catalog = temp_json(
        r#"{
            "version": "test-1",
            "implicit_extensions": ["OES_vertex_array_object"],
            "operations": {
                "legacy": ["clear", "drawArrays"],
                "modern": ["createVertexArray"]
            },
            "extension_operations": {
                "createVertexArray": ["OES_vertex_array_object", "createVertexArrayOES"]
            },
            "enums": {
                "legacy": {"COLOR_BUFFER_BIT": 16384},
                "modern": {},
                "extension": {}
            },
            "parameter_defaults": {}
        }"#,
    );
    let path = catalog.path().display().to_string();
    let outcome = run(&config(&["--catalog", &path, "--preset", "legacy"])).expect("probe");
    assert_eq!(outcome.report.catalog_version, "test-1");
    assert_eq!(outcome.report.operations.len(), 3);
    assert_eq!(outcome.report.counts.native, 2);
    assert_eq!(outcome.report.counts.extension, 1);
}

#[test]
fn test_broken_catalog_is_reported() {
    let catalog = temp_json("{ not json");
    let path = catalog.path().display().to_string();
    let err = run(&config(&["--catalog", &path])).expect_err("broken catalog");
    assert!(matches!(err, ProbeError::Catalog { .. }));
}

// ==========================================================================
// Negotiation failures and output
// ==========================================================================

#[test]
fn test_force_modern_on_legacy_preset_fails() {
    let err = run(&config(&["--preset", "legacy", "--force-modern"])).expect_err("unavailable");
    assert!(matches!(
        err,
        ProbeError::Negotiation(GlxError::UnavailableRevision(RevisionTag::Modern))
    ));
}

#[test]
fn test_json_output_round_trips_outcome() {
    let cfg = config(&["--preset", "modern", "--format", "json", "--show-operations"]);
    assert_eq!(cfg.format, OutputFormat::Json);
    let outcome = run(&cfg).expect("probe");
    let json = render(&outcome, cfg.format, cfg.show_operations).expect("render");
    let parsed: glx_probe::ProbeOutcome = serde_json::from_str(&json).expect("parse output");
    assert_eq!(parsed, outcome);
}
