//! Integration tests for operation resolution and invocation through a handle.

use glx_context::simulated::{CallRecord, SimulatedSurface, SurfaceProfile};
use glx_context::{
    acquire, AcquireOptions, CapabilityName, DispatchEntry, DispatchKind, GlxError, Handle,
    RevisionTag, Value,
};

fn modern() -> (Handle, SimulatedSurface) {
    let mut surface = SimulatedSurface::new(SurfaceProfile::modern());
    let handle = acquire(&mut surface, &AcquireOptions::new()).expect("modern handle");
    (handle, surface)
}

fn legacy() -> (Handle, SimulatedSurface) {
    let mut surface = SimulatedSurface::new(SurfaceProfile::legacy());
    let handle = acquire(&mut surface, &AcquireOptions::new()).expect("legacy handle");
    (handle, surface)
}

// ==========================================================================
// Resolution
// ==========================================================================

#[test]
fn test_every_catalog_operation_is_present() {
    let (handle, _surface) = legacy();
    let catalog = handle.catalog();
    assert_eq!(handle.operations().count(), catalog.operations().len());
    for op in catalog.operations() {
        assert!(handle.dispatch_kind(op.name.as_str()).is_some(), "{}", op.name);
    }
}

#[test]
fn test_native_wins_over_extension() {
    let mut profile = SurfaceProfile::modern();
    profile
        .extensions
        .push(CapabilityName::from("ANGLE_instanced_arrays"));
    let mut surface = SimulatedSurface::new(profile);
    let handle = acquire(&mut surface, &AcquireOptions::new()).expect("handle");
    assert_eq!(
        handle.dispatch_kind("drawArraysInstanced"),
        Some(DispatchKind::Native)
    );
}

#[test]
fn test_legacy_uses_extension_forward() {
    let (mut handle, surface) = legacy();
    assert_eq!(
        handle.resolution("drawArraysInstanced").map(|r| r.entry.clone()),
        Some(DispatchEntry::ExtensionForward {
            capability: CapabilityName::from("ANGLE_instanced_arrays"),
            method: "drawArraysInstancedANGLE".to_string(),
        })
    );

    let args = [Value::from(4u32), Value::from(0), Value::from(3), Value::from(10)];
    handle
        .invoke("drawArraysInstanced", &args)
        .expect("extension forward");
    let records = surface.log().records();
    assert_eq!(
        records.last(),
        Some(&CallRecord::Invoke {
            extension: Some(CapabilityName::from("ANGLE_instanced_arrays")),
            method: "drawArraysInstancedANGLE".to_string(),
            args: args.to_vec(),
        })
    );
}

#[test]
fn test_extension_without_method_is_unsupported() {
    let mut profile = SurfaceProfile::legacy();
    profile.extension_methods.insert(
        CapabilityName::from("ANGLE_instanced_arrays"),
        vec!["vertexAttribDivisorANGLE".to_string()],
    );
    let mut surface = SimulatedSurface::new(profile);
    let handle = acquire(&mut surface, &AcquireOptions::new()).expect("handle");
    assert_eq!(
        handle.dispatch_kind("drawArraysInstanced"),
        Some(DispatchKind::Unsupported)
    );
    assert_eq!(
        handle.dispatch_kind("vertexAttribDivisor"),
        Some(DispatchKind::Extension)
    );
}

#[test]
fn test_unsupported_fails_only_when_invoked() {
    let (mut handle, surface) = legacy();
    assert_eq!(handle.dispatch_kind("texStorage3D"), Some(DispatchKind::Unsupported));
    assert!(!handle.is_supported("texStorage3D"));
    let before = surface.log().invocation_count();

    let err = handle
        .invoke("texStorage3D", &[Value::from(32879u32)])
        .expect_err("unsupported");
    match err {
        GlxError::UnsupportedOperation {
            operation,
            capability,
        } => {
            assert_eq!(operation, "texStorage3D");
            assert!(capability.is_none());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(surface.log().invocation_count(), before);
}

#[test]
fn test_unsupported_names_the_unlocking_extension() {
    let (mut handle, _surface) = legacy();
    let err = handle.invoke("drawBuffers", &[]).expect_err("unsupported");
    assert!(matches!(
        err,
        GlxError::UnsupportedOperation { capability: Some(ref name), .. }
            if name == "WEBGL_draw_buffers"
    ));
    assert!(err.to_string().contains("WEBGL_draw_buffers"));
}

#[test]
fn test_enabled_extension_missing_method_names_no_extension() {
    let mut profile = SurfaceProfile::legacy();
    profile
        .extension_methods
        .insert(CapabilityName::from("OES_vertex_array_object"), vec![]);
    let mut surface = SimulatedSurface::new(profile);
    let mut handle = acquire(&mut surface, &AcquireOptions::new()).expect("handle");
    assert!(handle.has_extension("OES_vertex_array_object"));

    let err = handle.invoke("bindVertexArray", &[]).expect_err("unsupported");
    assert!(matches!(
        err,
        GlxError::UnsupportedOperation { capability: None, .. }
    ));
    assert_eq!(err.to_string(), "operation \"bindVertexArray\" not available");
}

#[test]
fn test_extension_only_operation_on_modern() {
    let (mut handle, surface) = modern();
    assert_eq!(handle.dispatch_kind("loseContext"), Some(DispatchKind::Extension));
    handle.invoke("loseContext", &[]).expect("loseContext");
    assert_eq!(surface.log().calls_to("loseContext").len(), 1);
    assert_eq!(handle.dispatch_kind("queryCounter"), Some(DispatchKind::Unsupported));
}

#[test]
fn test_unknown_operation() {
    let (mut handle, _surface) = modern();
    let err = handle.invoke("drawTeapot", &[]).expect_err("unknown");
    assert!(matches!(err, GlxError::UnknownOperation(name) if name == "drawTeapot"));
}

#[test]
fn test_native_forward_passes_arguments_and_result() {
    let (mut handle, surface) = modern();
    let buffer = handle.invoke("createBuffer", &[]).expect("createBuffer");
    assert!(buffer.as_object().is_some());
    handle
        .invoke("bindBuffer", &[Value::from(34962u32), buffer.clone()])
        .expect("bindBuffer");
    assert_eq!(
        surface.log().calls_to("bindBuffer"),
        vec![vec![Value::from(34962u32), buffer]]
    );
}

#[test]
fn test_missing_native_with_implicit_extension_is_unsupported() {
    let mut profile = SurfaceProfile::modern();
    profile.missing_operations.push("drawBuffers".into());
    let mut surface = SimulatedSurface::new(profile);
    let handle = acquire(&mut surface, &AcquireOptions::new()).expect("handle");
    // WEBGL_draw_buffers is implicit on WebGL 2, so there is no extension object to fall back to.
    assert_eq!(handle.dispatch_kind("drawBuffers"), Some(DispatchKind::Unsupported));
    assert_eq!(
        handle.resolution("drawBuffers").map(|r| &r.entry),
        Some(&DispatchEntry::Unsupported { capability: None })
    );
}

// ==========================================================================
// Query defaults
// ==========================================================================

#[test]
fn test_legacy_parameter_default_skips_context() {
    let (mut handle, surface) = legacy();
    let max_3d = handle.constant("MAX_3D_TEXTURE_SIZE");
    assert!(max_3d.is_none(), "WebGL 2 constant visible on WebGL 1");

    let value = handle.get_parameter(32883).expect("MAX_3D_TEXTURE_SIZE");
    assert_eq!(value, Value::Int(0));
    let value = handle.get_parameter(3074).expect("READ_BUFFER");
    assert_eq!(value, Value::Int(1029));
    assert!(surface.log().calls_to("getParameter").is_empty());
}

#[test]
fn test_legacy_parameter_without_default_is_forwarded() {
    let (mut handle, surface) = legacy();
    let value = handle.get_parameter(3379).expect("MAX_TEXTURE_SIZE");
    assert_eq!(value, Value::Int(4096));
    assert_eq!(
        surface.log().calls_to("getParameter"),
        vec![vec![Value::from(3379u32)]]
    );
}

#[test]
fn test_legacy_program_and_texture_defaults() {
    let (mut handle, surface) = legacy();
    let program = handle.invoke("createProgram", &[]).expect("program");
    let mode = handle
        .get_program_parameter(&program, 35967)
        .expect("TRANSFORM_FEEDBACK_BUFFER_MODE");
    assert_eq!(mode, Value::Int(35981));
    let compare = handle
        .get_tex_parameter(3553, 34893)
        .expect("TEXTURE_COMPARE_FUNC");
    assert_eq!(compare, Value::Int(515));
    let max_lod = handle.get_tex_parameter(3553, 33083).expect("TEXTURE_MAX_LOD");
    assert_eq!(max_lod, Value::Float(1000.0));
    assert!(surface.log().calls_to("getProgramParameter").is_empty());
    assert!(surface.log().calls_to("getTexParameter").is_empty());
}

#[test]
fn test_modern_queries_always_forward() {
    let (mut handle, surface) = modern();
    let value = handle.get_parameter(32883).expect("MAX_3D_TEXTURE_SIZE");
    // The simulated profile has no answer for it, so the context returns null.
    assert_eq!(value, Value::Null);
    assert_eq!(surface.log().calls_to("getParameter").len(), 1);
}

// ==========================================================================
// Constants and live properties
// ==========================================================================

#[test]
fn test_constants_differ_by_revision() {
    let (modern, _a) = modern();
    let (legacy, _b) = legacy();
    assert_eq!(modern.revision(), RevisionTag::Modern);
    assert_eq!(modern.constant("TEXTURE_3D"), Some(32879));
    assert_eq!(legacy.constant("TEXTURE_3D"), None);
    assert_eq!(legacy.constant("TRIANGLES"), Some(4));
    assert_eq!(legacy.constant("HALF_FLOAT_OES"), Some(36193));
    assert_eq!(modern.constant("HALF_FLOAT_OES"), Some(36193));
    assert!(modern.constant_count() > legacy.constant_count());
}

#[test]
fn test_drawing_buffer_is_read_live() {
    let (handle, surface) = modern();
    assert_eq!(
        (handle.drawing_buffer_width(), handle.drawing_buffer_height()),
        (300, 150)
    );
    surface.resize(1024, 768);
    assert_eq!(
        (handle.drawing_buffer_width(), handle.drawing_buffer_height()),
        (1024, 768)
    );
}

#[test]
fn test_dispatch_report_counts_match_table() {
    let (handle, _surface) = legacy();
    let report = handle.dispatch_report();
    assert_eq!(report.revision, RevisionTag::Legacy);
    let total = report.counts.native + report.counts.extension + report.counts.unsupported;
    assert_eq!(total, report.operations.len());
    assert_eq!(
        report.of_kind(DispatchKind::Extension).count(),
        report.counts.extension
    );
    let json = serde_json::to_value(&report).expect("serialize");
    assert_eq!(json["revision"], "legacy");
}
