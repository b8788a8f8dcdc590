//! Output rendering.

use std::fmt;

use glx_context::{ContextId, DispatchKind, OperationReport};

use crate::{OutputFormat, ProbeOutcome};

/// Render an outcome in the requested format.
///
/// Operations are included only when `show_operations` is set.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render(
    outcome: &ProbeOutcome,
    format: OutputFormat,
    show_operations: bool,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(TextReport {
            outcome,
            show_operations,
        }
        .to_string()),
        OutputFormat::Json => {
            if show_operations {
                serde_json::to_string_pretty(outcome)
            } else {
                let mut trimmed = outcome.clone();
                trimmed.report.operations.clear();
                serde_json::to_string_pretty(&trimmed)
            }
        }
    }
}

/// Human readable view of a [`ProbeOutcome`].
#[derive(Debug, Clone, Copy)]
pub struct TextReport<'a> {
    /// The outcome to show.
    pub outcome: &'a ProbeOutcome,
    /// Whether to list every operation.
    pub show_operations: bool,
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = self.outcome;
        let report = &outcome.report;

        writeln!(
            f,
            "revision:   {} (catalog {})",
            report.revision, report.catalog_version
        )?;
        let requested: Vec<&str> = outcome
            .requested_contexts
            .iter()
            .copied()
            .map(ContextId::as_str)
            .collect();
        writeln!(f, "requested:  {}", requested.join(", "))?;
        writeln!(
            f,
            "buffer:     {}x{}",
            report.drawing_buffer.0, report.drawing_buffer.1
        )?;

        let implicit = outcome.implicit_extensions.len();
        writeln!(
            f,
            "extensions: {} ({implicit} implicit)",
            report.supported_extensions.len()
        )?;
        for name in &report.supported_extensions {
            if outcome.implicit_extensions.contains(name) {
                writeln!(f, "  {name} (implicit)")?;
            } else {
                writeln!(f, "  {name}")?;
            }
        }

        let counts = report.counts;
        writeln!(
            f,
            "dispatch:   {} native, {} extension, {} unsupported",
            counts.native, counts.extension, counts.unsupported
        )?;

        if self.show_operations {
            writeln!(f, "operations:")?;
            for op in &report.operations {
                writeln!(f, "  {}", operation_line(op))?;
            }
        }
        Ok(())
    }
}

fn operation_line(op: &OperationReport) -> String {
    let name = op.name.as_str();
    match (op.kind, &op.capability, &op.method) {
        (DispatchKind::Native, _, _) => format!("{name:<40} native"),
        (DispatchKind::Extension, Some(capability), Some(method)) => {
            format!("{name:<40} extension {capability}.{method}")
        }
        (DispatchKind::Extension, _, _) => format!("{name:<40} extension"),
        (DispatchKind::Unsupported, Some(capability), _) => {
            format!("{name:<40} unsupported (requires {capability})")
        }
        (DispatchKind::Unsupported, None, _) => format!("{name:<40} unsupported"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{run, Preset, ProbeConfig, SurfaceSource};

    fn legacy_outcome() -> ProbeOutcome {
        run(&ProbeConfig {
            surface: SurfaceSource::Preset(Preset::Legacy),
            ..ProbeConfig::new()
        })
        .expect("probe")
    }

    #[test]
    fn text_lists_revision_and_counts() {
        let outcome = legacy_outcome();
        let text = render(&outcome, OutputFormat::Text, false).expect("render");
        assert!(text.starts_with("revision:   WebGL 1"));
        assert!(text.contains("requested:  webgl2, webgl"));
        assert!(text.contains("  ANGLE_instanced_arrays\n"));
        assert!(text.contains("unsupported"));
        assert!(!text.contains("operations:"));
    }

    #[test]
    fn text_operations_show_resolution() {
        let outcome = legacy_outcome();
        let text = render(&outcome, OutputFormat::Text, true).expect("render");
        assert!(text.contains("extension ANGLE_instanced_arrays.drawArraysInstancedANGLE"));
        assert!(text.contains("unsupported (requires WEBGL_draw_buffers)"));
    }

    #[test]
    fn modern_text_marks_implicit_extensions() {
        let outcome = run(&ProbeConfig::new()).expect("probe");
        let text = render(&outcome, OutputFormat::Text, false).expect("render");
        assert!(text.contains("  OES_vertex_array_object (implicit)"));
    }

    #[test]
    fn json_omits_operations_unless_asked() {
        let outcome = legacy_outcome();
        let brief: serde_json::Value =
            serde_json::from_str(&render(&outcome, OutputFormat::Json, false).expect("render"))
                .expect("json");
        assert_eq!(brief["report"]["operations"], serde_json::json!([]));
        assert_eq!(brief["report"]["revision"], "legacy");

        let full: serde_json::Value =
            serde_json::from_str(&render(&outcome, OutputFormat::Json, true).expect("render"))
                .expect("json");
        assert_eq!(
            full["report"]["operations"].as_array().map(Vec::len),
            Some(outcome.report.operations.len())
        );
    }
}
