//! # Saorsa GLX Probe
//!
//! Command-line entry point.

use anyhow::Context;
use glx_probe::{render, run, CliArgs, ProbeConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logs go to stderr so stdout stays parseable in JSON mode.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("glx_probe=info,glx_context=info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    // RUST_LOG_FORMAT=json for machine-readable logs
    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse_resolved();
    let config = ProbeConfig::from(args);
    tracing::debug!(surface = ?config.surface, catalog = ?config.catalog, "Probe config");

    let outcome = run(&config).context("probe failed")?;
    let output = render(&outcome, config.format, config.show_operations)
        .context("failed to render probe output")?;
    println!("{output}");
    Ok(())
}
