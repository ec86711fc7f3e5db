//! Drowsiness Monitor - Main Entry Point

use anyhow::Context;
use monitor::{alarm_sink, build_engine, init_logging, run_session, MonitorSettings, ReplaySource};
use std::path::PathBuf;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let settings = MonitorSettings::load(config_path.as_deref()).context("failed to load settings")?;

    init_logging(&settings.logging)?;

    info!("=== Drowsiness Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    let path = settings
        .source
        .path
        .clone()
        .context("no landmark source configured (set source.path or DROWSY__SOURCE__PATH)")?;

    let mut source = ReplaySource::open(&path, settings.source.frame_interval())
        .await
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut engine = build_engine(&settings, alarm_sink(settings.alarm_sink));

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Ctrl-C handler unavailable: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let summary = run_session(&mut engine, &mut source, shutdown).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
