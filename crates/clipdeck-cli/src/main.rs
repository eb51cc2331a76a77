//! clipdeck binary: replay a session script and print the final state.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use clipdeck_cli::{load_script, run_script};
use clipdeck_timeline::TimelineConfig;

const USAGE: &str = "usage: clipdeck <script.json | ->  (or set CLIPDECK_SCRIPT)";

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing()?;

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("CLIPDECK_SCRIPT").ok())
        .map(PathBuf::from)
        .context(USAGE)?;

    let config = TimelineConfig::from_env();
    info!(script = %path.display(), manifest = %config.manifest_url, "Starting clipdeck");

    let script = load_script(&path)?;
    let report = run_script(script, config).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Logs go to stderr so stdout carries only the report.
fn init_tracing() -> Result<()> {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("clipdeck=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .init();
    }
    Ok(())
}
