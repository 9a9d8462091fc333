//! Tracing subscriber setup driven by `[logging]`.
//!
//! `RUST_LOG` wins over the configured level when set. The file sink is
//! opened in append mode so restarts keep earlier history.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};
use crate::{KurchError, Result};

/// Targets that are chatty at `info` and only useful when debugging them.
const QUIET_TARGETS: &[&str] = &["sqlx=warn", "hyper=warn", "tower_http=info"];

/// Normalize a configured level name, falling back to `info`.
fn normalize_level(level: &str) -> &'static str {
    match level.trim().to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" | "warning" => "warn",
        "error" => "error",
        "off" => "off",
        _ => "info",
    }
}

/// Directive string for a configured level when `RUST_LOG` is absent.
fn default_directives(level: &str) -> String {
    let mut directives = vec![normalize_level(level)];
    directives.extend_from_slice(QUIET_TARGETS);
    directives.join(",")
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

fn build_writer(file: &str) -> Result<BoxMakeWriter> {
    if file.is_empty() {
        return Ok(BoxMakeWriter::new(std::io::stdout));
    }

    if let Some(parent) = Path::new(file).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let log_file = OpenOptions::new().create(true).append(true).open(file)?;
    Ok(BoxMakeWriter::new(std::io::stdout.and(Arc::new(log_file))))
}

/// Install the global subscriber described by `config`.
///
/// An empty `file` logs to stdout only.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(&config.level);
    let writer = build_writer(&config.file)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(writer),
            )
            .try_init(),
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(config.file.is_empty())
                    .with_target(true),
            )
            .try_init(),
    };

    installed.map_err(|e| KurchError::Config(format!("logging already initialized: {e}")))
}

/// Install a stdout-only text subscriber, ignoring a subscriber already set.
pub fn init_console_only(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(build_filter(level))
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init();
}
