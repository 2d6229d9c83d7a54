//!
//! src/logging.rs  Andrew Belles  Oct 2nd, 2025
//!
//! Initializes logger so every stage of a run reports through tracing,
//! as json lines by default or human readable with LOG_FORMAT=pretty
//!

use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use tracing_error::ErrorLayer;
use tracing_appender::non_blocking;

use crate::config::{LogFormat, LoggingConfig};

/// Flushes buffered log lines when dropped; hold it for all of main
pub struct LoggingGuard(tracing_appender::non_blocking::WorkerGuard);

fn filter(cfg: &LoggingConfig) -> EnvFilter {
    std::env::var("RUST_LOG")
        .ok()
        .map(EnvFilter::new)
        .unwrap_or_else(|| EnvFilter::new(cfg.filter_directives.clone()))
}

pub fn init_logging(cfg: &LoggingConfig) ->
    Result<LoggingGuard, crate::errors::LoaderError> {

    let (writer, guard) = non_blocking(std::io::stdout());
    let time = fmt::time::UtcTime::rfc_3339();

    let base = fmt::layer()
        .with_writer(writer)
        .with_timer(time)
        .with_target(cfg.include_target)
        .with_file(cfg.include_file_line)
        .with_line_number(cfg.include_file_line);

    let fmt_layer = match cfg.format {
        LogFormat::Json => base
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
        LogFormat::Pretty => base
            .with_ansi(cfg.with_ansi)
            .pretty()
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(filter(cfg))
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| crate::errors::LoaderError::Config(format!("init logging: {e}")))?;

    Ok( LoggingGuard(guard) )
}
