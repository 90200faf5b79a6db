//! Console logging.
//!
//! Events go to stderr so command output on stdout stays machine readable.
//! The level is taken from `RUST_LOG` and defaults to `info`.

use clap::ValueEnum;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line human readable output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

pub fn init_logging(format: LogFormat) {
    let registry = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()));

    match format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .with_target(false)
                    .with_timer(fmt::time::ChronoLocal::rfc_3339())
                    .with_file(true)
                    .pretty(),
            )
            .init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .with_timer(fmt::time::ChronoLocal::rfc_3339())
                    .with_file(true)
                    .with_current_span(true),
            )
            .init(),
    }
}
