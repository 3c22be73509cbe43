//! Logging setup for the CLI and embedding hosts
//!
//! `RUST_LOG` overrides everything, e.g.
//! `RUST_LOG=ligatures_limited::update::decide=trace` for per-match
//! decisions or `RUST_LOG=ligatures_limited::ligature=debug` for
//! configuration resolution and pattern compiles.
//!
//! A daily-rotated `ligatures.log` is also written under the config
//! directory's `logs/`, always at debug level for this crate.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_FILE: &str = "ligatures.log";

/// Level for this crate's console output at a given `-v` count
fn console_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Console filter: `RUST_LOG` if set, else this crate at the verbosity
/// level and every other crate at `warn`
fn console_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,ligatures_limited={}",
            console_level(verbosity)
        ))
    })
}

/// Install the console and file layers.
///
/// Console output goes to stderr so stdout stays machine-readable. Calling
/// this again keeps the first subscriber.
pub fn init(verbosity: u8) {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter(verbosity));

    let file_layer = match crate::config_paths::ensure_logs_dir() {
        Ok(logs_dir) => Some(
            fmt::layer()
                .with_writer(tracing_appender::rolling::daily(logs_dir, LOG_FILE))
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true)
                .with_filter(EnvFilter::new("warn,ligatures_limited=debug")),
        ),
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {}", e);
            None
        }
    };

    let _ = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init();
}
