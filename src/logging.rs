//! Structured logging utilities for Luarun
//!
//! Luarun only emits events; installing a subscriber is up to the embedding
//! application. The binary calls [`init`].
//!
//! # Log Format Conventions
//!
//! - `operation`: The operation being performed ("load", "eval")
//! - `status`: The result status ("success", "noscript")
//! - `object_id`: SHA1 of the flattened script (hex-encoded)
//! - `script`: Logical script name (e.g., "lib/util")
//! - `path`: Script file, relative to the script directory
//!
//! # Examples
//!
//! ```rust
//! use luarun::logging::{operations, status};
//! use tracing::info;
//!
//! let sha = "e0e1f9fabfc9d4800c877a703b823ac0578ff8db";
//! info!(
//!     operation = operations::EVAL,
//!     status = status::NOSCRIPT,
//!     object_id = %sha,
//!     script = "sum",
//!     "pushing script"
//! );
//! ```

use std::{fmt as std_fmt, io};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{
    fmt::{self, format::Writer},
    prelude::*,
    EnvFilter,
};

/// Custom formatter that shows "luarun" instead of full module path
struct LuarunFormatter {
    with_ansi: bool,
}

impl<S, N> FormatEvent<S, N> for LuarunFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std_fmt::Result {
        let meta = event.metadata();

        write!(
            writer,
            "{} ",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.6fZ")
        )?;

        if self.with_ansi {
            let level_style = match *meta.level() {
                tracing::Level::ERROR => "\x1b[31m", // Red
                tracing::Level::WARN => "\x1b[33m",  // Yellow
                tracing::Level::INFO => "\x1b[32m",  // Green
                tracing::Level::DEBUG => "\x1b[34m", // Blue
                tracing::Level::TRACE => "\x1b[35m", // Magenta
            };
            write!(writer, "{}{:5}(luarun)\x1b[0m: ", level_style, meta.level())?;
        } else {
            write!(writer, "{:5}(luarun): ", meta.level())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format (default for development)
    Pretty,
    /// Compact format (for CI/production)
    Compact,
    /// JSON format (for log aggregation systems)
    Json,
}

impl LogFormat {
    /// Parse from environment variable (LUARUN_LOG_FORMAT)
    pub fn from_env() -> Self {
        match std::env::var("LUARUN_LOG_FORMAT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "json" => Self::Json,
            "compact" => Self::Compact,
            "pretty" => Self::Pretty,
            _ => {
                if std::env::var("CI").is_ok() {
                    Self::Compact
                } else {
                    Self::Pretty
                }
            }
        }
    }
}

/// Initialize the global tracing subscriber
///
/// `default_level` applies when `RUST_LOG` is unset or invalid.
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "debug", "info", "warn")
/// - `LUARUN_LOG_FORMAT`: Set format ("pretty", "compact", "json")
/// - `CI`: If set, defaults to compact format
///
/// # Examples
///
/// ```bash
/// # Show every script file that gets loaded
/// RUST_LOG=debug luarun resolve sum
///
/// # JSON format for log aggregation
/// LUARUN_LOG_FORMAT=json luarun list
/// ```
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // A subscriber may already be installed by the host or a test harness
    let _ = match LogFormat::from_env() {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .event_format(LuarunFormatter { with_ansi: true })
                    .with_writer(io::stderr),
            )
            .try_init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .event_format(LuarunFormatter { with_ansi: false })
                    .with_writer(io::stderr),
            )
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_ansi(false)
                    .with_writer(io::stderr)
                    .json(),
            )
            .try_init(),
    };
}

/// Operation names for consistent logging
pub mod operations {
    pub const LOAD: &str = "load";
    pub const EVAL: &str = "eval";
}

/// Status values for consistent logging
pub mod status {
    pub const SUCCESS: &str = "success";
    pub const NOSCRIPT: &str = "noscript";
}
