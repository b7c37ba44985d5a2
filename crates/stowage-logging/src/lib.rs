//! # stowage-logging
//!
//! Error and fatal logging for the stowage server.
//!
//! An error plus a message becomes either a colored multi-line report with
//! a call-stack trace, or a single JSON line. Expected object layer errors
//! (missing buckets, missing objects and the like) are dropped silently.
//!
//! ## Key Types
//!
//! - [`Logger`] - Writes error and fatal records, gates passthrough prints
//! - [`LoggerConfig`] - Quiet and JSON switches, fixed at startup
//! - [`LogRecord`] - The five fields every record carries
//! - [`FrameSource`] - Call-stack enumeration ([`BacktraceFrames`], [`FixedFrames`])
//! - [`PathTrimmer`] - Strips toolchain and workspace roots from trace paths
//!
//! ## Output
//!
//! Text mode:
//!
//! ```text
//!
//! Trace: 1: crates/stowage/src/main.rs:112:stowage::open_store()
//!        2: crates/stowage/src/main.rs:87:stowage::main()
//! [2026-10-19T08:15:30.123456789Z] [FATAL] Unable to open data directory /srv/data (Disk Not Found: /Srv/Data)
//! ```
//!
//! JSON mode:
//!
//! ```text
//! {"level":"FATAL","message":"...","time":"...","cause":"...","trace":["..."]}
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stowage_logging::{error_if, Logger, LoggerConfig};
//!
//! let mut config = LoggerConfig::default();
//! config.enable_json();
//! let logger = Logger::new(config);
//!
//! error_if!(logger, &err, "unable to list bucket {}", bucket);
//! ```

mod classify;
mod format;
mod frames;
mod logger;
mod paths;
mod trace;

pub use classify::{cause_text, is_ignorable, title_case};
pub use format::{render_json, render_text, Level, LogRecord};
pub use frames::{BacktraceFrames, FixedFrames, FrameSource, Frames, RawFrame};
pub use logger::{AsLogError, Logger, LoggerConfig};
pub use paths::{PathTrimmer, SEARCH_ROOTS_ENV, SELF_PATH, TOOLCHAIN_ROOT_ENV};
pub use trace::{build_trace, short_name};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize internal diagnostics. These go to stderr so they never mix
/// with the records on stdout.
pub fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
