use std::error::Error;
use std::fmt;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, SecondsFormat, Utc};

use crate::classify::{cause_text, is_ignorable};
use crate::format::{render_json, render_text, Level, LogRecord};
use crate::frames::{BacktraceFrames, FrameSource};
use crate::paths::PathTrimmer;
use crate::trace::build_trace;

/// Frames between the stack snapshot and the code that asked for the log
/// entry: `build_trace`, `Logger::log` and the severity wrapper.
const TRACE_SKIP: usize = 3;

/// Output switches, fixed before the logger is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoggerConfig {
    quiet: bool,
    json: bool,
}

impl LoggerConfig {
    /// Silence passthrough prints. Error and fatal records are still written.
    pub fn enable_quiet(&mut self) {
        self.quiet = true;
    }

    /// Write records as JSON lines. Implies quiet, and cannot be undone.
    pub fn enable_json(&mut self) {
        self.json = true;
        self.quiet = true;
    }

    pub fn quiet(&self) -> bool {
        self.quiet
    }

    pub fn json(&self) -> bool {
        self.json
    }
}

/// Anything the logging macros accept as "the error", including no error.
pub trait AsLogError<'a> {
    fn as_log_error(self) -> Option<&'a (dyn Error + 'static)>;
}

impl<'a, E: Error + 'static> AsLogError<'a> for &'a E {
    fn as_log_error(self) -> Option<&'a (dyn Error + 'static)> {
        Some(self)
    }
}

impl<'a, E: Error + 'static> AsLogError<'a> for Option<&'a E> {
    fn as_log_error(self) -> Option<&'a (dyn Error + 'static)> {
        self.map(|e| e as &(dyn Error + 'static))
    }
}

impl<'a> AsLogError<'a> for &'a (dyn Error + 'static) {
    fn as_log_error(self) -> Option<&'a (dyn Error + 'static)> {
        Some(self)
    }
}

impl<'a> AsLogError<'a> for &'a (dyn Error + Send + Sync + 'static) {
    fn as_log_error(self) -> Option<&'a (dyn Error + 'static)> {
        Some(self)
    }
}

impl<'a> AsLogError<'a> for Option<&'a (dyn Error + 'static)> {
    fn as_log_error(self) -> Option<&'a (dyn Error + 'static)> {
        self
    }
}

/// Error and fatal logger for the server process.
///
/// Built once at startup from a [`LoggerConfig`] and shared by reference.
/// Ignorable object layer errors are dropped without a trace; everything
/// else is written to stdout as a text block or a JSON line.
pub struct Logger {
    config: LoggerConfig,
    out: Mutex<Box<dyn Write + Send>>,
    frames: Box<dyn FrameSource>,
    trimmer: PathTrimmer,
    clock: fn() -> DateTime<Utc>,
}

impl Logger {
    pub fn new(config: LoggerConfig) -> Self {
        Self {
            config,
            out: Mutex::new(Box::new(io::stdout())),
            frames: Box::new(BacktraceFrames),
            trimmer: PathTrimmer::from_env(),
            clock: Utc::now,
        }
    }

    /// Send output somewhere other than stdout.
    pub fn with_writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.out = Mutex::new(Box::new(writer));
        self
    }

    pub fn with_frame_source(mut self, frames: impl FrameSource + 'static) -> Self {
        self.frames = Box::new(frames);
        self
    }

    pub fn with_trimmer(mut self, trimmer: PathTrimmer) -> Self {
        self.trimmer = trimmer;
        self
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> LoggerConfig {
        self.config
    }

    /// Print a line unless quiet.
    pub fn println(&self, args: fmt::Arguments<'_>) {
        if !self.config.quiet {
            self.write(&fmt::format(args), true);
        }
    }

    /// Print without a trailing newline unless quiet.
    pub fn printf(&self, args: fmt::Arguments<'_>) {
        if !self.config.quiet {
            self.write(&fmt::format(args), false);
        }
    }

    #[inline(never)]
    pub fn error_if(&self, err: Option<&(dyn Error + 'static)>, message: fmt::Arguments<'_>) {
        self.log(Level::Error, err, message);
    }

    #[inline(never)]
    pub fn fatal_if(&self, err: Option<&(dyn Error + 'static)>, message: fmt::Arguments<'_>) {
        self.log(Level::Fatal, err, message);
    }

    /// Log `err` at `level`, unless there is no error or it is ignorable.
    ///
    /// The trace starts at the caller of [`Logger::error_if`] or
    /// [`Logger::fatal_if`]; call through those (or the macros) rather than
    /// directly. A fatal record exits the process with status 1 once written.
    #[inline(never)]
    pub fn log(&self, level: Level, err: Option<&(dyn Error + 'static)>, message: fmt::Arguments<'_>) {
        let Some(err) = err else {
            return;
        };
        if is_ignorable(err) {
            return;
        }

        let record = LogRecord {
            level,
            message: fmt::format(message),
            time: (self.clock)().to_rfc3339_opts(SecondsFormat::Nanos, true),
            cause: cause_text(err),
            trace: build_trace(self.frames.as_ref(), TRACE_SKIP, &self.trimmer),
        };

        let output = if self.config.json {
            match render_json(&record) {
                Ok(json) => json,
                Err(e) => {
                    // Logging is broken; logging that would recurse.
                    tracing::error!(error = %e, "serializing log record failed");
                    std::process::abort();
                }
            }
        } else {
            render_text(&record)
        };
        self.write(&output, true);

        if level == Level::Fatal {
            std::process::exit(1);
        }
    }

    fn write(&self, output: &str, newline: bool) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = out.write_all(output.as_bytes());
        if newline {
            let _ = out.write_all(b"\n");
        }
        let _ = out.flush();
    }
}

/// Log an error-level record if the error is present and not ignorable.
///
/// ```rust,ignore
/// error_if!(logger, store.stat(bucket, object).err().as_ref(), "stat {}/{}", bucket, object);
/// ```
#[macro_export]
macro_rules! error_if {
    ($logger:expr, $err:expr, $($arg:tt)+) => {
        $logger.error_if($crate::AsLogError::as_log_error($err), format_args!($($arg)+))
    };
}

/// Log a fatal record and exit with status 1, if the error is present and
/// not ignorable.
#[macro_export]
macro_rules! fatal_if {
    ($logger:expr, $err:expr, $($arg:tt)+) => {
        $logger.fatal_if($crate::AsLogError::as_log_error($err), format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! log_println {
    ($logger:expr, $($arg:tt)*) => {
        $logger.println(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_printf {
    ($logger:expr, $($arg:tt)*) => {
        $logger.printf(format_args!($($arg)*))
    };
}
