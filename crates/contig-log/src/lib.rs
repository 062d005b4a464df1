//! Leveled logging for the `contig` crates.
//!
//! A small, dependency-free logger with a process-wide level, module path
//! targets and coloured output on stderr. The level can be set directly,
//! parsed from a string, or read from an environment variable so that a
//! binary linking `contig-vec` can turn on reallocation tracing without
//! code changes.
//!
//! # Example
//!
//! ```
//! use contig_log::{debug, info, trace, Level};
//!
//! contig_log::set_level(Level::Debug);
//!
//! let slots = 8;
//! info!("reserved {} slots", slots);
//! debug!("block layout: {:?}", (slots, 4));
//! trace!("not shown at debug level");
//! ```

use std::fmt::{self, Arguments};
use std::str::FromStr;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU8, Ordering};

/// Environment variable consulted by [`init_from_env`] by default.
pub const DEFAULT_ENV_VAR: &str = "CONTIG_LOG";

/// Severity of a log record.
///
/// Ordered from most severe (`Error`) to least severe (`Trace`); a record
/// is emitted when its level is less than or equal to the logger level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Failures the caller is about to see.
    Error = 0,
    /// Suspicious but recoverable situations.
    Warn = 1,
    /// High-level lifecycle events.
    Info = 2,
    /// Block-level decisions (reallocations, strategy hand-overs).
    Debug = 3,
    /// Per-operation detail.
    Trace = 4,
}

impl Level {
    const fn color_code(self) -> &'static str {
        match self {
            Level::Error => "\x1b[31m",
            Level::Warn => "\x1b[33m",
            Level::Info => "\x1b[32m",
            Level::Debug => "\x1b[36m",
            Level::Trace => "\x1b[35m",
        }
    }

    /// Returns the upper-case name of this level.
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        }
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Level::Error,
            1 => Level::Warn,
            2 => Level::Info,
            3 => Level::Debug,
            _ => Level::Trace,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a level name, case-insensitively.
///
/// ```
/// use contig_log::Level;
///
/// assert_eq!("trace".parse::<Level>(), Ok(Level::Trace));
/// assert_eq!("WARN".parse::<Level>(), Ok(Level::Warn));
/// assert!("loud".parse::<Level>().is_err());
/// ```
impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ERROR" => Ok(Level::Error),
            "WARN" | "WARNING" => Ok(Level::Warn),
            "INFO" => Ok(Level::Info),
            "DEBUG" => Ok(Level::Debug),
            "TRACE" => Ok(Level::Trace),
            _ => Err(format!("Invalid log level: {s}")),
        }
    }
}

/// Process-wide logger state.
///
/// Only the minimum level is stored; it is read with relaxed ordering on
/// every macro invocation so a disabled level costs one atomic load.
pub struct Logger {
    level: AtomicU8,
}

impl Logger {
    const fn new(level: Level) -> Self {
        Logger {
            level: AtomicU8::new(level as u8),
        }
    }

    /// Sets the minimum level that will be emitted.
    pub fn set_level(&self, level: Level) {
        self.level.store(level as u8, Ordering::SeqCst);
    }

    /// Returns the current minimum level.
    pub fn level(&self) -> Level {
        Level::from_u8(self.level.load(Ordering::Relaxed))
    }

    /// Returns `true` if a record at `level` would be emitted.
    #[inline]
    pub fn enabled(&self, level: Level) -> bool {
        level as u8 <= self.level.load(Ordering::Relaxed)
    }
}

static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Returns the global logger, creating it at `Level::Warn` on first use.
///
/// Library crates stay quiet unless the embedding program raises the level.
pub fn get_logger() -> &'static Logger {
    LOGGER.get_or_init(|| Logger::new(Level::Warn))
}

/// Sets the global minimum level.
pub fn set_level(level: Level) {
    get_logger().set_level(level);
}

/// Sets the global minimum level from its name.
///
/// # Errors
///
/// Returns the parse error message when `s` is not a level name; the
/// current level is left unchanged.
pub fn set_level_from_str(s: &str) -> Result<(), String> {
    set_level(s.parse()?);
    Ok(())
}

/// Configures the global level from the environment variable `var`.
///
/// Returns the level that was applied, or `Ok(None)` when the variable is
/// unset or empty.
///
/// # Errors
///
/// Returns an error when the variable is set to something other than a
/// level name.
///
/// ```
/// // Unset variables leave the logger untouched.
/// assert_eq!(contig_log::init_from_env("CONTIG_LOG_DOCTEST_UNSET"), Ok(None));
/// ```
pub fn init_from_env(var: &str) -> Result<Option<Level>, String> {
    match std::env::var(var) {
        Ok(raw) if !raw.trim().is_empty() => {
            let level: Level = raw.parse()?;
            set_level(level);
            Ok(Some(level))
        }
        _ => Ok(None),
    }
}

#[doc(hidden)]
pub fn __log_with_target(level: Level, target: &str, args: Arguments) {
    static RESET: &str = "\x1b[0m";

    if !get_logger().enabled(level) {
        return;
    }

    let color = level.color_code();
    eprintln!("{color}[{level}]{RESET} {target}: {args}");
}

/// Emits a record at an explicit level.
///
/// ```
/// use contig_log::{log, Level};
///
/// log!(level: Level::Warn, "capacity {} exceeds hint {}", 64, 32);
/// log!(target: "contig::raw", level: Level::Trace, "released block");
/// ```
#[macro_export]
macro_rules! log {
    (target: $target:expr, level: $level:expr, $($arg:tt)*) => {{
        let level = $level;
        if $crate::get_logger().enabled(level) {
            $crate::__log_with_target(level, $target, format_args!($($arg)*));
        }
    }};
    (level: $level:expr, $($arg:tt)*) => {
        $crate::log!(target: module_path!(), level: $level, $($arg)*)
    };
}

/// Emits a record at `Level::Error`.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Error, $($arg)*)
    };
}

/// Emits a record at `Level::Warn`.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Warn, $($arg)*)
    };
}

/// Emits a record at `Level::Info`.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Info, $($arg)*)
    };
}

/// Emits a record at `Level::Debug`.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Debug, $($arg)*)
    };
}

/// Emits a record at `Level::Trace`.
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Trace, $($arg)*)
    };
}
