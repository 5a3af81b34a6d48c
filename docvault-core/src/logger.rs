use std::sync::{Arc, OnceLock};

/// Receives the vault's log messages.
///
/// Implement this in the host application and install it with [`set_logger`]. Secrets (API keys, private
/// keys) are never part of a message.
///
/// # Examples
///
/// ```rust
/// use docvault_core::logger::{LogLevel, Logger};
///
/// struct StdoutLogger;
///
/// impl Logger for StdoutLogger {
///     fn log(&self, level: LogLevel, message: String) {
///         println!("[{level:?}] {message}");
///     }
/// }
/// ```
///
/// ## Swift
///
/// ```swift
/// class VaultLoggerBridge: Docvault.Logger {
///     func log(level: Docvault.LogLevel, message: String) {
///         Log.log(level.toCoreLevel(), message)
///     }
/// }
///
/// Docvault.setLogger(logger: VaultLoggerBridge()) // once, at startup
/// ```
#[cfg_attr(feature = "ffi", uniffi::export(with_foreign))]
pub trait Logger: Sync + Send {
    /// Logs `message` at `level`.
    fn log(&self, level: LogLevel, message: String);
}

/// Severity of a log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum LogLevel {
    /// Very detailed diagnostics.
    Trace,
    /// Debugging information, such as workflow stages.
    Debug,
    /// Operation lifecycle (started, succeeded).
    Info,
    /// Failed operations and orphaned uploads.
    Warn,
    /// Errors the vault could not report through a return value.
    Error,
}

/// Forwards `log` records to the installed [`Logger`].
struct ForeignLogger;

impl log::Log for ForeignLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        if !should_forward(record.level(), record.module_path()) {
            return;
        }

        if let Some(logger) = LOGGER_INSTANCE.get() {
            logger.log(log_level(record.level()), format!("{}", record.args()));
        } else {
            eprintln!("Logger not set: {}", record.args());
        }
    }

    fn flush(&self) {}
}

/// Debug and trace records are only forwarded from this crate; dependencies (HTTP, RPC) are too chatty.
fn should_forward(level: log::Level, module_path: Option<&str>) -> bool {
    let is_from_docvault = module_path.is_some_and(|path| path.starts_with("docvault"));
    let is_debug_or_trace = level == log::Level::Debug || level == log::Level::Trace;
    is_from_docvault || !is_debug_or_trace
}

const fn log_level(level: log::Level) -> LogLevel {
    match level {
        log::Level::Error => LogLevel::Error,
        log::Level::Warn => LogLevel::Warn,
        log::Level::Info => LogLevel::Info,
        log::Level::Debug => LogLevel::Debug,
        log::Level::Trace => LogLevel::Trace,
    }
}

static LOGGER_INSTANCE: OnceLock<Arc<dyn Logger>> = OnceLock::new();

/// Installs the host logger. Only the first call has an effect.
#[cfg_attr(feature = "ffi", uniffi::export)]
pub fn set_logger(logger: Arc<dyn Logger>) {
    if LOGGER_INSTANCE.set(logger).is_err() {
        eprintln!("Logger already set");
        return;
    }

    if let Err(e) = init_logger() {
        eprintln!("Failed to set logger: {e}");
    }
}

fn init_logger() -> Result<(), log::SetLoggerError> {
    static LOGGER: ForeignLogger = ForeignLogger;
    log::set_logger(&LOGGER)?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}
