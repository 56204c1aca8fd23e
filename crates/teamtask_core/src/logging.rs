//! Rolling-file diagnostics for the workload engine.
//!
//! Log lines carry ids and counts only; task titles and member names stay
//! out of the files. The first successful `init_logging` call wins for the
//! lifetime of the process: repeating it with the same settings is a no-op,
//! asking for anything else is an error.

use flexi_logger::{
    Cleanup, Criterion, Duplicate, FileSpec, LogSpecification, Logger, LoggerHandle, Naming,
    WriteMode,
};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::panic::PanicHookInfo;
use std::path::PathBuf;

const FILE_BASENAME: &str = "teamtask";
const ROTATE_AT_BYTES: u64 = 8 * 1024 * 1024;
const KEEP_FILES: usize = 4;
const PANIC_TEXT_LIMIT: usize = 160;

static LOGGER: OnceCell<RunningLogger> = OnceCell::new();
static PANIC_HOOK_SET: OnceCell<()> = OnceCell::new();

#[derive(Debug, Clone, PartialEq, Eq)]
struct LogTarget {
    level: LevelFilter,
    dir: PathBuf,
    echo_stderr: bool,
}

impl LogTarget {
    fn parse(level: &str, dir: &str, echo_stderr: bool) -> Result<Self, LoggingError> {
        Ok(Self {
            level: parse_level(level)?,
            dir: parse_dir(dir)?,
            echo_stderr,
        })
    }
}

struct RunningLogger {
    target: LogTarget,
    _handle: LoggerHandle,
}

/// Why logging could not be started.
#[derive(Debug)]
pub enum LoggingError {
    BadLevel(String),
    BadDirectory(String),
    CreateDirectory {
        dir: PathBuf,
        source: std::io::Error,
    },
    Backend(String),
    /// Logging is already running with different settings.
    AlreadyRunning(String),
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadLevel(level) => {
                write!(f, "unknown log level `{level}` (use trace, debug, info, warn or error)")
            }
            Self::BadDirectory(reason) => write!(f, "invalid log directory: {reason}"),
            Self::CreateDirectory { dir, source } => {
                write!(f, "cannot create log directory {}: {source}", dir.display())
            }
            Self::Backend(message) => write!(f, "log backend failed to start: {message}"),
            Self::AlreadyRunning(detail) => write!(f, "logging already running with {detail}"),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDirectory { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Starts rolling file logs at `level` under the absolute directory `log_dir`.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), LoggingError> {
    init_logging_with(level, log_dir, false)
}

/// Same as [`init_logging`]; `echo_stderr` also copies warnings and errors
/// to stderr.
pub fn init_logging_with(level: &str, log_dir: &str, echo_stderr: bool) -> Result<(), LoggingError> {
    let wanted = LogTarget::parse(level, log_dir, echo_stderr)?;
    let running = LOGGER.get_or_try_init(|| start(wanted.clone()))?;
    match conflict(&running.target, &wanted) {
        Some(detail) => Err(LoggingError::AlreadyRunning(detail)),
        None => Ok(()),
    }
}

/// Level and directory of the running logger, if any.
pub fn logging_status() -> Option<(LevelFilter, PathBuf)> {
    LOGGER
        .get()
        .map(|running| (running.target.level, running.target.dir.clone()))
}

/// Level used when the caller does not pick one.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start(target: LogTarget) -> Result<RunningLogger, LoggingError> {
    std::fs::create_dir_all(&target.dir).map_err(|source| LoggingError::CreateDirectory {
        dir: target.dir.clone(),
        source,
    })?;

    let echo = if target.echo_stderr {
        Duplicate::Warn
    } else {
        Duplicate::None
    };
    let handle = Logger::with(LogSpecification::builder().default(target.level).build())
        .log_to_file(
            FileSpec::default()
                .directory(target.dir.as_path())
                .basename(FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_FILES),
        )
        .duplicate_to_stderr(echo)
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;

    set_panic_hook();
    info!(
        "event=engine_start module=logging status=ok os={} version={} level={} log_dir={}",
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION"),
        target.level,
        target.dir.display()
    );

    Ok(RunningLogger {
        target,
        _handle: handle,
    })
}

fn conflict(running: &LogTarget, wanted: &LogTarget) -> Option<String> {
    if running.dir != wanted.dir {
        Some(format!("directory {}", running.dir.display()))
    } else if running.level != wanted.level {
        Some(format!("level {}", running.level))
    } else if running.echo_stderr != wanted.echo_stderr {
        Some(format!("stderr echo {}", running.echo_stderr))
    } else {
        None
    }
}

fn parse_level(level: &str) -> Result<LevelFilter, LoggingError> {
    let normalized = level.trim().to_ascii_lowercase();
    let name = if normalized == "warning" {
        "warn"
    } else {
        normalized.as_str()
    };
    match name.parse::<LevelFilter>() {
        Ok(LevelFilter::Off) | Err(_) => Err(LoggingError::BadLevel(level.trim().to_string())),
        Ok(filter) => Ok(filter),
    }
}

fn parse_dir(dir: &str) -> Result<PathBuf, LoggingError> {
    let dir = PathBuf::from(dir.trim());
    if dir.as_os_str().is_empty() {
        return Err(LoggingError::BadDirectory("path is empty".to_string()));
    }
    if dir.is_relative() {
        return Err(LoggingError::BadDirectory(format!(
            "{} is not absolute",
            dir.display()
        )));
    }
    Ok(dir)
}

fn set_panic_hook() {
    if PANIC_HOOK_SET.set(()).is_err() {
        return;
    }
    let chained = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let at = panic
            .location()
            .map_or_else(|| "unknown".to_string(), |loc| format!("{}:{}", loc.file(), loc.line()));
        error!(
            "event=panic module=logging status=error location={at} payload={}",
            one_line(&panic_text(panic), PANIC_TEXT_LIMIT)
        );
        chained(panic);
    }));
}

fn panic_text(panic: &PanicHookInfo<'_>) -> String {
    let payload = panic.payload();
    payload
        .downcast_ref::<&str>()
        .map(|text| (*text).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "<non-string payload>".to_string())
}

/// Flattens `text` onto one line and caps it at `limit` characters.
fn one_line(text: &str, limit: usize) -> String {
    let flat = text.replace(['\r', '\n'], " ");
    match flat.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat,
    }
}
