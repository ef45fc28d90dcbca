use std::env;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, Once, PoisonError};

static ENABLE_LOGGING: AtomicBool = AtomicBool::new(false);
static SUBSCRIBER: Once = Once::new();
/// Current log file; `None` sends log lines to stdout
static LOG_FILE: Mutex<Option<File>> = Mutex::new(None);

/// Initializes logging based on the FLOWSTATS_LOGGING environment variable.
/// - If FLOWSTATS_LOGGING=true, logging is enabled and a tracing subscriber is installed.
/// - If FLOWSTATS_LOGGING=false or not set, logging is disabled.
/// - If FLOWSTATS_LOG_FILE is set, log lines go to that file instead of stdout. Calling
///   this again with another FLOWSTATS_LOG_FILE moves the output to the new file.
/// - To enable logging in tests, run: FLOWSTATS_LOGGING=true cargo test -- --nocapture
pub fn init_logging() {
    let enabled = match env::var("FLOWSTATS_LOGGING") {
        Ok(value) => match value.as_str() {
            "true" => true,
            "false" => false,
            other => {
                eprintln!(
                    "FLOWSTATS_LOGGING must be 'true' or 'false', got '{}'; logging stays disabled",
                    other
                );
                false
            }
        },
        Err(_) => false,
    };
    ENABLE_LOGGING.store(enabled, Ordering::SeqCst);
    if !enabled {
        return;
    }
    if let Ok(path) = env::var("FLOWSTATS_LOG_FILE") {
        if let Err(e) = set_log_file(&path) {
            eprintln!("Error creating log file {}: {}", path, e);
        }
    }
    SUBSCRIBER.call_once(install_subscriber);
}

/// Truncates `path` and sends every following log line there
pub fn set_log_file(path: impl AsRef<Path>) -> io::Result<()> {
    let file = File::create(path)?;
    *log_file() = Some(file);
    Ok(())
}

fn log_file() -> MutexGuard<'static, Option<File>> {
    LOG_FILE.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Writes to the current log file, or to stdout when none is set
pub struct LogWriter;

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match log_file().as_mut() {
            Some(file) => file.write(buf),
            None => io::stdout().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match log_file().as_mut() {
            Some(file) => file.flush(),
            None => io::stdout().flush(),
        }
    }
}

fn install_subscriber() {
    let result = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .with_ansi(false)
        .with_writer(|| LogWriter)
        .try_init();
    // Another subscriber may already be installed by the host application
    if let Err(e) = result {
        eprintln!("Tracing subscriber not installed: {}", e);
    }
}

pub fn is_enabled() -> bool {
    ENABLE_LOGGING.load(Ordering::SeqCst)
}

pub fn log(prefix: &str, message: &str) {
    if is_enabled() {
        tracing::info!("[{}]   {}", prefix, message);
    }
}
