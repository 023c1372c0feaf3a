//! Logging bridge.
//!
//! Every `log::info!()` etc. in the workspace and its crates ends up here and
//! is written to `aterm_debug.log` in the temp dir, so log output never lands
//! in the middle of a session's terminal. When `RUST_LOG` is set the same
//! lines are mirrored to stderr.
//!
//! The `debug_*!` macros log under an explicit category (the log target).

use log::{LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Where the bridge writes
pub fn log_path() -> PathBuf {
    std::env::temp_dir().join("aterm_debug.log")
}

/// Pick the effective level: CLI flag, then `RUST_LOG`, then config
pub fn resolve_level(
    cli: Option<LevelFilter>,
    rust_log: Option<&str>,
    config: LevelFilter,
) -> LevelFilter {
    cli.or_else(|| rust_log.and_then(|v| v.trim().parse().ok()))
        .unwrap_or(config)
}

fn timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}

struct BridgeLogger {
    file: Option<Mutex<File>>,
    mirror_stderr: bool,
}

impl BridgeLogger {
    fn open(level: LevelFilter, mirror_stderr: bool) -> Self {
        let file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .open(log_path())
            .ok()
            .map(|mut f| {
                let rule = "=".repeat(80);
                let _ = writeln!(
                    f,
                    "{rule}\naterm session started at {} (level={level})\n{rule}",
                    timestamp()
                );
                Mutex::new(f)
            });
        Self {
            file,
            mirror_stderr,
        }
    }
}

impl Log for BridgeLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{}] [{:<5}] [{}] {}\n",
            timestamp(),
            record.level(),
            record.target(),
            record.args()
        );
        if let Some(file) = &self.file {
            let mut file = file.lock();
            let _ = file.write_all(line.as_bytes());
        }
        if self.mirror_stderr {
            let _ = std::io::stderr().write_all(line.as_bytes());
        }
    }

    fn flush(&self) {
        if let Some(file) = &self.file {
            let _ = file.lock().flush();
        }
    }
}

static LOGGER: OnceLock<BridgeLogger> = OnceLock::new();

/// Install the bridge as the global logger.
///
/// Returns false if a logger was already installed; the level is still
/// updated in that case.
pub fn init_log_bridge(level: LevelFilter) -> bool {
    let mirror = std::env::var_os("RUST_LOG").is_some();
    let logger = LOGGER.get_or_init(|| BridgeLogger::open(level, mirror));
    let installed = log::set_logger(logger).is_ok();
    log::set_max_level(level);
    installed
}

/// Change the level after startup (e.g. once the config is loaded)
pub fn set_level(level: LevelFilter) {
    log::set_max_level(level);
}

#[macro_export]
macro_rules! debug_error {
    ($category:expr, $($arg:tt)*) => {
        ::log::error!(target: $category, $($arg)*)
    };
}

#[macro_export]
macro_rules! debug_info {
    ($category:expr, $($arg:tt)*) => {
        ::log::info!(target: $category, $($arg)*)
    };
}

#[macro_export]
macro_rules! debug_log {
    ($category:expr, $($arg:tt)*) => {
        ::log::debug!(target: $category, $($arg)*)
    };
}

#[macro_export]
macro_rules! debug_trace {
    ($category:expr, $($arg:tt)*) => {
        ::log::trace!(target: $category, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_precedence() {
        assert_eq!(
            resolve_level(Some(LevelFilter::Trace), Some("error"), LevelFilter::Warn),
            LevelFilter::Trace
        );
        assert_eq!(
            resolve_level(None, Some("debug"), LevelFilter::Warn),
            LevelFilter::Debug
        );
        assert_eq!(
            resolve_level(None, Some("nonsense"), LevelFilter::Info),
            LevelFilter::Info
        );
        assert_eq!(resolve_level(None, None, LevelFilter::Warn), LevelFilter::Warn);
    }
}
