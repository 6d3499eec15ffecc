//! Logging init: file under the XDG state dir, or stderr when that is not writable.

use anyhow::Result;
use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,rtry=debug,rtry_core=debug";

/// Where log events end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    File(PathBuf),
    Stderr,
}

/// Per-event writer; falls back to stderr if the shared file handle cannot be cloned.
enum LogWriter {
    File(File),
    Stderr,
}

impl io::Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LogWriter::File(f) => f.write(buf),
            LogWriter::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LogWriter::File(f) => f.flush(),
            LogWriter::Stderr => io::stderr().lock().flush(),
        }
    }
}

struct SharedFile(File);

impl<'a> MakeWriter<'a> for SharedFile {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.0
            .try_clone()
            .map(LogWriter::File)
            .unwrap_or(LogWriter::Stderr)
    }
}

/// `RUST_LOG` wins over `fallback` (usually `log_filter` from config), which wins over the built-in default.
fn env_filter(fallback: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .ok()
        .or_else(|| fallback.and_then(|f| EnvFilter::try_new(f).ok()))
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

fn open_log_file() -> Result<(File, PathBuf)> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("rtry")?;
    let log_dir = xdg_dirs.get_state_home();
    fs::create_dir_all(&log_dir)?;
    let path = log_dir.join("rtry.log");
    let file = fs::OpenOptions::new().create(true).append(true).open(&path)?;
    Ok((file, path))
}

/// Install the global subscriber, writing to `~/.local/state/rtry/rtry.log`
/// or to stderr when the log file cannot be opened. Returns where logs go.
pub fn init_logging(filter: Option<&str>) -> Result<LogTarget> {
    let (writer, target) = match open_log_file() {
        Ok((file, path)) => (BoxMakeWriter::new(SharedFile(file)), LogTarget::File(path)),
        Err(_) => (BoxMakeWriter::new(io::stderr), LogTarget::Stderr),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(filter))
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install log subscriber: {}", e))?;

    match &target {
        LogTarget::File(path) => tracing::info!("rtry logging initialized at {}", path.display()),
        LogTarget::Stderr => tracing::info!("rtry logging to stderr"),
    }
    Ok(target)
}
