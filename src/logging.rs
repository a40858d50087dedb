use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use file_rotate::{compression::Compression, suffix::AppendCount, ContentLimit, FileRotate};
use once_cell::sync::Lazy;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::{self, time::UtcTime, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

pub const ENV_LOG: &str = "FOLIO_LOG";
pub const DEFAULT_FILTER: &str = "folio=warn";
pub const LOG_FILE: &str = "folio.log";
const MAX_LOG_BYTES: usize = 1024 * 1024;
const MAX_ARCHIVES: usize = 5;

static FILE_SINK: Lazy<Mutex<Option<NonBlocking>>> = Lazy::new(|| Mutex::new(None));
static FILE_GUARD: Lazy<Mutex<Option<WorkerGuard>>> = Lazy::new(|| Mutex::new(None));

/// Writes to the file sink once [`init_file_logging`] has wired one, and
/// discards output before that.
#[derive(Clone, Copy, Default)]
struct FileSink;

struct FileSinkWriter(Option<NonBlocking>);

impl io::Write for FileSinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.0 {
            Some(writer) => writer.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.0 {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for FileSink {
    type Writer = FileSinkWriter;

    fn make_writer(&'a self) -> Self::Writer {
        FileSinkWriter(FILE_SINK.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }
}

/// Install the global subscriber: JSON lines to stderr and to the (initially
/// unwired) file sink, filtered by `FOLIO_LOG`. Safe to call more than once.
pub fn init_logging() {
    let _ = tracing_log::LogTracer::init();

    let filter = EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let stderr_layer = fmt::layer()
        .json()
        .flatten_event(true)
        .with_target(true)
        .with_timer(UtcTime::rfc_3339())
        .with_writer(io::stderr);
    let file_layer = fmt::layer()
        .json()
        .flatten_event(true)
        .with_target(true)
        .with_timer(UtcTime::rfc_3339())
        .with_ansi(false)
        .with_writer(FileSink);

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer);
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Start writing JSON log lines to `<dir>/folio.log`, rotated by size.
pub fn init_file_logging(dir: &Path) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("create log directory {}", dir.display()))?;
    let path = dir.join(LOG_FILE);
    let rotate = FileRotate::new(
        &path,
        AppendCount::new(MAX_ARCHIVES),
        ContentLimit::Bytes(MAX_LOG_BYTES),
        Compression::None,
        #[cfg(unix)]
        None,
    );
    let (writer, guard) = tracing_appender::non_blocking(rotate);
    *FILE_SINK.lock().unwrap_or_else(|e| e.into_inner()) = Some(writer);
    *FILE_GUARD.lock().unwrap_or_else(|e| e.into_inner()) = Some(guard);
    Ok(path)
}

/// Flush pending file log lines and detach the file sink.
pub fn flush_file_logs() {
    FILE_SINK.lock().unwrap_or_else(|e| e.into_inner()).take();
    let guard = FILE_GUARD.lock().unwrap_or_else(|e| e.into_inner()).take();
    drop(guard);
}
