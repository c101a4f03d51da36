//! Rolling file logger
//!
//! Installs a `tracing` subscriber that also receives `log` records, writes
//! them to `<dir>/<app>.log`, rotates to `<app>.log.1 ..= .N` once the file
//! grows past a size cap, and keeps the most recent lines in memory.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Lines kept in the in-memory ring buffer
pub const RING_CAPACITY: usize = 500;
pub const DEFAULT_MAX_BYTES: u64 = 5 * 1024 * 1024;
pub const DEFAULT_MAX_FILES: usize = 3;

static GLOBAL: OnceLock<RollingWriter> = OnceLock::new();

struct Inner {
    path: PathBuf,
    file: File,
    written: u64,
    max_bytes: u64,
    max_files: usize,
    ring: VecDeque<String>,
    partial: String,
}

impl Inner {
    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        for n in (1..self.max_files).rev() {
            let from = rotated_path(&self.path, n);
            if from.exists() {
                fs::rename(&from, rotated_path(&self.path, n + 1))?;
            }
        }
        if self.max_files > 0 {
            fs::rename(&self.path, rotated_path(&self.path, 1))?;
        }
        self.file = OpenOptions::new().create(true).write(true).truncate(true).open(&self.path)?;
        self.written = 0;
        Ok(())
    }

    fn remember(&mut self, chunk: &[u8]) {
        self.partial.push_str(&String::from_utf8_lossy(chunk));
        while let Some(pos) = self.partial.find('\n') {
            let line: String = self.partial.drain(..=pos).collect();
            let line = line.trim_end().to_string();
            if line.is_empty() {
                continue;
            }
            if self.ring.len() == RING_CAPACITY {
                self.ring.pop_front();
            }
            self.ring.push_back(line);
        }
    }
}

fn rotated_path(path: &Path, n: usize) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{}", n));
    PathBuf::from(name)
}

/// Size-capped file writer with a ring buffer of recent lines
#[derive(Clone)]
pub struct RollingWriter {
    inner: Arc<Mutex<Inner>>,
}

impl RollingWriter {
    pub fn new(log_dir: &Path, app_name: &str, max_bytes: u64, max_files: usize) -> io::Result<Self> {
        fs::create_dir_all(log_dir)?;
        let path = log_dir.join(format!("{}.log", app_name));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata().map(|m| m.len()).unwrap_or(0);

        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                path,
                file,
                written,
                max_bytes,
                max_files,
                ring: VecDeque::with_capacity(RING_CAPACITY),
                partial: String::new(),
            })),
        })
    }

    pub fn path(&self) -> PathBuf {
        match self.inner.lock() {
            Ok(inner) => inner.path.clone(),
            Err(poisoned) => poisoned.into_inner().path.clone(),
        }
    }

    /// Most recent lines, oldest first
    pub fn recent(&self) -> Vec<String> {
        match self.inner.lock() {
            Ok(inner) => inner.ring.iter().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl Write for RollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer poisoned"))?;
        if inner.written > 0 && inner.written + buf.len() as u64 > inner.max_bytes {
            inner.rotate()?;
        }
        inner.file.write_all(buf)?;
        inner.written += buf.len() as u64;
        inner.remember(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer poisoned"))?;
        inner.file.flush()
    }
}

impl<'a> MakeWriter<'a> for RollingWriter {
    type Writer = RollingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Install the global logger. Fails if a logger is already installed.
pub fn init_logger(log_dir: PathBuf, app_name: &str) -> Result<(), String> {
    let writer = RollingWriter::new(&log_dir, app_name, DEFAULT_MAX_BYTES, DEFAULT_MAX_FILES)
        .map_err(|e| format!("Failed to open log file: {}", e))?;

    tracing_subscriber::registry()
        .with(LevelFilter::INFO)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(writer.clone()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .try_init()
        .map_err(|e| format!("Failed to install logger: {}", e))?;

    GLOBAL
        .set(writer)
        .map_err(|_| "Logger already initialized".to_string())?;

    tracing::info!(
        target: "rolling_logger",
        "=== {} started {} ===",
        app_name,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    Ok(())
}

/// Lines recently written by the global logger, oldest first
pub fn recent_entries() -> Vec<String> {
    GLOBAL.get().map(|w| w.recent()).unwrap_or_default()
}

pub fn info(message: &str) -> Result<(), String> {
    if GLOBAL.get().is_none() {
        return Err("Logger not initialized".to_string());
    }
    log::info!(target: "rolling_logger", "{}", message);
    Ok(())
}

pub fn error(message: &str) -> Result<(), String> {
    if GLOBAL.get().is_none() {
        return Err("Logger not initialized".to_string());
    }
    log::error!(target: "rolling_logger", "{}", message);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_keeps_bounded_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = RollingWriter::new(dir.path(), "app", 64, 2).unwrap();

        for n in 0..20 {
            writeln!(writer, "line number {:02} with some padding", n).unwrap();
        }

        let base = dir.path().join("app.log");
        assert!(base.exists());
        assert!(rotated_path(&base, 1).exists());
        assert!(rotated_path(&base, 2).exists());
        assert!(!rotated_path(&base, 3).exists());
        assert!(fs::metadata(&base).unwrap().len() <= 64);
    }

    #[test]
    fn test_ring_buffer_holds_latest_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = RollingWriter::new(dir.path(), "app", DEFAULT_MAX_BYTES, 1).unwrap();

        for n in 0..(RING_CAPACITY + 10) {
            writeln!(writer, "entry {}", n).unwrap();
        }
        // a line split across writes is recorded once complete
        write!(writer, "half ").unwrap();
        writeln!(writer, "done").unwrap();

        let recent = writer.recent();
        assert_eq!(recent.len(), RING_CAPACITY);
        assert_eq!(recent.first().map(String::as_str), Some("entry 11"));
        assert_eq!(recent.last().map(String::as_str), Some("half done"));
    }

    #[test]
    fn test_helpers_need_initialized_logger() {
        // Nothing in this test binary installs the global logger
        assert!(info("hello").is_err());
        assert!(recent_entries().is_empty());
    }
}
