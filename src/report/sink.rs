//! Reporting sink
//!
//! Receives timestamped log lines and screenshot bytes. Every line goes to the
//! `log` facade, to the run's log file, and into the buffer of the test case
//! currently executing, which the runner drains when the case finishes.

use chrono::Local;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::types::{Attachment, LogEntry};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Debug,
    Warn,
    Error,
    Pass,
    Fail,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Pass => "PASS",
            Level::Fail => "FAIL",
        }
    }

    fn log_level(&self) -> log::Level {
        match self {
            Level::Info | Level::Pass => log::Level::Info,
            Level::Debug => log::Level::Debug,
            Level::Warn => log::Level::Warn,
            Level::Error | Level::Fail => log::Level::Error,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Default)]
struct Pending {
    entries: Vec<LogEntry>,
    attachments: Vec<Attachment>,
}

pub struct Reporter {
    log_file: Option<Mutex<File>>,
    screenshot_dir: PathBuf,
    pending: Mutex<Pending>,
}

impl Reporter {
    /// Sink appending to `log_file`; both directories are created on demand
    pub fn new(log_file: &Path, screenshot_dir: &Path) -> io::Result<Self> {
        if let Some(parent) = log_file.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(log_file)?;

        Ok(Self {
            log_file: Some(Mutex::new(file)),
            screenshot_dir: screenshot_dir.to_path_buf(),
            pending: Mutex::default(),
        })
    }

    /// Sink without a log file
    pub fn console(screenshot_dir: &Path) -> Self {
        Self {
            log_file: None,
            screenshot_dir: screenshot_dir.to_path_buf(),
            pending: Mutex::default(),
        }
    }

    pub fn log(&self, level: Level, message: impl Into<String>) {
        let entry = LogEntry {
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            level: level.as_str().to_string(),
            message: message.into(),
        };

        log::log!(level.log_level(), "[{}] {}", entry.level, entry.message);

        if let Some(file) = &self.log_file {
            if let Ok(mut file) = file.lock() {
                if let Err(e) = writeln!(file, "{}", entry.line()) {
                    log::warn!("Could not write to log file: {}", e);
                }
            }
        }

        if let Ok(mut pending) = self.pending.lock() {
            pending.entries.push(entry);
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(Level::Info, message);
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.log(Level::Debug, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(Level::Warn, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(Level::Error, message);
    }

    pub fn pass(&self, message: impl Into<String>) {
        self.log(Level::Pass, message);
    }

    pub fn fail(&self, message: impl Into<String>) {
        self.log(Level::Fail, message);
    }

    /// Save PNG bytes as `<screenshot dir>/<name>.png` and attach them to the
    /// current test case
    pub fn attach_screenshot(&self, name: &str, png: &[u8]) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.screenshot_dir)?;
        let path = self.screenshot_dir.join(format!("{}.png", file_stem(name)));
        fs::write(&path, png)?;

        if let Ok(mut pending) = self.pending.lock() {
            pending.attachments.push(Attachment {
                name: name.to_string(),
                path: path.display().to_string(),
            });
        }
        self.info(format!("Screenshot taken: {}", name));
        Ok(path)
    }

    /// Drain everything received since the last call
    pub fn take(&self) -> (Vec<LogEntry>, Vec<Attachment>) {
        match self.pending.lock() {
            Ok(mut pending) => {
                let taken = std::mem::take(&mut *pending);
                (taken.entries, taken.attachments)
            }
            Err(_) => (Vec::new(), Vec::new()),
        }
    }
}

/// Screenshot names become file names
fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
