//! Log sinks
//!
//! Info/access lines and error/warning lines each go to their own sink: a
//! console stream by default, or an append-mode file when configured.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

#[derive(Debug, Clone, Copy)]
enum Console {
    Stdout,
    Stderr,
}

enum LogTarget {
    Console(Console),
    File(Mutex<File>),
}

impl LogTarget {
    /// File sink for `path`, or `fallback` when no path is configured
    fn open(path: Option<&str>, fallback: Console) -> io::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::Console(fallback));
        };

        let path = Path::new(path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::File(Mutex::new(file)))
    }

    fn write_line(&self, message: &str) {
        match self {
            Self::Console(Console::Stdout) => println!("{message}"),
            Self::Console(Console::Stderr) => eprintln!("{message}"),
            // A poisoned lock or a failed write drops the line
            Self::File(file) => {
                if let Ok(mut f) = file.lock() {
                    let _ = writeln!(f, "{message}");
                }
            }
        }
    }
}

pub struct LogWriter {
    access: LogTarget,
    error: LogTarget,
}

impl LogWriter {
    fn new(access_log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<Self> {
        Ok(Self {
            access: LogTarget::open(access_log_file, Console::Stdout)?,
            error: LogTarget::open(error_log_file, Console::Stderr)?,
        })
    }

    pub fn write_access(&self, message: &str) {
        self.access.write_line(message);
    }

    pub fn write_error(&self, message: &str) {
        self.error.write_line(message);
    }
}

/// Install the process-wide writer. Fails if a log file cannot be opened or
/// the writer is already installed.
pub fn init(access_log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<()> {
    let writer = LogWriter::new(access_log_file, error_log_file)?;
    LOG_WRITER
        .set(writer)
        .map_err(|_| io::Error::new(io::ErrorKind::AlreadyExists, "logger already initialized"))
}

/// The installed writer; `None` before `init`, e.g. in unit tests
pub fn get() -> Option<&'static LogWriter> {
    LOG_WRITER.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_target_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let access = dir.path().join("nested/access.log");
        let error = dir.path().join("error.log");

        let writer = LogWriter::new(access.to_str(), error.to_str()).unwrap();
        writer.write_access("first");
        writer.write_access("second");
        writer.write_error("boom");

        assert_eq!(std::fs::read_to_string(&access).unwrap(), "first\nsecond\n");
        assert_eq!(std::fs::read_to_string(&error).unwrap(), "boom\n");
    }

    #[test]
    fn test_existing_file_is_appended() {
        let dir = tempfile::tempdir().unwrap();
        let access = dir.path().join("access.log");
        std::fs::write(&access, "earlier\n").unwrap();

        let writer = LogWriter::new(access.to_str(), None).unwrap();
        writer.write_access("later");

        assert_eq!(std::fs::read_to_string(&access).unwrap(), "earlier\nlater\n");
    }
}
