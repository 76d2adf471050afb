// Fake Frog — Diagnostic sink
//
// Console mirror through the `log` facade, plus the run's log file.
//
// Both destinations are best-effort and independent. Text written without a
// newline is held back on the console side and emitted as one record when
// the line completes, so `"Initializing SD card... "` + `"Done."` shows up as
// a single log line. The file receives text exactly as given.

use core::fmt;

use heapless::String;

use crate::config::CONSOLE_LINE_CAPACITY;
use crate::storage::{StorageFile, SyncWrite};

/// Terminal state reached through [`DiagnosticSink::log_fatal`]. Nothing
/// recovers from it short of a restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Halt {
    pub reason: std::string::String,
}

impl fmt::Display for Halt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "halted: {}", self.reason)
    }
}

pub struct DiagnosticSink<W> {
    console_enabled: bool,
    file_enabled: bool,
    file: Option<StorageFile<W>>,
    pending: String<CONSOLE_LINE_CAPACITY>,
    console_lines: u32,
    file_failures: u32,
}

impl<W: SyncWrite> DiagnosticSink<W> {
    pub fn new(console_enabled: bool, file_enabled: bool) -> Self {
        Self {
            console_enabled,
            file_enabled,
            file: None,
            pending: String::new(),
            console_lines: 0,
            file_failures: 0,
        }
    }

    /// Start mirroring to `file`. Ignored when file logging is disabled.
    pub fn attach_file(&mut self, file: StorageFile<W>) {
        if self.file_enabled {
            self.file = Some(file);
        }
    }

    pub fn file(&self) -> Option<&StorageFile<W>> {
        self.file.as_ref()
    }

    pub fn file_enabled(&self) -> bool {
        self.file_enabled
    }

    /// Lines emitted on the console so far.
    pub fn console_lines(&self) -> u32 {
        self.console_lines
    }

    /// Log-file writes that failed so far.
    pub fn file_failures(&self) -> u32 {
        self.file_failures
    }

    pub fn log(&mut self, message: &str, newline: bool) {
        self.log_at(log::Level::Info, message, newline);
    }

    pub fn warn(&mut self, message: &str) {
        self.log_at(log::Level::Warn, message, true);
    }

    /// Log `message`, then enter the halted state.
    #[must_use]
    pub fn log_fatal(&mut self, message: &str) -> Halt {
        self.log_at(log::Level::Error, message, true);
        Halt {
            reason: message.trim().to_owned(),
        }
    }

    fn log_at(&mut self, level: log::Level, message: &str, newline: bool) {
        if self.console_enabled {
            self.console(level, message, newline);
        }
        if self.file_enabled {
            self.append_file(message, newline);
        }
    }

    fn console(&mut self, level: log::Level, message: &str, newline: bool) {
        for c in message.chars() {
            if self.pending.push(c).is_err() {
                // Over-long partial line: emit what we have and carry on.
                self.emit(level);
                let _ = self.pending.push(c);
            }
        }
        if newline {
            self.emit(level);
        }
    }

    fn emit(&mut self, level: log::Level) {
        log::log!(target: "fakefrog", level, "{}", self.pending);
        self.pending.clear();
        self.console_lines += 1;
    }

    fn append_file(&mut self, message: &str, newline: bool) {
        let Some(file) = self.file.as_mut() else {
            return;
        };
        let mut result = file.append_durable(message.as_bytes());
        if result.is_ok() && newline {
            result = file.append_durable(b"\n");
        }
        if let Err(err) = result {
            self.file_failures += 1;
            // Reported once on the console only; the file is what failed.
            if self.file_failures == 1 && self.console_enabled {
                log::warn!(target: "fakefrog", "log file write failed: {}", err);
            }
        }
    }
}
