// Fake Frog — Error types

use std::io;

/// Failures of the storage medium or of the file-name allocator.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The medium is not mounted or not reachable.
    #[error("storage medium unavailable at '{path}'")]
    Unavailable { path: String },

    /// Every slot `<prefix>000<ext>..<prefix>{max-1}<ext>` already exists.
    #[error("no free file name for '{prefix}NNN{extension}' (all {max_index} slots in use)")]
    Exhausted {
        prefix: String,
        extension: String,
        max_index: u16,
    },

    #[error("storage i/o error: {0}")]
    Io(#[from] io::Error),
}

/// Failures reading an analog input.
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error("ADC read failed on channel {channel}: {detail}")]
    ReadFailed { channel: u8, detail: String },
}

/// Failures of the real-time clock or of timestamp validation.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    #[error("real-time clock not responding: {0}")]
    Unavailable(String),

    #[error("invalid date/time {year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}")]
    InvalidTimestamp {
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    },

    #[error("clock i/o error: {0}")]
    Io(#[from] io::Error),
}

/// Failures appending a data record.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("record line exceeds {capacity} bytes")]
    LineTooLong { capacity: usize },

    #[error("record write failed: {0}")]
    Io(#[from] io::Error),
}
