// Fake Frog — CSV data records
//
// One line per completed sampling cycle:
// `YYYY-MM-DDTHH:MM:SS,<temp1>,...,<tempN>` with two decimals per value.
// A `Timestamp,<label1>,...` header precedes the first line of a fresh file.

use core::fmt::Write as _;

use heapless::String;

use crate::clock::Timestamp;
use crate::config::{ChannelConfig, RECORD_LINE_CAPACITY};
use crate::error::RecordError;
use crate::events::Reading;
use crate::storage::{StorageFile, SyncWrite};

pub type RecordLine = String<RECORD_LINE_CAPACITY>;

/// What happened to one cycle's readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// No valid data file; the readings were discarded.
    Dropped,
}

/// Formats the header line (without line terminator).
pub fn format_header<'a>(
    labels: impl IntoIterator<Item = &'a str>,
) -> Result<RecordLine, RecordError> {
    let mut line = RecordLine::new();
    let overflow = || RecordError::LineTooLong {
        capacity: RECORD_LINE_CAPACITY,
    };
    line.push_str("Timestamp").map_err(|_| overflow())?;
    for label in labels {
        write!(line, ",{label}").map_err(|_| overflow())?;
    }
    Ok(line)
}

/// Formats one data line (without line terminator).
pub fn format_record(ts: &Timestamp, readings: &[Reading]) -> Result<RecordLine, RecordError> {
    let mut line = RecordLine::new();
    let overflow = || RecordError::LineTooLong {
        capacity: RECORD_LINE_CAPACITY,
    };
    write!(line, "{ts}").map_err(|_| overflow())?;
    for reading in readings {
        write!(line, ",{:.2}", reading.temperature_c).map_err(|_| overflow())?;
    }
    Ok(line)
}

/// Appends records to the run's data file. The handle is optional: while it
/// is absent every cycle is dropped.
pub struct RecordWriter<W> {
    file: Option<StorageFile<W>>,
    header: RecordLine,
    header_written: bool,
}

impl<W: SyncWrite> RecordWriter<W> {
    /// `channels` must be in the same order as the readings later passed to
    /// `write_record`.
    pub fn new<'a>(
        file: Option<StorageFile<W>>,
        channels: impl IntoIterator<Item = &'a ChannelConfig>,
    ) -> Result<Self, RecordError> {
        let header = format_header(channels.into_iter().map(|c| c.label.as_str()))?;
        Ok(Self {
            file,
            header,
            header_written: false,
        })
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file.as_ref().map(|f| f.name())
    }

    pub fn file(&self) -> Option<&StorageFile<W>> {
        self.file.as_ref()
    }

    /// Append one record, writing the header first on a fresh file. Each
    /// line is synced to the medium before returning. Nothing is retried.
    pub fn write_record(
        &mut self,
        ts: &Timestamp,
        readings: &[Reading],
    ) -> Result<WriteOutcome, RecordError> {
        let Some(file) = self.file.as_mut() else {
            return Ok(WriteOutcome::Dropped);
        };

        let line = format_record(ts, readings)?;

        if !self.header_written {
            append_line(file, &self.header)?;
            self.header_written = true;
        }

        append_line(file, &line)?;
        Ok(WriteOutcome::Written)
    }
}

/// Line and terminator go out in one durable append.
fn append_line<W: SyncWrite>(file: &mut StorageFile<W>, line: &RecordLine) -> Result<(), RecordError> {
    let mut bytes: heapless::Vec<u8, { RECORD_LINE_CAPACITY + 1 }> = heapless::Vec::new();
    // Capacity is one more than the longest line, so this cannot fail.
    let _ = bytes.extend_from_slice(line.as_bytes());
    let _ = bytes.push(b'\n');
    file.append_durable(&bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoggerConfig;
    use crate::storage::FileRole;
    use std::io::{self, Write};

    fn reading(id: u8, t: f64) -> Reading {
        Reading {
            channel_id: id,
            raw_mean: 0.0,
            resistance_ohm: 0.0,
            temperature_c: t,
        }
    }

    fn contents(writer: &RecordWriter<Vec<u8>>) -> std::string::String {
        std::string::String::from_utf8(writer.file().unwrap().handle().clone()).unwrap()
    }

    #[test]
    fn fresh_file_gets_header_then_line() {
        let cfg = LoggerConfig::with_channels(2);
        let file = StorageFile::new(FileRole::Data, "data_000.csv", Vec::new());
        let mut writer = RecordWriter::new(Some(file), &cfg.channels).unwrap();

        let ts = Timestamp::new(2024, 1, 2, 3, 4, 5).unwrap();
        let outcome = writer
            .write_record(&ts, &[reading(0, 23.45), reading(1, 19.02)])
            .unwrap();

        assert_eq!(outcome, WriteOutcome::Written);
        assert_eq!(
            contents(&writer),
            "Timestamp,Temp1,Temp2\n2024-01-02T03:04:05,23.45,19.02\n"
        );
    }

    #[test]
    fn header_is_written_once() {
        let cfg = LoggerConfig::with_channels(1);
        let file = StorageFile::new(FileRole::Data, "data_000.csv", Vec::new());
        let mut writer = RecordWriter::new(Some(file), &cfg.channels).unwrap();
        let ts = Timestamp::new(2024, 1, 2, 3, 4, 5).unwrap();

        writer.write_record(&ts, &[reading(0, 1.0)]).unwrap();
        writer.write_record(&ts, &[reading(0, -2.5)]).unwrap();

        let text = contents(&writer);
        assert_eq!(text.lines().count(), 3);
        assert_eq!(text.matches("Timestamp").count(), 1);
        assert!(text.ends_with("2024-01-02T03:04:05,-2.50\n"));
    }

    #[test]
    fn missing_handle_drops_silently() {
        let cfg = LoggerConfig::with_channels(1);
        let mut writer: RecordWriter<Vec<u8>> = RecordWriter::new(None, &cfg.channels).unwrap();
        let ts = Timestamp::new(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            writer.write_record(&ts, &[reading(0, 1.0)]).unwrap(),
            WriteOutcome::Dropped
        );
    }

    #[test]
    fn values_are_rounded_to_two_decimals() {
        let ts = Timestamp::new(2024, 1, 2, 3, 4, 5).unwrap();
        let line = format_record(&ts, &[reading(0, 21.005_1), reading(1, -1.236)]).unwrap();
        assert_eq!(line.as_str(), "2024-01-02T03:04:05,21.01,-1.24");
    }

    struct BrokenCard;

    impl Write for BrokenCard {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "card removed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SyncWrite for BrokenCard {
        fn sync(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Fails only the write with the given index, counting from zero.
    struct FlakyCard {
        written: Vec<u8>,
        writes: usize,
        fail_at: usize,
    }

    impl Write for FlakyCard {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let index = self.writes;
            self.writes += 1;
            if index == self.fail_at {
                return Err(io::Error::new(io::ErrorKind::Other, "card busy"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SyncWrite for FlakyCard {
        fn sync(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_line_after_header_does_not_repeat_header() {
        let cfg = LoggerConfig::with_channels(1);
        let card = FlakyCard {
            written: Vec::new(),
            writes: 0,
            fail_at: 1,
        };
        let file = StorageFile::new(FileRole::Data, "data_000.csv", card);
        let mut writer = RecordWriter::new(Some(file), &cfg.channels).unwrap();
        let ts = Timestamp::new(2024, 1, 2, 3, 4, 5).unwrap();

        assert!(writer.write_record(&ts, &[reading(0, 1.0)]).is_err());
        assert_eq!(
            writer.write_record(&ts, &[reading(0, 2.0)]).unwrap(),
            WriteOutcome::Written
        );

        let text = std::string::String::from_utf8(writer.file().unwrap().handle().written.clone()).unwrap();
        assert_eq!(text, "Timestamp,Temp1\n2024-01-02T03:04:05,2.00\n");
    }

    #[test]
    fn io_failure_is_reported() {
        let cfg = LoggerConfig::with_channels(1);
        let file = StorageFile::new(FileRole::Data, "data_000.csv", BrokenCard);
        let mut writer = RecordWriter::new(Some(file), &cfg.channels).unwrap();
        let ts = Timestamp::new(2024, 1, 2, 3, 4, 5).unwrap();
        assert!(matches!(
            writer.write_record(&ts, &[reading(0, 1.0)]),
            Err(RecordError::Io(_))
        ));
    }
}
