// Fake Frog — Cadence Scheduler
//
// Boot brings the board up in a fixed order, each failure fatal:
//   1. Storage medium ("Initializing SD card... ").
//   2. Log file (when file logging is on).
//   3. Real-time clock, then the optional serial clock prompt.
//   4. Data file.
//   5. Start-up banner with the clock time and software version.
//
// After boot, `tick` runs once per second: every `reading_interval_s` it reads
// the RTC, samples all channels and appends one record. The end-of-tick sleep
// absorbs the time spent working so the counters track wall-clock seconds.

use std::io::BufRead;

use crate::clock::Timestamp;
use crate::config::{LoggerConfig, VERSION};
use crate::diag::{DiagnosticSink, Halt};
use crate::drivers::{AnalogInput, RealTimeClock, Timebase};
use crate::error::StorageError;
use crate::events::{Reading, StatusSnapshot, UiRequest};
use crate::record::{RecordWriter, WriteOutcome};
use crate::rtc_setup;
use crate::storage::{open_storage_file, FileRole, StorageMedium, SyncWrite};
use crate::tasks::sampler::ChannelSampler;

/// The display/buttons side, polled once per tick.
pub trait Interactive {
    /// Whether `poll` wants the current clock in its snapshot. Reading the
    /// RTC costs a bus transaction, so it is skipped when nothing is shown.
    fn needs_clock(&self) -> bool {
        false
    }

    fn poll(&mut self, status: &StatusSnapshot<'_>) -> Option<UiRequest>;
}

/// Headless operation.
impl Interactive for () {
    fn poll(&mut self, _status: &StatusSnapshot<'_>) -> Option<UiRequest> {
        None
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleState {
    /// Seconds since the last reading.
    pub elapsed_s: u64,
    pub last_processing_ms: u64,
    pub uptime_s: u64,
    pub iterations: u64,
    pub records_written: u32,
    pub records_dropped: u32,
}

/// Hardware handed to [`boot`]. `medium` is the outcome of mounting the
/// card, so a failed mount is reported through the boot log like any other
/// step.
pub struct Board<M, A, C, T> {
    pub medium: Result<M, StorageError>,
    pub inputs: Vec<A>,
    pub rtc: C,
    pub timebase: T,
}

pub struct DataLogger<W, A, C, T> {
    config: LoggerConfig,
    sampler: ChannelSampler<A>,
    rtc: C,
    timebase: T,
    writer: RecordWriter<W>,
    sink: DiagnosticSink<W>,
    state: ScheduleState,
    started_at: Timestamp,
}

/// Bring the logger up. On any fatal step the failure is logged and the
/// returned [`Halt`] is the end of the run.
pub fn boot<M, A, C, T>(
    config: LoggerConfig,
    board: Board<M, A, C, T>,
    clock_prompt: Option<&mut dyn BufRead>,
) -> Result<DataLogger<M::File, A, C, T>, Halt>
where
    M: StorageMedium,
    A: AnalogInput,
    C: RealTimeClock,
    T: Timebase,
{
    let Board {
        medium,
        inputs,
        mut rtc,
        timebase,
    } = board;
    let mut sink = DiagnosticSink::new(config.serial_logging, config.file_logging);

    // ---- Storage ------------------------------------------------------------
    sink.log("Initializing SD card... ", false);
    let mut medium = match medium {
        Ok(medium) => medium,
        Err(err) => return Err(sink.log_fatal(&format!("Failed. ({})", err))),
    };
    sink.log("Done.", true);

    // ---- Log file -----------------------------------------------------------
    if config.file_logging {
        sink.log("Creating log file... ", false);
        match open_storage_file(
            &mut medium,
            FileRole::Log,
            config.log_prefix,
            config.log_extension,
            config.max_log_files,
        ) {
            Ok(file) => {
                sink.attach_file(file);
                sink.log("Done.", true);
            }
            Err(err) => return Err(sink.log_fatal(&format!("Failed. ({})", err))),
        }
    }

    // ---- RTC ----------------------------------------------------------------
    sink.log("Initializing RTC... ", false);
    if let Err(err) = rtc.begin() {
        return Err(sink.log_fatal(&format!("Failed. ({})", err)));
    }
    sink.log("Done.", true);

    if let Some(input) = clock_prompt {
        match rtc_setup::prompt_clock(input) {
            Ok(Some(ts)) => match rtc.adjust(&ts) {
                Ok(()) => sink.log(&format!("Clock set to {}", ts), true),
                Err(err) => sink.warn(&format!("Clock not set: {}", err)),
            },
            Ok(None) => {}
            Err(err) => sink.warn(&format!("Clock not set: {}", err)),
        }
    }

    // ---- Data file ----------------------------------------------------------
    sink.log("Creating data file... ", false);
    let data_file = match open_storage_file(
        &mut medium,
        FileRole::Data,
        config.data_prefix,
        config.data_extension,
        config.max_data_files,
    ) {
        Ok(file) => file,
        Err(err) => return Err(sink.log_fatal(&format!("Failed. ({})", err))),
    };
    sink.log("Done.", true);
    sink.log(&format!("Writing readings to {}", data_file.name()), true);

    // ---- Channels -----------------------------------------------------------
    let wired = inputs.len();
    let sampler = ChannelSampler::new(
        &config.channels,
        inputs,
        config.sample_count,
        config.sample_delay_ms,
        config.adc_max_code,
    );
    if wired != config.channels.len() {
        sink.warn(&format!(
            "{} channels configured but {} inputs wired, logging {}",
            config.channels.len(),
            wired,
            sampler.channel_count()
        ));
    }

    // Columns follow the sampler's id order, so the header does too.
    let writer = match RecordWriter::new(Some(data_file), sampler.channels()) {
        Ok(writer) => writer,
        Err(err) => return Err(sink.log_fatal(&format!("Bad CSV header: {}", err))),
    };

    // ---- Banner -------------------------------------------------------------
    let started_at = match rtc.now() {
        Ok(ts) => ts,
        Err(err) => return Err(sink.log_fatal(&format!("Couldn't read RTC: {}", err))),
    };
    sink.log(
        &format!(
            "Data logger started at {}. Software version: {}",
            started_at, VERSION
        ),
        true,
    );

    Ok(DataLogger {
        config,
        sampler,
        rtc,
        timebase,
        writer,
        sink,
        state: ScheduleState::default(),
        started_at,
    })
}

impl<W, A, C, T> DataLogger<W, A, C, T>
where
    W: SyncWrite,
    A: AnalogInput,
    C: RealTimeClock,
    T: Timebase,
{
    pub fn state(&self) -> &ScheduleState {
        &self.state
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    pub fn readings(&self) -> &[Reading] {
        self.sampler.readings()
    }

    pub fn data_file_name(&self) -> Option<&str> {
        self.writer.file_name()
    }

    pub fn diagnostics(&self) -> &DiagnosticSink<W> {
        &self.sink
    }

    pub fn rtc_mut(&mut self) -> &mut C {
        &mut self.rtc
    }

    /// One scheduler iteration, including the end-of-tick sleep.
    pub fn tick<I: Interactive + ?Sized>(&mut self, ui: &mut I) {
        let start = self.timebase.now_ms();

        if self.state.elapsed_s >= self.config.reading_interval_s as u64 {
            self.state.elapsed_s = 0;
            self.take_reading();
        }

        self.poll_ui(ui, start);

        // Whole seconds of overrun are counted rather than lost, and the
        // sleep only fills the rest of the current second.
        let tick_ms = self.config.tick_ms.max(1);
        let processing = self.timebase.now_ms().saturating_sub(start);
        let overrun_s = processing / tick_ms;
        if overrun_s > 0 {
            log::debug!("Tick overran by {} s ({} ms)", overrun_s, processing);
        }
        self.state.elapsed_s += overrun_s;
        self.state.uptime_s += overrun_s;

        self.timebase.delay_ms(tick_ms - processing % tick_ms);

        self.state.elapsed_s += 1;
        self.state.uptime_s += 1;
        self.state.iterations += 1;
        self.state.last_processing_ms = processing;
    }

    /// Run `count` iterations back to back.
    pub fn run_ticks<I: Interactive + ?Sized>(&mut self, ui: &mut I, count: u64) {
        for _ in 0..count {
            self.tick(ui);
        }
    }

    fn take_reading(&mut self) {
        let ts = match self.rtc.now() {
            Ok(ts) => ts,
            Err(err) => {
                self.sink.warn(&format!("RTC read failed, reading skipped: {}", err));
                self.state.records_dropped += 1;
                return;
            }
        };

        let readings = match self.sampler.sample_all(&mut self.timebase) {
            Ok(readings) => readings,
            Err(err) => {
                self.sink.warn(&format!("Sensor read failed, reading skipped: {}", err));
                self.state.records_dropped += 1;
                return;
            }
        };

        match self.writer.write_record(&ts, readings) {
            Ok(WriteOutcome::Written) => {
                self.state.records_written += 1;
                log::debug!("Record {} at {}", self.state.records_written, ts);
            }
            Ok(WriteOutcome::Dropped) => self.state.records_dropped += 1,
            Err(err) => {
                self.state.records_dropped += 1;
                self.sink.warn(&format!("Couldn't save reading: {}", err));
            }
        }
    }

    fn poll_ui<I: Interactive + ?Sized>(&mut self, ui: &mut I, now_ms: u64) {
        let clock = if ui.needs_clock() {
            self.rtc.now().ok()
        } else {
            None
        };
        let snapshot = StatusSnapshot {
            now_ms,
            clock,
            readings: self.sampler.readings(),
            data_file: self.writer.file_name(),
            uptime_s: self.state.uptime_s,
            records_written: self.state.records_written,
        };

        match ui.poll(&snapshot) {
            Some(UiRequest::SetClock(ts)) => match self.rtc.adjust(&ts) {
                Ok(()) => self.sink.log(&format!("Clock set to {}", ts), true),
                Err(err) => self.sink.warn(&format!("Clock not set: {}", err)),
            },
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChannelConfig, ADC_MAX_CODE};
    use crate::convert;
    use crate::drivers::sim::{ManualClock, MemoryCard, MemoryFile, ScriptedAnalog, VirtualTimebase};
    use std::io::Cursor;

    type TestLogger = DataLogger<MemoryFile, ScriptedAnalog, ManualClock, VirtualTimebase>;

    fn start() -> Timestamp {
        Timestamp::new(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn config(interval_s: u32) -> LoggerConfig {
        LoggerConfig {
            sample_count: 1,
            sample_delay_ms: 0,
            reading_interval_s: interval_s,
            ..LoggerConfig::default()
        }
    }

    fn board(
        card: &MemoryCard,
        tb: &VirtualTimebase,
        input: ScriptedAnalog,
    ) -> Board<MemoryCard, ScriptedAnalog, ManualClock, VirtualTimebase> {
        Board {
            medium: Ok(card.clone()),
            inputs: vec![input],
            rtc: ManualClock::new(start(), tb),
            timebase: tb.clone(),
        }
    }

    fn booted(interval_s: u32, input: ScriptedAnalog) -> (TestLogger, MemoryCard, VirtualTimebase) {
        let card = MemoryCard::new();
        let tb = VirtualTimebase::new();
        let logger = boot(config(interval_s), board(&card, &tb, input), None).unwrap();
        (logger, card, tb)
    }

    #[test]
    fn boot_creates_log_and_data_files() {
        let (logger, card, _) = booted(60, ScriptedAnalog::constant(0, 512));
        assert_eq!(card.names(), ["data_000.csv", "log_000.txt"]);
        assert_eq!(logger.data_file_name(), Some("data_000.csv"));

        let log = card.contents("log_000.txt").unwrap();
        assert!(log.starts_with("Done.\nInitializing RTC... Done.\n"), "{log}");
        assert!(log.contains(&format!(
            "Data logger started at 2024-01-01T00:00:00. Software version: {}\n",
            VERSION
        )));
        // Header waits for the first record.
        assert_eq!(card.contents("data_000.csv").as_deref(), Some(""));
    }

    #[test]
    fn reading_fires_every_interval() {
        let (mut logger, card, tb) = booted(5, ScriptedAnalog::constant(0, 512));
        logger.run_ticks(&mut (), 20);

        assert_eq!(logger.state().records_written, 3);
        assert_eq!(tb.now_ms(), 20_000);
        assert_eq!(
            card.contents("data_000.csv").unwrap(),
            "Timestamp,Temp1\n\
             2024-01-01T00:00:05,24.96\n\
             2024-01-01T00:00:10,24.96\n\
             2024-01-01T00:00:15,24.96\n"
        );
    }

    #[test]
    fn columns_are_labelled_in_channel_id_order() {
        let tb = VirtualTimebase::new();
        let card = MemoryCard::new();
        let cfg = LoggerConfig {
            channels: [ChannelConfig::standard(1), ChannelConfig::standard(0)]
                .into_iter()
                .collect(),
            ..config(1)
        };
        let b = Board {
            medium: Ok(card.clone()),
            // Paired with the configured order: channel 1 reads 700, channel 0 reads 300.
            inputs: vec![ScriptedAnalog::constant(1, 700), ScriptedAnalog::constant(0, 300)],
            rtc: ManualClock::new(start(), &tb),
            timebase: tb.clone(),
        };
        let mut logger = boot(cfg, b, None).unwrap();
        logger.run_ticks(&mut (), 2);

        let data = card.contents("data_000.csv").unwrap();
        let mut lines = data.lines();
        assert_eq!(lines.next(), Some("Timestamp,Temp1,Temp2"));

        let fields: Vec<&str> = lines.next().unwrap().split(',').collect();
        let expected = |raw: u16| {
            let channel = ChannelConfig::standard(0);
            let t = convert::temperature_from_resistance(
                convert::resistance_from_raw(raw as f64, channel.series_resistance, ADC_MAX_CODE),
                channel.nominal_resistance,
                channel.beta,
                convert::celsius_to_kelvin(channel.nominal_temp_c),
            );
            format!("{:.2}", t)
        };
        assert_eq!(fields[1], expected(300));
        assert_eq!(fields[2], expected(700));
    }

    #[test]
    fn unwired_channels_are_left_out_of_the_header() {
        let tb = VirtualTimebase::new();
        let card = MemoryCard::new();
        let cfg = LoggerConfig {
            sample_count: 1,
            sample_delay_ms: 0,
            reading_interval_s: 1,
            ..LoggerConfig::with_channels(2)
        };
        let mut logger = boot(cfg, board(&card, &tb, ScriptedAnalog::constant(0, 512)), None).unwrap();
        logger.run_ticks(&mut (), 2);

        assert_eq!(
            card.contents("data_000.csv").unwrap(),
            "Timestamp,Temp1\n2024-01-01T00:00:01,24.96\n"
        );
        let log = card.contents("log_000.txt").unwrap();
        assert!(log.contains("2 channels configured but 1 inputs wired, logging 1"), "{log}");
    }

    #[test]
    fn slow_cycles_do_not_drift() {
        let tb = VirtualTimebase::new();
        let card = MemoryCard::new();
        let input = ScriptedAnalog::constant(0, 512).with_cost(&tb, 1400);
        let mut logger = boot(config(0), board(&card, &tb, input), None).unwrap();

        logger.run_ticks(&mut (), 10);

        let state = logger.state();
        assert_eq!(state.iterations, 10);
        assert_eq!(state.uptime_s, 20);
        assert_eq!(state.last_processing_ms, 1400);
        assert_eq!(tb.now_ms(), 20_000);
        assert_eq!(state.uptime_s * 1000, tb.now_ms());
    }

    #[test]
    fn sensor_failure_drops_the_cycle() {
        let (mut logger, card, _) = booted(1, ScriptedAnalog::new(0, []));
        logger.run_ticks(&mut (), 3);

        assert_eq!(logger.state().records_written, 0);
        // Ticks 1 and 2 both attempt a reading.
        assert_eq!(logger.state().records_dropped, 2);
        assert_eq!(card.contents("data_000.csv").as_deref(), Some(""));
        assert!(card.contents("log_000.txt").unwrap().contains("Sensor read failed"));
    }

    #[test]
    fn unmounted_card_halts() {
        let tb = VirtualTimebase::new();
        let mut b = board(&MemoryCard::new(), &tb, ScriptedAnalog::constant(0, 512));
        b.medium = Err(StorageError::Unavailable {
            path: "/sdcard".into(),
        });
        let halt = boot(config(60), b, None).err().unwrap();
        assert!(halt.reason.starts_with("Failed."), "{}", halt.reason);
        assert!(halt.reason.contains("/sdcard"));
    }

    #[test]
    fn missing_rtc_halts() {
        let tb = VirtualTimebase::new();
        let card = MemoryCard::new();
        let mut b = board(&card, &tb, ScriptedAnalog::constant(0, 512));
        b.rtc = ManualClock::missing(&tb);
        assert!(boot(config(60), b, None).is_err());
        assert!(card.contents("log_000.txt").unwrap().contains("Failed."));
        assert!(card.contents("data_000.csv").is_none());
    }

    #[test]
    fn exhausted_data_slots_halt() {
        let tb = VirtualTimebase::new();
        let card = MemoryCard::with_files(["data_000.csv", "data_001.csv"]);
        let cfg = LoggerConfig {
            max_data_files: 2,
            ..config(60)
        };
        let halt = boot(cfg, board(&card, &tb, ScriptedAnalog::constant(0, 512)), None)
            .err()
            .unwrap();
        assert!(halt.reason.contains("data_NNN.csv"), "{}", halt.reason);
    }

    #[test]
    fn clock_prompt_sets_rtc() {
        let card = MemoryCard::new();
        let tb = VirtualTimebase::new();
        let mut answers = Cursor::new(&b"y\n2030\n6\n15\n8\n30\n0\n"[..]);
        let b = board(&card, &tb, ScriptedAnalog::constant(0, 512));
        let mut logger = boot(config(60), b, Some(&mut answers as &mut dyn BufRead)).unwrap();
        assert_eq!(logger.started_at().to_string(), "2030-06-15T08:30:00");
        assert_eq!(logger.rtc_mut().now().unwrap().year, 2030);
    }

    struct SetClockOnce(Option<Timestamp>);

    impl Interactive for SetClockOnce {
        fn poll(&mut self, _status: &StatusSnapshot<'_>) -> Option<UiRequest> {
            self.0.take().map(UiRequest::SetClock)
        }
    }

    #[test]
    fn ui_clock_request_reaches_rtc() {
        let (mut logger, card, _) = booted(1, ScriptedAnalog::constant(0, 512));
        let target = Timestamp::new(2025, 7, 1, 12, 0, 0).unwrap();
        let mut ui = SetClockOnce(Some(target));

        logger.tick(&mut ui); // no reading on the first tick, clock set
        logger.tick(&mut ui); // reading one second later

        let data = card.contents("data_000.csv").unwrap();
        assert!(data.ends_with("2025-07-01T12:00:01,24.96\n"), "{data}");
        assert!(card.contents("log_000.txt").unwrap().contains("Clock set to 2025-07-01T12:00:00"));
    }
}
