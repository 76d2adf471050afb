// Fake Frog — Simulated hardware
//
// `SimulatedThermistor` feeds the host build with plausible ADC codes. The
// virtual-time doubles let the scheduler be driven through hours of ticks
// without sleeping.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::io::{self, Write};
use std::rc::Rc;

use chrono::{NaiveDateTime, TimeDelta};

use crate::clock::Timestamp;
use crate::config::ChannelConfig;
use crate::convert;
use crate::drivers::{AnalogInput, Button, RealTimeClock, Timebase};
use crate::error::{ClockError, SensorError, StorageError};
use crate::storage::{StorageMedium, SyncWrite};

/// Produces the ADC code of a thermistor at `base_temp_c`, with a small
/// deterministic ripple (±`ripple_c`) standing in for input noise.
pub struct SimulatedThermistor {
    channel: ChannelConfig,
    adc_max_code: f64,
    base_temp_c: f64,
    ripple_c: f64,
    step: u32,
}

impl SimulatedThermistor {
    pub fn new(channel: ChannelConfig, adc_max_code: f64, base_temp_c: f64) -> Self {
        Self {
            channel,
            adc_max_code,
            base_temp_c,
            ripple_c: 0.25,
            step: 0,
        }
    }

    pub fn with_ripple(mut self, ripple_c: f64) -> Self {
        self.ripple_c = ripple_c;
        self
    }
}

impl AnalogInput for SimulatedThermistor {
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        // Triangle wave over 8 reads: -1, -0.5, 0, 0.5, 1, 0.5, 0, -0.5
        let phase = (self.step % 8) as f64;
        let wave = if phase <= 4.0 { phase / 2.0 - 1.0 } else { 3.0 - phase / 2.0 };
        self.step = self.step.wrapping_add(1);

        let temp = self.base_temp_c + wave * self.ripple_c;
        let r = convert::resistance_from_temperature(
            temp,
            self.channel.nominal_resistance,
            self.channel.beta,
            convert::celsius_to_kelvin(self.channel.nominal_temp_c),
        );
        let raw = convert::raw_from_resistance(r, self.channel.series_resistance, self.adc_max_code);
        Ok(raw.round().clamp(0.0, self.adc_max_code) as u16)
    }
}

/// Shared virtual clock in milliseconds. Clones observe the same time, so a
/// test can hand one clone to the logger and advance another.
#[derive(Clone, Default)]
pub struct VirtualTimebase {
    now: Rc<Cell<u64>>,
    slept: Rc<Cell<u64>>,
}

impl VirtualTimebase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate work that takes `ms`.
    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }

    /// Total time spent in `delay_ms`.
    pub fn slept_ms(&self) -> u64 {
        self.slept.get()
    }
}

impl Timebase for VirtualTimebase {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    fn delay_ms(&mut self, ms: u64) {
        self.advance(ms);
        self.slept.set(self.slept.get() + ms);
    }
}

/// Replays a fixed list of raw codes, then repeats the last one. An empty
/// script fails every read.
pub struct ScriptedAnalog {
    channel: u8,
    codes: VecDeque<u16>,
    last: Option<u16>,
    cost_ms: u64,
    timebase: Option<VirtualTimebase>,
}

impl ScriptedAnalog {
    pub fn new(channel: u8, codes: impl IntoIterator<Item = u16>) -> Self {
        Self {
            channel,
            codes: codes.into_iter().collect(),
            last: None,
            cost_ms: 0,
            timebase: None,
        }
    }

    pub fn constant(channel: u8, code: u16) -> Self {
        Self::new(channel, [code])
    }

    /// Charge `cost_ms` of virtual time for every conversion.
    pub fn with_cost(mut self, timebase: &VirtualTimebase, cost_ms: u64) -> Self {
        self.timebase = Some(timebase.clone());
        self.cost_ms = cost_ms;
        self
    }
}

impl AnalogInput for ScriptedAnalog {
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        if let Some(tb) = &self.timebase {
            tb.advance(self.cost_ms);
        }
        if let Some(code) = self.codes.pop_front() {
            self.last = Some(code);
        }
        self.last.ok_or_else(|| SensorError::ReadFailed {
            channel: self.channel,
            detail: "no signal".into(),
        })
    }
}

/// RTC that ticks with a [`VirtualTimebase`] from a fixed start time.
pub struct ManualClock {
    start: NaiveDateTime,
    timebase: VirtualTimebase,
    present: bool,
}

impl ManualClock {
    pub fn new(start: Timestamp, timebase: &VirtualTimebase) -> Self {
        Self {
            start: start.to_naive().unwrap_or_default(),
            timebase: timebase.clone(),
            present: true,
        }
    }

    /// A clock that fails `begin` and every read.
    pub fn missing(timebase: &VirtualTimebase) -> Self {
        Self {
            start: NaiveDateTime::default(),
            timebase: timebase.clone(),
            present: false,
        }
    }

    fn elapsed(&self) -> TimeDelta {
        TimeDelta::milliseconds(self.timebase.now_ms() as i64)
    }

    fn check(&self) -> Result<(), ClockError> {
        if self.present {
            Ok(())
        } else {
            Err(ClockError::Unavailable("no acknowledge".into()))
        }
    }
}

impl RealTimeClock for ManualClock {
    fn begin(&mut self) -> Result<(), ClockError> {
        self.check()
    }

    fn now(&mut self) -> Result<Timestamp, ClockError> {
        self.check()?;
        Ok(Timestamp::from_naive(&(self.start + self.elapsed())))
    }

    fn adjust(&mut self, ts: &Timestamp) -> Result<(), ClockError> {
        self.check()?;
        let target = ts.to_naive().ok_or(ClockError::InvalidTimestamp {
            year: ts.year,
            month: ts.month,
            day: ts.day,
            hour: ts.hour,
            minute: ts.minute,
            second: ts.second,
        })?;
        self.start = target - self.elapsed();
        Ok(())
    }
}

/// Button whose state is set from outside through a shared cell.
#[derive(Clone, Default)]
pub struct SharedButton {
    pressed: Rc<Cell<bool>>,
}

impl SharedButton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, pressed: bool) {
        self.pressed.set(pressed);
    }
}

impl Button for SharedButton {
    fn is_pressed(&mut self) -> bool {
        self.pressed.get()
    }
}

/// In-memory storage medium. Clones share the same files, so a test can keep
/// one and read back what the logger wrote.
#[derive(Clone, Default)]
pub struct MemoryCard {
    files: Rc<RefCell<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryCard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A card that already holds empty files called `names`.
    pub fn with_files<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let card = Self::new();
        for name in names {
            card.files.borrow_mut().insert(name.to_owned(), Vec::new());
        }
        card
    }

    pub fn names(&self) -> Vec<String> {
        self.files.borrow().keys().cloned().collect()
    }

    pub fn contents(&self, name: &str) -> Option<String> {
        self.files
            .borrow()
            .get(name)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

impl StorageMedium for MemoryCard {
    type File = MemoryFile;

    fn exists(&self, name: &str) -> Result<bool, StorageError> {
        Ok(self.files.borrow().contains_key(name))
    }

    fn create(&mut self, name: &str) -> Result<MemoryFile, StorageError> {
        let mut files = self.files.borrow_mut();
        if files.contains_key(name) {
            return Err(io::Error::new(io::ErrorKind::AlreadyExists, name.to_owned()).into());
        }
        files.insert(name.to_owned(), Vec::new());
        Ok(MemoryFile {
            name: name.to_owned(),
            files: Rc::clone(&self.files),
        })
    }
}

/// Append handle onto one [`MemoryCard`] entry.
pub struct MemoryFile {
    name: String,
    files: Rc<RefCell<BTreeMap<String, Vec<u8>>>>,
}

impl Write for MemoryFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.files
            .borrow_mut()
            .entry(self.name.clone())
            .or_default()
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SyncWrite for MemoryFile {
    fn sync(&mut self) -> io::Result<()> {
        Ok(())
    }
}
