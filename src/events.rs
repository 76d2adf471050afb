// Fake Frog — Data Types & UI Events

use crate::clock::Timestamp;

// ---------------------------------------------------------------------------
// Reading (one thermistor channel, one sampling cycle)
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Reading {
    pub channel_id: u8,
    /// Mean of the raw ADC codes taken this cycle.
    pub raw_mean: f64,
    pub resistance_ohm: f64,
    pub temperature_c: f64,
}

// ---------------------------------------------------------------------------
// Display Modes (all keep logging)
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// Blank screen.
    #[default]
    Idle,
    /// Clock, latest temperature, data file.
    Information,
    /// Field-by-field clock editor.
    RtcEditor,
}

impl DisplayMode {
    /// Order the mode button cycles through.
    pub fn next(self) -> Self {
        match self {
            Self::Idle => Self::Information,
            Self::Information => Self::RtcEditor,
            Self::RtcEditor => Self::Idle,
        }
    }
}

// ---------------------------------------------------------------------------
// Button Events: produced by the debouncer on a press edge
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    /// Mode button: cycle display modes / move to the next clock field.
    Mode,
    /// Select button: increment the clock field under the cursor.
    Select,
}

// ---------------------------------------------------------------------------
// UI Requests: returned to the scheduler, which owns the RTC
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiRequest {
    SetClock(Timestamp),
}

// ---------------------------------------------------------------------------
// Status snapshot handed to the UI each tick
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy)]
pub struct StatusSnapshot<'a> {
    pub now_ms: u64,
    pub clock: Option<Timestamp>,
    pub readings: &'a [Reading],
    pub data_file: Option<&'a str>,
    pub uptime_s: u64,
    pub records_written: u32,
}
