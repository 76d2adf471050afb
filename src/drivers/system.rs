// Fake Frog — std-backed drivers
//
// `SystemTimebase` is used on every target (ESP-IDF maps std threads and
// `thread::sleep` onto FreeRTOS). `SystemClock` and `LogDisplay` stand in for
// the RTC and the OLED when running on a desktop.

use std::thread;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDateTime, TimeDelta};

use crate::clock::Timestamp;
use crate::config::LCD_ROWS;
use crate::drivers::{RealTimeClock, TextDisplay, Timebase};
use crate::error::ClockError;

/// Milliseconds since construction; delays block the calling thread.
pub struct SystemTimebase {
    start: Instant,
}

impl SystemTimebase {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemTimebase {
    fn default() -> Self {
        Self::new()
    }
}

impl Timebase for SystemTimebase {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn delay_ms(&mut self, ms: u64) {
        thread::sleep(Duration::from_millis(ms));
    }
}

/// Host wall clock. `adjust` stores an offset from local time rather than
/// touching the system clock.
pub struct SystemClock {
    offset: TimeDelta,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            offset: TimeDelta::zero(),
        }
    }

    fn local_now() -> NaiveDateTime {
        Local::now().naive_local()
    }
}

impl RealTimeClock for SystemClock {
    fn begin(&mut self) -> Result<(), ClockError> {
        Ok(())
    }

    fn now(&mut self) -> Result<Timestamp, ClockError> {
        Ok(Timestamp::from_naive(&(Self::local_now() + self.offset)))
    }

    fn adjust(&mut self, ts: &Timestamp) -> Result<(), ClockError> {
        let target = ts.to_naive().ok_or(ClockError::InvalidTimestamp {
            year: ts.year,
            month: ts.month,
            day: ts.day,
            hour: ts.hour,
            minute: ts.minute,
            second: ts.second,
        })?;
        self.offset = target - Self::local_now();
        log::info!("Host clock offset set to {} s", self.offset.num_seconds());
        Ok(())
    }
}

/// Writes display rows to the `log` facade at debug level, skipping rows that
/// did not change.
#[derive(Default)]
pub struct LogDisplay {
    rows: [String; LCD_ROWS],
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[String; LCD_ROWS] {
        &self.rows
    }
}

impl TextDisplay for LogDisplay {
    fn clear(&mut self) {
        for row in self.rows.iter_mut() {
            row.clear();
        }
    }

    fn print_line(&mut self, row: usize, text: &str) {
        if let Some(slot) = self.rows.get_mut(row) {
            if slot != text {
                *slot = text.to_owned();
                log::debug!("display[{}]: {}", row, text);
            }
        }
    }
}
