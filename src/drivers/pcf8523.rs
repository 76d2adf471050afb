// Fake Frog — PCF8523 RTC Driver
//
// Register-level driver over the shared I2C bus. Time registers are packed
// BCD starting at 0x03: seconds, minutes, hours, days, weekdays, months,
// years (offset from 2000).

use chrono::Datelike;
use esp_idf_hal::i2c::I2cDriver;
use esp_idf_hal::sys::EspError;

use crate::clock::{bcd_to_bin, bin_to_bcd, Timestamp};
use crate::config::{I2C_ADDR_PCF8523, I2C_TIMEOUT_TICKS};
use crate::drivers::{RealTimeClock, SharedBus};
use crate::error::ClockError;

const REG_CONTROL_1: u8 = 0x00;
const REG_CONTROL_3: u8 = 0x02;
const REG_SECONDS: u8 = 0x03;

const CONTROL_1_STOP: u8 = 0x20;
const SECONDS_OS: u8 = 0x80; // Oscillator was stopped; time is not trustworthy
const CONTROL_3_SWITCHOVER: u8 = 0xE0;

pub struct Pcf8523 {
    bus: SharedBus,
}

impl Pcf8523 {
    pub fn new(bus: SharedBus) -> Self {
        Self { bus }
    }

    fn with_bus<R>(
        &self,
        f: impl FnOnce(&mut I2cDriver<'static>) -> Result<R, EspError>,
    ) -> Result<R, ClockError> {
        let mut bus = self
            .bus
            .lock()
            .map_err(|_| ClockError::Unavailable("I2C bus lock poisoned".into()))?;
        f(&mut bus).map_err(|e| ClockError::Unavailable(e.to_string()))
    }

    fn read_reg(&self, reg: u8) -> Result<u8, ClockError> {
        let mut buf = [0u8; 1];
        self.with_bus(|bus| bus.write_read(I2C_ADDR_PCF8523, &[reg], &mut buf, I2C_TIMEOUT_TICKS))?;
        Ok(buf[0])
    }

    fn write_reg(&self, reg: u8, value: u8) -> Result<(), ClockError> {
        self.with_bus(|bus| bus.write(I2C_ADDR_PCF8523, &[reg, value], I2C_TIMEOUT_TICKS))
    }
}

impl RealTimeClock for Pcf8523 {
    fn begin(&mut self) -> Result<(), ClockError> {
        let control_1 = self.read_reg(REG_CONTROL_1)?;
        if control_1 & CONTROL_1_STOP != 0 {
            self.write_reg(REG_CONTROL_1, control_1 & !CONTROL_1_STOP)?;
            log::info!("PCF8523 oscillator restarted");
        }

        // Standard battery switch-over so the clock survives power loss.
        let control_3 = self.read_reg(REG_CONTROL_3)?;
        if control_3 & CONTROL_3_SWITCHOVER != 0 {
            self.write_reg(REG_CONTROL_3, control_3 & !CONTROL_3_SWITCHOVER)?;
        }

        if self.read_reg(REG_SECONDS)? & SECONDS_OS != 0 {
            log::warn!("PCF8523 lost power; set the clock");
        }
        Ok(())
    }

    fn now(&mut self) -> Result<Timestamp, ClockError> {
        let mut raw = [0u8; 7];
        self.with_bus(|bus| {
            bus.write_read(I2C_ADDR_PCF8523, &[REG_SECONDS], &mut raw, I2C_TIMEOUT_TICKS)
        })?;

        Timestamp::new(
            2000 + bcd_to_bin(raw[6]) as u16,
            bcd_to_bin(raw[5] & 0x1F),
            bcd_to_bin(raw[3] & 0x3F),
            bcd_to_bin(raw[2] & 0x3F),
            bcd_to_bin(raw[1] & 0x7F),
            bcd_to_bin(raw[0] & 0x7F),
        )
    }

    fn adjust(&mut self, ts: &Timestamp) -> Result<(), ClockError> {
        let invalid = || ClockError::InvalidTimestamp {
            year: ts.year,
            month: ts.month,
            day: ts.day,
            hour: ts.hour,
            minute: ts.minute,
            second: ts.second,
        };
        let date = ts.to_naive().ok_or_else(invalid)?;
        if !(2000..=2099).contains(&ts.year) {
            return Err(invalid());
        }

        let frame = [
            REG_SECONDS,
            bin_to_bcd(ts.second), // also clears OS
            bin_to_bcd(ts.minute),
            bin_to_bcd(ts.hour),
            bin_to_bcd(ts.day),
            date.weekday().num_days_from_sunday() as u8,
            bin_to_bcd(ts.month),
            bin_to_bcd((ts.year - 2000) as u8),
        ];
        self.with_bus(|bus| bus.write(I2C_ADDR_PCF8523, &frame, I2C_TIMEOUT_TICKS))?;
        log::info!("PCF8523 set to {}", ts);
        Ok(())
    }
}
