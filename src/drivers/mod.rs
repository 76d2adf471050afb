// Fake Frog — Hardware capability traits
//
// The core only talks to hardware through these traits. `system` provides std
// implementations; `sim` holds the simulated sensor used by the host build
// and the virtual-time doubles used by tests. The ESP-IDF drivers live behind
// `cfg(target_os = "espidf")`.

pub mod display;
pub mod sim;
pub mod system;

#[cfg(target_os = "espidf")]
pub mod adc;
#[cfg(target_os = "espidf")]
pub mod button;
#[cfg(target_os = "espidf")]
pub mod oled;
#[cfg(target_os = "espidf")]
pub mod pcf8523;
#[cfg(all(target_os = "espidf", feature = "experimental"))]
pub mod sdcard;

use crate::clock::Timestamp;
use crate::error::{ClockError, SensorError};

/// I2C bus shared by the RTC and the OLED.
#[cfg(target_os = "espidf")]
pub type SharedBus = &'static std::sync::Mutex<esp_idf_hal::i2c::I2cDriver<'static>>;

/// One thermistor divider wired to an ADC input.
pub trait AnalogInput {
    /// Single raw conversion.
    fn read_raw(&mut self) -> Result<u16, SensorError>;
}

/// Monotonic milliseconds plus a blocking delay.
///
/// `delay_ms` blocks the whole process: nothing else runs until it returns,
/// and it cannot be cancelled.
pub trait Timebase {
    fn now_ms(&self) -> u64;
    fn delay_ms(&mut self, ms: u64);
}

/// Battery-backed real-time clock.
pub trait RealTimeClock {
    /// Check the clock is present and running.
    fn begin(&mut self) -> Result<(), ClockError>;
    fn now(&mut self) -> Result<Timestamp, ClockError>;
    fn adjust(&mut self, ts: &Timestamp) -> Result<(), ClockError>;
}

/// A push button; `true` while held down.
pub trait Button {
    fn is_pressed(&mut self) -> bool;
}

/// A small character display addressed by row.
pub trait TextDisplay {
    fn clear(&mut self);
    fn print_line(&mut self, row: usize, text: &str);
}

impl<T: AnalogInput + ?Sized> AnalogInput for Box<T> {
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        (**self).read_raw()
    }
}

impl<T: Timebase + ?Sized> Timebase for &mut T {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }

    fn delay_ms(&mut self, ms: u64) {
        (**self).delay_ms(ms)
    }
}
