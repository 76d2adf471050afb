// Fake Frog — Thermistor data logger
//
// Samples one or more thermistor channels on a fixed cadence, timestamps the
// readings from a battery-backed RTC and appends them as CSV records to an
// SD card, mirroring diagnostics to the console and a log file.
//
// Hardware is reached only through the traits in `drivers`; the ESP-IDF
// implementations are compiled for `target_os = "espidf"`, while the host
// build runs against a directory and a simulated sensor.

pub mod clock;
pub mod config;
pub mod convert;
pub mod diag;
pub mod drivers;
pub mod error;
pub mod events;
pub mod input;
pub mod record;
pub mod rtc_setup;
pub mod storage;
pub mod tasks;
