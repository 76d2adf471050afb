// Fake Frog — Hardware & System Configuration
// Target: ESP32-C3 data-logging board (thermistor inputs, microSD, PCF8523
// RTC, SSD1306 OLED, two buttons). The same constants drive the host build.

use heapless::Vec;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------
pub const SERIAL_LOGGING: bool = true;   // Mirror diagnostics to the console.
pub const FILE_LOGGING: bool = true;     // Mirror diagnostics to log_NNN.txt (recommended).
pub const DISPLAY_ENABLED: bool = true;  // Show menus and information on the display.
pub const CLOCK_PROMPT_ENABLED: bool = false; // Ask on the console whether to set the RTC at boot.

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------
pub const NUM_SAMPLES: u16 = 10;          // Samples get averaged to reduce noise.
pub const SAMPLE_DELAY_MS: u32 = 10;      // Between samples.
pub const READING_INTERVAL_S: u32 = 60;   // Between readings.
pub const TICK_MS: u64 = 1000;            // Nominal scheduler tick.

/// Largest code the ADC can return.
#[cfg(target_os = "espidf")]
pub const ADC_MAX_CODE: f64 = 4095.0; // 12-bit SAR ADC
#[cfg(not(target_os = "espidf"))]
pub const ADC_MAX_CODE: f64 = 1023.0; // 10-bit reference divider

// ---------------------------------------------------------------------------
// Thermistors
// ---------------------------------------------------------------------------
pub const MAX_CHANNELS: usize = 4;
pub const THERMISTOR_SERIES_RES: f64 = 10_000.0;
pub const THERMISTOR_RES_NOM: f64 = 10_000.0;  // Nominal resistance, R0.
pub const THERMISTOR_B_COEFF: f64 = 3950.0;    // Beta coefficient of the thermistor.
pub const THERMISTOR_TEMP_NOM: f64 = 25.0;     // Nominal temperature of R0 (°C).

// ---------------------------------------------------------------------------
// GPIO Wiring (ESP32-C3)
//   GPIO3  Mode / next-field button (pull-up, active LOW)
//   GPIO9  Select / increment button (pull-up, active LOW)
//   GPIO6  I2C SDA, GPIO7 I2C SCL (RTC + OLED)
//   GPIO4  SD SCK, GPIO10 SD MOSI, GPIO5 SD MISO, GPIO20 SD CS
// ---------------------------------------------------------------------------
pub const THERMISTOR_ADC_CHANNELS: [u32; MAX_CHANNELS] = [0, 1, 2, 3]; // GPIO0..GPIO3 / ADC1

// ---------------------------------------------------------------------------
// I2C Bus
// ---------------------------------------------------------------------------
pub const I2C_ADDR_PCF8523: u8 = 0x68;
pub const I2C_ADDR_OLED: u8 = 0x3C;
pub const I2C_TIMEOUT_TICKS: u32 = 1000; // FreeRTOS ticks

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------
pub const SD_MOUNT_POINT: &str = "/sdcard";
pub const SD_MAX_OPEN_FILES: usize = 4;
pub const DATA_FILE_PREFIX: &str = "data_";
pub const DATA_FILE_EXTENSION: &str = ".csv";
pub const LOG_FILE_PREFIX: &str = "log_";
pub const LOG_FILE_EXTENSION: &str = ".txt";
pub const MAX_DATA_FILES: u16 = 1000;
pub const MAX_LOG_FILES: u16 = 1000;
pub const RECORD_LINE_CAPACITY: usize = 128;
pub const CONSOLE_LINE_CAPACITY: usize = 160;

/// Host builds write into this directory instead of a mounted card.
pub const HOST_STORAGE_DIR: &str = match option_env!("FAKEFROG_STORAGE_DIR") {
    Some(dir) => dir,
    None => "sdcard",
};

// ---------------------------------------------------------------------------
// Display (SSD1306 OLED used as a character display)
// ---------------------------------------------------------------------------
pub const SCREEN_WIDTH: u32 = 128;
pub const SCREEN_HEIGHT: u32 = 64;
pub const DISPLAY_BUFFER_SIZE: usize = (SCREEN_WIDTH as usize * SCREEN_HEIGHT as usize) / 8; // 1024
pub const LCD_ROWS: usize = 2;
pub const LCD_COLUMNS: usize = 16;

// ---------------------------------------------------------------------------
// Buttons (milliseconds)
// ---------------------------------------------------------------------------
pub const DEBOUNCE_MS: u64 = 50;

/// Physical constants of one thermistor input.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelConfig {
    pub id: u8,
    /// CSV column name.
    pub label: heapless::String<16>,
    pub series_resistance: f64,
    pub nominal_resistance: f64,
    pub beta: f64,
    pub nominal_temp_c: f64,
}

impl ChannelConfig {
    /// Channel `id` with the board's default thermistor constants and the
    /// label `Temp<id + 1>`.
    pub fn standard(id: u8) -> Self {
        let mut label = heapless::String::new();
        // "Temp" plus at most three digits always fits.
        let _ = core::fmt::write(&mut label, format_args!("Temp{}", id as u16 + 1));
        Self {
            id,
            label,
            series_resistance: THERMISTOR_SERIES_RES,
            nominal_resistance: THERMISTOR_RES_NOM,
            beta: THERMISTOR_B_COEFF,
            nominal_temp_c: THERMISTOR_TEMP_NOM,
        }
    }
}

/// Everything the logger reads from the build configuration, gathered so
/// tests can run with a shorter interval or a different channel set.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub serial_logging: bool,
    pub file_logging: bool,
    pub display_enabled: bool,
    pub sample_count: u16,
    pub sample_delay_ms: u32,
    pub reading_interval_s: u32,
    pub tick_ms: u64,
    pub adc_max_code: f64,
    pub channels: Vec<ChannelConfig, MAX_CHANNELS>,
    pub data_prefix: &'static str,
    pub data_extension: &'static str,
    pub log_prefix: &'static str,
    pub log_extension: &'static str,
    pub max_data_files: u16,
    pub max_log_files: u16,
}

impl LoggerConfig {
    /// Build configuration with `count` standard channels (clamped to
    /// [`MAX_CHANNELS`]).
    pub fn with_channels(count: usize) -> Self {
        let channels = (0..count.min(MAX_CHANNELS) as u8)
            .map(ChannelConfig::standard)
            .collect();
        Self {
            channels,
            ..Self::default()
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        let mut channels = Vec::new();
        let _ = channels.push(ChannelConfig::standard(0));
        Self {
            serial_logging: SERIAL_LOGGING,
            file_logging: FILE_LOGGING,
            display_enabled: DISPLAY_ENABLED,
            sample_count: NUM_SAMPLES,
            sample_delay_ms: SAMPLE_DELAY_MS,
            reading_interval_s: READING_INTERVAL_S,
            tick_ms: TICK_MS,
            adc_max_code: ADC_MAX_CODE,
            channels,
            data_prefix: DATA_FILE_PREFIX,
            data_extension: DATA_FILE_EXTENSION,
            log_prefix: LOG_FILE_PREFIX,
            log_extension: LOG_FILE_EXTENSION,
            max_data_files: MAX_DATA_FILES,
            max_log_files: MAX_LOG_FILES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_channel_labels_are_one_based() {
        assert_eq!(ChannelConfig::standard(0).label.as_str(), "Temp1");
        assert_eq!(ChannelConfig::standard(3).label.as_str(), "Temp4");
    }

    #[test]
    fn with_channels_clamps_to_capacity() {
        let cfg = LoggerConfig::with_channels(9);
        assert_eq!(cfg.channels.len(), MAX_CHANNELS);
        let ids: std::vec::Vec<u8> = cfg.channels.iter().map(|c| c.id).collect();
        assert_eq!(ids, [0, 1, 2, 3]);
    }

    #[test]
    fn default_has_single_channel() {
        let cfg = LoggerConfig::default();
        assert_eq!(cfg.channels.len(), 1);
        assert_eq!(cfg.reading_interval_s, READING_INTERVAL_S);
        assert_eq!(cfg.max_data_files, 1000);
    }
}
