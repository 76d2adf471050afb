// Fake Frog — Firmware Entry Point
//
// Boot sequence (see `tasks::scheduler::boot`):
//   1. Mount the SD card.
//   2. Create log_NNN.txt, bring up the RTC, optionally prompt for the time.
//   3. Create data_NNN.csv and print the start-up banner.
//   4. Bring up the display and buttons.
//   5. Tick once per second forever.
//
// On the board a failed boot parks the main thread; the host build exits
// with the failure instead.

use std::io::{self, BufRead};

use fakefrog::config::*;
use fakefrog::drivers::{AnalogInput, RealTimeClock, Timebase};
use fakefrog::storage::SyncWrite;
use fakefrog::tasks::scheduler::{boot, Board, DataLogger, Interactive};

fn main() -> anyhow::Result<()> {
    platform::run()
}

/// Console answers for the clock prompt, when enabled.
fn clock_prompt<'a>(console: &'a mut io::StdinLock<'static>) -> Option<&'a mut dyn BufRead> {
    if CLOCK_PROMPT_ENABLED {
        Some(console as &mut dyn BufRead)
    } else {
        None
    }
}

fn run_forever<W, A, C, T>(logger: &mut DataLogger<W, A, C, T>, ui: &mut dyn Interactive) -> !
where
    W: SyncWrite,
    A: AnalogInput,
    C: RealTimeClock,
    T: Timebase,
{
    loop {
        logger.tick(ui);
    }
}

// ---------------------------------------------------------------------------
// Board (ESP-IDF)
// ---------------------------------------------------------------------------
#[cfg(target_os = "espidf")]
mod platform {
    use std::sync::Mutex;
    use std::thread;
    use std::time::Duration;

    use esp_idf_hal::gpio::IOPin;
    use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_hal::prelude::*;

    use fakefrog::diag::Halt;
    use fakefrog::drivers::adc::AdcUnit;
    use fakefrog::drivers::button::PanelButton;
    use fakefrog::drivers::oled::Ssd1306Oled;
    use fakefrog::drivers::pcf8523::Pcf8523;
    use fakefrog::drivers::system::SystemTimebase;
    use fakefrog::drivers::SharedBus;
    use fakefrog::storage::DirMedium;
    use fakefrog::tasks::ui::StatusUi;

    use super::*;

    pub fn run() -> anyhow::Result<()> {
        esp_idf_svc::sys::link_patches();
        esp_idf_svc::log::EspLogger::initialize_default();
        log::info!("Fake Frog {} starting…", VERSION);

        let config = LoggerConfig::default();
        let peripherals = Peripherals::take()?;
        let pins = peripherals.pins;

        // ---- I2C bus (shared between RTC and OLED) -------------------------
        let i2c_config = I2cConfig::new().baudrate(400u32.kHz().into());
        let i2c = I2cDriver::new(
            peripherals.i2c0,
            pins.gpio6, // SDA
            pins.gpio7, // SCL
            &i2c_config,
        )?;
        let bus: SharedBus = Box::leak(Box::new(Mutex::new(i2c)));

        // ---- SD card -------------------------------------------------------
        #[cfg(feature = "experimental")]
        let (_card, medium) = {
            use fakefrog::drivers::sdcard::{SdCard, SdPins};
            let pins = SdPins {
                sck: pins.gpio4.downgrade(),
                mosi: pins.gpio10.downgrade(),
                miso: pins.gpio5.downgrade(),
                cs: pins.gpio20.downgrade(),
            };
            match SdCard::mount(peripherals.spi2, pins) {
                Ok(card) => (Some(card), DirMedium::open(SD_MOUNT_POINT)),
                Err(e) => (None, Err(e)),
            }
        };
        #[cfg(not(feature = "experimental"))]
        let medium = DirMedium::open(SD_MOUNT_POINT);

        // ---- Thermistor inputs ---------------------------------------------
        let adc = AdcUnit::new()?;
        let inputs = config
            .channels
            .iter()
            .zip(THERMISTOR_ADC_CHANNELS)
            .map(|(channel, adc_channel)| adc.channel(channel.id, adc_channel))
            .collect::<Result<Vec<_>, _>>()?;

        let board = Board {
            medium,
            inputs,
            rtc: Pcf8523::new(bus),
            timebase: SystemTimebase::new(),
        };

        let display_enabled = config.display_enabled;
        let mut console = io::stdin().lock();
        let mut logger = match boot(config, board, clock_prompt(&mut console)) {
            Ok(logger) => logger,
            Err(halt) => park(halt),
        };

        // ---- Display & buttons ---------------------------------------------
        let mut ui: Box<dyn Interactive> = if display_enabled {
            let mut oled = Ssd1306Oled::new(bus);
            if let Err(e) = oled.init() {
                log::warn!("OLED init failed: {}", e);
            }
            Box::new(StatusUi::new(
                oled,
                PanelButton::new(pins.gpio3.downgrade())?,
                PanelButton::new(pins.gpio9.downgrade())?,
            ))
        } else {
            Box::new(())
        };

        run_forever(&mut logger, ui.as_mut())
    }

    /// Nothing recovers from a failed boot; keep the main thread parked.
    fn park(halt: Halt) -> ! {
        log::error!("{}", halt);
        loop {
            thread::sleep(Duration::from_secs(60));
        }
    }
}

// ---------------------------------------------------------------------------
// Host (directory-backed card, simulated thermistors)
// ---------------------------------------------------------------------------
#[cfg(not(target_os = "espidf"))]
mod platform {
    use std::fs;

    use fakefrog::drivers::sim::{SharedButton, SimulatedThermistor};
    use fakefrog::drivers::system::{LogDisplay, SystemClock, SystemTimebase};
    use fakefrog::events::DisplayMode;
    use fakefrog::storage::DirMedium;
    use fakefrog::tasks::ui::StatusUi;

    use super::*;

    /// Room temperature for the first simulated channel; the others run a
    /// degree warmer each.
    const SIMULATED_BASE_C: f64 = 21.0;

    pub fn run() -> anyhow::Result<()> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        log::info!("Fake Frog {} starting (host build)", VERSION);

        let config = LoggerConfig::default();
        fs::create_dir_all(HOST_STORAGE_DIR)?;

        let inputs = config
            .channels
            .iter()
            .enumerate()
            .map(|(i, channel)| {
                SimulatedThermistor::new(
                    channel.clone(),
                    config.adc_max_code,
                    SIMULATED_BASE_C + i as f64,
                )
            })
            .collect::<Vec<_>>();

        let board = Board {
            medium: DirMedium::open(HOST_STORAGE_DIR),
            inputs,
            rtc: SystemClock::new(),
            timebase: SystemTimebase::new(),
        };

        let display_enabled = config.display_enabled;
        let mut console = io::stdin().lock();
        let mut logger = match boot(config, board, clock_prompt(&mut console)) {
            Ok(logger) => logger,
            Err(halt) => anyhow::bail!("{}", halt),
        };

        // No buttons on a desktop: show the information page permanently.
        let mut ui: Box<dyn Interactive> = if display_enabled {
            let mut status = StatusUi::new(LogDisplay::new(), SharedButton::new(), SharedButton::new());
            status.switch_mode(DisplayMode::Information);
            Box::new(status)
        } else {
            Box::new(())
        };

        run_forever(&mut logger, ui.as_mut())
    }
}
