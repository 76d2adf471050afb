// Fake Frog — SSD1306 OLED (128x64, I2C)
//
// Text is rendered into a local framebuffer and the whole buffer is pushed
// after every change, one page (128 bytes) per I2C transaction.

use esp_idf_hal::i2c::I2cDriver;
use esp_idf_hal::sys::EspError;

use crate::config::{I2C_ADDR_OLED, I2C_TIMEOUT_TICKS, SCREEN_WIDTH};
use crate::drivers::display::{Framebuffer, GraphicTextDisplay, PAGE_COUNT};
use crate::drivers::{SharedBus, TextDisplay};

const CONTROL_COMMAND: u8 = 0x00;
const CONTROL_DATA: u8 = 0x40;

// Display off, clock, mux 64, offset 0, start line 0, charge pump on,
// horizontal addressing, segment remap, COM scan dec, COM pins, contrast,
// precharge, VCOMH, resume RAM, normal, display on.
const INIT_SEQUENCE: [u8; 25] = [
    0xAE, 0xD5, 0x80, 0xA8, 0x3F, 0xD3, 0x00, 0x40, 0x8D, 0x14, 0x20, 0x00, 0xA1, 0xC8, 0xDA,
    0x12, 0x81, 0xCF, 0xD9, 0xF1, 0xDB, 0x40, 0xA4, 0xA6, 0xAF,
];

pub struct Ssd1306Oled {
    bus: SharedBus,
    text: GraphicTextDisplay<Framebuffer>,
    flush_failed: bool,
}

impl Ssd1306Oled {
    pub fn new(bus: SharedBus) -> Self {
        Self {
            bus,
            text: GraphicTextDisplay::new(Framebuffer::new()),
            flush_failed: false,
        }
    }

    pub fn init(&mut self) -> anyhow::Result<()> {
        self.command(&INIT_SEQUENCE)?;
        self.flush()?;
        log::info!("SSD1306 initialised");
        Ok(())
    }

    fn with_bus(
        &self,
        f: impl FnOnce(&mut I2cDriver<'static>) -> Result<(), EspError>,
    ) -> anyhow::Result<()> {
        let mut bus = self
            .bus
            .lock()
            .map_err(|_| anyhow::anyhow!("I2C bus lock poisoned"))?;
        f(&mut bus)?;
        Ok(())
    }

    fn command(&self, commands: &[u8]) -> anyhow::Result<()> {
        let mut frame: heapless::Vec<u8, 32> = heapless::Vec::new();
        if frame.push(CONTROL_COMMAND).is_err() || frame.extend_from_slice(commands).is_err() {
            anyhow::bail!("command sequence too long");
        }
        self.with_bus(|bus| bus.write(I2C_ADDR_OLED, &frame, I2C_TIMEOUT_TICKS))
    }

    /// Push the framebuffer to the panel.
    pub fn flush(&self) -> anyhow::Result<()> {
        self.command(&[0x21, 0, (SCREEN_WIDTH - 1) as u8, 0x22, 0, (PAGE_COUNT - 1) as u8])?;

        let mut frame = [0u8; SCREEN_WIDTH as usize + 1];
        frame[0] = CONTROL_DATA;
        for page in 0..PAGE_COUNT {
            frame[1..].copy_from_slice(self.text.target().page(page));
            self.with_bus(|bus| bus.write(I2C_ADDR_OLED, &frame, I2C_TIMEOUT_TICKS))?;
        }
        Ok(())
    }

    fn present(&mut self) {
        match self.flush() {
            Ok(()) => self.flush_failed = false,
            Err(e) if !self.flush_failed => {
                log::warn!("OLED flush failed: {}", e);
                self.flush_failed = true;
            }
            Err(_) => {}
        }
    }
}

impl TextDisplay for Ssd1306Oled {
    fn clear(&mut self) {
        self.text.clear();
        self.present();
    }

    fn print_line(&mut self, row: usize, text: &str) {
        self.text.print_line(row, text);
        self.present();
    }
}
