// Fake Frog — Front-panel buttons (internal pull-up, active LOW)

use esp_idf_hal::gpio::{AnyIOPin, Input, PinDriver, Pull};
use esp_idf_hal::sys::EspError;

use crate::drivers::Button;

pub struct PanelButton {
    pin: PinDriver<'static, AnyIOPin, Input>,
}

impl PanelButton {
    pub fn new(pin: AnyIOPin) -> Result<Self, EspError> {
        let mut pin = PinDriver::input(pin)?;
        pin.set_pull(Pull::Up)?;
        Ok(Self { pin })
    }
}

impl Button for PanelButton {
    fn is_pressed(&mut self) -> bool {
        self.pin.is_low()
    }
}
