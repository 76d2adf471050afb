// Fake Frog — Button Input
//
// Debounced press detection for the two front-panel buttons. Polled once per
// scheduler tick with the current time; a press is reported once, on the
// first poll where the button has been stably down for `DEBOUNCE_MS`.

use crate::config::DEBOUNCE_MS;
use crate::drivers::Button;
use crate::events::ButtonEvent;

pub struct Debouncer<B> {
    button: B,
    event: ButtonEvent,
    debounce_ms: u64,

    last_raw: bool,
    last_change_ms: u64,
    reported_down: bool,
}

impl<B: Button> Debouncer<B> {
    pub fn new(button: B, event: ButtonEvent) -> Self {
        Self {
            button,
            event,
            debounce_ms: DEBOUNCE_MS,
            last_raw: false,
            last_change_ms: 0,
            reported_down: false,
        }
    }

    pub fn with_debounce(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    /// Returns the button's event on a debounced press edge.
    pub fn update(&mut self, now_ms: u64) -> Option<ButtonEvent> {
        let raw = self.button.is_pressed();
        if raw != self.last_raw {
            self.last_raw = raw;
            self.last_change_ms = now_ms;
        }

        if now_ms.saturating_sub(self.last_change_ms) < self.debounce_ms {
            // Still bouncing.
            return None;
        }

        match (raw, self.reported_down) {
            (true, false) => {
                self.reported_down = true;
                Some(self.event)
            }
            (false, true) => {
                self.reported_down = false;
                None
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::sim::SharedButton;

    #[test]
    fn stable_press_fires_once() {
        let button = SharedButton::new();
        let mut d = Debouncer::new(button.clone(), ButtonEvent::Mode);

        button.set(true);
        assert_eq!(d.update(1000), None); // edge seen, still bouncing
        assert_eq!(d.update(1060), Some(ButtonEvent::Mode));
        assert_eq!(d.update(2000), None); // held, not repeated

        button.set(false);
        assert_eq!(d.update(2010), None);
        assert_eq!(d.update(2100), None);

        button.set(true);
        assert_eq!(d.update(3000), None);
        assert_eq!(d.update(3100), Some(ButtonEvent::Mode));
    }

    #[test]
    fn bounce_shorter_than_window_is_ignored() {
        let button = SharedButton::new();
        let mut d = Debouncer::new(button.clone(), ButtonEvent::Select);

        button.set(true);
        assert_eq!(d.update(1000), None);
        button.set(false);
        assert_eq!(d.update(1020), None);
        assert_eq!(d.update(1200), None);
    }

    #[test]
    fn zero_window_reports_immediately() {
        let button = SharedButton::new();
        let mut d = Debouncer::new(button.clone(), ButtonEvent::Select).with_debounce(0);
        button.set(true);
        assert_eq!(d.update(5), Some(ButtonEvent::Select));
    }
}
