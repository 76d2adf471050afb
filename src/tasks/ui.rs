// Fake Frog — Status UI
//
// Owns the display and the two buttons. Polled once per scheduler tick:
//   - Mode button cycles Idle → Information → RTC editor → Idle.
//   - In the RTC editor, Select increments the field under the cursor and
//     Mode moves to the next field; leaving the last field (seconds) commits
//     the edited time to the RTC and returns to Idle.
// Logging continues in every mode.

use core::fmt::Write as _;

use crate::clock::{TimeField, Timestamp};
use crate::config::{LCD_COLUMNS, LCD_ROWS};
use crate::drivers::{Button, TextDisplay};
use crate::events::{ButtonEvent, DisplayMode, StatusSnapshot, UiRequest};
use crate::input::Debouncer;
use crate::tasks::scheduler::Interactive;

type Row = heapless::String<LCD_COLUMNS>;

/// Clock value being edited and the field under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockEditor {
    pub value: Timestamp,
    pub field: TimeField,
}

pub struct StatusUi<D, M, S> {
    display: D,
    mode_button: Debouncer<M>,
    select_button: Debouncer<S>,
    mode: DisplayMode,
    editor: Option<ClockEditor>,
    rows: [Row; LCD_ROWS],
}

impl<D, M, S> StatusUi<D, M, S>
where
    D: TextDisplay,
    M: Button,
    S: Button,
{
    pub fn new(mut display: D, mode_button: M, select_button: S) -> Self {
        display.clear();
        Self {
            display,
            mode_button: Debouncer::new(mode_button, ButtonEvent::Mode),
            select_button: Debouncer::new(select_button, ButtonEvent::Select),
            mode: DisplayMode::Idle,
            editor: None,
            rows: Default::default(),
        }
    }

    /// Override the debounce window of both buttons.
    pub fn with_debounce(mut self, debounce_ms: u64) -> Self {
        self.mode_button = self.mode_button.with_debounce(debounce_ms);
        self.select_button = self.select_button.with_debounce(debounce_ms);
        self
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn editor(&self) -> Option<&ClockEditor> {
        self.editor.as_ref()
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn switch_mode(&mut self, mode: DisplayMode) {
        self.mode = mode;
        if mode != DisplayMode::RtcEditor {
            self.editor = None;
        }
        log::debug!("Display mode {:?}", mode);
    }

    fn handle(&mut self, event: ButtonEvent, status: &StatusSnapshot<'_>) -> Option<UiRequest> {
        match (self.mode, event) {
            (DisplayMode::RtcEditor, ButtonEvent::Select) => {
                if let Some(editor) = self.editor.as_mut() {
                    editor.value = editor.value.increment(editor.field);
                }
                None
            }
            (DisplayMode::RtcEditor, ButtonEvent::Mode) => {
                let editor = self.editor?;
                match editor.field.next() {
                    Some(field) => {
                        self.editor = Some(ClockEditor { field, ..editor });
                        None
                    }
                    None => {
                        self.switch_mode(DisplayMode::Idle);
                        Some(UiRequest::SetClock(editor.value))
                    }
                }
            }
            (mode, ButtonEvent::Mode) => {
                let next = mode.next();
                self.switch_mode(next);
                if next == DisplayMode::RtcEditor {
                    let value = status.clock.unwrap_or(Timestamp::EPOCH);
                    self.editor = Some(ClockEditor {
                        value,
                        field: TimeField::Year,
                    });
                }
                None
            }
            (_, ButtonEvent::Select) => None,
        }
    }

    fn render(&mut self, status: &StatusSnapshot<'_>) {
        let mut rows: [Row; LCD_ROWS] = Default::default();
        match self.mode {
            DisplayMode::Idle => {}
            DisplayMode::Information => {
                match status.clock {
                    Some(ts) => {
                        let _ = write!(rows[0], "{:02}:{:02}:{:02}", ts.hour, ts.minute, ts.second);
                    }
                    None => {
                        let _ = rows[0].push_str("--:--:--");
                    }
                }
                if let Some(first) = status.readings.first() {
                    let _ = write!(rows[0], " {:.1}C", first.temperature_c);
                }
                let name = status.data_file.unwrap_or("no card");
                let _ = write!(rows[1], "{} {}", name.trim_end_matches(".csv"), status.records_written);
            }
            DisplayMode::RtcEditor => {
                if let Some(editor) = &self.editor {
                    let _ = write!(rows[0], "Set {}", editor.field.name());
                    let _ = write!(rows[1], "> {}", editor.value.field(editor.field));
                }
            }
        }

        if rows != self.rows {
            self.display.clear();
            for (i, row) in rows.iter().enumerate() {
                if !row.is_empty() {
                    self.display.print_line(i, row);
                }
            }
            self.rows = rows;
        }
    }
}

impl<D, M, S> Interactive for StatusUi<D, M, S>
where
    D: TextDisplay,
    M: Button,
    S: Button,
{
    fn needs_clock(&self) -> bool {
        self.mode != DisplayMode::Idle
    }

    fn poll(&mut self, status: &StatusSnapshot<'_>) -> Option<UiRequest> {
        let mut request = None;
        let events = [
            self.mode_button.update(status.now_ms),
            self.select_button.update(status.now_ms),
        ];
        for event in events.into_iter().flatten() {
            if let Some(r) = self.handle(event, status) {
                request = Some(r);
            }
        }
        self.render(status);
        request
    }
}
