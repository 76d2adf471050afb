// Fake Frog — Monochrome text display
//
// `Framebuffer` is a 128x64 1-bpp buffer in SSD1306 page layout (8 vertical
// pixels per byte, one page = 128 bytes). `GraphicTextDisplay` renders the
// status rows onto any BinaryColor draw target with embedded-graphics; the
// OLED driver flushes the framebuffer pages over I2C.

use core::convert::Infallible;

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};

use crate::config::{DISPLAY_BUFFER_SIZE, LCD_ROWS, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::drivers::TextDisplay;

/// Pixel height of one text row (10 px glyphs plus spacing).
pub const ROW_HEIGHT: u32 = 12;

pub const PAGE_COUNT: usize = SCREEN_HEIGHT as usize / 8;

pub struct Framebuffer {
    buf: [u8; DISPLAY_BUFFER_SIZE],
}

impl Framebuffer {
    pub fn new() -> Self {
        Self {
            buf: [0; DISPLAY_BUFFER_SIZE],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> bool {
        if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
            return false;
        }
        self.buf[Self::index(x, y)] & (1 << (y % 8)) != 0
    }

    /// One 128-byte page (rows `8 * page .. 8 * page + 8`).
    pub fn page(&self, page: usize) -> &[u8] {
        let width = SCREEN_WIDTH as usize;
        &self.buf[page * width..(page + 1) * width]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    fn index(x: u32, y: u32) -> usize {
        x as usize + (y as usize / 8) * SCREEN_WIDTH as usize
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}

impl DrawTarget for Framebuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) else {
                continue;
            };
            if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
                continue;
            }
            let idx = Self::index(x, y);
            let bit = 1u8 << (y % 8);
            match color {
                BinaryColor::On => self.buf[idx] |= bit,
                BinaryColor::Off => self.buf[idx] &= !bit,
            }
        }
        Ok(())
    }
}

/// Text rows on a pixel display.
pub struct GraphicTextDisplay<D> {
    target: D,
}

impl<D> GraphicTextDisplay<D>
where
    D: DrawTarget<Color = BinaryColor>,
{
    pub fn new(target: D) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &D {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut D {
        &mut self.target
    }
}

impl<D> TextDisplay for GraphicTextDisplay<D>
where
    D: DrawTarget<Color = BinaryColor>,
{
    fn clear(&mut self) {
        self.target.clear(BinaryColor::Off).ok();
    }

    fn print_line(&mut self, row: usize, text: &str) {
        if row >= LCD_ROWS {
            return;
        }
        let top = (row as u32 * ROW_HEIGHT) as i32;
        let width = self.target.bounding_box().size.width;

        Rectangle::new(Point::new(0, top), Size::new(width, ROW_HEIGHT))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::Off))
            .draw(&mut self.target)
            .ok();

        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        Text::with_baseline(text, Point::new(0, top), style, Baseline::Top)
            .draw(&mut self.target)
            .ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit_in_rows(fb: &Framebuffer, rows: core::ops::Range<u32>) -> usize {
        rows.flat_map(|y| (0..SCREEN_WIDTH).map(move |x| (x, y)))
            .filter(|&(x, y)| fb.pixel(x, y))
            .count()
    }

    #[test]
    fn pixels_use_page_layout() {
        let mut fb = Framebuffer::new();
        fb.draw_iter([Pixel(Point::new(3, 9), BinaryColor::On)]).unwrap();
        assert!(fb.pixel(3, 9));
        assert_eq!(fb.page(1)[3], 0b0000_0010);
        assert_eq!(fb.as_bytes().iter().filter(|b| **b != 0).count(), 1);

        fb.draw_iter([Pixel(Point::new(3, 9), BinaryColor::Off)]).unwrap();
        assert!(!fb.pixel(3, 9));
    }

    #[test]
    fn out_of_bounds_pixels_are_ignored() {
        let mut fb = Framebuffer::new();
        fb.draw_iter([
            Pixel(Point::new(-1, 0), BinaryColor::On),
            Pixel(Point::new(0, 64), BinaryColor::On),
            Pixel(Point::new(128, 0), BinaryColor::On),
        ])
        .unwrap();
        assert!(fb.as_bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn rows_render_in_their_own_band() {
        let mut display = GraphicTextDisplay::new(Framebuffer::new());
        display.print_line(1, "12:00:00 21.5C");
        let fb = display.target();
        assert_eq!(lit_in_rows(fb, 0..ROW_HEIGHT), 0);
        assert!(lit_in_rows(fb, ROW_HEIGHT..2 * ROW_HEIGHT) > 0);

        display.print_line(1, "");
        assert_eq!(lit_in_rows(display.target(), 0..SCREEN_HEIGHT), 0);
    }

    #[test]
    fn clear_blanks_everything() {
        let mut display = GraphicTextDisplay::new(Framebuffer::new());
        display.print_line(0, "Set year");
        display.print_line(7, "ignored");
        assert!(lit_in_rows(display.target(), 0..ROW_HEIGHT) > 0);
        display.clear();
        assert!(display.target().as_bytes().iter().all(|b| *b == 0));
    }
}
