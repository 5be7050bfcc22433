//! Cursor-based text over embedded-graphics
//!
//! Panel drivers that expose an embedded-graphics [`DrawTarget`] implement
//! the text half of [`TextDisplay`](crate::TextDisplay) by keeping a
//! [`TextCursor`] and forwarding `draw_text` to it.
//!
//! Glyphs come from a fixed mono font and are enlarged by an integer
//! factor, so a scale of 2 turns every font pixel into a 2x2 block.

use embedded_graphics::geometry::{Dimensions, Point, Size};
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::{Rgb565, RgbColor};
use embedded_graphics::prelude::{DrawTarget, Drawable, Pixel};
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::{Baseline, Text};

/// Font used for every message
pub const FONT: &MonoFont<'static> = &FONT_6X10;

/// Text cursor state: position, color and scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextCursor {
    position: Point,
    color: Rgb565,
    scale: u8,
}

impl TextCursor {
    pub const fn new() -> Self {
        Self {
            position: Point::zero(),
            color: Rgb565::WHITE,
            scale: 1,
        }
    }

    pub fn set_position(&mut self, x: i16, y: i16) {
        self.position = Point::new(i32::from(x), i32::from(y));
    }

    pub fn set_color(&mut self, color: Rgb565) {
        self.color = color;
    }

    /// Set the glyph scale; 0 is treated as 1
    pub fn set_scale(&mut self, scale: u8) {
        self.scale = scale.max(1);
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn scale(&self) -> u8 {
        self.scale
    }

    /// Draw `text` with its top-left corner at the cursor
    ///
    /// A `\n` starts a new line at the cursor's x coordinate. The cursor
    /// itself does not move.
    pub fn draw<T>(&self, target: &mut T, text: &str) -> Result<(), T::Error>
    where
        T: DrawTarget<Color = Rgb565>,
    {
        let style = MonoTextStyle::new(FONT, self.color);

        if self.scale == 1 {
            Text::with_baseline(text, self.position, style, Baseline::Top).draw(target)?;
        } else {
            let mut scaled = Scaled::new(target, self.position, u32::from(self.scale));
            Text::with_baseline(text, Point::zero(), style, Baseline::Top).draw(&mut scaled)?;
        }

        Ok(())
    }
}

impl Default for TextCursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Draw target that blows every pixel up into a `scale` x `scale` block
///
/// Coordinates are relative to `origin` on the wrapped target.
pub struct Scaled<'a, T> {
    inner: &'a mut T,
    origin: Point,
    scale: u32,
}

impl<'a, T: DrawTarget> Scaled<'a, T> {
    pub fn new(inner: &'a mut T, origin: Point, scale: u32) -> Self {
        Self {
            inner,
            origin,
            scale: scale.max(1),
        }
    }
}

impl<T: DrawTarget> Dimensions for Scaled<'_, T> {
    fn bounding_box(&self) -> Rectangle {
        let outer = self.inner.bounding_box();
        let scale = self.scale as i32;
        let top_left = outer.top_left - self.origin;
        Rectangle::new(
            Point::new(top_left.x.div_euclid(scale), top_left.y.div_euclid(scale)),
            Size::new(outer.size.width / self.scale, outer.size.height / self.scale),
        )
    }
}

impl<T: DrawTarget> DrawTarget for Scaled<'_, T> {
    type Color = T::Color;
    type Error = T::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let block = Size::new_equal(self.scale);
        let scale = self.scale as i32;

        for Pixel(point, color) in pixels {
            let top_left = self.origin + point * scale;
            self.inner.fill_solid(&Rectangle::new(top_left, block), color)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::mock_display::MockDisplay;

    fn drawn_area(text: &str, x: i16, y: i16, scale: u8) -> Rectangle {
        let mut display: MockDisplay<Rgb565> = MockDisplay::new();
        let mut cursor = TextCursor::new();
        cursor.set_position(x, y);
        cursor.set_scale(scale);
        cursor.set_color(Rgb565::GREEN);
        cursor.draw(&mut display, text).unwrap();
        display.affected_area()
    }

    #[test]
    fn test_draws_at_cursor() {
        let area = drawn_area("A", 10, 20, 1);
        assert!(area.top_left.x >= 10);
        assert!(area.top_left.y >= 20);
        assert!(area.size.width <= FONT.character_size.width);
        assert!(area.size.height <= FONT.character_size.height);
    }

    #[test]
    fn test_scale_enlarges_glyph_blocks() {
        let single = drawn_area("A", 4, 6, 1);
        let double = drawn_area("A", 4, 6, 2);

        assert_eq!(double.size, single.size * 2);
        let offset = single.top_left - Point::new(4, 6);
        assert_eq!(double.top_left, Point::new(4, 6) + offset * 2);
    }

    #[test]
    fn test_newline_returns_to_cursor_x() {
        let one = drawn_area("A", 2, 0, 1);
        let two = drawn_area("A\nA", 2, 0, 1);
        assert_eq!(two.top_left.x, one.top_left.x);
        assert_eq!(two.size.width, one.size.width);
        assert_eq!(two.size.height, one.size.height + FONT.character_size.height);

        let scaled = drawn_area("A\nA", 2, 0, 2);
        assert_eq!(
            scaled.size.height,
            one.size.height * 2 + FONT.character_size.height * 2
        );
    }

    #[test]
    fn test_zero_scale_is_one() {
        let mut cursor = TextCursor::new();
        cursor.set_scale(0);
        assert_eq!(cursor.scale(), 1);
        assert_eq!(drawn_area("A", 0, 0, 0), drawn_area("A", 0, 0, 1));
    }

    #[test]
    fn test_scaled_bounding_box() {
        let mut display: MockDisplay<Rgb565> = MockDisplay::new();
        let scaled = Scaled::new(&mut display, Point::new(8, 8), 2);
        let bounds = scaled.bounding_box();
        assert_eq!(bounds.top_left, Point::new(-4, -4));
        assert_eq!(bounds.size, Size::new(32, 32));
    }

    #[test]
    fn test_scaled_bounding_box_odd_origin() {
        let mut display: MockDisplay<Rgb565> = MockDisplay::new();
        let scaled = Scaled::new(&mut display, Point::new(3, 5), 2);
        // Cell -2 starts at pixel -1, so it still covers column 0
        assert_eq!(scaled.bounding_box().top_left, Point::new(-2, -3));
    }
}
