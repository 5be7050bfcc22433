//! Display backend trait
//!
//! Defines the drawing primitives the renderer needs from a panel driver.
//! Only the renderer ever calls these.

use embedded_graphics::pixelcolor::Rgb565;

/// Display backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with display
    Communication,
    /// Invalid coordinates or dimensions
    InvalidCoordinates,
    /// Display not initialized
    NotInitialized,
    /// Buffer overflow
    BufferOverflow,
}

/// Panel orientation in quarter turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rotation {
    /// Native orientation
    #[default]
    Deg0,
    /// 90° clockwise
    Deg90,
    /// 180°
    Deg180,
    /// 270° clockwise (landscape, connector on the left on the TFT Feather)
    Deg270,
}

impl Rotation {
    /// Build from the conventional 0..=3 rotation index (wraps)
    pub const fn from_index(index: u8) -> Self {
        match index % 4 {
            0 => Rotation::Deg0,
            1 => Rotation::Deg90,
            2 => Rotation::Deg180,
            _ => Rotation::Deg270,
        }
    }
}

/// Text-oriented display backend
///
/// Mirrors the classic cursor-based GFX API: the cursor, text color and
/// text scale are driver state, and `draw_text` renders at the cursor.
/// `draw_text` must honor embedded `\n` by starting a new line at the
/// cursor's original x coordinate.
pub trait TextDisplay {
    /// Initialize the controller for a panel of `width` x `height` pixels
    /// (native orientation)
    fn init(&mut self, width: u16, height: u16) -> Result<(), DisplayError>;

    /// Rotate the drawing coordinate system
    fn set_rotation(&mut self, rotation: Rotation) -> Result<(), DisplayError>;

    /// Fill the entire visible screen
    fn fill(&mut self, color: Rgb565) -> Result<(), DisplayError>;

    /// Move the text cursor
    fn set_cursor(&mut self, x: i16, y: i16);

    /// Set the text foreground color
    fn set_text_color(&mut self, color: Rgb565);

    /// Set the integer glyph scale
    fn set_text_scale(&mut self, scale: u8);

    /// Render text at the cursor
    fn draw_text(&mut self, text: &str) -> Result<(), DisplayError>;
}

impl<T: TextDisplay + ?Sized> TextDisplay for &mut T {
    fn init(&mut self, width: u16, height: u16) -> Result<(), DisplayError> {
        (**self).init(width, height)
    }

    fn set_rotation(&mut self, rotation: Rotation) -> Result<(), DisplayError> {
        (**self).set_rotation(rotation)
    }

    fn fill(&mut self, color: Rgb565) -> Result<(), DisplayError> {
        (**self).fill(color)
    }

    fn set_cursor(&mut self, x: i16, y: i16) {
        (**self).set_cursor(x, y)
    }

    fn set_text_color(&mut self, color: Rgb565) {
        (**self).set_text_color(color)
    }

    fn set_text_scale(&mut self, scale: u8) {
        (**self).set_text_scale(scale)
    }

    fn draw_text(&mut self, text: &str) -> Result<(), DisplayError> {
        (**self).draw_text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_index() {
        assert_eq!(Rotation::from_index(3), Rotation::Deg270);
        assert_eq!(Rotation::from_index(5), Rotation::Deg90);
        assert_eq!(Rotation::from_index(2), Rotation::Deg180);
    }
}
