//! Display commands
//!
//! A [`DisplayCommand`] is one self-contained screen update. Producers build
//! commands and hand them to the command channel by value; the renderer
//! consumes each one exactly once.

use embedded_graphics::pixelcolor::{Rgb565, RgbColor};

use crate::text::MessageText;

/// Position used by [`DisplayCommand::message`]
pub const DEFAULT_MESSAGE_POSITION: Position = Position::new(10, 50);

/// Glyph scale used by [`DisplayCommand::message`]
pub const DEFAULT_MESSAGE_SCALE: u8 = 2;

/// Glyph scale used by [`DisplayCommand::message_at`]
pub const DEFAULT_AT_SCALE: u8 = 1;

/// Default text color
pub const DEFAULT_TEXT_COLOR: Rgb565 = Rgb565::WHITE;

/// Default screen background
pub const DEFAULT_BACKGROUND: Rgb565 = Rgb565::BLACK;

/// Pixel position, origin top-left in the display's current rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Position {
    pub x: i16,
    pub y: i16,
}

impl Position {
    /// Create a position
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }
}

/// One rendering operation
///
/// `fill` and the text are independent: a clear carries only a fill, a
/// positioned message carries only text, and a full-screen message
/// carries both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayCommand {
    text: MessageText,
    color: Rgb565,
    text_size: u8,
    fill: Option<Rgb565>,
    position: Position,
}

impl DisplayCommand {
    /// Clear the whole screen to `color`
    pub fn clear(color: Rgb565) -> Self {
        Self {
            text: MessageText::new(),
            color,
            text_size: DEFAULT_AT_SCALE,
            fill: Some(color),
            position: Position::default(),
        }
    }

    /// Full-screen message: clear to the default background, then draw
    /// `text` at [`DEFAULT_MESSAGE_POSITION`]
    pub fn message(text: &str) -> Self {
        Self {
            text: MessageText::truncating(text),
            color: DEFAULT_TEXT_COLOR,
            text_size: DEFAULT_MESSAGE_SCALE,
            fill: Some(DEFAULT_BACKGROUND),
            position: DEFAULT_MESSAGE_POSITION,
        }
    }

    /// Draw `text` at `(x, y)` without clearing
    pub fn message_at(text: &str, x: i16, y: i16) -> Self {
        Self {
            text: MessageText::truncating(text),
            color: DEFAULT_TEXT_COLOR,
            text_size: DEFAULT_AT_SCALE,
            fill: None,
            position: Position::new(x, y),
        }
    }

    /// Set the text color
    pub fn with_color(mut self, color: Rgb565) -> Self {
        self.color = color;
        self
    }

    /// Set the glyph scale (0 is treated as 1)
    pub fn with_scale(mut self, scale: u8) -> Self {
        self.text_size = scale.max(1);
        self
    }

    /// Set the color the screen is cleared to before drawing
    pub fn with_fill(mut self, fill: Rgb565) -> Self {
        self.fill = Some(fill);
        self
    }

    /// Draw without clearing first
    pub fn without_fill(mut self) -> Self {
        self.fill = None;
        self
    }

    /// Text to draw (may be empty)
    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    /// Text color
    pub fn color(&self) -> Rgb565 {
        self.color
    }

    /// Glyph scale factor (always at least 1)
    pub fn text_size(&self) -> u8 {
        self.text_size
    }

    /// Screen fill applied before drawing, if any
    pub fn fill(&self) -> Option<Rgb565> {
        self.fill
    }

    /// Whether the screen is cleared before drawing
    pub fn clear_first(&self) -> bool {
        self.fill.is_some()
    }

    /// Cursor position for the text
    pub fn position(&self) -> Position {
        self.position
    }

    /// Whether there is any text to draw
    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DisplayCommand {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "DisplayCommand {{ text: {=str}, size: {}, clear_first: {}, at: {} }}",
            self.text.as_str(),
            self.text_size,
            self.fill.is_some(),
            self.position
        );
    }
}
