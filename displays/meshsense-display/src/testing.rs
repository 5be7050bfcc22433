//! Host test doubles

use std::string::String;
use std::vec::Vec;

use embedded_graphics::pixelcolor::Rgb565;
use meshsense_hal::OutputPin;

use crate::backend::{DisplayError, Rotation, TextDisplay};

/// One recorded backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOp {
    Init(u16, u16),
    Rotation(Rotation),
    Fill(Rgb565),
    Cursor(i16, i16),
    TextColor(Rgb565),
    TextScale(u8),
    Text(String),
}

/// Display backend that records every call
#[derive(Default)]
pub struct RecordingDisplay {
    ops: Vec<DrawOp>,
    fail_init: bool,
    fail_text: Option<String>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `init` fail with a communication error
    pub fn fail_init(&mut self) {
        self.fail_init = true;
    }

    /// Make drawing exactly `text` fail
    pub fn fail_text(&mut self, text: &str) {
        self.fail_text = Some(text.into());
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Every drawn text, in order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// Every drawn line, splitting texts on `\n`
    pub fn lines(&self) -> Vec<&str> {
        self.texts().flat_map(|text| text.split('\n')).collect()
    }

    /// Every fill color, in order
    pub fn fills(&self) -> impl Iterator<Item = Rgb565> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Fill(color) => Some(*color),
            _ => None,
        })
    }

    pub fn fill_count(&self) -> usize {
        self.fills().count()
    }
}

impl TextDisplay for RecordingDisplay {
    fn init(&mut self, width: u16, height: u16) -> Result<(), DisplayError> {
        if self.fail_init {
            return Err(DisplayError::Communication);
        }
        self.ops.push(DrawOp::Init(width, height));
        Ok(())
    }

    fn set_rotation(&mut self, rotation: Rotation) -> Result<(), DisplayError> {
        self.ops.push(DrawOp::Rotation(rotation));
        Ok(())
    }

    fn fill(&mut self, color: Rgb565) -> Result<(), DisplayError> {
        self.ops.push(DrawOp::Fill(color));
        Ok(())
    }

    fn set_cursor(&mut self, x: i16, y: i16) {
        self.ops.push(DrawOp::Cursor(x, y));
    }

    fn set_text_color(&mut self, color: Rgb565) {
        self.ops.push(DrawOp::TextColor(color));
    }

    fn set_text_scale(&mut self, scale: u8) {
        self.ops.push(DrawOp::TextScale(scale));
    }

    fn draw_text(&mut self, text: &str) -> Result<(), DisplayError> {
        if self.fail_text.as_deref() == Some(text) {
            return Err(DisplayError::Communication);
        }
        self.ops.push(DrawOp::Text(text.into()));
        Ok(())
    }
}

/// Output pin that remembers its level
pub struct MockPin {
    id: u8,
    high: bool,
}

impl MockPin {
    pub fn new() -> Self {
        Self::with_id(0)
    }

    /// Pin that can be told apart from others by `id`
    pub fn with_id(id: u8) -> Self {
        Self { id, high: false }
    }

    pub fn id(&self) -> u8 {
        self.id
    }
}

impl OutputPin for MockPin {
    fn set_high(&mut self) {
        self.high = true;
    }

    fn set_low(&mut self) {
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}
