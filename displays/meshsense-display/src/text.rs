//! Bounded message text
//!
//! Display commands carry their text inline so they can be copied into the
//! command channel without borrowing from the producer.

use core::fmt;
use core::ops::Deref;

use heapless::String;

/// Text buffer size in bytes, counting the terminator slot the display
/// protocol traditionally reserves
pub const TEXT_CAPACITY: usize = 128;

/// Maximum number of text bytes a command can carry
pub const MAX_TEXT_LEN: usize = TEXT_CAPACITY - 1;

/// Text did not fit into a [`MessageText`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TextTooLong {
    /// Length of the rejected input in bytes
    pub len: usize,
}

/// Fixed-capacity UTF-8 text for a display command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageText {
    inner: String<MAX_TEXT_LEN>,
}

impl MessageText {
    /// Create empty text
    pub const fn new() -> Self {
        Self {
            inner: String::new(),
        }
    }

    /// Copy `text`, cutting it at the last character boundary that fits
    ///
    /// Overlong input is never rejected.
    pub fn truncating(text: &str) -> Self {
        let mut inner = String::new();
        // Cannot fail: the prefix is at most MAX_TEXT_LEN bytes
        let _ = inner.push_str(truncate_to_boundary(text, MAX_TEXT_LEN));
        Self { inner }
    }

    /// Copy `text`, failing if it does not fit
    pub fn try_from_str(text: &str) -> Result<Self, TextTooLong> {
        if text.len() > MAX_TEXT_LEN {
            return Err(TextTooLong { len: text.len() });
        }
        Ok(Self::truncating(text))
    }

    /// Check whether `text` would be cut by [`MessageText::truncating`]
    pub fn would_truncate(text: &str) -> bool {
        text.len() > MAX_TEXT_LEN
    }

    /// Borrow the text
    pub fn as_str(&self) -> &str {
        self.inner.as_str()
    }
}

impl Deref for MessageText {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl From<&str> for MessageText {
    fn from(text: &str) -> Self {
        Self::truncating(text)
    }
}

impl fmt::Display for MessageText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for MessageText {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=str}", self.as_str());
    }
}

/// Longest prefix of `text` that is at most `max` bytes and ends on a
/// character boundary
fn truncate_to_boundary(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
