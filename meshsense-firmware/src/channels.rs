//! Cross-core shared state
//!
//! The display subsystem's statics live here so both executors can reach
//! them. Everything uses `CriticalSectionRawMutex`, which is safe across
//! the two cores.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use meshsense_display::{Backlight, DisplayHandle, DisplayLink, Renderer, DEFAULT_CAPACITY};
use meshsense_hal_esp32s3::Esp32s3Output;

use crate::display::St7789Display;

/// Depth of the display command queue
pub const DISPLAY_QUEUE_DEPTH: usize = DEFAULT_CAPACITY;

/// Command queue and lifecycle state between producers and the renderer
pub static DISPLAY_LINK: DisplayLink<CriticalSectionRawMutex, DISPLAY_QUEUE_DEPTH> =
    DisplayLink::new();

/// TFT backlight enable (GPIO45), written directly by producers
pub static BACKLIGHT: Backlight<CriticalSectionRawMutex, Esp32s3Output<'static>> =
    Backlight::new();

/// Producer handle given to the application core
pub type Screen =
    DisplayHandle<'static, CriticalSectionRawMutex, Esp32s3Output<'static>, DISPLAY_QUEUE_DEPTH>;

/// Renderer driving the Feather's panel
pub type PanelRenderer =
    Renderer<'static, St7789Display, CriticalSectionRawMutex, DISPLAY_QUEUE_DEPTH>;
