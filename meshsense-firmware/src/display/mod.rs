//! Display hardware
//!
//! Renderer-side panel driver. Producers never see this module; they go
//! through the display subsystem's queue.

pub mod st7789;

pub use st7789::{PanelSpi, St7789Display};
