//! Queued display subsystem for MeshSense
//!
//! This crate provides:
//! - [`DisplayCommand`] - an immutable description of one screen update
//! - [`CommandChannel`] - bounded FIFO between producers and the renderer
//! - [`Renderer`] - the single consumer performing all display writes
//! - [`DisplayManager`] / [`DisplayHandle`] - lifecycle and producer API
//! - [`TextDisplay`] - the backend trait a panel driver implements
//! - [`TextCursor`] - scaled mono-font text for `DrawTarget` panels
//!
//! # Architecture
//!
//! ```text
//!  app core                         render core
//! ┌───────────────┐   submit   ┌─────────────┐   drain   ┌──────────────┐
//! │ DisplayHandle │ ─────────► │   Channel   │ ────────► │   Renderer   │
//! └───────────────┘            └─────────────┘           └──────┬───────┘
//!         │ set_backlight                                       │
//!         ▼                                                      ▼
//!    Backlight pin                                         TextDisplay
//! ```
//!
//! Producers never touch the panel. The backlight is the one exception and
//! is written directly since it carries no ordering relative to drawing.

#![cfg_attr(not(test), no_std)]

pub mod backend;
pub mod channel;
pub mod command;
pub mod graphics;
pub mod renderer;
pub mod subsystem;
pub mod text;

#[cfg(test)]
mod testing;

// Re-export key types
pub use backend::{DisplayError, Rotation, TextDisplay};
pub use channel::{CommandChannel, SubmitError, SubmitPolicy, DEFAULT_CAPACITY};
pub use command::{DisplayCommand, Position};
pub use graphics::TextCursor;
pub use renderer::{RenderMode, Renderer};
pub use subsystem::{
    Backlight, DisplayConfig, DisplayHandle, DisplayLink, DisplayManager, InitError, SpawnError,
};
pub use text::{MessageText, TextTooLong, MAX_TEXT_LEN, TEXT_CAPACITY};
