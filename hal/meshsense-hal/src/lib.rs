//! MeshSense Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the board-agnostic crates are
//! written against. Chip-specific HALs implement them so the display
//! subsystem and the provisioning flow can be tested on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  meshsense-display / meshsense-core          │
//! └──────────────────────────────────────────────┘
//!                      │
//!                      ▼
//! ┌──────────────────────────────────────────────┐
//! │  meshsense-hal (this crate - traits)         │
//! └──────────────────────────────────────────────┘
//!                      │
//!                      ▼
//! ┌──────────────────────────────────────────────┐
//! │  meshsense-hal-esp32s3                       │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O (backlight, buttons)
//! - [`storage::KeyValueStore`] - Persistent settings

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod storage;

// Re-export key traits at crate root for convenience
pub use gpio::{InputPin, OutputPin};
pub use storage::{KeyValueStore, StorageError, StorageKey};
