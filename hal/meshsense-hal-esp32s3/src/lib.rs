//! ESP32-S3-specific HAL for the MeshSense firmware
//!
//! This crate provides ESP32-S3 implementations of the shared
//! `meshsense-hal` traits:
//!
//! - GPIO wrappers for the backlight and user buttons
//! - Flash key/value store on the `nvs` partition (implements
//!   `meshsense_hal::KeyValueStore`)

#![no_std]

pub mod flash;
pub mod gpio;

pub use flash::FlashStore;
pub use gpio::{Esp32s3Input, Esp32s3Output};

// Re-export shared traits from meshsense-hal for convenience
pub use meshsense_hal::{KeyValueStore, StorageKey};
