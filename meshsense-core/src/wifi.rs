//! Network mode model and persistence
//!
//! The selected mode is one byte under [`StorageKey::WifiMode`]. Anything
//! that cannot be read back as a known mode means "not provisioned".

use meshsense_hal::{KeyValueStore, StorageError, StorageKey};

/// How the board joins the network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum WifiMode {
    /// No mode chosen yet
    #[default]
    Unprovisioned = 0,
    /// Station joined to an existing network
    Client = 1,
    /// Board hosts its own access point
    AccessPoint = 2,
}

impl WifiMode {
    /// Persisted byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Decode a persisted byte; unknown values are unprovisioned
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => WifiMode::Client,
            2 => WifiMode::AccessPoint,
            _ => WifiMode::Unprovisioned,
        }
    }
}

/// Loads and saves the [`WifiMode`] through a key/value store
pub struct ModeStore<S> {
    storage: S,
}

impl<S: KeyValueStore> ModeStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Read the persisted mode
    ///
    /// Missing values and read errors both yield
    /// [`WifiMode::Unprovisioned`]; errors are logged.
    pub async fn load(&mut self) -> WifiMode {
        let mut buf = [0u8; 1];
        match self.storage.read(StorageKey::WifiMode, &mut buf).await {
            Ok(1) => WifiMode::from_u8(buf[0]),
            Ok(_) | Err(StorageError::NotFound) => WifiMode::Unprovisioned,
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Failed to read WiFi mode: {}", _e);
                WifiMode::Unprovisioned
            }
        }
    }

    /// Persist `mode`
    pub async fn save(&mut self, mode: WifiMode) -> Result<(), StorageError> {
        self.storage
            .write(StorageKey::WifiMode, &[mode.as_u8()])
            .await
    }

    /// Consume and return the underlying store
    pub fn into_storage(self) -> S {
        self.storage
    }
}
