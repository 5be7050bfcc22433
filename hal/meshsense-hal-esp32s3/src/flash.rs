//! Flash key/value store for ESP32-S3
//!
//! Uses sequential-storage for wear-leveled key-value storage in the
//! `nvs` partition of the default partition table. esp-storage only offers
//! blocking flash access, so it is wrapped in embassy-embedded-hal's
//! `BlockingAsync` adapter to get the async `NorFlash` sequential-storage
//! needs.
//!
//! Implements the `KeyValueStore` trait from `meshsense-hal`.

use embassy_embedded_hal::adapter::BlockingAsync;
use esp_hal::peripherals::FLASH;
use esp_storage::FlashStorage;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

pub use meshsense_hal::storage::{StorageError, StorageKey};

/// Start of the `nvs` partition (default ESP-IDF partition table)
pub const SETTINGS_PARTITION_START: u32 = 0x9000;
/// Size of the `nvs` partition: six 4KB sectors
pub const SETTINGS_PARTITION_SIZE: u32 = 0x6000;

/// Flash range used for settings
pub const SETTINGS_RANGE: core::ops::Range<u32> =
    SETTINGS_PARTITION_START..(SETTINGS_PARTITION_START + SETTINGS_PARTITION_SIZE);

// Settings are a handful of bytes
const ITEM_BUFFER_SIZE: usize = 128;

/// ESP32-S3 flash key/value store
pub struct FlashStore<'d> {
    flash: BlockingAsync<FlashStorage<'d>>,
}

impl<'d> FlashStore<'d> {
    /// Create a store over the internal SPI flash
    pub fn new(flash: FLASH<'d>) -> Self {
        Self {
            flash: BlockingAsync::new(FlashStorage::new(flash)),
        }
    }
}

impl meshsense_hal::KeyValueStore for FlashStore<'_> {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StorageError> {
        let mut data_buffer = [0u8; ITEM_BUFFER_SIZE];

        let result = map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            SETTINGS_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
        )
        .await;

        match result {
            Ok(Some(data)) => {
                let len = data.len();
                if buffer.len() < len {
                    return Err(StorageError::BufferTooSmall);
                }
                buffer[..len].copy_from_slice(data);
                Ok(len)
            }
            Ok(None) => Err(StorageError::NotFound),
            Err(sequential_storage::Error::Storage { .. }) => Err(StorageError::Flash),
            Err(_) => Err(StorageError::Storage),
        }
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError> {
        let mut data_buffer = [0u8; ITEM_BUFFER_SIZE];

        map::store_item(
            &mut self.flash,
            SETTINGS_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
            &data,
        )
        .await
        .map_err(|e| match e {
            sequential_storage::Error::FullStorage => StorageError::Full,
            sequential_storage::Error::Storage { .. } => StorageError::Flash,
            _ => StorageError::Storage,
        })
    }
}
