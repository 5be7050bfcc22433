//! Host test doubles

use core::cell::{Cell, RefCell};
use core::net::Ipv4Addr;
use std::collections::BTreeMap;
use std::string::String;
use std::vec::Vec;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_hal_async::delay::DelayNs;
use meshsense_display::{DisplayError, Rotation, TextDisplay};
use meshsense_hal::{InputPin, KeyValueStore, OutputPin, StorageError, StorageKey};

use crate::network::{
    AccessPointConfig, ApInfo, ConnectionInfo, NetworkError, NetworkLink, PortalConfig,
};
use crate::status::StatusScreen;

/// In-memory key/value store
#[derive(Default)]
pub struct MemoryStore {
    values: BTreeMap<u8, Vec<u8>>,
    fail_reads: bool,
    fail_writes: bool,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: StorageKey, value: &[u8]) {
        self.values.insert(key.as_u8(), value.to_vec());
    }

    pub fn get(&self, key: StorageKey) -> Option<&[u8]> {
        self.values.get(&key.as_u8()).map(Vec::as_slice)
    }

    pub fn fail_reads(&mut self) {
        self.fail_reads = true;
    }

    pub fn fail_writes(&mut self) {
        self.fail_writes = true;
    }

    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl KeyValueStore for MemoryStore {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StorageError> {
        if self.fail_reads {
            return Err(StorageError::Flash);
        }
        let value = self
            .values
            .get(&key.as_u8())
            .ok_or(StorageError::NotFound)?;
        if value.len() > buffer.len() {
            return Err(StorageError::BufferTooSmall);
        }
        buffer[..value.len()].copy_from_slice(value);
        Ok(value.len())
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Flash);
        }
        self.values.insert(key.as_u8(), data.to_vec());
        self.writes += 1;
        Ok(())
    }
}

/// Delay that returns immediately and records what was asked for
#[derive(Default)]
pub struct MockDelay {
    delays_ns: Vec<u64>,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_ms(&self) -> u64 {
        self.delays_ns.iter().sum::<u64>() / 1_000_000
    }

    /// Number of delays of exactly `ms`
    pub fn count_of(&self, ms: u32) -> usize {
        let ns = u64::from(ms) * 1_000_000;
        self.delays_ns.iter().filter(|&&d| d == ns).count()
    }
}

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.delays_ns.push(u64::from(ns));
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.delays_ns.push(u64::from(ms) * 1_000_000);
    }
}

/// Input pin that reads released for a number of samples, then pressed
///
/// Meant for active-low buttons: pressed reads low.
pub struct ScriptedButton {
    press_after: Option<usize>,
    reads: Cell<usize>,
}

impl ScriptedButton {
    pub fn released() -> Self {
        Self {
            press_after: None,
            reads: Cell::new(0),
        }
    }

    pub fn pressed_after(reads: usize) -> Self {
        Self {
            press_after: Some(reads),
            reads: Cell::new(0),
        }
    }
}

impl InputPin for ScriptedButton {
    fn is_high(&self) -> bool {
        let n = self.reads.get();
        self.reads.set(n + 1);
        match self.press_after {
            Some(after) => n < after,
            None => true,
        }
    }
}

/// Scripted WiFi link
pub struct MockNetwork {
    connection: ConnectionInfo,
    fail_reconnect: bool,
    fail_join: bool,
    fail_access_point: bool,
    reconnects: Vec<(u8, u32)>,
}

impl MockNetwork {
    /// A link whose joins succeed
    pub fn connected() -> Self {
        Self {
            connection: ConnectionInfo {
                ssid: heapless::String::try_from("HomeNet").unwrap(),
                ip: Ipv4Addr::new(192, 168, 1, 42),
                rssi: -61,
            },
            fail_reconnect: false,
            fail_join: false,
            fail_access_point: false,
            reconnects: Vec::new(),
        }
    }

    pub fn fail_reconnect(&mut self) {
        self.fail_reconnect = true;
    }

    pub fn fail_join(&mut self) {
        self.fail_join = true;
    }

    pub fn fail_access_point(&mut self) {
        self.fail_access_point = true;
    }

    pub fn reconnect_calls(&self) -> Vec<(u8, u32)> {
        self.reconnects.clone()
    }
}

impl NetworkLink for MockNetwork {
    async fn reconnect(
        &mut self,
        attempts: u8,
        interval_ms: u32,
    ) -> Result<ConnectionInfo, NetworkError> {
        self.reconnects.push((attempts, interval_ms));
        if self.fail_reconnect {
            return Err(NetworkError::Timeout);
        }
        Ok(self.connection.clone())
    }

    async fn join(&mut self, _portal: &PortalConfig) -> Result<ConnectionInfo, NetworkError> {
        if self.fail_join {
            return Err(NetworkError::JoinFailed);
        }
        Ok(self.connection.clone())
    }

    async fn start_access_point(&mut self, ap: &AccessPointConfig) -> Result<ApInfo, NetworkError> {
        if self.fail_access_point {
            return Err(NetworkError::Radio);
        }
        Ok(ApInfo {
            ssid: ap.ssid.clone(),
            password: ap.password.clone(),
            ip: Ipv4Addr::new(192, 168, 4, 1),
        })
    }

    fn rssi(&mut self) -> Option<i8> {
        Some(self.connection.rssi)
    }
}

/// One recorded status update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenOp {
    Message(String, Rgb565, u8),
    At(String, i16, i16, Rgb565, u8),
    Clear(Rgb565),
}

/// Status screen that records every update
#[derive(Default)]
pub struct RecordingScreen {
    ops: RefCell<Vec<ScreenOp>>,
}

impl RecordingScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> Vec<ScreenOp> {
        self.ops.borrow().clone()
    }
}

impl StatusScreen for RecordingScreen {
    async fn show_message(&self, text: &str, color: Rgb565, scale: u8) {
        self.ops
            .borrow_mut()
            .push(ScreenOp::Message(text.into(), color, scale));
    }

    async fn show_message_at(&self, text: &str, x: i16, y: i16, color: Rgb565, scale: u8) {
        self.ops
            .borrow_mut()
            .push(ScreenOp::At(text.into(), x, y, color, scale));
    }

    async fn clear(&self, color: Rgb565) {
        self.ops.borrow_mut().push(ScreenOp::Clear(color));
    }
}

/// Display backend that accepts everything
pub struct NullDisplay;

impl TextDisplay for NullDisplay {
    fn init(&mut self, _width: u16, _height: u16) -> Result<(), DisplayError> {
        Ok(())
    }

    fn set_rotation(&mut self, _rotation: Rotation) -> Result<(), DisplayError> {
        Ok(())
    }

    fn fill(&mut self, _color: Rgb565) -> Result<(), DisplayError> {
        Ok(())
    }

    fn set_cursor(&mut self, _x: i16, _y: i16) {}

    fn set_text_color(&mut self, _color: Rgb565) {}

    fn set_text_scale(&mut self, _scale: u8) {}

    fn draw_text(&mut self, _text: &str) -> Result<(), DisplayError> {
        Ok(())
    }
}

/// Output pin that goes nowhere
pub struct NullPin;

impl OutputPin for NullPin {
    fn set_high(&mut self) {}

    fn set_low(&mut self) {}

    fn is_set_high(&self) -> bool {
        false
    }
}
