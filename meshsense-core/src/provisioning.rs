//! Boot-time network provisioning
//!
//! Restores the persisted [`WifiMode`], or walks the user through choosing
//! one with the two board buttons, and reports every step on the status
//! screen.
//!
//! ```text
//!            load mode
//!     ┌──────────┼──────────────┐
//!     ▼          ▼              ▼
//! Unprovisioned Client      AccessPoint
//!     │          │ reconnect     │
//!     │    fail  ├──────┐        │
//!     ▼◄─────────┘  ok  ▼        ▼
//!   menu ──A/timeout──► client  access point
//!     └──────B──────────────────►
//! ```

use core::fmt::{self, Write};

use embedded_graphics::pixelcolor::{Rgb565, RgbColor};
use embedded_hal_async::delay::DelayNs;
use heapless::String;
use meshsense_hal::gpio::{Button, InputPin};
use meshsense_hal::KeyValueStore;

use crate::network::{AccessPointConfig, ApInfo, ConnectionInfo, NetworkLink, PortalConfig};
use crate::status::StatusScreen;
use crate::wifi::{ModeStore, WifiMode};

/// Capacity of one formatted status line
const LINE_CAPACITY: usize = 64;

/// Scale of full-screen messages
const MESSAGE_SCALE: u8 = 2;

/// Scale of the connection detail lines
const DETAIL_SCALE: u8 = 1;

/// Pauses and retry limits of the provisioning flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProvisioningConfig {
    /// Pause after the boot banner
    pub boot_pause_ms: u32,
    /// Reconnect attempts for a restored client mode
    pub reconnect_attempts: u8,
    /// Delay between reconnect attempts
    pub reconnect_interval_ms: u32,
    /// Pause after a failed reconnect
    pub failure_pause_ms: u32,
    /// Pause on the "setup required" notice
    pub setup_notice_ms: u32,
    /// Pause after a clear, before drawing detail lines
    pub settle_ms: u32,
    /// Pause on a mode banner or "Connected!"
    pub banner_ms: u32,
    /// Pause before a restart
    pub restart_pause_ms: u32,
    /// How long the menu waits for a button
    pub select_timeout_ms: u32,
    /// Button sampling period
    pub button_poll_ms: u32,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            boot_pause_ms: 1000,
            reconnect_attempts: 20,
            reconnect_interval_ms: 500,
            failure_pause_ms: 2000,
            setup_notice_ms: 2000,
            settle_ms: 100,
            banner_ms: 1000,
            restart_pause_ms: 3000,
            select_timeout_ms: 10_000,
            button_poll_ms: 100,
        }
    }
}

/// What the user picked in the setup menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Selection {
    Client,
    AccessPoint,
}

/// Result of the provisioning flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Joined a network as a client
    Client(ConnectionInfo),
    /// Hosting an access point
    AccessPoint(ApInfo),
    /// Setup failed; the board must be reset
    Restart,
}

impl Outcome {
    /// Mode the board ended up in
    pub fn mode(&self) -> WifiMode {
        match self {
            Outcome::Client(_) => WifiMode::Client,
            Outcome::AccessPoint(_) => WifiMode::AccessPoint,
            Outcome::Restart => WifiMode::Unprovisioned,
        }
    }
}

/// Provisioning state machine over its collaborators
pub struct Provisioner<S, N, K, A, B, D> {
    screen: S,
    network: N,
    modes: ModeStore<K>,
    button_a: Button<A>,
    button_b: Button<B>,
    delay: D,
    portal: PortalConfig,
    access_point: AccessPointConfig,
    config: ProvisioningConfig,
}

impl<S, N, K, A, B, D> Provisioner<S, N, K, A, B, D>
where
    S: StatusScreen,
    N: NetworkLink,
    K: KeyValueStore,
    A: InputPin,
    B: InputPin,
    D: DelayNs,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        screen: S,
        network: N,
        modes: ModeStore<K>,
        button_a: Button<A>,
        button_b: Button<B>,
        delay: D,
        portal: PortalConfig,
        access_point: AccessPointConfig,
        config: ProvisioningConfig,
    ) -> Self {
        Self {
            screen,
            network,
            modes,
            button_a,
            button_b,
            delay,
            portal,
            access_point,
            config,
        }
    }

    /// Run the boot flow to completion
    pub async fn run(&mut self) -> Outcome {
        self.screen
            .show_message("Initializing...", Rgb565::CYAN, MESSAGE_SCALE)
            .await;
        self.delay.delay_ms(self.config.boot_pause_ms).await;

        let mode = self.modes.load().await;

        #[cfg(feature = "defmt")]
        defmt::info!("Persisted WiFi mode: {}", mode);

        match mode {
            WifiMode::Unprovisioned => self.provision().await,
            WifiMode::Client => self.restore_client().await,
            WifiMode::AccessPoint => self.setup_access_point().await,
        }
    }

    async fn restore_client(&mut self) -> Outcome {
        self.screen
            .show_message("Connecting...", Rgb565::GREEN, MESSAGE_SCALE)
            .await;

        match self
            .network
            .reconnect(
                self.config.reconnect_attempts,
                self.config.reconnect_interval_ms,
            )
            .await
        {
            Ok(_) => self.setup_client().await,
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Reconnect failed: {}", _e);

                self.screen
                    .show_message("Connection\nFailed!", Rgb565::RED, MESSAGE_SCALE)
                    .await;
                self.delay.delay_ms(self.config.failure_pause_ms).await;
                self.provision().await
            }
        }
    }

    /// Show the setup menu and follow the user's choice
    pub async fn provision(&mut self) -> Outcome {
        self.screen
            .show_message("WiFi Setup\nRequired", Rgb565::MAGENTA, MESSAGE_SCALE)
            .await;
        self.delay.delay_ms(self.config.setup_notice_ms).await;

        self.clear_and_settle().await;

        let legend: [(&str, i16, Rgb565); 5] = [
            ("Press:", 30, Rgb565::WHITE),
            ("BTN A:", 60, Rgb565::GREEN),
            ("Client", 80, Rgb565::WHITE),
            ("BTN B:", 110, Rgb565::BLUE),
            ("Server", 130, Rgb565::WHITE),
        ];
        for (text, y, color) in legend {
            self.screen
                .show_message_at(text, 10, y, color, MESSAGE_SCALE)
                .await;
        }

        match self.await_selection().await {
            Selection::Client => self.setup_client().await,
            Selection::AccessPoint => self.setup_access_point().await,
        }
    }

    /// Sample the buttons until one is pressed or the menu times out
    ///
    /// Button A wins if both are held. A timeout selects client mode.
    pub async fn await_selection(&mut self) -> Selection {
        let poll = self.config.button_poll_ms.max(1);
        let mut waited = 0u32;

        while waited < self.config.select_timeout_ms {
            if self.button_a.is_pressed() {
                return Selection::Client;
            }
            if self.button_b.is_pressed() {
                return Selection::AccessPoint;
            }
            self.delay.delay_ms(poll).await;
            waited = waited.saturating_add(poll);
        }

        #[cfg(feature = "defmt")]
        defmt::info!("No button pressed, defaulting to client mode");

        Selection::Client
    }

    /// Join as a client and show the connection details
    pub async fn setup_client(&mut self) -> Outcome {
        self.screen
            .show_message("WiFi Client\nMode", Rgb565::GREEN, MESSAGE_SCALE)
            .await;
        self.delay.delay_ms(self.config.banner_ms).await;

        let connect_to = line(format_args!("Connect to:\n{}", self.portal.ssid));
        self.screen
            .show_message(&connect_to, Rgb565::YELLOW, MESSAGE_SCALE)
            .await;

        let info = match self.network.join(&self.portal).await {
            Ok(info) => info,
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("WiFi join failed: {}", _e);
                return self.fail_and_restart("WiFi Failed!\nRestarting...").await;
            }
        };

        self.screen
            .show_message("Connected!", Rgb565::GREEN, MESSAGE_SCALE)
            .await;
        self.delay.delay_ms(self.config.banner_ms).await;

        self.clear_and_settle().await;

        let rssi = self.network.rssi().unwrap_or(info.rssi);
        let lines = [
            (line(format_args!("WiFi Client Mode")), 20),
            (line(format_args!("SSID: {}", info.ssid)), 40),
            (line(format_args!("IP: {}", info.ip)), 55),
            (line(format_args!("Signal: {} dBm", rssi)), 70),
        ];
        for (text, y) in &lines {
            self.screen
                .show_message_at(text, 10, *y, Rgb565::GREEN, DETAIL_SCALE)
                .await;
        }

        self.persist(WifiMode::Client).await;

        #[cfg(feature = "defmt")]
        defmt::info!("Client mode up: {}", info);

        Outcome::Client(info)
    }

    /// Start the access point and show its details
    pub async fn setup_access_point(&mut self) -> Outcome {
        self.screen
            .show_message("WiFi AP\nMode", Rgb565::BLUE, MESSAGE_SCALE)
            .await;
        self.delay.delay_ms(self.config.banner_ms).await;

        let info = match self.network.start_access_point(&self.access_point).await {
            Ok(info) => info,
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Access point failed: {}", _e);
                return self.fail_and_restart("AP Failed!\nRestarting...").await;
            }
        };

        self.clear_and_settle().await;

        let lines = [
            (line(format_args!("WiFi AP Mode")), 20, Rgb565::BLUE),
            (line(format_args!("SSID: {}", info.ssid)), 40, Rgb565::BLUE),
            (line(format_args!("Pass: {}", info.password)), 55, Rgb565::BLUE),
            (line(format_args!("IP: {}", info.ip)), 70, Rgb565::BLUE),
            (line(format_args!("Waiting for")), 90, Rgb565::YELLOW),
            (line(format_args!("connections...")), 105, Rgb565::YELLOW),
        ];
        for (text, y, color) in &lines {
            self.screen
                .show_message_at(text, 10, *y, *color, DETAIL_SCALE)
                .await;
        }

        self.persist(WifiMode::AccessPoint).await;

        #[cfg(feature = "defmt")]
        defmt::info!("Access point up: {}", info);

        Outcome::AccessPoint(info)
    }

    /// Tear down, returning the network link for the status task
    pub fn into_network(self) -> N {
        self.network
    }

    async fn fail_and_restart(&mut self, message: &str) -> Outcome {
        self.screen
            .show_message(message, Rgb565::RED, MESSAGE_SCALE)
            .await;
        self.delay.delay_ms(self.config.restart_pause_ms).await;
        Outcome::Restart
    }

    async fn clear_and_settle(&mut self) {
        self.screen.clear(Rgb565::BLACK).await;
        self.delay.delay_ms(self.config.settle_ms).await;
    }

    async fn persist(&mut self, mode: WifiMode) {
        if let Err(_e) = self.modes.save(mode).await {
            #[cfg(feature = "defmt")]
            defmt::error!("Failed to persist WiFi mode {}: {}", mode, _e);
        }
    }
}

/// Format one status line, cutting it at the line capacity
fn line(args: fmt::Arguments<'_>) -> String<LINE_CAPACITY> {
    let mut out = String::new();
    let _ = Truncating(&mut out).write_fmt(args);
    out
}

struct Truncating<'a>(&'a mut String<LINE_CAPACITY>);

impl Write for Truncating<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}
