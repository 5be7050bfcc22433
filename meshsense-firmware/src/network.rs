//! WiFi link over esp-radio and embassy-net
//!
//! Implements [`NetworkLink`] for the provisioning flow. The station and
//! access point interfaces each get their own embassy-net stack; which one
//! carries traffic depends on the mode the radio is configured for.
//!
//! Client credentials are compiled in from `MESHSENSE_WIFI_SSID` and
//! `MESHSENSE_WIFI_PASSWORD`. There is no captive portal.

use core::net::Ipv4Addr;

use defmt::*;
use embassy_executor::Spawner;
use embassy_net::{Ipv4Cidr, Stack, StackResources, StaticConfigV4};
use embassy_time::{with_timeout, Duration, Timer};
use esp_hal::peripherals::WIFI;
use esp_radio::wifi::{AccessPointConfig, AuthMethod, ClientConfig, ModeConfig, WifiController};
use meshsense_core::network::{Ssid, MAX_SSID_LEN};
use meshsense_core::{AccessPointConfig as ApSettings, ApInfo, ConnectionInfo, NetworkError};
use meshsense_core::{NetworkLink, PortalConfig};
use static_cell::StaticCell;

use crate::tasks::net_task;

/// Address of the board on its own access point
pub const AP_ADDRESS: Ipv4Addr = Ipv4Addr::new(192, 168, 4, 1);

// embassy-net needs a random seed per stack
const STA_SEED: u64 = 0x4D53_6E73_0001_5A17;
const AP_SEED: u64 = 0x4D53_6E73_0002_2B34;

static RADIO: StaticCell<esp_radio::Controller<'static>> = StaticCell::new();
static STA_RESOURCES: StaticCell<StackResources<4>> = StaticCell::new();
static AP_RESOURCES: StaticCell<StackResources<4>> = StaticCell::new();

/// Network to join in client mode
#[derive(Clone, Copy)]
struct Credentials {
    ssid: &'static str,
    password: &'static str,
}

impl Credentials {
    const fn compiled() -> Option<Self> {
        match (
            option_env!("MESHSENSE_WIFI_SSID"),
            option_env!("MESHSENSE_WIFI_PASSWORD"),
        ) {
            (Some(ssid), Some(password)) => Some(Self { ssid, password }),
            (Some(ssid), None) => Some(Self { ssid, password: "" }),
            _ => None,
        }
    }
}

/// Radio, station stack and access point stack
pub struct EspNetwork {
    controller: WifiController<'static>,
    sta: Stack<'static>,
    ap: Stack<'static>,
    credentials: Option<Credentials>,
}

impl EspNetwork {
    /// Bring up the radio and spawn both network stacks on `spawner`
    ///
    /// Must only be called once.
    pub fn start(spawner: Spawner, wifi: WIFI<'static>) -> Result<Self, NetworkError> {
        let radio = esp_radio::init().map_err(|e| {
            warn!("esp-radio init failed: {}", Debug2Format(&e));
            NetworkError::Radio
        })?;
        let radio = RADIO.init(radio);

        let (controller, interfaces) =
            esp_radio::wifi::new(radio, wifi, esp_radio::wifi::Config::default()).map_err(
                |e| {
                    warn!("WiFi init failed: {}", Debug2Format(&e));
                    NetworkError::Radio
                },
            )?;

        let (sta, sta_runner) = embassy_net::new(
            interfaces.sta,
            embassy_net::Config::dhcpv4(Default::default()),
            STA_RESOURCES.init(StackResources::new()),
            STA_SEED,
        );

        let ap_config = embassy_net::Config::ipv4_static(StaticConfigV4 {
            address: Ipv4Cidr::new(AP_ADDRESS, 24),
            gateway: Some(AP_ADDRESS),
            dns_servers: Default::default(),
        });
        let (ap, ap_runner) = embassy_net::new(
            interfaces.ap,
            ap_config,
            AP_RESOURCES.init(StackResources::new()),
            AP_SEED,
        );

        spawner
            .spawn(net_task(sta_runner))
            .map_err(|_| NetworkError::Radio)?;
        spawner
            .spawn(net_task(ap_runner))
            .map_err(|_| NetworkError::Radio)?;

        let credentials = Credentials::compiled();
        if credentials.is_none() {
            warn!("No client credentials compiled in (MESHSENSE_WIFI_SSID)");
        }

        Ok(Self {
            controller,
            sta,
            ap,
            credentials,
        })
    }

    /// Whether the access point interface has its address
    pub fn is_access_point_up(&self) -> bool {
        self.ap.is_config_up()
    }

    /// (Re)start the radio in `mode`
    async fn restart_with(&mut self, mode: ModeConfig) -> Result<(), NetworkError> {
        if self.controller.is_started().unwrap_or(false) {
            self.controller.stop_async().await.map_err(radio_error)?;
        }
        self.controller.set_config(&mode).map_err(radio_error)?;
        self.controller.start_async().await.map_err(radio_error)
    }

    async fn start_client(&mut self) -> Result<Credentials, NetworkError> {
        let credentials = self.credentials.ok_or(NetworkError::NotProvisioned)?;
        let client = ClientConfig::default()
            .with_ssid(credentials.ssid.into())
            .with_password(credentials.password.into());
        self.restart_with(ModeConfig::Client(client)).await?;
        Ok(credentials)
    }

    /// Connect once, then wait for DHCP
    async fn connect(&mut self, ssid: &str) -> Result<ConnectionInfo, NetworkError> {
        self.controller.connect_async().await.map_err(|e| {
            debug!("Connect failed: {}", Debug2Format(&e));
            NetworkError::JoinFailed
        })?;
        self.sta.wait_config_up().await;
        self.connection_info(ssid)
    }

    fn connection_info(&mut self, ssid: &str) -> Result<ConnectionInfo, NetworkError> {
        let config = self.sta.config_v4().ok_or(NetworkError::NoAddress)?;
        Ok(ConnectionInfo {
            ssid: bounded_ssid(ssid),
            ip: config.address.address(),
            rssi: NetworkLink::rssi(self).unwrap_or(0),
        })
    }
}

impl NetworkLink for EspNetwork {
    async fn reconnect(
        &mut self,
        attempts: u8,
        interval_ms: u32,
    ) -> Result<ConnectionInfo, NetworkError> {
        let credentials = self.start_client().await?;
        let interval = Duration::from_millis(u64::from(interval_ms));

        for attempt in 1..=attempts {
            match with_timeout(interval, self.controller.connect_async()).await {
                Ok(Ok(())) => {
                    let budget = interval * u32::from(attempts - attempt + 1);
                    with_timeout(budget, self.sta.wait_config_up())
                        .await
                        .map_err(|_| NetworkError::NoAddress)?;
                    return self.connection_info(credentials.ssid);
                }
                Ok(Err(e)) => {
                    debug!("Reconnect attempt {} failed: {}", attempt, Debug2Format(&e));
                    Timer::after(interval).await;
                }
                Err(_) => trace!("Reconnect attempt {} timed out", attempt),
            }
        }

        Err(NetworkError::Timeout)
    }

    async fn join(&mut self, portal: &PortalConfig) -> Result<ConnectionInfo, NetworkError> {
        let credentials = self.start_client().await?;
        info!(
            "Joining {} (setup portal {} not served)",
            credentials.ssid,
            portal.ssid.as_str()
        );

        let budget = Duration::from_secs(u64::from(portal.timeout_s));
        match with_timeout(budget, self.connect(credentials.ssid)).await {
            Ok(result) => result,
            Err(_) => Err(NetworkError::Timeout),
        }
    }

    async fn start_access_point(&mut self, ap: &ApSettings) -> Result<ApInfo, NetworkError> {
        let config = AccessPointConfig::default()
            .with_ssid(ap.ssid.as_str().into())
            .with_password(ap.password.as_str().into())
            .with_auth_method(AuthMethod::Wpa2Personal);
        self.restart_with(ModeConfig::AccessPoint(config)).await?;

        info!("Access point {} up at {}", ap.ssid.as_str(), AP_ADDRESS);

        Ok(ApInfo {
            ssid: ap.ssid.clone(),
            password: ap.password.clone(),
            ip: AP_ADDRESS,
        })
    }

    fn rssi(&mut self) -> Option<i8> {
        if !matches!(self.controller.is_connected(), Ok(true)) {
            return None;
        }
        self.controller
            .rssi()
            .ok()
            .map(|dbm| dbm.clamp(i32::from(i8::MIN), i32::from(i8::MAX)) as i8)
    }
}

fn radio_error(e: esp_radio::wifi::WifiError) -> NetworkError {
    warn!("WiFi error: {}", Debug2Format(&e));
    NetworkError::Radio
}

/// SSID as shown on screen, cut at a character boundary if needed
fn bounded_ssid(ssid: &str) -> Ssid {
    let mut end = ssid.len().min(MAX_SSID_LEN);
    while !ssid.is_char_boundary(end) {
        end -= 1;
    }
    let mut bounded = Ssid::new();
    // Cannot fail: `end` is within capacity
    let _ = bounded.push_str(&ssid[..end]);
    bounded
}
