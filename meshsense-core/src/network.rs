//! Network collaborator interface
//!
//! The provisioning flow only needs to know whether a join worked and what
//! to print about it. The radio driver lives in the firmware.

use core::future::Future;
use core::net::Ipv4Addr;

use heapless::String;

/// Maximum SSID length in bytes (802.11)
pub const MAX_SSID_LEN: usize = 32;

/// Maximum WPA2 passphrase length in bytes
pub const MAX_PASSWORD_LEN: usize = 64;

pub type Ssid = String<MAX_SSID_LEN>;
pub type Password = String<MAX_PASSWORD_LEN>;

/// Network operation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetworkError {
    /// No stored credentials to reconnect with
    NotProvisioned,
    /// Association or authentication failed
    JoinFailed,
    /// Gave up before a connection came up
    Timeout,
    /// Connected but no address was acquired
    NoAddress,
    /// The radio rejected the configuration
    Radio,
}

/// Parameters of the setup network a client joins through
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    /// Name shown on screen as the network to connect to
    pub ssid: Ssid,
    pub password: Password,
    /// How long the join may take before giving up
    pub timeout_s: u16,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            ssid: String::try_from("MeshSense-AP").unwrap_or_default(),
            password: String::try_from("password").unwrap_or_default(),
            timeout_s: 180,
        }
    }
}

/// Parameters of the access point the board hosts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPointConfig {
    pub ssid: Ssid,
    pub password: Password,
}

impl Default for AccessPointConfig {
    fn default() -> Self {
        Self {
            ssid: String::try_from("MeshSense-Server").unwrap_or_default(),
            password: String::try_from("mesh1234").unwrap_or_default(),
        }
    }
}

/// An established client connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub ssid: Ssid,
    pub ip: Ipv4Addr,
    /// Signal strength in dBm
    pub rssi: i8,
}

/// A running access point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApInfo {
    pub ssid: Ssid,
    pub password: Password,
    pub ip: Ipv4Addr,
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConnectionInfo {
    fn format(&self, f: defmt::Formatter) {
        let [a, b, c, d] = self.ip.octets();
        defmt::write!(
            f,
            "{=str} {}.{}.{}.{} {} dBm",
            self.ssid.as_str(),
            a,
            b,
            c,
            d,
            self.rssi
        );
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ApInfo {
    fn format(&self, f: defmt::Formatter) {
        let [a, b, c, d] = self.ip.octets();
        defmt::write!(f, "{=str} {}.{}.{}.{}", self.ssid.as_str(), a, b, c, d);
    }
}

/// WiFi link used by the provisioning flow
pub trait NetworkLink {
    /// Rejoin with previously used credentials, trying `attempts` times
    /// `interval_ms` apart
    fn reconnect(
        &mut self,
        attempts: u8,
        interval_ms: u32,
    ) -> impl Future<Output = Result<ConnectionInfo, NetworkError>>;

    /// Join as a client through the setup network described by `portal`
    ///
    /// Returns the current connection if already connected.
    fn join(
        &mut self,
        portal: &PortalConfig,
    ) -> impl Future<Output = Result<ConnectionInfo, NetworkError>>;

    /// Start hosting an access point
    fn start_access_point(
        &mut self,
        ap: &AccessPointConfig,
    ) -> impl Future<Output = Result<ApInfo, NetworkError>>;

    /// Current client signal strength in dBm, if connected
    fn rssi(&mut self) -> Option<i8>;
}
