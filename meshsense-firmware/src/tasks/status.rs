//! Periodic connection status log

use defmt::*;
use embassy_time::{Duration, Ticker};
use meshsense_core::{NetworkLink, WifiMode};

use crate::network::EspNetwork;

const STATUS_INTERVAL: Duration = Duration::from_secs(5);

/// Log the link state every few seconds, forever
pub async fn report_forever(network: &mut EspNetwork, mode: WifiMode) -> ! {
    let mut ticker = Ticker::every(STATUS_INTERVAL);

    loop {
        ticker.next().await;

        match mode {
            WifiMode::Client => match network.rssi() {
                Some(dbm) => info!("client rssi={} dBm", dbm),
                None => warn!("client link down"),
            },
            WifiMode::AccessPoint => {
                if network.is_access_point_up() {
                    info!("access point active");
                } else {
                    warn!("access point interface down");
                }
            }
            WifiMode::Unprovisioned => {}
        }
    }
}
