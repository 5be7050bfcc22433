//! embassy-net stack runner

use embassy_net::Runner;
use esp_radio::wifi::WifiDevice;

/// One per interface (station and access point)
#[embassy_executor::task(pool_size = 2)]
pub async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) -> ! {
    runner.run().await
}
