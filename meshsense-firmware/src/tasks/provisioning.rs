//! Provisioning task
//!
//! Brings up the radio, runs the boot-time provisioning flow and then
//! keeps logging the link status. A failed setup resets the chip.

use defmt::*;
use embassy_executor::Spawner;
use embassy_time::{Delay, Timer};
use embedded_graphics::pixelcolor::{Rgb565, RgbColor};
use esp_hal::peripherals::WIFI;
use meshsense_core::{BoardConfig, ModeStore, Outcome, Provisioner};
use meshsense_hal::gpio::Button;
use meshsense_hal_esp32s3::{Esp32s3Input, FlashStore};

use crate::channels::Screen;
use crate::network::EspNetwork;
use crate::tasks::status;

/// Everything the application core needs, moved over at startup
pub struct AppResources {
    pub screen: Screen,
    pub wifi: WIFI<'static>,
    pub flash: FlashStore<'static>,
    /// BOOT button (GPIO0), active-low
    pub button_a: Esp32s3Input<'static>,
    /// External button on D5 (GPIO5) to ground, active-low
    pub button_b: Esp32s3Input<'static>,
    pub board: BoardConfig,
}

#[embassy_executor::task]
pub async fn provisioning_task(spawner: Spawner, app: AppResources) {
    info!("Provisioning task started");

    let AppResources {
        screen,
        wifi,
        flash,
        button_a,
        button_b,
        board,
    } = app;

    let network = match EspNetwork::start(spawner, wifi) {
        Ok(network) => network,
        Err(e) => {
            error!("Radio unavailable: {}", e);
            let _ = screen
                .show_message("Radio Failed!", Rgb565::RED, 2)
                .await;
            loop {
                Timer::after_secs(1).await;
            }
        }
    };

    let mut provisioner = Provisioner::new(
        screen,
        network,
        ModeStore::new(flash),
        Button::active_low(button_a),
        Button::active_low(button_b),
        Delay,
        board.portal,
        board.access_point,
        board.provisioning,
    );

    let outcome = provisioner.run().await;
    match &outcome {
        Outcome::Client(info) => info!("Client mode: {}", info),
        Outcome::AccessPoint(info) => info!("Access point mode: {}", info),
        Outcome::Restart => {
            warn!("Provisioning failed, restarting");
            esp_hal::system::software_reset();
        }
    }

    let mut network = provisioner.into_network();
    status::report_forever(&mut network, outcome.mode()).await
}
