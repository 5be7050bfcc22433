//! Display renderer task
//!
//! Owns the ST7789 bus for the lifetime of the firmware.

use defmt::*;
use esp_hal::system::Cpu;

use crate::channels::PanelRenderer;

#[embassy_executor::task]
pub async fn display_task(renderer: PanelRenderer) {
    info!("Display task started on {}", Debug2Format(&Cpu::current()));

    let _panel = renderer.run().await;

    // Only reached after a subsystem shutdown
    info!("Display task stopped");
}
