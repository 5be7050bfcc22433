//! MeshSense - Status Display Firmware
//!
//! Firmware for the Adafruit ESP32-S3 TFT Feather. Core 0 runs the display
//! renderer, which owns the ST7789 bus. Core 1 runs WiFi provisioning and
//! networking, and only reaches the screen through the display subsystem's
//! command queue.

#![no_std]
#![no_main]

extern crate alloc;

use defmt::*;
use embassy_executor::Spawner;
use embassy_time::Timer;
use embedded_hal_bus::spi::ExclusiveDevice;
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull};
use esp_hal::interrupt::software::SoftwareInterruptControl;
use esp_hal::spi::master::{Config as SpiConfig, Spi};
use esp_hal::system::Stack;
use esp_hal::time::Rate;
use esp_hal::timer::timg::TimerGroup;
use meshsense_display::{DisplayManager, SpawnError};
use meshsense_hal_esp32s3::{Esp32s3Input, Esp32s3Output, FlashStore};
use static_cell::StaticCell;
use {esp_backtrace as _, esp_println as _};

use crate::channels::{BACKLIGHT, DISPLAY_LINK};
use crate::display::St7789Display;
use crate::tasks::AppResources;

mod channels;
mod config;
mod display;
mod network;
mod tasks;

// ESP-IDF app descriptor required by espflash
esp_bootloader_esp_idf::esp_app_desc!();

/// Panel SPI clock
const DISPLAY_SPI_MHZ: u32 = 40;

// Static cells (must live forever)
static APP_CORE_STACK: StaticCell<Stack<16384>> = StaticCell::new();
static TFT_POWER: StaticCell<Output<'static>> = StaticCell::new();
static PANEL_BUFFER: StaticCell<[u8; 512]> = StaticCell::new();

/// Main entry point, on core 0
#[esp_rtos::main]
async fn main(spawner: Spawner) {
    let peripherals = esp_hal::init(esp_hal::Config::default().with_cpu_clock(CpuClock::max()));

    // esp-radio requires an allocator
    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 64 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("MeshSense firmware starting...");

    let board = config::load_board_config();

    // TFT and STEMMA QT share this power switch (TFT_I2C_POWER)
    TFT_POWER.init(Output::new(
        peripherals.GPIO21,
        Level::High,
        OutputConfig::default(),
    ));

    // Feather TFT wiring: SCK=GPIO36 MOSI=GPIO35 CS=GPIO7 DC=GPIO39 RST=GPIO40 BL=GPIO45
    let spi = Spi::new(
        peripherals.SPI2,
        SpiConfig::default().with_frequency(Rate::from_mhz(DISPLAY_SPI_MHZ)),
    )
    .unwrap()
    .with_sck(peripherals.GPIO36)
    .with_mosi(peripherals.GPIO35);
    let cs = Output::new(peripherals.GPIO7, Level::High, OutputConfig::default());
    let dc = Output::new(peripherals.GPIO39, Level::Low, OutputConfig::default());
    let rst = Output::new(peripherals.GPIO40, Level::High, OutputConfig::default());
    let backlight = Output::new(peripherals.GPIO45, Level::Low, OutputConfig::default());

    let spi_device = ExclusiveDevice::new_no_delay(spi, cs).unwrap();
    let panel = St7789Display::new(spi_device, dc, rst, PANEL_BUFFER.init([0u8; 512]));

    let mut manager = DisplayManager::new(&DISPLAY_LINK, &BACKLIGHT, board.display);
    let screen = match manager.begin(Esp32s3Output::new(backlight), panel, |renderer| {
        spawner
            .spawn(tasks::display_task(renderer))
            .map_err(|_| SpawnError)
    }) {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to initialize display: {}", e);
            loop {
                Timer::after_secs(1).await;
            }
        }
    };
    info!("Display subsystem running");

    // Buttons: A is BOOT (GPIO0), B is D5 (GPIO5); both pull to ground
    let buttons = InputConfig::default().with_pull(Pull::Up);
    let resources = AppResources {
        screen,
        wifi: peripherals.WIFI,
        flash: FlashStore::new(peripherals.FLASH),
        button_a: Esp32s3Input::new(Input::new(peripherals.GPIO0, buttons)),
        button_b: Esp32s3Input::new(Input::new(peripherals.GPIO5, buttons)),
        board,
    };

    let sw_ints = SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    let app_core_stack = APP_CORE_STACK.init(Stack::new());

    esp_rtos::start_second_core(
        peripherals.CPU_CTRL,
        sw_ints.software_interrupt0,
        sw_ints.software_interrupt1,
        app_core_stack,
        move || {
            static EXECUTOR: StaticCell<esp_rtos::embassy::Executor> = StaticCell::new();
            let executor = EXECUTOR.init(esp_rtos::embassy::Executor::new());
            executor.run(|spawner| {
                spawner
                    .spawn(tasks::provisioning_task(spawner, resources))
                    .unwrap();
            });
        },
    );

    info!("Application core started");

    // Core 0 has nothing else to do - the renderer runs as its own task
    loop {
        Timer::after_secs(60).await;
    }
}
