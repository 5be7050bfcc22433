//! ST7789 panel of the ESP32-S3 TFT Feather
//!
//! Implements [`TextDisplay`] over mipidsi. The controller is only brought
//! out of reset when the display subsystem calls [`TextDisplay::init`], so
//! construction is free of bus traffic.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::DrawTarget;
use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};
use esp_hal::delay::Delay;
use esp_hal::gpio::Output;
use esp_hal::spi::master::Spi;
use esp_hal::Blocking;
use meshsense_display::{DisplayError, Rotation, TextCursor, TextDisplay};
use mipidsi::interface::SpiInterface;
use mipidsi::models::ST7789;
use mipidsi::options::{ColorInversion, Orientation, Rotation as PanelRotation};
use mipidsi::{Builder, Display};

/// SPI bus with the panel's chip select
pub type PanelSpi = ExclusiveDevice<Spi<'static, Blocking>, Output<'static>, NoDelay>;

type Interface = SpiInterface<'static, PanelSpi, Output<'static>>;
type Panel = Display<Interface, ST7789, Output<'static>>;

/// Position of the 135x240 glass inside the controller's 240x320 RAM
const PANEL_OFFSET: (u16, u16) = (52, 40);

enum State {
    /// Wired up, controller not initialized yet
    Idle {
        interface: Interface,
        rst: Output<'static>,
    },
    Ready(Panel),
    /// Initialization failed and consumed the bus
    Faulted,
}

/// Text display on the Feather's ST7789
pub struct St7789Display {
    state: State,
    cursor: TextCursor,
}

impl St7789Display {
    /// `buffer` batches pixel data for SPI transfers
    pub fn new(
        spi: PanelSpi,
        dc: Output<'static>,
        rst: Output<'static>,
        buffer: &'static mut [u8],
    ) -> Self {
        Self {
            state: State::Idle {
                interface: SpiInterface::new(spi, dc, buffer),
                rst,
            },
            cursor: TextCursor::new(),
        }
    }

    fn panel(&mut self) -> Result<&mut Panel, DisplayError> {
        match &mut self.state {
            State::Ready(panel) => Ok(panel),
            _ => Err(DisplayError::NotInitialized),
        }
    }
}

impl TextDisplay for St7789Display {
    fn init(&mut self, width: u16, height: u16) -> Result<(), DisplayError> {
        match core::mem::replace(&mut self.state, State::Faulted) {
            State::Idle { interface, rst } => {
                let panel = Builder::new(ST7789, interface)
                    .display_size(width, height)
                    .display_offset(PANEL_OFFSET.0, PANEL_OFFSET.1)
                    .invert_colors(ColorInversion::Inverted)
                    .reset_pin(rst)
                    .init(&mut Delay::new())
                    .map_err(|_| DisplayError::Communication)?;
                self.state = State::Ready(panel);
                Ok(())
            }
            State::Ready(panel) => {
                self.state = State::Ready(panel);
                Ok(())
            }
            State::Faulted => Err(DisplayError::NotInitialized),
        }
    }

    fn set_rotation(&mut self, rotation: Rotation) -> Result<(), DisplayError> {
        let rotation = match rotation {
            Rotation::Deg0 => PanelRotation::Deg0,
            Rotation::Deg90 => PanelRotation::Deg90,
            Rotation::Deg180 => PanelRotation::Deg180,
            Rotation::Deg270 => PanelRotation::Deg270,
        };
        self.panel()?
            .set_orientation(Orientation::new().rotate(rotation))
            .map_err(|_| DisplayError::Communication)
    }

    fn fill(&mut self, color: Rgb565) -> Result<(), DisplayError> {
        self.panel()?
            .clear(color)
            .map_err(|_| DisplayError::Communication)
    }

    fn set_cursor(&mut self, x: i16, y: i16) {
        self.cursor.set_position(x, y);
    }

    fn set_text_color(&mut self, color: Rgb565) {
        self.cursor.set_color(color);
    }

    fn set_text_scale(&mut self, scale: u8) {
        self.cursor.set_scale(scale);
    }

    fn draw_text(&mut self, text: &str) -> Result<(), DisplayError> {
        let State::Ready(panel) = &mut self.state else {
            return Err(DisplayError::NotInitialized);
        };
        self.cursor
            .draw(panel, text)
            .map_err(|_| DisplayError::Communication)
    }
}
