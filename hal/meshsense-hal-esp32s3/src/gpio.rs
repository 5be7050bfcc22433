//! GPIO wrappers
//!
//! Newtypes over the esp-hal drivers so the board-agnostic crates only see
//! the `meshsense-hal` pin traits.

use esp_hal::gpio::{Input, Output};

/// Push-pull output, used for the TFT backlight
pub struct Esp32s3Output<'d>(Output<'d>);

impl<'d> Esp32s3Output<'d> {
    pub fn new(pin: Output<'d>) -> Self {
        Self(pin)
    }
}

impl meshsense_hal::OutputPin for Esp32s3Output<'_> {
    fn set_high(&mut self) {
        self.0.set_high();
    }

    fn set_low(&mut self) {
        self.0.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.0.is_set_high()
    }
}

/// Digital input, used for the user buttons
pub struct Esp32s3Input<'d>(Input<'d>);

impl<'d> Esp32s3Input<'d> {
    pub fn new(pin: Input<'d>) -> Self {
        Self(pin)
    }
}

impl meshsense_hal::InputPin for Esp32s3Input<'_> {
    fn is_high(&self) -> bool {
        self.0.is_high()
    }
}
