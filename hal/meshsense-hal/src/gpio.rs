//! GPIO pin abstractions
//!
//! Provides traits for digital input and output pins that can be implemented
//! by chip-specific HALs.

/// Digital output pin
///
/// Used for the display backlight enable line.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;
}

/// Digital input pin
///
/// Used for the board's user buttons.
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

/// Logical button on top of an input pin
///
/// Boards wire buttons either to ground (pull-up, active-low) or to the
/// supply rail (pull-down, active-high).
pub struct Button<P> {
    pin: P,
    active_low: bool,
}

impl<P: InputPin> Button<P> {
    /// Button that reads low while pressed
    pub fn active_low(pin: P) -> Self {
        Self {
            pin,
            active_low: true,
        }
    }

    /// Button that reads high while pressed
    pub fn active_high(pin: P) -> Self {
        Self {
            pin,
            active_low: false,
        }
    }

    /// Check whether the button is held down right now
    pub fn is_pressed(&self) -> bool {
        self.pin.is_high() != self.active_low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockInput {
        high: bool,
    }

    impl InputPin for MockInput {
        fn is_high(&self) -> bool {
            self.high
        }
    }

    struct MockOutput {
        high: bool,
    }

    impl OutputPin for MockOutput {
        fn set_high(&mut self) {
            self.high = true;
        }

        fn set_low(&mut self) {
            self.high = false;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    #[test]
    fn test_set_state() {
        let mut pin = MockOutput { high: false };
        pin.set_state(true);
        assert!(pin.is_set_high());
        pin.set_state(false);
        assert!(!pin.is_set_high());
    }

    #[test]
    fn test_active_low_button() {
        assert!(Button::active_low(MockInput { high: false }).is_pressed());
        assert!(!Button::active_low(MockInput { high: true }).is_pressed());
    }

    #[test]
    fn test_active_high_button() {
        assert!(Button::active_high(MockInput { high: true }).is_pressed());
        assert!(!Button::active_high(MockInput { high: false }).is_pressed());
    }
}
