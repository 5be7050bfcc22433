//! Status screen abstraction
//!
//! The provisioning flow reports progress through [`StatusScreen`] so it can
//! be tested against a recording screen. On the board it is implemented by
//! the display subsystem's producer handle.

use core::future::Future;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_graphics::pixelcolor::Rgb565;
use meshsense_display::{DisplayHandle, SubmitError};
use meshsense_hal::OutputPin;

/// Text output used for status messages
///
/// Updates are best effort: a rejected update is logged, never retried.
pub trait StatusScreen {
    /// Clear to the background, then draw at the default position
    fn show_message(&self, text: &str, color: Rgb565, scale: u8) -> impl Future<Output = ()>;

    /// Draw at `(x, y)` without clearing
    fn show_message_at(
        &self,
        text: &str,
        x: i16,
        y: i16,
        color: Rgb565,
        scale: u8,
    ) -> impl Future<Output = ()>;

    /// Fill the screen with `color`
    fn clear(&self, color: Rgb565) -> impl Future<Output = ()>;
}

impl<M: RawMutex, P: OutputPin, const N: usize> StatusScreen for DisplayHandle<'_, M, P, N> {
    async fn show_message(&self, text: &str, color: Rgb565, scale: u8) {
        log_rejected(DisplayHandle::show_message(self, text, color, scale).await);
    }

    async fn show_message_at(&self, text: &str, x: i16, y: i16, color: Rgb565, scale: u8) {
        log_rejected(DisplayHandle::show_message_at(self, text, x, y, color, scale).await);
    }

    async fn clear(&self, color: Rgb565) {
        log_rejected(DisplayHandle::clear(self, color).await);
    }
}

fn log_rejected(result: Result<(), SubmitError>) {
    if let Err(_e) = result {
        #[cfg(feature = "defmt")]
        defmt::warn!("Status update dropped: {}", _e);
    }
}
