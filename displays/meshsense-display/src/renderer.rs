//! Renderer loop
//!
//! The renderer is the single consumer of the command channel and the only
//! code that touches the display backend while the subsystem is running.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{Duration, Timer};

use crate::backend::{DisplayError, TextDisplay};
use crate::command::DisplayCommand;
use crate::subsystem::DisplayLink;

/// Reference polling interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How the renderer waits between bursts of commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderMode {
    /// Drain, then sleep for a fixed interval before checking again
    Poll(Duration),
    /// Drain, then sleep until a producer submits
    WaitForSubmit,
}

impl Default for RenderMode {
    fn default() -> Self {
        RenderMode::Poll(DEFAULT_POLL_INTERVAL)
    }
}

/// Channel consumer that applies commands to a display backend
pub struct Renderer<'a, D, M: RawMutex, const N: usize> {
    display: D,
    link: &'a DisplayLink<M, N>,
    mode: RenderMode,
    applied: u32,
}

impl<'a, D: TextDisplay, M: RawMutex, const N: usize> Renderer<'a, D, M, N> {
    /// Create a renderer for an already initialized display
    pub(crate) fn new(display: D, link: &'a DisplayLink<M, N>, mode: RenderMode) -> Self {
        Self {
            display,
            link,
            mode,
            applied: 0,
        }
    }

    /// Apply one command to the display
    ///
    /// Fill first (if requested), then text (if any). Errors are returned
    /// so the loop can log them; nothing is retried.
    pub fn apply(&mut self, command: &DisplayCommand) -> Result<(), DisplayError> {
        if let Some(fill) = command.fill() {
            self.display.fill(fill)?;
        }

        if command.has_text() {
            let at = command.position();
            self.display.set_cursor(at.x, at.y);
            self.display.set_text_color(command.color());
            self.display.set_text_scale(command.text_size());
            self.display.draw_text(command.text())?;
        }

        Ok(())
    }

    /// Apply every command currently queued, returning how many were applied
    pub fn drain_pending(&mut self) -> usize {
        let mut count = 0;
        while let Some(command) = self.link.channel().try_drain_one() {
            self.apply_logged(&command);
            count += 1;
        }
        count
    }

    /// Run until the subsystem is shut down, then hand the display back
    ///
    /// Commands still queued when the stop request arrives are left for
    /// the shutdown path to discard.
    pub async fn run(mut self) -> D {
        let link = self.link;

        #[cfg(feature = "defmt")]
        defmt::info!("Renderer started ({})", self.mode);

        loop {
            self.drain_pending();

            match self.mode {
                RenderMode::Poll(interval) => {
                    if let Either::First(()) =
                        select(link.stop_requested(), Timer::after(interval)).await
                    {
                        break;
                    }
                }
                RenderMode::WaitForSubmit => {
                    match select(link.stop_requested(), link.channel().receive()).await {
                        Either::First(()) => break,
                        Either::Second(command) => self.apply_logged(&command),
                    }
                }
            }
        }

        #[cfg(feature = "defmt")]
        defmt::info!("Renderer stopped after {} commands", self.applied);

        link.acknowledge_stop();
        self.display
    }

    /// Number of commands applied so far
    pub fn applied(&self) -> u32 {
        self.applied
    }

    /// Borrow the display backend
    pub fn display(&self) -> &D {
        &self.display
    }

    fn apply_logged(&mut self, command: &DisplayCommand) {
        self.applied = self.applied.wrapping_add(1);
        if let Err(_e) = self.apply(command) {
            #[cfg(feature = "defmt")]
            defmt::warn!("Failed to render {}: {:?}", command, _e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subsystem::DisplayLink;
    use crate::testing::{DrawOp, RecordingDisplay};
    use embassy_futures::{block_on, join::join, yield_now};
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use embedded_graphics::pixelcolor::{Rgb565, RgbColor};
    use std::vec;

    type TestLink = DisplayLink<CriticalSectionRawMutex, 10>;

    fn renderer(link: &TestLink, mode: RenderMode) -> Renderer<'_, RecordingDisplay, CriticalSectionRawMutex, 10> {
        Renderer::new(RecordingDisplay::new(), link, mode)
    }

    #[test]
    fn test_message_applies_clear_then_text() {
        let link = TestLink::new();
        let mut r = renderer(&link, RenderMode::default());

        let cmd = DisplayCommand::message("WiFi Client\nMode")
            .with_color(Rgb565::GREEN)
            .with_scale(2);
        r.apply(&cmd).unwrap();

        assert_eq!(
            r.display().ops(),
            &[
                DrawOp::Fill(Rgb565::BLACK),
                DrawOp::Cursor(10, 50),
                DrawOp::TextColor(Rgb565::GREEN),
                DrawOp::TextScale(2),
                DrawOp::Text("WiFi Client\nMode".into()),
            ]
        );
        assert_eq!(r.display().lines(), vec!["WiFi Client", "Mode"]);
    }

    #[test]
    fn test_clear_then_message_at_two_passes() {
        let link = TestLink::new();
        link.channel().try_submit(DisplayCommand::clear(Rgb565::BLACK)).unwrap();
        link.channel()
            .try_submit(
                DisplayCommand::message_at("IP: 192.168.4.1", 10, 70)
                    .with_color(Rgb565::BLUE)
                    .with_scale(1),
            )
            .unwrap();

        let mut r = renderer(&link, RenderMode::default());
        assert_eq!(r.drain_pending(), 2);

        assert_eq!(
            r.display().ops(),
            &[
                DrawOp::Fill(Rgb565::BLACK),
                DrawOp::Cursor(10, 70),
                DrawOp::TextColor(Rgb565::BLUE),
                DrawOp::TextScale(1),
                DrawOp::Text("IP: 192.168.4.1".into()),
            ]
        );
        assert_eq!(r.display().fill_count(), 1);
    }

    #[test]
    fn test_drain_preserves_fifo() {
        let link = TestLink::new();
        for i in 0..10i16 {
            link.channel()
                .try_submit(DisplayCommand::message_at(&std::format!("{}", i), 0, i))
                .unwrap();
        }

        let mut r = renderer(&link, RenderMode::default());
        assert_eq!(r.drain_pending(), 10);
        assert_eq!(r.applied(), 10);

        let texts: std::vec::Vec<&str> = r.display().texts().collect();
        assert_eq!(texts, vec!["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"]);
        assert!(link.channel().is_empty());
    }

    #[test]
    fn test_draw_error_skips_command() {
        let link = TestLink::new();
        link.channel().try_submit(DisplayCommand::message_at("bad", 0, 0)).unwrap();
        link.channel().try_submit(DisplayCommand::message_at("good", 0, 10)).unwrap();

        let mut display = RecordingDisplay::new();
        display.fail_text("bad");
        let mut r = Renderer::new(display, &link, RenderMode::default());

        assert_eq!(r.drain_pending(), 2);
        let texts: std::vec::Vec<&str> = r.display().texts().collect();
        assert_eq!(texts, vec!["good"]);
    }

    fn run_until_drained(mode: RenderMode) -> RecordingDisplay {
        let link = TestLink::new();
        let r = renderer(&link, mode);

        let (display, ()) = block_on(join(r.run(), async {
            link.channel().submit(DisplayCommand::clear(Rgb565::RED)).await;
            link.channel()
                .submit(DisplayCommand::message_at("first", 1, 2))
                .await;
            link.channel()
                .submit(DisplayCommand::message_at("second", 3, 4))
                .await;
            while !link.channel().is_empty() {
                yield_now().await;
            }
            link.request_stop();
        }));

        assert!(link.stop_acknowledged());
        display
    }

    #[test]
    fn test_run_poll_mode() {
        let display = run_until_drained(RenderMode::Poll(Duration::from_millis(1)));
        assert_eq!(display.fills().collect::<std::vec::Vec<_>>(), vec![Rgb565::RED]);
        assert_eq!(
            display.texts().collect::<std::vec::Vec<_>>(),
            vec!["first", "second"]
        );
    }

    #[test]
    fn test_run_wait_mode() {
        let display = run_until_drained(RenderMode::WaitForSubmit);
        assert_eq!(display.fills().collect::<std::vec::Vec<_>>(), vec![Rgb565::RED]);
        assert_eq!(
            display.texts().collect::<std::vec::Vec<_>>(),
            vec!["first", "second"]
        );
    }
}
