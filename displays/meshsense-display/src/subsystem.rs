//! Display subsystem lifecycle
//!
//! The subsystem is split into borrowed parts so the firmware can keep the
//! backing storage in `static`s without a global handle:
//!
//! - [`DisplayLink`] - the command channel plus the armed/stop state shared
//!   by producers and the renderer
//! - [`Backlight`] - the backlight pin, written directly by producers
//! - [`DisplayManager`] - runs `begin`/`shutdown` over the two above
//! - [`DisplayHandle`] - `Copy` producer handle passed to whoever needs to
//!   show status

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_futures::yield_now;
use embassy_sync::signal::Signal;
use embedded_graphics::pixelcolor::Rgb565;
use meshsense_hal::OutputPin;
use portable_atomic::{AtomicU8, AtomicUsize, Ordering};

use crate::backend::{DisplayError, Rotation, TextDisplay};
use crate::channel::{CommandChannel, SubmitError, SubmitPolicy};
use crate::command::{DisplayCommand, DEFAULT_BACKGROUND};
use crate::renderer::{RenderMode, Renderer};

const RELEASED: u8 = 0;
const CLAIMED: u8 = 1;
const ARMED: u8 = 2;

/// Shared state between producers, the renderer and the manager
pub struct DisplayLink<M: RawMutex, const N: usize> {
    channel: CommandChannel<M, N>,
    state: AtomicU8,
    submitters: AtomicUsize,
    stop: Signal<M, ()>,
    stopped: Signal<M, ()>,
}

impl<M: RawMutex, const N: usize> DisplayLink<M, N> {
    /// Create a released link with an empty channel
    pub const fn new() -> Self {
        Self {
            channel: CommandChannel::new(),
            state: AtomicU8::new(RELEASED),
            submitters: AtomicUsize::new(0),
            stop: Signal::new(),
            stopped: Signal::new(),
        }
    }

    /// The command channel
    pub fn channel(&self) -> &CommandChannel<M, N> {
        &self.channel
    }

    /// Check if producer operations are live
    pub fn is_armed(&self) -> bool {
        self.state.load(Ordering::Acquire) == ARMED
    }

    /// Check if a subsystem currently owns the channel
    pub fn is_claimed(&self) -> bool {
        self.state.load(Ordering::Acquire) != RELEASED
    }

    /// Take ownership of the channel, returning false if already owned
    ///
    /// Leftovers from a previous owner and stale stop signals are cleared.
    pub(crate) fn claim(&self) -> bool {
        if self
            .state
            .compare_exchange(RELEASED, CLAIMED, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        self.channel.discard_pending();
        self.stop.reset();
        self.stopped.reset();
        true
    }

    pub(crate) fn arm(&self) {
        self.state.store(ARMED, Ordering::Release);
    }

    pub(crate) fn disarm(&self) {
        let _ = self
            .state
            .compare_exchange(ARMED, CLAIMED, Ordering::SeqCst, Ordering::SeqCst);
    }

    /// Register an in-flight submission, or `None` if not armed
    ///
    /// The count goes up before the armed check, so a concurrent
    /// [`settle`](Self::settle) either sees this submitter or it sees the
    /// link disarmed.
    fn enter_submit(&self) -> Option<SubmitGuard<'_, M, N>> {
        self.submitters.fetch_add(1, Ordering::SeqCst);
        let guard = SubmitGuard { link: self };
        if self.state.load(Ordering::SeqCst) == ARMED {
            Some(guard)
        } else {
            None
        }
    }

    /// Number of submissions currently waiting on the channel
    pub fn submitters(&self) -> usize {
        self.submitters.load(Ordering::SeqCst)
    }

    /// Discard pending commands until no submitter is left in flight
    ///
    /// Must run after [`disarm`](Self::disarm). Every discard frees slots,
    /// which lets blocked submitters finish and report
    /// [`SubmitError::Closed`].
    async fn settle(&self) -> usize {
        let mut discarded = 0;
        loop {
            let idle = self.submitters() == 0;
            discarded += self.channel.discard_pending();
            if idle {
                return discarded;
            }
            yield_now().await;
        }
    }

    /// Discard pending commands and give up the channel
    pub(crate) fn release(&self) -> usize {
        self.disarm();
        let discarded = self.channel.discard_pending();
        self.state.store(RELEASED, Ordering::Release);
        discarded
    }

    /// Ask the renderer to exit
    pub fn request_stop(&self) {
        self.stop.signal(());
    }

    /// Resolves once a stop has been requested
    pub async fn stop_requested(&self) {
        self.stop.wait().await
    }

    /// Renderer side: report that the loop has exited
    pub fn acknowledge_stop(&self) {
        self.stopped.signal(());
    }

    /// Check if the renderer has exited and nobody has waited on it yet
    pub fn stop_acknowledged(&self) -> bool {
        self.stopped.signaled()
    }

    async fn wait_stopped(&self) {
        self.stopped.wait().await
    }
}

impl<M: RawMutex, const N: usize> Default for DisplayLink<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

struct SubmitGuard<'l, M: RawMutex, const N: usize> {
    link: &'l DisplayLink<M, N>,
}

impl<M: RawMutex, const N: usize> Drop for SubmitGuard<'_, M, N> {
    fn drop(&mut self) {
        self.link.submitters.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Backlight enable line
///
/// Writes bypass the command channel and take effect immediately.
pub struct Backlight<M: RawMutex, P> {
    pin: Mutex<M, RefCell<Option<P>>>,
}

impl<M: RawMutex, P: OutputPin> Backlight<M, P> {
    /// Create with no pin installed
    pub const fn new() -> Self {
        Self {
            pin: Mutex::new(RefCell::new(None)),
        }
    }

    /// Install the pin, replacing any previous one
    pub fn install(&self, pin: P) {
        self.pin.lock(|cell| *cell.borrow_mut() = Some(pin));
    }

    /// Drive the line, returning false if no pin is installed
    pub fn set(&self, on: bool) -> bool {
        self.pin.lock(|cell| match cell.borrow_mut().as_mut() {
            Some(pin) => {
                pin.set_state(on);
                true
            }
            None => false,
        })
    }

    /// Current line state, if a pin is installed
    pub fn is_on(&self) -> Option<bool> {
        self.pin
            .lock(|cell| cell.borrow().as_ref().map(|pin| pin.is_set_high()))
    }

    /// Switch the line off and remove the pin
    pub fn take(&self) -> Option<P> {
        self.pin.lock(|cell| {
            let mut pin = cell.borrow_mut().take()?;
            pin.set_low();
            Some(pin)
        })
    }
}

impl<M: RawMutex, P: OutputPin> Default for Backlight<M, P> {
    fn default() -> Self {
        Self::new()
    }
}

/// Panel and queue configuration used by `begin`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    /// Native panel width in pixels
    pub width: u16,
    /// Native panel height in pixels
    pub height: u16,
    /// Rotation applied after init
    pub rotation: Rotation,
    /// Initial fill and `show_message` background
    pub background: Rgb565,
    /// Producer behavior on a full channel
    pub submit_policy: SubmitPolicy,
    /// Renderer wait strategy
    pub render_mode: RenderMode,
}

impl DisplayConfig {
    /// ESP32-S3 TFT Feather: 135x240 ST7789 in landscape
    pub const fn feather_tft() -> Self {
        Self {
            width: 135,
            height: 240,
            rotation: Rotation::Deg270,
            background: DEFAULT_BACKGROUND,
            submit_policy: SubmitPolicy::Block,
            render_mode: RenderMode::WaitForSubmit,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::feather_tft()
    }
}

/// The scheduler could not start the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpawnError;

/// `begin` failed; no renderer is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError {
    /// Display controller bring-up failed
    Display(DisplayError),
    /// The channel is owned by another subsystem
    ChannelUnavailable,
    /// The renderer could not be spawned
    Spawn,
    /// `begin` already succeeded on this manager
    AlreadyStarted,
}

impl From<DisplayError> for InitError {
    fn from(e: DisplayError) -> Self {
        InitError::Display(e)
    }
}

impl From<SpawnError> for InitError {
    fn from(_: SpawnError) -> Self {
        InitError::Spawn
    }
}

/// Owns the lifecycle of one display subsystem
pub struct DisplayManager<'a, M: RawMutex, P, const N: usize> {
    link: &'a DisplayLink<M, N>,
    backlight: &'a Backlight<M, P>,
    config: DisplayConfig,
    claimed: bool,
    renderer_spawned: bool,
}

impl<'a, M: RawMutex, P: OutputPin, const N: usize> DisplayManager<'a, M, P, N> {
    pub fn new(
        link: &'a DisplayLink<M, N>,
        backlight: &'a Backlight<M, P>,
        config: DisplayConfig,
    ) -> Self {
        Self {
            link,
            backlight,
            config,
            claimed: false,
            renderer_spawned: false,
        }
    }

    /// Bring up the display and start the renderer
    ///
    /// `spawn` receives the renderer and must schedule [`Renderer::run`]
    /// on the rendering core. The channel is claimed before the backlight
    /// pin is installed; on any later failure the pin is removed and the
    /// channel released again.
    pub fn begin<D, F>(
        &mut self,
        backlight_pin: P,
        mut display: D,
        spawn: F,
    ) -> Result<DisplayHandle<'a, M, P, N>, InitError>
    where
        D: TextDisplay,
        F: FnOnce(Renderer<'a, D, M, N>) -> Result<(), SpawnError>,
    {
        if self.claimed {
            return Err(InitError::AlreadyStarted);
        }

        if !self.link.claim() {
            return Err(InitError::ChannelUnavailable);
        }

        self.backlight.install(backlight_pin);
        self.backlight.set(true);

        if let Err(e) = self.bring_up(&mut display) {
            self.abandon();
            return Err(e.into());
        }
        self.claimed = true;

        let renderer = Renderer::new(display, self.link, self.config.render_mode);
        if let Err(e) = spawn(renderer) {
            self.abandon();
            self.claimed = false;
            return Err(e.into());
        }
        self.renderer_spawned = true;

        self.link.arm();

        #[cfg(feature = "defmt")]
        defmt::info!("Display subsystem armed ({})", self.config);

        Ok(self.handle())
    }

    fn bring_up<D: TextDisplay>(&self, display: &mut D) -> Result<(), DisplayError> {
        display.init(self.config.width, self.config.height)?;
        display.set_rotation(self.config.rotation)?;
        display.fill(self.config.background)
    }

    /// Undo a partial `begin`
    fn abandon(&self) {
        let _ = self.backlight.take();
        self.link.release();
    }

    /// Producer handle, a no-op until `begin` succeeds
    pub fn handle(&self) -> DisplayHandle<'a, M, P, N> {
        DisplayHandle {
            link: self.link,
            backlight: self.backlight,
            policy: self.config.submit_policy,
            background: self.config.background,
        }
    }

    /// Stop the renderer and release the channel
    ///
    /// Producers still blocked on a full channel are let through and get
    /// [`SubmitError::Closed`]; their commands are discarded with the rest.
    /// Safe to call any number of times, including after a failed `begin`.
    pub async fn shutdown(&mut self) {
        if !self.claimed {
            return;
        }

        self.link.disarm();

        if self.renderer_spawned {
            self.link.request_stop();
            self.link.wait_stopped().await;
            self.renderer_spawned = false;
        }

        let _discarded = self.link.settle().await + self.link.release();
        self.claimed = false;

        #[cfg(feature = "defmt")]
        defmt::info!("Display subsystem shut down, {} commands discarded", _discarded);
    }

    /// Check if the subsystem is armed
    pub fn is_running(&self) -> bool {
        self.claimed && self.link.is_armed()
    }
}

/// Producer-side handle
///
/// Every operation is a no-op returning `Ok` while the subsystem is not
/// armed.
pub struct DisplayHandle<'a, M: RawMutex, P, const N: usize> {
    link: &'a DisplayLink<M, N>,
    backlight: &'a Backlight<M, P>,
    policy: SubmitPolicy,
    background: Rgb565,
}

impl<M: RawMutex, P, const N: usize> Clone for DisplayHandle<'_, M, P, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: RawMutex, P, const N: usize> Copy for DisplayHandle<'_, M, P, N> {}

impl<'a, M: RawMutex, P: OutputPin, const N: usize> DisplayHandle<'a, M, P, N> {
    /// Clear to the background, then draw `text` at the default position
    pub async fn show_message(
        &self,
        text: &str,
        color: Rgb565,
        scale: u8,
    ) -> Result<(), SubmitError> {
        let command = DisplayCommand::message(text)
            .with_color(color)
            .with_scale(scale)
            .with_fill(self.background);
        self.submit(command).await
    }

    /// Draw `text` at `(x, y)` without clearing
    pub async fn show_message_at(
        &self,
        text: &str,
        x: i16,
        y: i16,
        color: Rgb565,
        scale: u8,
    ) -> Result<(), SubmitError> {
        let command = DisplayCommand::message_at(text, x, y)
            .with_color(color)
            .with_scale(scale);
        self.submit(command).await
    }

    /// Fill the screen with `color`
    pub async fn clear(&self, color: Rgb565) -> Result<(), SubmitError> {
        self.submit(DisplayCommand::clear(color)).await
    }

    /// Enqueue a prebuilt command
    pub async fn submit(&self, command: DisplayCommand) -> Result<(), SubmitError> {
        let Some(_in_flight) = self.link.enter_submit() else {
            return Ok(());
        };
        self.link.channel().submit_with(command, self.policy).await?;
        if !self.link.is_armed() {
            return Err(SubmitError::Closed);
        }
        Ok(())
    }

    /// Switch the backlight immediately
    pub fn set_backlight(&self, on: bool) {
        if self.link.is_armed() {
            self.backlight.set(on);
        }
    }

    /// Check if submissions reach the renderer
    pub fn is_armed(&self) -> bool {
        self.link.is_armed()
    }
}
