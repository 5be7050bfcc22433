//! Display command channel
//!
//! Bounded multi-producer, single-consumer FIFO between producers and the
//! renderer. All synchronization lives inside the embassy-sync channel, so
//! neither side needs an external lock.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use embassy_time::{with_timeout, Duration};

use crate::command::DisplayCommand;

/// Reference channel capacity (outstanding commands)
pub const DEFAULT_CAPACITY: usize = 10;

/// A command was not accepted by the channel
///
/// `Full` and `Timeout` come only from the non-default submit policies.
/// With [`SubmitPolicy::Block`] a submission is accepted unless the
/// subsystem shuts down while it waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SubmitError {
    /// Channel was full and the caller asked not to wait
    Full,
    /// Channel stayed full for the whole bounded wait
    Timeout,
    /// The subsystem shut down while the submission was waiting, so the
    /// command may never be drawn
    Closed,
}

/// How producers behave when the channel is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SubmitPolicy {
    /// Wait as long as it takes; no update is ever dropped
    #[default]
    Block,
    /// Wait at most this long, then report [`SubmitError::Timeout`]
    Timeout(Duration),
    /// Never wait; report [`SubmitError::Full`]
    NoWait,
}

/// Bounded FIFO of display commands
pub struct CommandChannel<M: RawMutex, const N: usize> {
    inner: Channel<M, DisplayCommand, N>,
}

impl<M: RawMutex, const N: usize> CommandChannel<M, N> {
    /// Create an empty channel
    pub const fn new() -> Self {
        Self {
            inner: Channel::new(),
        }
    }

    /// Insert at the tail, waiting indefinitely while the channel is full
    pub async fn submit(&self, command: DisplayCommand) {
        self.inner.send(command).await;
    }

    /// Insert at the tail, waiting at most `timeout` for space
    pub async fn submit_within(
        &self,
        command: DisplayCommand,
        timeout: Duration,
    ) -> Result<(), SubmitError> {
        with_timeout(timeout, self.inner.send(command))
            .await
            .map_err(|_| SubmitError::Timeout)
    }

    /// Insert at the tail only if there is room right now
    pub fn try_submit(&self, command: DisplayCommand) -> Result<(), SubmitError> {
        self.inner
            .try_send(command)
            .map_err(|_: TrySendError<DisplayCommand>| SubmitError::Full)
    }

    /// Insert according to `policy`
    pub async fn submit_with(
        &self,
        command: DisplayCommand,
        policy: SubmitPolicy,
    ) -> Result<(), SubmitError> {
        match policy {
            SubmitPolicy::Block => {
                self.submit(command).await;
                Ok(())
            }
            SubmitPolicy::Timeout(timeout) => self.submit_within(command, timeout).await,
            SubmitPolicy::NoWait => self.try_submit(command),
        }
    }

    /// Remove the head without waiting (renderer only)
    pub fn try_drain_one(&self) -> Option<DisplayCommand> {
        self.inner.try_receive().ok()
    }

    /// Wait for the next command (renderer only)
    pub async fn receive(&self) -> DisplayCommand {
        self.inner.receive().await
    }

    /// Drop every queued command, returning how many were dropped
    pub fn discard_pending(&self) -> usize {
        let mut discarded = 0;
        while self.inner.try_receive().is_ok() {
            discarded += 1;
        }
        discarded
    }

    /// Number of queued commands
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Check if a blocking submit would wait
    pub fn is_full(&self) -> bool {
        self.inner.is_full()
    }

    /// Fixed capacity
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<M: RawMutex, const N: usize> Default for CommandChannel<M, N> {
    fn default() -> Self {
        Self::new()
    }
}
