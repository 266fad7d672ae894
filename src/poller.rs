use std::fmt;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::callbacks::Callbacks;
use crate::client::Client;
use crate::error::{Error, Result};

/// Unit for [`Client::poll_every`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    pub const fn seconds(&self) -> u64 {
        match self {
            TimeUnit::Seconds => 1,
            TimeUnit::Minutes => 60,
            TimeUnit::Hours => 60 * 60,
            TimeUnit::Days => 24 * 60 * 60,
        }
    }

    pub const fn interval(&self, multiplier: u32) -> Duration {
        Duration::from_secs(self.seconds() * multiplier as u64)
    }
}

pub fn minutely() -> Duration {
    TimeUnit::Minutes.interval(1)
}

pub fn hourly() -> Duration {
    TimeUnit::Hours.interval(1)
}

pub fn daily() -> Duration {
    TimeUnit::Days.interval(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Running,
    /// Stop was requested; the thread may still be finishing a cycle.
    Stopping,
    Stopped,
}

/// Handle to a background poll started by [`Client::start_poll`].
///
/// Dropping the handle stops the poll the same way [`PollHandle::stop`] does.
pub struct PollHandle {
    location: String,
    interval: Duration,
    stop_tx: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl PollHandle {
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> PollState {
        match (&self.stop_tx, &self.thread) {
            (_, None) => PollState::Stopped,
            (_, Some(t)) if t.is_finished() => PollState::Stopped,
            (Some(_), Some(_)) => PollState::Running,
            (None, Some(_)) => PollState::Stopping,
        }
    }

    /// Asks the thread to exit after its current cycle without waiting for it.
    pub fn request_stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            // A send error means the thread is already gone.
            let _ = tx.send(());
            debug!(location = %self.location, "stop requested");
        }
    }

    /// Stops the poll and blocks until its thread has exited.
    ///
    /// Once this returns no callback will run again for this poll, so the
    /// callbacks and the client may be dropped.
    pub fn stop(mut self) -> Result<()> {
        self.request_stop();
        self.join()
    }

    fn join(&mut self) -> Result<()> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };
        thread.join().map_err(|_| Error::PollerPanicked)?;
        info!(location = %self.location, "polling stopped");
        Ok(())
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.request_stop();
        if let Err(e) = self.join() {
            error!(location = %self.location, "{}", e);
        }
    }
}

impl fmt::Debug for PollHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollHandle")
            .field("location", &self.location)
            .field("interval", &self.interval)
            .field("state", &self.state())
            .finish()
    }
}

pub(crate) fn spawn<U>(
    client: Client,
    callbacks: Arc<Callbacks<U>>,
    location: &str,
    interval: Duration,
) -> Result<PollHandle>
where
    U: Send + Sync + 'static,
{
    if interval.is_zero() {
        return Err(Error::Config("poll interval must be greater than zero".into()));
    }
    // Same check a single fetch applies, so a bad location fails here.
    client.conditions_url(location)?;
    let location = location.trim().to_string();

    let (stop_tx, stop_rx) = mpsc::channel();
    let thread_location = location.clone();
    let thread = thread::Builder::new()
        .name("wunderground-poll".into())
        .spawn(move || run(client, callbacks, thread_location, interval, stop_rx))
        .map_err(Error::Spawn)?;

    info!(%location, interval_secs = interval.as_secs_f64(), "polling started");
    Ok(PollHandle {
        location,
        interval,
        stop_tx: Some(stop_tx),
        thread: Some(thread),
    })
}

fn run<U>(
    client: Client,
    callbacks: Arc<Callbacks<U>>,
    location: String,
    interval: Duration,
    stop_rx: Receiver<()>,
) {
    let mut cycle: u64 = 0;
    loop {
        // A dropped sender counts as a stop request.
        if !matches!(stop_rx.try_recv(), Err(TryRecvError::Empty)) {
            break;
        }

        cycle += 1;
        match client.fetch_conditions(&location) {
            Ok(conditions) => {
                let invoked = callbacks.dispatch(&conditions);
                debug!(%location, cycle, invoked, "poll cycle complete");
            }
            Err(e) => warn!(%location, cycle, error = %e, "poll cycle failed"),
        }

        match stop_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    debug!(%location, cycles = cycle, "poll thread exiting");
}
