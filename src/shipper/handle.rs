//! Public shipper type exported by the crate.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use crossbeam_channel::{RecvTimeoutError, Sender, TrySendError};
use log::warn;
use parking_lot::Mutex;

use crate::rate_limited_warner::RateLimitedWarner;

use super::{
    config::ShipperConfig,
    serialise::PendingMessage,
    transport::{Dialer, TcpDialer},
    worker::{WorkerHandles, spawn_worker},
};

/// Result of [`Shipper::stop`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopOutcome {
    /// The stop signal was sent; the caller did not wait.
    Signalled,
    /// The worker exited and its thread was joined.
    Stopped,
    /// The worker did not exit within the configured wait. Its thread is
    /// left detached and the owning process may terminate unilaterally.
    TimedOut,
    /// Stop had already been requested; nothing was done.
    AlreadyStopped,
}

/// Background shipper forwarding lines to a Logstash TCP input.
///
/// Delivery is best effort: lines enqueued while the collector is
/// unreachable, or while the queue is full, are dropped without telling the
/// caller. No method of this type ever blocks on network state, apart from
/// the bounded wait of a graceful [`stop`](Self::stop).
pub struct Shipper {
    tx: Sender<PendingMessage>,
    stop_tx: Mutex<Option<Sender<()>>>,
    done_rx: crossbeam_channel::Receiver<()>,
    handle: Mutex<Option<thread::JoinHandle<()>>>,
    stopped: AtomicBool,
    warner: Arc<RateLimitedWarner>,
    stop_wait: Duration,
}

impl Shipper {
    /// Start shipping to the configured endpoint over plain TCP.
    ///
    /// Returns immediately; the first connection attempt happens on the
    /// worker thread.
    pub fn start(config: ShipperConfig) -> Self {
        let dialer = TcpDialer::new(config.write_timeout);
        Self::start_with_dialer(config, dialer)
    }

    /// Start shipping using a caller-supplied [`Dialer`].
    pub fn start_with_dialer<D: Dialer>(config: ShipperConfig, dialer: D) -> Self {
        let stop_wait = config.stop_wait;
        let warner = Arc::new(RateLimitedWarner::new(config.warn_interval));
        let WorkerHandles {
            tx,
            stop_tx,
            done_rx,
            handle,
        } = spawn_worker(config, dialer, Arc::clone(&warner));
        Self {
            tx,
            stop_tx: Mutex::new(Some(stop_tx)),
            done_rx,
            handle: Mutex::new(Some(handle)),
            stopped: AtomicBool::new(false),
            warner,
            stop_wait,
        }
    }

    /// Submit one line for shipping. Never blocks; drops the line when the
    /// queue is full or the shipper has been stopped.
    pub fn enqueue(&self, line: impl Into<String>) {
        self.submit(PendingMessage::new(line));
    }

    /// Submit one line tagged with a level label, sent as `loglevel`.
    pub fn enqueue_with_level(&self, level: impl Into<String>, line: impl Into<String>) {
        self.submit(PendingMessage::with_level(level, line));
    }

    fn submit(&self, message: PendingMessage) {
        if self.stopped.load(Ordering::Relaxed) {
            self.record_drop("shipper stopped");
            return;
        }
        match self.tx.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => self.record_drop("queue full"),
            Err(TrySendError::Disconnected(_)) => self.record_drop("worker exited"),
        }
    }

    fn record_drop(&self, reason: &str) {
        self.warner.record_drop();
        self.warner.warn_if_due(|count| {
            warn!("logstash shipper dropped {count} messages; latest cause: {reason}");
        });
    }

    /// Ask the worker to close its connection and exit.
    ///
    /// With `graceful` set, blocks for at most the configured stop wait.
    /// Only the first call has any effect; later calls return
    /// [`StopOutcome::AlreadyStopped`] immediately.
    pub fn stop(&self, graceful: bool) -> StopOutcome {
        let Some(stop_tx) = self.stop_tx.lock().take() else {
            return StopOutcome::AlreadyStopped;
        };
        self.stopped.store(true, Ordering::Relaxed);
        // Disconnecting the channel is the signal.
        drop(stop_tx);
        if !graceful {
            return StopOutcome::Signalled;
        }
        match self.done_rx.recv_timeout(self.stop_wait) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                self.join_worker();
                StopOutcome::Stopped
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    "logstash shipper worker did not exit within {:?}",
                    self.stop_wait
                );
                StopOutcome::TimedOut
            }
        }
    }

    fn join_worker(&self) {
        let Some(handle) = self.handle.lock().take() else {
            return;
        };
        if handle.join().is_err() {
            warn!("logstash shipper worker thread panicked");
        }
    }
}

impl Drop for Shipper {
    fn drop(&mut self) {
        self.stop(false);
    }
}

impl std::fmt::Debug for Shipper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shipper")
            .field("stopped", &self.stopped.load(Ordering::Relaxed))
            .field("stop_wait", &self.stop_wait)
            .finish()
    }
}
