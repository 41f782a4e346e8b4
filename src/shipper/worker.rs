//! Worker thread driving the collector connection.
//!
//! The worker owns the connection and the backoff state outright. It waits
//! on three sources at once: the message queue, the stop channel, and a dial
//! timer that only exists while disconnected.

use std::{
    io::Write,
    mem,
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, Sender, at, bounded, never, select};
use log::{debug, info, warn};

use crate::rate_limited_warner::RateLimitedWarner;

use super::{
    backoff::BackoffState,
    config::ShipperConfig,
    serialise::{PendingMessage, check_size, encode_line},
    transport::Dialer,
};

/// Producer-side ends of a freshly spawned worker.
pub struct WorkerHandles {
    pub tx: Sender<PendingMessage>,
    pub stop_tx: Sender<()>,
    pub done_rx: Receiver<()>,
    pub handle: thread::JoinHandle<()>,
}

pub fn spawn_worker<D: Dialer>(
    config: ShipperConfig,
    dialer: D,
    warner: Arc<RateLimitedWarner>,
) -> WorkerHandles {
    // `bounded(0)` would be a rendezvous channel.
    let (tx, rx) = bounded(config.queue_capacity.max(1));
    let (stop_tx, stop_rx) = bounded::<()>(1);
    let (done_tx, done_rx) = bounded(1);
    let handle = thread::spawn(move || {
        Worker::new(config, dialer, warner).run(&rx, &stop_rx);
        let _ = done_tx.send(());
    });
    WorkerHandles {
        tx,
        stop_tx,
        done_rx,
        handle,
    }
}

enum ConnectionState<C> {
    Disconnected { next_dial: Instant },
    Connected(C),
    /// Terminal; entered once the worker has closed.
    Closed,
}

struct Worker<D: Dialer> {
    config: ShipperConfig,
    dialer: D,
    state: ConnectionState<D::Conn>,
    backoff: BackoffState,
    warner: Arc<RateLimitedWarner>,
}

impl<D: Dialer> Worker<D> {
    fn new(config: ShipperConfig, dialer: D, warner: Arc<RateLimitedWarner>) -> Self {
        let backoff = BackoffState::new(config.backoff);
        Self {
            config,
            dialer,
            // First dial is due straight away.
            state: ConnectionState::Disconnected {
                next_dial: Instant::now(),
            },
            backoff,
            warner,
        }
    }

    fn run(mut self, rx: &Receiver<PendingMessage>, stop_rx: &Receiver<()>) {
        loop {
            let dial_timer = match self.state {
                ConnectionState::Disconnected { next_dial } => at(next_dial),
                _ => never(),
            };
            select! {
                recv(stop_rx) -> _ => break,
                recv(rx) -> msg => match msg {
                    Ok(message) => self.handle_message(message),
                    Err(_) => break,
                },
                recv(dial_timer) -> _ => self.dial(),
            }
        }
        self.drain(rx);
        self.close();
    }

    fn dial(&mut self) {
        let address = &self.config.endpoint_address;
        match self.dialer.dial(address, self.config.connect_timeout) {
            Ok(conn) => {
                info!("logstash shipper connected to {address}");
                self.state = ConnectionState::Connected(conn);
            }
            Err(err) => {
                let delay = self.backoff.on_dial_failure();
                debug!("logstash shipper dial to {address} failed: {err}; retrying in {delay:?}");
                self.disconnect_for(delay);
            }
        }
    }

    fn handle_message(&mut self, message: PendingMessage) {
        let ConnectionState::Connected(conn) = &mut self.state else {
            self.record_drop("no active connection");
            return;
        };
        let line = match encode_line(
            &self.config.source_type,
            &message,
            self.config.include_timestamp,
        )
        .and_then(|line| check_size(line, self.config.max_message_size))
        {
            Ok(line) => line,
            Err(err) => {
                warn!("logstash shipper serialisation error: {err}");
                self.record_drop("serialisation failures");
                return;
            }
        };
        let result = conn.write_all(&line).and_then(|()| conn.flush());
        match result {
            Ok(()) => self.backoff.on_write_success(),
            Err(err) => {
                warn!(
                    "logstash shipper write to {} failed: {err}; reconnecting",
                    self.config.endpoint_address
                );
                self.disconnect_for(self.backoff.current());
                self.record_drop("write errors");
            }
        }
    }

    fn disconnect_for(&mut self, delay: Duration) {
        self.state = ConnectionState::Disconnected {
            // Delays are capped by `BackoffState`, so this cannot overflow.
            next_dial: Instant::now() + delay,
        };
    }

    /// Handle only what is queued right now so a busy producer cannot keep
    /// the worker alive after stop.
    fn drain(&mut self, rx: &Receiver<PendingMessage>) {
        let pending = rx.len();
        for message in rx.try_iter().take(pending) {
            self.handle_message(message);
        }
    }

    fn close(&mut self) {
        let previous = mem::replace(&mut self.state, ConnectionState::Closed);
        if let ConnectionState::Connected(mut conn) = previous {
            let _ = conn.flush();
            info!(
                "logstash shipper closed connection to {}",
                self.config.endpoint_address
            );
        }
        self.warner.flush(|count| {
            warn!("logstash shipper dropped {count} messages before shutdown");
        });
    }

    fn record_drop(&self, reason: &str) {
        self.warner.record_drop();
        self.warner.warn_if_due(|count| {
            warn!("logstash shipper dropped {count} messages; latest cause: {reason}");
        });
    }
}
