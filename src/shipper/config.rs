//! Configuration structures consumed by the shipper lifecycle.
//!
//! [`ShipperBuilder`](super::ShipperBuilder) validates these values before
//! passing them to [`Shipper`](super::Shipper) for runtime use.

use std::time::Duration;

use crate::rate_limited_warner::DEFAULT_WARN_INTERVAL;

/// Default bounded queue capacity used by the shipper.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;
/// Default bound on a single dial attempt.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);
/// Default write timeout applied to the connection.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(1);
/// Default floor of the reconnect delay.
pub const DEFAULT_BACKOFF_FLOOR: Duration = Duration::from_millis(250);
/// Default ceiling of the reconnect delay.
pub const DEFAULT_BACKOFF_CEILING: Duration = Duration::from_secs(30);
/// Default time a graceful stop waits for the worker to exit.
pub const DEFAULT_STOP_WAIT: Duration = Duration::from_secs(10);
/// Default maximum size (in bytes) of one encoded line.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 1 << 20; // 1 MiB

/// Configuration object describing how to start a [`Shipper`](super::Shipper).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShipperConfig {
    /// `host:port` of the remote collector.
    pub endpoint_address: String,
    /// Label sent as `type` with every message.
    pub source_type: String,
    /// Messages held between producers and the worker. Values below 1 are
    /// treated as 1.
    pub queue_capacity: usize,
    /// Upper bound on one dial, shared by every address the endpoint
    /// resolves to.
    pub connect_timeout: Duration,
    /// Write timeout set on each established connection.
    pub write_timeout: Duration,
    /// Reconnect delay policy; normalised by the worker on start.
    pub backoff: BackoffPolicy,
    /// How long `stop(true)` waits for the worker to exit.
    pub stop_wait: Duration,
    /// Attach an `@timestamp` field when a message is sent.
    pub include_timestamp: bool,
    /// Encoded lines larger than this many bytes are dropped.
    pub max_message_size: usize,
    /// Minimum gap between dropped-message warnings.
    pub warn_interval: Duration,
}

impl ShipperConfig {
    /// Create a configuration with default tuning for the given endpoint and label.
    pub fn new(endpoint_address: impl Into<String>, source_type: impl Into<String>) -> Self {
        Self {
            endpoint_address: endpoint_address.into(),
            source_type: source_type.into(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            backoff: BackoffPolicy::default(),
            stop_wait: DEFAULT_STOP_WAIT,
            include_timestamp: false,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            warn_interval: DEFAULT_WARN_INTERVAL,
        }
    }

    /// Override the backoff policy.
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }
}

/// Exponential backoff policy for reconnection attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// First delay after a failure; raised to
    /// [`MIN_BACKOFF_FLOOR`](super::MIN_BACKOFF_FLOOR) if smaller.
    pub floor: Duration,
    /// Largest delay; capped at
    /// [`MAX_BACKOFF_CEILING`](super::MAX_BACKOFF_CEILING).
    pub ceiling: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            floor: DEFAULT_BACKOFF_FLOOR,
            ceiling: DEFAULT_BACKOFF_CEILING,
        }
    }
}
