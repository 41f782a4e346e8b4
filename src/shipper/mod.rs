//! Background shipping of log lines to a Logstash TCP input.
//!
//! [`Shipper`] owns a bounded queue and a worker thread. Producers push
//! already formatted lines with [`Shipper::enqueue`]; the worker encodes each
//! one as a newline-delimited JSON object and writes it to a single long-lived
//! TCP connection. The worker reconnects with exponential backoff and drops
//! messages while no connection is available. Producers never see delivery
//! failures.

pub(crate) mod backoff;
mod builder;
mod config;
mod handle;
mod serialise;
mod transport;
mod worker;


pub use backoff::{BackoffState, MAX_BACKOFF_CEILING, MIN_BACKOFF_FLOOR};
pub use builder::{BackoffOverrides, BuildError, ENV_ADDRESS, ENV_TYPE, ShipperBuilder};
pub use config::{
    BackoffPolicy, DEFAULT_BACKOFF_CEILING, DEFAULT_BACKOFF_FLOOR, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_MAX_MESSAGE_SIZE, DEFAULT_QUEUE_CAPACITY, DEFAULT_STOP_WAIT, DEFAULT_WRITE_TIMEOUT,
    ShipperConfig,
};
pub use handle::{Shipper, StopOutcome};
pub use serialise::{PendingMessage, encode_line};
pub use transport::{Dialer, TcpDialer};
