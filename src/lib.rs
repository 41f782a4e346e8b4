//! Best-effort shipping of log lines to a Logstash TCP input.
//!
//! A logging library hands already formatted lines to a [`Shipper`], which
//! forwards them from a background thread as newline-delimited JSON over one
//! persistent TCP connection. Delivery is never guaranteed and never
//! blocks the caller: while the collector is unreachable lines are dropped,
//! and the worker reconnects with exponential backoff.
//!
//! ```no_run
//! use logstash_shipper::{ShipperBuilder, StopOutcome};
//!
//! let shipper = ShipperBuilder::new()
//!     .with_endpoint("127.0.0.1:5000")
//!     .with_source_type("billing")
//!     .start()
//!     .expect("valid configuration");
//! shipper.enqueue("  payment accepted  ");
//! assert_ne!(shipper.stop(true), StopOutcome::AlreadyStopped);
//! ```

pub mod global;
pub mod log_bridge;
pub mod rate_limited_warner;
pub mod shipper;

pub use global::StartError;
pub use log_bridge::ShipperLogAdapter;
pub use shipper::{
    BackoffOverrides, BackoffPolicy, BuildError, Dialer, PendingMessage, Shipper, ShipperBuilder,
    ShipperConfig, StopOutcome, TcpDialer,
};
