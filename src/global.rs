//! Process-wide shipper instance.
//!
//! A logging library normally owns exactly one shipper. These functions keep
//! that instance behind a lock so producers anywhere in the process can
//! submit lines without holding a handle. Enqueueing only takes the read
//! side of the lock.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use thiserror::Error;

use crate::shipper::{Shipper, ShipperConfig, StopOutcome};

static GLOBAL: Lazy<RwLock<Option<Shipper>>> = Lazy::new(|| RwLock::new(None));

/// Errors returned by [`start`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StartError {
    /// A global shipper is already running.
    #[error("a global logstash shipper is already running")]
    AlreadyRunning,
}

/// Start the global shipper.
pub fn start(config: ShipperConfig) -> Result<(), StartError> {
    let mut slot = GLOBAL.write();
    if slot.is_some() {
        return Err(StartError::AlreadyRunning);
    }
    *slot = Some(Shipper::start(config));
    Ok(())
}

/// Install an already started shipper as the global instance.
pub fn install(shipper: Shipper) -> Result<(), StartError> {
    let mut slot = GLOBAL.write();
    if slot.is_some() {
        return Err(StartError::AlreadyRunning);
    }
    *slot = Some(shipper);
    Ok(())
}

/// Whether a global shipper is running.
pub fn is_running() -> bool {
    GLOBAL.read().is_some()
}

/// Submit a line to the global shipper; dropped when none is running.
pub fn enqueue(line: impl Into<String>) {
    if let Some(shipper) = GLOBAL.read().as_ref() {
        shipper.enqueue(line);
    }
}

/// Submit a line with a level label to the global shipper.
pub fn enqueue_with_level(level: impl Into<String>, line: impl Into<String>) {
    if let Some(shipper) = GLOBAL.read().as_ref() {
        shipper.enqueue_with_level(level, line);
    }
}

/// Stop and remove the global shipper.
///
/// The lock is released before waiting, so producers racing with shutdown
/// never block. Returns [`StopOutcome::AlreadyStopped`] when nothing runs.
pub fn stop(graceful: bool) -> StopOutcome {
    let Some(shipper) = GLOBAL.write().take() else {
        return StopOutcome::AlreadyStopped;
    };
    shipper.stop(graceful)
}
