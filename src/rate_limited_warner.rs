use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Default interval between dropped-message warnings.
pub const DEFAULT_WARN_INTERVAL: Duration = Duration::from_secs(5);

/// Helper that rate limits dropped-message warnings.
///
/// Producers and the shipper worker increment the drop counter via
/// [`record_drop`](Self::record_drop). The next call to
/// [`warn_if_due`](Self::warn_if_due) emits a warning through the provided
/// callback if the configured interval has elapsed.
/// [`flush`](Self::flush) emits immediately if anything was dropped since the
/// last emission.
pub struct RateLimitedWarner {
    origin: Instant,
    interval_ms: u64,
    last_warn_ms: AtomicU64,
    dropped: AtomicU64,
}

impl Default for RateLimitedWarner {
    fn default() -> Self {
        Self::new(DEFAULT_WARN_INTERVAL)
    }
}

impl RateLimitedWarner {
    /// Create a new [`RateLimitedWarner`]. The first warning can be emitted
    /// immediately.
    pub fn new(interval: Duration) -> Self {
        let interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        Self {
            // Shift the origin back so the first check is already due.
            origin: Instant::now()
                .checked_sub(interval)
                .unwrap_or_else(Instant::now),
            interval_ms,
            last_warn_ms: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Increment the dropped-message counter.
    pub fn record_drop(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of drops recorded since the last emitted warning.
    pub fn pending(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Emit a warning if the rate limit interval has elapsed.
    pub fn warn_if_due(&self, mut warn: impl FnMut(u64)) {
        // Nothing to report; leave the window open for the next drop.
        if self.dropped.load(Ordering::Relaxed) == 0 {
            return;
        }
        let now = self.now_ms();
        let prev = self.last_warn_ms.load(Ordering::Relaxed);
        if now.saturating_sub(prev) < self.interval_ms {
            return;
        }
        if self
            .last_warn_ms
            .compare_exchange(prev, now, Ordering::Relaxed, Ordering::Relaxed)
            .is_err()
        {
            // Another thread claimed this window.
            return;
        }
        let count = self.dropped.swap(0, Ordering::Relaxed);
        if count > 0 {
            warn(count);
        }
    }

    /// Immediately warn about any dropped messages.
    pub fn flush(&self, mut warn: impl FnMut(u64)) {
        let count = self.dropped.swap(0, Ordering::Relaxed);
        if count > 0 {
            warn(count);
            self.last_warn_ms.store(self.now_ms(), Ordering::Relaxed);
        }
    }
}
