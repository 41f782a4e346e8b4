//! Compatibility bridge for the Rust `log` crate.
//!
//! [`ShipperLogAdapter`] implements `log::Log` and forwards records to the
//! [global](crate::global) shipper, tagging each with its level. Records
//! emitted by this crate are never forwarded: they only reach the optional
//! fallback logger, so the shipper's own diagnostics cannot feed back into
//! it.

use std::sync::OnceLock;

use log::{LevelFilter, Log, Metadata, Record};

use crate::global;

const OWN_TARGET: &str = env!("CARGO_CRATE_NAME");

fn is_own_target(target: &str) -> bool {
    target
        .strip_prefix(OWN_TARGET)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

fn level_label(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "ERROR",
        log::Level::Warn => "WARN",
        log::Level::Info => "INFO",
        log::Level::Debug => "DEBUG",
        log::Level::Trace => "TRACE",
    }
}

/// Adapter implementing the Rust `log::Log` trait.
pub struct ShipperLogAdapter {
    level: LevelFilter,
    fallback: Option<Box<dyn Log>>,
    sink: fn(&'static str, String),
}

impl ShipperLogAdapter {
    /// Forward records at or above `level` to the global shipper.
    pub fn new(level: LevelFilter, fallback: Option<Box<dyn Log>>) -> Self {
        Self {
            level,
            fallback,
            sink: |level, line| global::enqueue_with_level(level, line),
        }
    }

    #[cfg(test)]
    fn with_sink(
        level: LevelFilter,
        fallback: Option<Box<dyn Log>>,
        sink: fn(&'static str, String),
    ) -> Self {
        Self {
            level,
            fallback,
            sink,
        }
    }
}

impl Log for ShipperLogAdapter {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
            || self
                .fallback
                .as_ref()
                .is_some_and(|fallback| fallback.enabled(metadata))
    }

    fn log(&self, record: &Record<'_>) {
        if let Some(fallback) = &self.fallback
            && fallback.enabled(record.metadata())
        {
            fallback.log(record);
        }
        if record.level() > self.level || is_own_target(record.target()) {
            return;
        }
        (self.sink)(level_label(record.level()), record.args().to_string());
    }

    fn flush(&self) {
        if let Some(fallback) = &self.fallback {
            fallback.flush();
        }
    }
}

static INSTALL_RESULT: OnceLock<bool> = OnceLock::new();

/// Install the adapter as the global Rust logger.
///
/// Returns `true` on success. When a different global logger is already set,
/// installation fails and `false` is returned. Later calls return the cached
/// outcome and ignore their arguments.
pub fn install(level: LevelFilter, fallback: Option<Box<dyn Log>>) -> bool {
    *INSTALL_RESULT.get_or_init(|| {
        let max = fallback
            .as_ref()
            .map_or(level, |_| LevelFilter::Trace)
            .max(level);
        if log::set_boxed_logger(Box::new(ShipperLogAdapter::new(level, fallback))).is_err() {
            return false;
        }
        log::set_max_level(max);
        true
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::{Mutex, const_mutex};
    use rstest::rstest;
    use std::sync::Arc;

    static SHIPPED: Mutex<Vec<(&'static str, String)>> = const_mutex(Vec::new());

    fn capture(level: &'static str, line: String) {
        SHIPPED.lock().push((level, line));
    }

    #[derive(Clone, Default)]
    struct Recording(Arc<Mutex<Vec<String>>>);

    impl Log for Recording {
        fn enabled(&self, _: &Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &Record<'_>) {
            self.0.lock().push(format!("{}: {}", record.target(), record.args()));
        }

        fn flush(&self) {}
    }

    fn emit(adapter: &ShipperLogAdapter, level: log::Level, target: &str, message: &str) {
        adapter.log(
            &Record::builder()
                .level(level)
                .target(target)
                .args(format_args!("{message}"))
                .build(),
        );
    }

    fn shipped_for(marker: &str) -> Vec<(&'static str, String)> {
        SHIPPED
            .lock()
            .iter()
            .filter(|(_, line)| line.contains(marker))
            .cloned()
            .collect()
    }

    #[rstest]
    #[case("logstash_shipper", true)]
    #[case("logstash_shipper::shipper::worker", true)]
    #[case("logstash_shipper_extra", false)]
    #[case("myapp::db", false)]
    fn recognises_own_target(#[case] target: &str, #[case] own: bool) {
        assert_eq!(is_own_target(target), own);
    }

    #[rstest]
    fn forwards_enabled_records_with_level() {
        let adapter = ShipperLogAdapter::with_sink(LevelFilter::Info, None, capture);
        emit(&adapter, log::Level::Warn, "myapp", "forward-me disk low");
        emit(&adapter, log::Level::Debug, "myapp", "forward-me too chatty");
        assert_eq!(
            shipped_for("forward-me"),
            vec![("WARN", "forward-me disk low".to_owned())]
        );
    }

    #[rstest]
    fn own_records_only_reach_fallback() {
        let recording = Recording::default();
        let adapter = ShipperLogAdapter::with_sink(
            LevelFilter::Trace,
            Some(Box::new(recording.clone())),
            capture,
        );
        emit(
            &adapter,
            log::Level::Warn,
            "logstash_shipper::shipper::worker",
            "own-record dropped 3 messages",
        );
        assert!(shipped_for("own-record").is_empty());
        assert_eq!(
            *recording.0.lock(),
            vec!["logstash_shipper::shipper::worker: own-record dropped 3 messages".to_owned()]
        );
    }

    #[rstest]
    fn enabled_considers_fallback() {
        let adapter = ShipperLogAdapter::with_sink(
            LevelFilter::Error,
            Some(Box::new(Recording::default())),
            capture,
        );
        let metadata = Metadata::builder().level(log::Level::Debug).build();
        assert!(adapter.enabled(&metadata));
        let bare = ShipperLogAdapter::with_sink(LevelFilter::Error, None, capture);
        assert!(!bare.enabled(&metadata));
    }
}
