//! Builder for [`Shipper`](super::Shipper).
//!
//! Collects the endpoint, source label and tuning knobs, validates them, and
//! produces a [`ShipperConfig`]. The endpoint and label can also be read from
//! the `LOGSTASH_ADDRESS` and `LOGSTASH_TYPE` environment variables.

use std::{env, time::Duration};

use thiserror::Error;

use super::{
    config::{BackoffPolicy, ShipperConfig},
    handle::Shipper,
};

/// Environment variable holding the collector `host:port`.
pub const ENV_ADDRESS: &str = "LOGSTASH_ADDRESS";
/// Environment variable holding the source type label.
pub const ENV_TYPE: &str = "LOGSTASH_TYPE";

/// Errors that may occur while building a shipper configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    /// Invalid user supplied configuration.
    #[error("invalid shipper configuration: {0}")]
    InvalidConfig(String),
    /// An environment variable was set but unusable.
    #[error("environment variable {name} is not valid unicode")]
    Env { name: &'static str },
}

/// Overrides for the reconnect backoff timings.
#[derive(Clone, Debug, Default)]
pub struct BackoffOverrides {
    floor_ms: Option<u64>,
    ceiling_ms: Option<u64>,
}

macro_rules! ensure_positive {
    ($value:expr, $field:expr) => {{
        if $value == 0 {
            Err(BuildError::InvalidConfig(format!(
                "{} must be greater than zero",
                $field
            )))
        } else {
            Ok($value)
        }
    }};
}

impl BackoffOverrides {
    /// Create overrides with no custom values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the floor delay in milliseconds.
    pub fn with_floor_ms(mut self, floor_ms: u64) -> Self {
        self.floor_ms = Some(floor_ms);
        self
    }

    /// Override the ceiling delay in milliseconds.
    pub fn with_ceiling_ms(mut self, ceiling_ms: u64) -> Self {
        self.ceiling_ms = Some(ceiling_ms);
        self
    }

    fn apply(&self, policy: &mut BackoffPolicy) -> Result<(), BuildError> {
        if let Some(floor) = self.floor_ms {
            policy.floor = Duration::from_millis(ensure_positive!(floor, "backoff_floor_ms")?);
        }
        if let Some(ceiling) = self.ceiling_ms {
            policy.ceiling =
                Duration::from_millis(ensure_positive!(ceiling, "backoff_ceiling_ms")?);
        }
        if policy.ceiling < policy.floor {
            return Err(BuildError::InvalidConfig(format!(
                "backoff ceiling {:?} is below floor {:?}",
                policy.ceiling, policy.floor
            )));
        }
        Ok(())
    }
}

macro_rules! option_setter {
    ($(#[$meta:meta])* $fn_name:ident, $field:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn_name(mut self, value: $ty) -> Self {
            self.$field = Some(value);
            self
        }
    };
}

/// Builder for constructing [`Shipper`] instances.
#[derive(Clone, Debug, Default)]
pub struct ShipperBuilder {
    endpoint: Option<String>,
    source_type: Option<String>,
    capacity: Option<usize>,
    connect_timeout_ms: Option<u64>,
    write_timeout_ms: Option<u64>,
    stop_wait_ms: Option<u64>,
    max_message_size: Option<usize>,
    warn_interval_ms: Option<u64>,
    include_timestamp: bool,
    backoff: BackoffOverrides,
}

impl ShipperBuilder {
    /// Create a new builder with no endpoint configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the endpoint and label from the process environment.
    pub fn from_env() -> Result<Self, BuildError> {
        Self::from_env_with(|name| match env::var(name) {
            Ok(value) => Ok(Some(value)),
            Err(env::VarError::NotPresent) => Ok(None),
            Err(env::VarError::NotUnicode(_)) => Err(BuildError::Env { name }),
        })
    }

    /// Seed the endpoint and label through `lookup`, which stands in for the
    /// environment.
    pub fn from_env_with<F>(mut lookup: F) -> Result<Self, BuildError>
    where
        F: FnMut(&'static str) -> Result<Option<String>, BuildError>,
    {
        let mut builder = Self::new();
        builder.endpoint = lookup(ENV_ADDRESS)?;
        builder.source_type = lookup(ENV_TYPE)?;
        Ok(builder)
    }

    /// Set the collector address as `host:port`.
    pub fn with_endpoint(mut self, address: impl Into<String>) -> Self {
        self.endpoint = Some(address.into());
        self
    }

    /// Set the label sent as `type` with every message.
    pub fn with_source_type(mut self, source_type: impl Into<String>) -> Self {
        self.source_type = Some(source_type.into());
        self
    }

    option_setter!(
        #[doc = "Set the bounded queue capacity."]
        with_capacity,
        capacity,
        usize
    );
    option_setter!(with_connect_timeout_ms, connect_timeout_ms, u64);
    option_setter!(with_write_timeout_ms, write_timeout_ms, u64);
    option_setter!(
        #[doc = "Set how long a graceful stop waits for the worker."]
        with_stop_wait_ms,
        stop_wait_ms,
        u64
    );
    option_setter!(with_max_message_size, max_message_size, usize);
    option_setter!(with_warn_interval_ms, warn_interval_ms, u64);

    /// Attach an `@timestamp` to each message when it is sent.
    pub fn with_timestamp(mut self, enabled: bool) -> Self {
        self.include_timestamp = enabled;
        self
    }

    /// Override backoff timings using the provided overrides.
    pub fn with_backoff(mut self, overrides: BackoffOverrides) -> Self {
        self.backoff = overrides;
        self
    }

    fn validate_endpoint(&self) -> Result<String, BuildError> {
        let endpoint = self
            .endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| BuildError::InvalidConfig("endpoint address is required".into()))?;
        let valid = endpoint
            .rsplit_once(':')
            .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok());
        if !valid {
            return Err(BuildError::InvalidConfig(format!(
                "endpoint address {endpoint:?} must be host:port"
            )));
        }
        Ok(endpoint.to_owned())
    }

    fn validate_source_type(&self) -> Result<String, BuildError> {
        self.source_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| BuildError::InvalidConfig("source type is required".into()))
    }

    /// Validate the collected settings and produce a configuration.
    pub fn build_config(&self) -> Result<ShipperConfig, BuildError> {
        let mut config = ShipperConfig::new(self.validate_endpoint()?, self.validate_source_type()?);
        if let Some(capacity) = self.capacity {
            config.queue_capacity = ensure_positive!(capacity, "capacity")?;
        }
        if let Some(ms) = self.connect_timeout_ms {
            config.connect_timeout = Duration::from_millis(ensure_positive!(ms, "connect_timeout_ms")?);
        }
        if let Some(ms) = self.write_timeout_ms {
            config.write_timeout = Duration::from_millis(ensure_positive!(ms, "write_timeout_ms")?);
        }
        if let Some(ms) = self.stop_wait_ms {
            config.stop_wait = Duration::from_millis(ensure_positive!(ms, "stop_wait_ms")?);
        }
        if let Some(size) = self.max_message_size {
            config.max_message_size = ensure_positive!(size, "max_message_size")?;
        }
        if let Some(ms) = self.warn_interval_ms {
            config.warn_interval = Duration::from_millis(ms);
        }
        config.include_timestamp = self.include_timestamp;
        self.backoff.apply(&mut config.backoff)?;
        Ok(config)
    }

    /// Validate the settings and start a shipper.
    pub fn start(&self) -> Result<Shipper, BuildError> {
        Ok(Shipper::start(self.build_config()?))
    }
}
