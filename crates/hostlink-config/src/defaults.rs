use crate::logging::LogFormat;

/// Default TCP port for the command listener.
pub const DEFAULT_PORT: u16 = 1337;

/// Seconds of inactivity after which a client is evicted.
pub const DEFAULT_CLIENT_TIMEOUT_SECONDS: f64 = 30.0;

/// Size of the temporary buffer used for each socket read.
pub const DEFAULT_RECEIVE_BUFFER_SIZE: usize = 8192;

/// Interval between scheduler ticks.
pub const DEFAULT_TICK_INTERVAL_SECONDS: f64 = 0.1;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default listener port.
pub const fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Default client timeout in seconds.
pub const fn default_client_timeout_seconds() -> f64 {
    DEFAULT_CLIENT_TIMEOUT_SECONDS
}

/// Default receive buffer size in bytes.
pub const fn default_receive_buffer_size() -> usize {
    DEFAULT_RECEIVE_BUFFER_SIZE
}

/// Default tick interval in seconds.
pub const fn default_tick_interval_seconds() -> f64 {
    DEFAULT_TICK_INTERVAL_SECONDS
}

/// Default log filter expression used by the binaries.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Default logging format for the binaries.
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}
