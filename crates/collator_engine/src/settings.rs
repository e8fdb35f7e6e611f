use std::time::Duration;

/// Default width of the fetch stage's task pool.
pub const DEFAULT_FETCH_WIDTH: usize = 10;

/// Default width of the aggregation stage's reader pool.
pub const DEFAULT_READER_WIDTH: usize = 16;

/// Timeouts applied to every outbound HTTP call.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}
