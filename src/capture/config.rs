use std::time::Duration;

/// Restrict capture to TCP and UDP and leave loopback traffic out.
pub const FILTER: &str = "(tcp or udp) and not host 127.0.0.1";

#[derive(Clone, Debug)]
pub struct Config {
    pub filter:      String,
    pub timeout:     Duration,
    pub buffer_size: u64,
    pub snaplen:     u64,
    pub promisc:     bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            filter:      FILTER.to_owned(),
            timeout:     Duration::from_millis(100),
            buffer_size: 10_000_000,
            snaplen:     128,
            promisc:     false,
        }
    }
}
