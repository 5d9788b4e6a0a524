//! Engine configuration.

use std::time::Duration;

pub const DEFAULT_TTY: &str = "/dev/ttyUSB0";
pub const DEFAULT_BAUD_RATE: u32 = 115_200;
/// Short enough that the worker notices shutdown quickly.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Events queued per subscriber before deliveries to it are dropped.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// How to reach the amplifier and how the engine behaves once connected.
///
/// The serial line itself is fixed by the amplifier: 8 data bits, no parity, 1 stop bit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Path of the serial device.
    pub tty: String,
    pub baud_rate: u32,
    /// Upper bound on one blocking read.
    pub read_timeout: Duration,
    /// Interval between two poll queries.
    pub poll_interval: Duration,
    pub event_capacity: usize,
    /// Ask the amplifier to push its changes once everything is discovered.
    pub auto_update: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tty: DEFAULT_TTY.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            auto_update: true,
        }
    }
}

impl Config {
    pub fn new(tty: impl Into<String>) -> Self {
        Self {
            tty: tty.into(),
            ..Self::default()
        }
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// A capacity of zero is raised to one.
    pub fn with_event_capacity(mut self, event_capacity: usize) -> Self {
        self.event_capacity = event_capacity.max(1);
        self
    }

    pub fn with_auto_update(mut self, auto_update: bool) -> Self {
        self.auto_update = auto_update;
        self
    }
}
