use std::time::Duration;

/// Sessions created when no count is configured.
pub const DEFAULT_SESSION_COUNT: usize = 8;

/// How often a cancellable lock wait re-checks its flag.
pub const DEFAULT_LOCK_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Store sizing and locking behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Number of sessions; ids are `0..session_count`. Must be at least 1.
    pub session_count: usize,
    /// Slice of time a cancellable handle waits on a busy lock between
    /// cancellation checks. Must be non-zero.
    pub lock_poll_interval: Duration,
}

impl StoreConfig {
    pub fn with_session_count(mut self, session_count: usize) -> Self {
        self.session_count = session_count;
        self
    }

    pub fn with_lock_poll_interval(mut self, interval: Duration) -> Self {
        self.lock_poll_interval = interval;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            session_count: DEFAULT_SESSION_COUNT,
            lock_poll_interval: DEFAULT_LOCK_POLL_INTERVAL,
        }
    }
}
