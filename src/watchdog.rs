//! Silence watchdog: auto-stops a dictation session after a quiet interval.

use std::time::{Duration, Instant};

pub const DEFAULT_SILENCE_TIMEOUT: Duration = Duration::from_millis(1500);

/// Holds at most one pending deadline; every reset supersedes the previous one.
#[derive(Debug, Clone)]
pub struct SilenceWatchdog {
    timeout: Duration,
    deadline: Option<Instant>,
}

impl SilenceWatchdog {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            deadline: None,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn reset(&mut self, now: Instant) {
        self.deadline = Some(now + self.timeout);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Returns true once when the deadline has passed, disarming the watchdog.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for SilenceWatchdog {
    fn default() -> Self {
        Self::new(DEFAULT_SILENCE_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_timeout() {
        let start = Instant::now();
        let mut watchdog = SilenceWatchdog::default();
        watchdog.reset(start);

        assert!(!watchdog.poll(start + Duration::from_millis(1499)));
        assert!(watchdog.poll(start + Duration::from_millis(1500)));
        assert!(!watchdog.poll(start + Duration::from_millis(5000)));
        assert!(!watchdog.is_armed());
    }

    #[test]
    fn only_last_reset_deadline_fires() {
        let start = Instant::now();
        let mut watchdog = SilenceWatchdog::default();
        for step in 0..5u64 {
            watchdog.reset(start + Duration::from_millis(step * 1000));
        }
        // Earlier deadlines (1500, 2500, ...) have all been superseded.
        assert!(!watchdog.poll(start + Duration::from_millis(5000)));
        assert!(watchdog.poll(start + Duration::from_millis(5500)));
    }

    #[test]
    fn cancel_prevents_expiry() {
        let start = Instant::now();
        let mut watchdog = SilenceWatchdog::new(Duration::from_millis(200));
        watchdog.reset(start);
        watchdog.cancel();
        assert!(!watchdog.poll(start + Duration::from_secs(10)));
    }
}
