//! MQTT link supervision.
//!
//! The broker connection is either up or it isn't; while it is down the only
//! remedy is to try again on a fixed cadence. This module makes that policy
//! an explicit, host-testable state machine: the main loop feeds the client's
//! connected flag into [`LinkSupervisor::tick`] and acts on the returned
//! [`LinkAction`]. Retries use a fixed delay with no backoff and no attempt
//! limit.

use std::time::{Duration, Instant};

use crate::config::MQTT_RETRY_DELAY;

/// Connection state of the MQTT link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Not connected, no attempt in flight.
    Down,
    /// An attempt was issued, waiting out the retry window.
    Connecting,
    /// Connected to the broker.
    Up,
}

/// What the main loop should do this iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAction {
    /// The link is up: service it (read sensors, publish).
    Service,
    /// Issue a connect attempt now.
    Connect,
    /// Inside the retry window; wait this much longer before reattempting.
    Backoff(Duration),
}

/// Tick-driven reconnect supervisor.
///
/// Call [`tick`](Self::tick) once per main-loop iteration with the client's
/// current connected flag. The supervisor never reports [`LinkAction::Service`]
/// until that flag is true, and spaces [`LinkAction::Connect`] reports by the
/// configured retry delay.
#[derive(Debug)]
pub struct LinkSupervisor {
    state: LinkState,
    retry_delay: Duration,
    last_attempt: Option<Instant>,
}

impl LinkSupervisor {
    /// Create a supervisor with the given retry cadence.
    pub fn new(retry_delay: Duration) -> Self {
        Self {
            state: LinkState::Down,
            retry_delay,
            last_attempt: None,
        }
    }

    /// Current link state.
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Advance the state machine.
    ///
    /// `connected` is the transport's view of the link, `now` the current
    /// monotonic time (a parameter so tests can steer the clock).
    pub fn tick(&mut self, connected: bool, now: Instant) -> LinkAction {
        if connected {
            self.state = LinkState::Up;
            self.last_attempt = None;
            return LinkAction::Service;
        }

        match self.last_attempt {
            Some(at) => {
                let elapsed = now.duration_since(at);
                if elapsed < self.retry_delay {
                    self.state = LinkState::Connecting;
                    LinkAction::Backoff(self.retry_delay - elapsed)
                } else {
                    self.last_attempt = Some(now);
                    self.state = LinkState::Connecting;
                    LinkAction::Connect
                }
            }
            None => {
                // First tick after boot or after losing an established link
                self.last_attempt = Some(now);
                self.state = LinkState::Connecting;
                LinkAction::Connect
            }
        }
    }
}

impl Default for LinkSupervisor {
    fn default() -> Self {
        Self::new(MQTT_RETRY_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_secs(5);

    #[test]
    fn test_first_tick_connects() {
        let mut sup = LinkSupervisor::new(DELAY);
        let now = Instant::now();
        assert_eq!(sup.tick(false, now), LinkAction::Connect);
        assert_eq!(sup.state(), LinkState::Connecting);
    }

    #[test]
    fn test_never_services_until_connected() {
        let mut sup = LinkSupervisor::new(DELAY);
        let start = Instant::now();
        // Walk a minute of disconnected ticks at 1s resolution
        for i in 0..60 {
            let action = sup.tick(false, start + Duration::from_secs(i));
            assert_ne!(action, LinkAction::Service, "serviced while down at t={}", i);
            assert_ne!(sup.state(), LinkState::Up);
        }
    }

    #[test]
    fn test_backoff_inside_retry_window() {
        let mut sup = LinkSupervisor::new(DELAY);
        let start = Instant::now();
        assert_eq!(sup.tick(false, start), LinkAction::Connect);
        match sup.tick(false, start + Duration::from_secs(2)) {
            LinkAction::Backoff(remaining) => assert_eq!(remaining, Duration::from_secs(3)),
            other => panic!("expected Backoff, got {:?}", other),
        }
    }

    #[test]
    fn test_reconnect_after_retry_delay() {
        let mut sup = LinkSupervisor::new(DELAY);
        let start = Instant::now();
        assert_eq!(sup.tick(false, start), LinkAction::Connect);
        assert_eq!(sup.tick(false, start + DELAY), LinkAction::Connect);
        // And the window restarts from the second attempt
        match sup.tick(false, start + DELAY + Duration::from_secs(1)) {
            LinkAction::Backoff(_) => {}
            other => panic!("expected Backoff, got {:?}", other),
        }
    }

    #[test]
    fn test_retry_cadence_is_fixed() {
        // No exponential growth: attempts stay exactly one delay apart
        let mut sup = LinkSupervisor::new(DELAY);
        let start = Instant::now();
        let mut attempts = 0;
        for i in 0..31 {
            if sup.tick(false, start + Duration::from_secs(i)) == LinkAction::Connect {
                attempts += 1;
            }
        }
        // t = 0, 5, 10, 15, 20, 25, 30
        assert_eq!(attempts, 7);
    }

    #[test]
    fn test_connected_services_immediately() {
        let mut sup = LinkSupervisor::new(DELAY);
        let now = Instant::now();
        assert_eq!(sup.tick(true, now), LinkAction::Service);
        assert_eq!(sup.state(), LinkState::Up);
    }

    #[test]
    fn test_service_skips_reconnect_while_up() {
        let mut sup = LinkSupervisor::new(DELAY);
        let start = Instant::now();
        for i in 0..10 {
            let action = sup.tick(true, start + Duration::from_secs(i));
            assert_eq!(action, LinkAction::Service);
        }
    }

    #[test]
    fn test_drop_after_up_reconnects_without_waiting() {
        let mut sup = LinkSupervisor::new(DELAY);
        let start = Instant::now();
        assert_eq!(sup.tick(true, start), LinkAction::Service);
        // The link drops: the first retry fires immediately, not after a
        // stale window from before the connection was established
        assert_eq!(
            sup.tick(false, start + Duration::from_secs(1)),
            LinkAction::Connect
        );
    }
}
