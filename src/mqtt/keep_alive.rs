//! Keep-alive scheduling.
//!
//! The timer context only posts ticks. [`KeepAlive`] turns each consumed tick
//! into a decision for the poll loop: send a ping, give up on the broker, or
//! do nothing.

use crate::system::timer::Timer;

/// What the poll loop should do for one consumed tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepAliveAction {
    /// Send PINGREQ.
    Ping,
    /// The previous PINGREQ was never answered; close the transport.
    Expired,
    /// The scheduler is not running.
    Idle,
}

/// Ping scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepAlive {
    interval_ms: u32,
    awaiting_response: bool,
    running: bool,
}

impl KeepAlive {
    /// A stopped scheduler firing every `seconds`. `0` never fires.
    pub fn new(seconds: u16) -> Self {
        Self {
            interval_ms: u32::from(seconds) * 1_000,
            awaiting_response: false,
            running: false,
        }
    }

    /// Change the period. Takes effect on the next [`KeepAlive::start`].
    pub fn set_interval(&mut self, seconds: u16) {
        self.interval_ms = u32::from(seconds) * 1_000;
    }

    /// Start the timer unless the interval is zero.
    pub fn start<T: Timer>(&mut self, timer: &mut T) {
        self.awaiting_response = false;
        if self.interval_ms == 0 {
            self.running = false;
            return;
        }
        timer.start(self.interval_ms);
        self.running = true;
    }

    /// Stop the timer and forget any outstanding ping.
    pub fn stop<T: Timer>(&mut self, timer: &mut T) {
        if self.running {
            timer.stop();
        }
        self.running = false;
        self.awaiting_response = false;
    }

    /// Decide what a tick means.
    pub fn on_tick(&mut self) -> KeepAliveAction {
        if !self.running {
            KeepAliveAction::Idle
        } else if self.awaiting_response {
            KeepAliveAction::Expired
        } else {
            self.awaiting_response = true;
            KeepAliveAction::Ping
        }
    }

    /// PINGRESP arrived.
    pub fn on_ping_response(&mut self) {
        self.awaiting_response = false;
    }

    /// Whether a PINGREQ is still unanswered.
    pub fn is_awaiting_response(&self) -> bool {
        self.awaiting_response
    }

    /// Whether the timer is running.
    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingTimer {
        started: Option<u32>,
        stops: usize,
    }

    impl Timer for RecordingTimer {
        fn now_millis(&self) -> u64 {
            0
        }
        fn start(&mut self, period_ms: u32) {
            self.started = Some(period_ms);
        }
        fn stop(&mut self) {
            self.stops += 1;
        }
        fn take_tick(&mut self) -> bool {
            false
        }
    }

    #[test]
    fn test_ping_then_expire() {
        let mut timer = RecordingTimer::default();
        let mut keep_alive = KeepAlive::new(10);
        keep_alive.start(&mut timer);
        assert_eq!(timer.started, Some(10_000));

        assert_eq!(keep_alive.on_tick(), KeepAliveAction::Ping);
        assert!(keep_alive.is_awaiting_response());
        assert_eq!(keep_alive.on_tick(), KeepAliveAction::Expired);
    }

    #[test]
    fn test_response_rearms() {
        let mut timer = RecordingTimer::default();
        let mut keep_alive = KeepAlive::new(5);
        keep_alive.start(&mut timer);
        assert_eq!(keep_alive.on_tick(), KeepAliveAction::Ping);
        keep_alive.on_ping_response();
        assert_eq!(keep_alive.on_tick(), KeepAliveAction::Ping);
    }

    #[test]
    fn test_zero_interval_never_starts() {
        let mut timer = RecordingTimer::default();
        let mut keep_alive = KeepAlive::new(0);
        keep_alive.start(&mut timer);
        assert_eq!(timer.started, None);
        assert_eq!(keep_alive.on_tick(), KeepAliveAction::Idle);
        keep_alive.stop(&mut timer);
        assert_eq!(timer.stops, 0);
    }

    #[test]
    fn test_stop_clears_state() {
        let mut timer = RecordingTimer::default();
        let mut keep_alive = KeepAlive::new(1);
        keep_alive.start(&mut timer);
        keep_alive.on_tick();
        keep_alive.stop(&mut timer);
        assert_eq!(timer.stops, 1);
        assert!(!keep_alive.is_awaiting_response());
        assert_eq!(keep_alive.on_tick(), KeepAliveAction::Idle);
    }
}
