//! Countdown timing for timed shots.
//!
//! A countdown is advanced in whole-second ticks by whoever drives the
//! session (a timer in the CLI, a UI frame loop elsewhere). It holds no
//! clock of its own, so tests can step it deterministically.

use std::time::Duration;

/// Outcome of advancing a countdown by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    /// Seconds still to go after this tick.
    Remaining(u32),
    /// The countdown reached zero on this tick.
    Elapsed,
}

/// A whole-second countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    total_secs: u32,
    remaining_secs: u32,
}

impl Countdown {
    /// Tick interval expected by `tick`.
    pub const TICK: Duration = Duration::from_secs(1);

    /// Create a countdown starting at `secs`.
    pub fn new(secs: u32) -> Self {
        Self {
            total_secs: secs,
            remaining_secs: secs,
        }
    }

    /// Seconds left before the shot fires.
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// Configured length of the countdown.
    pub fn total_secs(&self) -> u32 {
        self.total_secs
    }

    /// Whether the countdown has already reached zero.
    pub fn is_elapsed(&self) -> bool {
        self.remaining_secs == 0
    }

    /// Advance by one second.
    ///
    /// A zero-length countdown elapses on its first tick. Ticking an
    /// elapsed countdown keeps reporting `Elapsed`.
    pub fn tick(&mut self) -> CountdownTick {
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            CountdownTick::Elapsed
        } else {
            CountdownTick::Remaining(self.remaining_secs)
        }
    }

    /// Restart from the configured length.
    pub fn reset(&mut self) {
        self.remaining_secs = self.total_secs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_second_countdown() {
        let mut countdown = Countdown::new(3);
        assert_eq!(countdown.remaining_secs(), 3);
        assert_eq!(countdown.tick(), CountdownTick::Remaining(2));
        assert_eq!(countdown.tick(), CountdownTick::Remaining(1));
        assert_eq!(countdown.tick(), CountdownTick::Elapsed);
        assert!(countdown.is_elapsed());
        assert_eq!(countdown.tick(), CountdownTick::Elapsed);
    }

    #[test]
    fn test_zero_length_elapses_immediately() {
        let mut countdown = Countdown::new(0);
        assert_eq!(countdown.tick(), CountdownTick::Elapsed);
    }

    #[test]
    fn test_reset_restores_total() {
        let mut countdown = Countdown::new(2);
        countdown.tick();
        countdown.reset();
        assert_eq!(countdown.remaining_secs(), 2);
        assert_eq!(countdown.total_secs(), 2);
    }
}
