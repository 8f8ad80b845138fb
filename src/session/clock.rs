// src/session/clock.rs

/// Remaining time of one exam attempt, in whole seconds.
///
/// The counter only ever moves down and stops at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClock {
    remaining: u64,
}

/// What a single tick did to the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickResult {
    Running(u64),
    /// This tick took the clock from one to zero.
    Expired,
    /// The clock was already at zero.
    Idle,
}

impl SessionClock {
    pub fn new(seconds: u64) -> Self {
        Self { remaining: seconds }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    pub fn tick(&mut self) -> TickResult {
        match self.remaining {
            0 => TickResult::Idle,
            1 => {
                self.remaining = 0;
                TickResult::Expired
            }
            n => {
                self.remaining = n - 1;
                TickResult::Running(self.remaining)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_clamp_at_zero() {
        for (start, ticks) in [(60, 10), (60, 60), (60, 61), (5, 100), (0, 3)] {
            let mut clock = SessionClock::new(start);
            for _ in 0..ticks {
                clock.tick();
            }
            assert_eq!(clock.remaining(), start.saturating_sub(ticks));
        }
    }

    #[test]
    fn test_expired_reported_once() {
        let mut clock = SessionClock::new(2);
        assert_eq!(clock.tick(), TickResult::Running(1));
        assert_eq!(clock.tick(), TickResult::Expired);
        assert!(clock.is_expired());
        assert_eq!(clock.tick(), TickResult::Idle);
        assert_eq!(clock.tick(), TickResult::Idle);
    }
}
