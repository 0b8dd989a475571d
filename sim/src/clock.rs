//! Fixed-timestep clock.
//!
//! Wall time is accumulated in whole nanoseconds, so the number of ticks run
//! over any sequence of `advance` calls is exactly `floor(total / tick)` as
//! long as the per-frame cap is never hit. When a frame owes more than
//! `max_ticks_per_frame` ticks, the surplus whole ticks are dropped and only
//! the sub-tick remainder is carried, which keeps one slow frame from forcing
//! ever more catch-up work.

use crate::error::{SimError, SimResult};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationClock {
    tick: Duration,
    max_ticks_per_frame: u32,
    accumulator: Duration,
    total_ticks: u64,
    dropped_ticks: u64,
}

impl SimulationClock {
    pub fn new(tick: Duration, max_ticks_per_frame: u32) -> SimResult<Self> {
        if tick.is_zero() {
            return Err(SimError::invalid("tick duration must be positive"));
        }
        if max_ticks_per_frame == 0 {
            return Err(SimError::invalid("max_ticks_per_frame must be at least 1"));
        }
        Ok(Self {
            tick,
            max_ticks_per_frame,
            accumulator: Duration::ZERO,
            total_ticks: 0,
            dropped_ticks: 0,
        })
    }

    /// Account for `elapsed` wall time and return how many ticks to run now.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        let pending = self.accumulator.as_nanos() + elapsed.as_nanos();
        let tick = self.tick.as_nanos();

        let due = pending / tick;
        let run = due.min(u128::from(self.max_ticks_per_frame));
        if due > run {
            let dropped = (due - run) as u64;
            self.dropped_ticks += dropped;
            log::warn!(
                "simulation fell behind: running {run} ticks, dropping {dropped} ({} dropped so far)",
                self.dropped_ticks
            );
        }

        // The remainder is below one tick, which itself fits in a Duration.
        self.accumulator = Duration::from_nanos((pending % tick) as u64);
        let run = run as u32;
        self.total_ticks += u64::from(run);
        run
    }

    /// Fraction of a tick carried over, for render interpolation (0.0..1.0).
    pub fn alpha(&self) -> f32 {
        (self.accumulator.as_secs_f64() / self.tick.as_secs_f64()) as f32
    }

    /// Discard carried time.
    pub fn reset(&mut self) {
        self.accumulator = Duration::ZERO;
    }

    pub fn tick_duration(&self) -> Duration {
        self.tick
    }

    pub fn max_ticks_per_frame(&self) -> u32 {
        self.max_ticks_per_frame
    }

    pub fn accumulated(&self) -> Duration {
        self.accumulator
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    pub fn dropped_ticks(&self) -> u64 {
        self.dropped_ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(10);

    #[test]
    fn test_rejects_invalid_setup() {
        assert!(matches!(
            SimulationClock::new(Duration::ZERO, 5),
            Err(SimError::InvalidConfiguration(_))
        ));
        assert!(SimulationClock::new(TICK, 0).is_err());
    }

    #[test]
    fn test_three_and_a_half_ticks() {
        let mut clock = SimulationClock::new(TICK, 10).unwrap();
        assert_eq!(clock.advance(TICK * 7 / 2), 3);
        assert_eq!(clock.accumulated(), TICK / 2);
        assert!((clock.alpha() - 0.5).abs() < 1e-6);

        // The carried half tick completes with the next half.
        assert_eq!(clock.advance(TICK / 2), 1);
        assert_eq!(clock.accumulated(), Duration::ZERO);
    }

    #[test]
    fn test_zero_and_short_frames() {
        let mut clock = SimulationClock::new(TICK, 10).unwrap();
        assert_eq!(clock.advance(Duration::ZERO), 0);
        assert_eq!(clock.advance(Duration::from_millis(9)), 0);
        assert_eq!(clock.advance(Duration::from_millis(1)), 1);
    }

    #[test]
    fn test_no_drift_over_irregular_frames() {
        let tick = Duration::from_nanos(16_666_667);
        let mut clock = SimulationClock::new(tick, u32::MAX).unwrap();

        // Deterministic pseudo-random frame times between 0 and ~50 ms.
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        let mut total: u128 = 0;
        let mut executed: u64 = 0;
        for _ in 0..10_000 {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            let frame = Duration::from_nanos(seed % 50_000_000);
            total += frame.as_nanos();
            executed += u64::from(clock.advance(frame));
        }

        assert_eq!(u128::from(executed), total / tick.as_nanos());
        assert_eq!(clock.total_ticks(), executed);
        assert_eq!(clock.dropped_ticks(), 0);
    }

    #[test]
    fn test_cap_drops_surplus_ticks() {
        let mut clock = SimulationClock::new(TICK, 5).unwrap();
        let ran = clock.advance(TICK * 12 + Duration::from_millis(3));
        assert_eq!(ran, 5);
        assert_eq!(clock.dropped_ticks(), 7);
        assert_eq!(clock.accumulated(), Duration::from_millis(3));

        // Normal pacing resumes afterwards.
        assert_eq!(clock.advance(Duration::from_millis(7)), 1);
        assert_eq!(clock.total_ticks(), 6);
    }

    #[test]
    fn test_reset_discards_carry() {
        let mut clock = SimulationClock::new(TICK, 5).unwrap();
        clock.advance(Duration::from_millis(9));
        clock.reset();
        assert_eq!(clock.advance(Duration::from_millis(9)), 0);
    }
}
