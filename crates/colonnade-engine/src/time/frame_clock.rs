use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous frame tick, in seconds.
    pub dt: f32,

    /// Sum of clamped deltas since the clock started, in seconds.
    pub total: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Frame clock producing `FrameTime` snapshots.
///
/// Delta time is clamped to avoid pathological values when the application is paused
/// by the debugger, minimized, or stalls. `total` accumulates the clamped values, so
/// animations driven by it never jump after a stall.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    total: Duration,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    /// Creates a new clock with default clamps (0.1 ms to 250 ms).
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            total: Duration::ZERO,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Resets the delta baseline. Total time is kept.
    ///
    /// Useful when resuming from suspension.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);

        self.last = now;
        self.total += dt;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            total: self.total.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_accumulates_clamped_deltas() {
        let mut clock = FrameClock::with_clamps(Duration::from_millis(1), Duration::from_millis(100));
        let start = clock.last;

        let a = clock.tick_at(start + Duration::from_millis(10));
        // A long stall only counts as the maximum delta.
        let b = clock.tick_at(start + Duration::from_secs(5));

        assert!((a.dt - 0.010).abs() < 1e-6);
        assert!((b.dt - 0.100).abs() < 1e-6);
        assert!((b.total - 0.110).abs() < 1e-6);
        assert_eq!((a.frame_index, b.frame_index), (0, 1));
    }

    #[test]
    fn tight_loop_gets_minimum_delta() {
        let mut clock = FrameClock::new();
        let start = clock.last;
        let ft = clock.tick_at(start);
        assert!((ft.dt - 0.0001).abs() < 1e-7);
    }
}
