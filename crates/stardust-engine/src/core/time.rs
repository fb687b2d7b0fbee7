/// Reference update cadence the simulation is normalized to.
/// Velocities are expressed in units-per-frame at 60 updates per second.
pub const REFERENCE_HZ: f64 = 60.0;

/// Scale factor that makes one tick of `dt_ms` advance the simulation by
/// the same amount a 60 Hz frame would. At dt = 16.67 ms this is ~1.0, so
/// simulation speed is independent of the actual tick rate.
#[inline]
pub fn frame_scale(dt_ms: f64) -> f32 {
    (dt_ms / 1000.0 * REFERENCE_HZ) as f32
}

/// Wall-clock frame timer.
/// Turns the host's absolute `now_ms` callbacks into bounded per-tick
/// deltas. The first tick after construction or a `reset` yields zero,
/// so resuming never produces a huge simulated time jump.
#[derive(Debug)]
pub struct FrameClock {
    last_ms: Option<f64>,
    /// Upper bound on a single delta (stall protection).
    max_step_ms: f64,
}

impl FrameClock {
    pub fn new(max_step_ms: f64) -> Self {
        Self {
            last_ms: None,
            max_step_ms,
        }
    }

    /// Elapsed time since the previous tick, clamped to `[0, max_step_ms]`.
    pub fn delta(&mut self, now_ms: f64) -> f64 {
        let dt = match self.last_ms {
            Some(last) => (now_ms - last).clamp(0.0, self.max_step_ms),
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        dt
    }

    /// Timestamp of the most recent tick, if any.
    pub fn now(&self) -> Option<f64> {
        self.last_ms
    }

    /// Drop the elapsed-time baseline. The next `delta` returns zero.
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_delta_is_zero() {
        let mut clock = FrameClock::new(100.0);
        assert_eq!(clock.delta(5000.0), 0.0);
    }

    #[test]
    fn delta_between_ticks() {
        let mut clock = FrameClock::new(100.0);
        clock.delta(1000.0);
        assert_eq!(clock.delta(1016.0), 16.0);
    }

    #[test]
    fn delta_clamped_after_stall() {
        let mut clock = FrameClock::new(100.0);
        clock.delta(1000.0);
        assert_eq!(clock.delta(9000.0), 100.0);
    }

    #[test]
    fn reset_rearms_baseline() {
        let mut clock = FrameClock::new(100.0);
        clock.delta(1000.0);
        clock.reset();
        assert_eq!(clock.delta(60_000.0), 0.0);
        assert_eq!(clock.delta(60_016.0), 16.0);
    }

    #[test]
    fn backwards_time_yields_zero() {
        let mut clock = FrameClock::new(100.0);
        clock.delta(1000.0);
        assert_eq!(clock.delta(900.0), 0.0);
    }

    #[test]
    fn frame_scale_is_one_at_reference_rate() {
        let s = frame_scale(1000.0 / 60.0);
        assert!((s - 1.0).abs() < 1e-4, "scale was {}", s);
    }
}
