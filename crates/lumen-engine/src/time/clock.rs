use std::time::{Duration, Instant};

/// Frame timing snapshot produced by [`Clock::sample`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Seconds since the clock started. Never decreases.
    pub elapsed: f32,

    /// Seconds since the previous sample. Never negative or NaN.
    pub delta: f32,

    /// Monotonic timestamp taken at the sample.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Clock configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClockConfig {
    /// Optional upper bound for `delta`.
    ///
    /// `None` reports the real gap between samples. Set a bound when the update
    /// hook integrates physics that would explode after a long stall.
    pub max_delta: Option<Duration>,
}

/// Wall-time source producing elapsed and delta time.
///
/// One clock per frame loop, so independent schedulers do not share delta state.
/// Sampling uses saturating arithmetic: an instant older than the previous
/// sample (re-entrant or reordered sampling) yields `delta == 0` and leaves
/// `elapsed` where it was.
#[derive(Debug, Clone)]
pub struct Clock {
    start: Instant,
    last: Instant,
    last_elapsed: Duration,
    frame_index: u64,
    config: ClockConfig,
}

impl Clock {
    /// Starts a clock at `Instant::now()`.
    pub fn new() -> Self {
        Self::start_at(Instant::now())
    }

    /// Starts a clock at an explicit instant.
    pub fn start_at(start: Instant) -> Self {
        Self::with_config(start, ClockConfig::default())
    }

    pub fn with_config(start: Instant, config: ClockConfig) -> Self {
        Self {
            start,
            last: start,
            last_elapsed: Duration::ZERO,
            frame_index: 0,
            config,
        }
    }

    /// Restarts the clock baseline; the next sample reports elapsed from here.
    pub fn reset_at(&mut self, start: Instant) {
        self.start = start;
        self.last = start;
        self.last_elapsed = Duration::ZERO;
    }

    /// Seconds elapsed as of the most recent sample.
    pub fn elapsed(&self) -> f32 {
        self.last_elapsed.as_secs_f32()
    }

    /// Samples the clock at `Instant::now()`.
    pub fn sample(&mut self) -> FrameTime {
        self.sample_at(Instant::now())
    }

    /// Samples the clock at `now`.
    pub fn sample_at(&mut self, now: Instant) -> FrameTime {
        let mut delta = now.saturating_duration_since(self.last);
        if let Some(max) = self.config.max_delta {
            delta = delta.min(max);
        }

        if now > self.last {
            self.last = now;
        }

        let elapsed = self.last.saturating_duration_since(self.start);
        self.last_elapsed = self.last_elapsed.max(elapsed);

        let ft = FrameTime {
            elapsed: self.last_elapsed.as_secs_f32(),
            delta: delta.as_secs_f32(),
            now: self.last,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn samples_elapsed_and_delta() {
        let t0 = Instant::now();
        let mut clock = Clock::start_at(t0);

        let a = clock.sample_at(t0);
        assert_eq!(a.elapsed, 0.0);
        assert_eq!(a.delta, 0.0);

        let b = clock.sample_at(t0 + ms(16));
        assert!(close(b.elapsed, 0.016));
        assert!(close(b.delta, 0.016));

        let c = clock.sample_at(t0 + ms(1016));
        assert!(close(c.elapsed, 1.016));
        assert!(close(c.delta, 1.0));
        assert_eq!(c.frame_index, 2);
    }

    #[test]
    fn stale_instant_never_goes_backwards() {
        let t0 = Instant::now();
        let mut clock = Clock::start_at(t0);

        clock.sample_at(t0 + ms(100));
        let stale = clock.sample_at(t0 + ms(40));
        assert_eq!(stale.delta, 0.0);
        assert!(close(stale.elapsed, 0.1));

        let next = clock.sample_at(t0 + ms(150));
        assert!(close(next.delta, 0.05));
        assert!(next.delta >= 0.0 && !next.delta.is_nan());
    }

    #[test]
    fn optional_delta_clamp() {
        let t0 = Instant::now();
        let mut clock = Clock::with_config(t0, ClockConfig { max_delta: Some(ms(250)) });

        let ft = clock.sample_at(t0 + ms(2000));
        assert!(close(ft.delta, 0.25));
        // Elapsed still tracks wall time.
        assert!(close(ft.elapsed, 2.0));
    }
}
