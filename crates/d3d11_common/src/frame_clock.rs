use std::time::Duration;
use std::time::Instant;

use tracing::warn;

pub const DEFAULT_TARGET_FRAMERATE: f32 = 30.0;

/// Measures time between frames. A long stall, such as sitting on a
/// breakpoint, is reported as a single frame at the target rate.
#[derive(Debug, Clone)]
pub struct FrameClock {
    max_delta: f32,
    previous: Instant,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_FRAMERATE)
    }
}

impl FrameClock {
    pub fn new(target_framerate: f32) -> Self {
        Self::starting_at(target_framerate, Instant::now())
    }

    /// A target framerate that is not a positive number falls back to
    /// [`DEFAULT_TARGET_FRAMERATE`].
    pub fn starting_at(target_framerate: f32, start: Instant) -> Self {
        let target_framerate = if target_framerate.is_finite() && target_framerate > 0.0 {
            target_framerate
        } else {
            warn!("Invalid target framerate {target_framerate}, using {DEFAULT_TARGET_FRAMERATE}");
            DEFAULT_TARGET_FRAMERATE
        };
        Self {
            max_delta: 1.0 / target_framerate,
            previous: start,
        }
    }

    pub fn max_delta(&self) -> Duration {
        Duration::from_secs_f32(self.max_delta)
    }

    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Seconds since the previous tick, at most `1 / target_framerate`.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.previous).as_secs_f32();
        self.previous = now;
        elapsed.min(self.max_delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_frames_pass_through() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(30.0, start);
        let delta = clock.tick_at(start + Duration::from_millis(10));
        assert!((delta - 0.010).abs() < 1e-4);
    }

    #[test]
    fn long_stalls_are_clamped_to_one_target_frame() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(30.0, start);
        let delta = clock.tick_at(start + Duration::from_secs(5));
        assert!((delta - 1.0 / 30.0).abs() < 1e-6);

        // the stall is not carried into the next frame
        let next = clock.tick_at(start + Duration::from_secs(5) + Duration::from_millis(5));
        assert!((next - 0.005).abs() < 1e-4);
    }

    #[test]
    fn unusable_framerates_fall_back_to_the_default() {
        let start = Instant::now();
        for framerate in [0.0, -60.0, f32::NAN, f32::INFINITY] {
            let mut clock = FrameClock::starting_at(framerate, start);
            assert!((clock.max_delta().as_secs_f32() - 1.0 / 30.0).abs() < 1e-6);
            let delta = clock.tick_at(start + Duration::from_secs(1));
            assert!((delta - 1.0 / 30.0).abs() < 1e-6);
        }
    }

    #[test]
    fn default_targets_thirty_frames_per_second() {
        let clock = FrameClock::default();
        assert!((clock.max_delta().as_secs_f32() - 1.0 / 30.0).abs() < 1e-6);
    }
}
