#![forbid(unsafe_code)]

//! Time-based animation primitives.
//!
//! Animations produce normalized `f32` values in [0.0, 1.0] and advance only
//! when ticked, so tests can drive them with exact durations.

use std::time::Duration;

/// Easing function signature: maps `t` in [0, 1] to output in [0, 1].
pub type EasingFn = fn(f32) -> f32;

/// Identity easing (constant velocity).
#[inline]
pub fn linear(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// Quadratic ease-in-out (slow start and end).
#[inline]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// A time-based animation producing values in [0.0, 1.0].
pub trait Animation {
    /// Advance the animation by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has reached its end.
    fn is_complete(&self) -> bool;

    /// Current output value, clamped to [0.0, 1.0].
    fn value(&self) -> f32;

    /// Reset the animation to its initial state.
    fn reset(&mut self);
}

/// Progression from 0.0 to 1.0 over a duration, with configurable easing.
#[derive(Debug, Clone, Copy)]
pub struct Fade {
    elapsed: Duration,
    duration: Duration,
    easing: EasingFn,
}

impl Fade {
    /// Create a fade with the given duration and default linear easing.
    pub fn new(duration: Duration) -> Self {
        Self {
            elapsed: Duration::ZERO,
            duration: if duration.is_zero() {
                Duration::from_nanos(1)
            } else {
                duration
            },
            easing: linear,
        }
    }

    /// Set the easing function.
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    fn raw_progress(&self) -> f32 {
        let t = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        (t as f32).clamp(0.0, 1.0)
    }
}

impl Animation for Fade {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f32 {
        (self.easing)(self.raw_progress())
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}

/// Triangle-wave oscillation between 0.0 and 1.0. Never completes.
///
/// Rises from 0.0 to 1.0 over `half_period`, then falls back over the same
/// span, and repeats. Easing is applied to each half.
#[derive(Debug, Clone, Copy)]
pub struct Oscillator {
    half_period: Duration,
    elapsed: Duration,
    easing: EasingFn,
}

impl Oscillator {
    /// Create an oscillator whose rise (and fall) each take `half_period`.
    pub fn new(half_period: Duration) -> Self {
        Self {
            half_period: if half_period.is_zero() {
                Duration::from_nanos(1)
            } else {
                half_period
            },
            elapsed: Duration::ZERO,
            easing: linear,
        }
    }

    /// Set the easing function applied to each half-cycle.
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// Whether the oscillator is currently in its rising half.
    pub fn is_rising(&self) -> bool {
        let period = self.half_period.as_nanos() * 2;
        self.elapsed.as_nanos() % period < self.half_period.as_nanos()
    }
}

impl Animation for Oscillator {
    fn tick(&mut self, dt: Duration) {
        let period = self.half_period.saturating_mul(2);
        let nanos = (self.elapsed.saturating_add(dt).as_nanos() % period.as_nanos()) as u64;
        self.elapsed = Duration::from_nanos(nanos);
    }

    fn is_complete(&self) -> bool {
        false
    }

    fn value(&self) -> f32 {
        let half = self.half_period.as_nanos();
        let pos = self.elapsed.as_nanos();
        let t = if pos < half {
            pos as f64 / half as f64
        } else {
            1.0 - (pos - half) as f64 / half as f64
        };
        (self.easing)(t as f32)
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn easing_endpoints() {
        assert!((linear(0.0) - 0.0).abs() < f32::EPSILON);
        assert!((linear(1.0) - 1.0).abs() < f32::EPSILON);
        assert!((ease_in_out(0.0) - 0.0).abs() < f32::EPSILON);
        assert!((ease_in_out(1.0) - 1.0).abs() < f32::EPSILON);
        assert!((ease_in_out(0.5) - 0.5).abs() < 0.01);
    }

    #[test]
    fn easing_clamps_input() {
        assert!((linear(-1.0) - 0.0).abs() < f32::EPSILON);
        assert!((linear(2.0) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn fade_progresses_and_completes() {
        let mut fade = Fade::new(ms(800));
        assert!((fade.value() - 0.0).abs() < f32::EPSILON);
        fade.tick(ms(400));
        assert!((fade.value() - 0.5).abs() < 0.001);
        assert!(!fade.is_complete());
        fade.tick(ms(500));
        assert!(fade.is_complete());
        assert!((fade.value() - 1.0).abs() < f32::EPSILON);
        fade.reset();
        assert!(!fade.is_complete());
    }

    #[test]
    fn zero_duration_fade_completes_on_first_tick() {
        let mut fade = Fade::new(Duration::ZERO);
        fade.tick(ms(1));
        assert!(fade.is_complete());
    }

    #[test]
    fn oscillator_rises_then_falls() {
        let mut osc = Oscillator::new(ms(600));
        assert!(osc.is_rising());
        osc.tick(ms(300));
        assert!((osc.value() - 0.5).abs() < 0.001);
        osc.tick(ms(300));
        assert!(!osc.is_rising());
        assert!((osc.value() - 1.0).abs() < 0.001);
        osc.tick(ms(300));
        assert!((osc.value() - 0.5).abs() < 0.001);
        osc.tick(ms(300));
        assert!(osc.is_rising());
        assert!(osc.value() < 0.001);
        assert!(!osc.is_complete());
    }

    #[test]
    fn oscillator_wraps_large_ticks() {
        let mut osc = Oscillator::new(ms(100));
        osc.tick(ms(1_050));
        assert!((osc.value() - 0.5).abs() < 0.001);
    }
}
