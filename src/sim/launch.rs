//! Launch physics model
//!
//! Turns a hold-then-flick gesture plus the current wind into the initial
//! velocity and spin of a laundry item.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::wind::WindState;
use crate::flick_vector;
use crate::tuning::LaunchTuning;

/// Hold-to-charge power meter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PowerMeter {
    /// Current power in [0, max_power]
    pub power: f32,
    /// Pointer is down and charging
    pub charging: bool,
}

impl PowerMeter {
    pub fn start(&mut self) {
        self.charging = true;
        self.power = 0.0;
    }

    /// One fixed tick of charging
    pub fn charge(&mut self, tuning: &LaunchTuning) {
        if self.charging {
            self.power = (self.power + tuning.power_per_tick).clamp(0.0, tuning.max_power);
        }
    }

    /// Drop the charge (throw consumed, rejected, or input ignored)
    pub fn reset(&mut self) {
        self.charging = false;
        self.power = 0.0;
    }
}

/// A press-to-release pointer gesture
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaunchGesture {
    pub start_position: Vec2,
    pub release_position: Vec2,
    /// Press timestamp (host clock, ms)
    pub start_ms: f64,
    /// Release minus press (ms); zero until released
    pub elapsed_flick_ms: f32,
}

impl LaunchGesture {
    /// Created on press
    pub fn begin(position: Vec2, time_ms: f64) -> Self {
        Self {
            start_position: position,
            release_position: position,
            start_ms: time_ms,
            elapsed_flick_ms: 0.0,
        }
    }

    /// Track the pointer while it is held
    pub fn track(&mut self, position: Vec2) {
        self.release_position = position;
    }

    /// Finalized on release
    pub fn finish(mut self, position: Vec2, time_ms: f64) -> Self {
        self.release_position = position;
        self.elapsed_flick_ms = (time_ms - self.start_ms).max(0.0) as f32;
        self
    }

    /// (rightward distance, upward distance)
    pub fn flick_distance(&self) -> Vec2 {
        flick_vector(self.start_position, self.release_position)
    }

    /// Upward speed (px/ms); elapsed time is floored at 1 ms
    pub fn flick_speed(&self) -> f32 {
        self.flick_distance().y / self.elapsed_flick_ms.max(1.0)
    }
}

/// Why a release did not produce a throw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrowRejection {
    /// Not enough upward travel
    TooShort,
    /// Upward travel too slow
    TooSlow,
}

/// Initial conditions handed to the flight resolver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Launch {
    pub velocity: Vec2,
    /// Degrees per second
    pub angular_velocity: f32,
    /// Flick was hard enough to trigger the wild-throw penalty
    pub over_flick: bool,
}

/// Speed multiplier that grows with level
#[inline]
pub fn level_multiplier(level: u32, tuning: &LaunchTuning) -> f32 {
    tuning.level_multiplier_base + level as f32 * tuning.level_multiplier_step
}

/// Validity gate: both thresholds are strict
pub fn validate_flick(gesture: &LaunchGesture, tuning: &LaunchTuning) -> Result<(), ThrowRejection> {
    if gesture.flick_distance().y <= tuning.min_flick_distance {
        return Err(ThrowRejection::TooShort);
    }
    if gesture.flick_speed() <= tuning.min_flick_speed {
        return Err(ThrowRejection::TooSlow);
    }
    Ok(())
}

/// Compute launch velocity and spin for a released gesture
pub fn compute_launch<R: Rng>(
    gesture: &LaunchGesture,
    power: f32,
    level: u32,
    wind: &WindState,
    tuning: &LaunchTuning,
    rng: &mut R,
) -> Result<Launch, ThrowRejection> {
    validate_flick(gesture, tuning)?;

    let distance = gesture.flick_distance();
    let flick_speed = gesture.flick_speed();
    let flick_angle = distance.y.atan2(distance.x);

    let power_factor = power.clamp(0.0, tuning.max_power) / tuning.max_power;
    let level_mult = level_multiplier(level, tuning);
    let flick_push = flick_speed * tuning.flick_gain;

    let vx = (power_factor * tuning.power_x + flick_angle.cos() * flick_push) * level_mult
        + wind.signed_speed() * tuning.wind_gain;
    let mut vy = -(power_factor * tuning.power_y + flick_angle.sin() * flick_push + tuning.base_lift)
        * level_mult;

    // Flicking too hard sends the item sky-high and spinning
    let over_flick = flick_speed > tuning.over_flick_speed;
    let mut spin_mult = 1.0;
    if over_flick {
        let excess = flick_speed - tuning.over_flick_speed;
        vy *= 1.5 + excess * 3.0;
        spin_mult = 2.0 + excess * 4.0;
    }

    let base_spin = rng.random_range(tuning.spin_min..=tuning.spin_max);
    let angular_velocity = base_spin * (flick_speed + 0.5) * spin_mult;

    Ok(Launch {
        velocity: Vec2::new(vx, vy),
        angular_velocity,
        over_flick,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::wind::WindDirection;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn calm() -> WindState {
        WindState {
            speed: 0.0,
            direction: WindDirection::Right,
            intensity: 0.0,
        }
    }

    fn gesture(dx: f32, dy: f32, elapsed: f64) -> LaunchGesture {
        let start = Vec2::new(100.0, 500.0);
        LaunchGesture::begin(start, 1000.0).finish(start + Vec2::new(dx, -dy), 1000.0 + elapsed)
    }

    #[test]
    fn test_power_meter_clamps() {
        let t = LaunchTuning::default();
        let mut meter = PowerMeter::default();
        meter.charge(&t);
        assert_eq!(meter.power, 0.0); // not charging yet
        meter.start();
        for _ in 0..80 {
            meter.charge(&t);
        }
        assert_eq!(meter.power, 100.0);
        meter.reset();
        assert_eq!(meter.power, 0.0);
        assert!(!meter.charging);
    }

    #[test]
    fn test_flick_boundary() {
        let t = LaunchTuning::default();
        assert_eq!(
            validate_flick(&gesture(0.0, 20.0, 100.0), &t),
            Err(ThrowRejection::TooShort)
        );
        assert_eq!(validate_flick(&gesture(0.0, 21.0, 100.0), &t), Ok(()));
    }

    #[test]
    fn test_slow_flick_rejected() {
        let t = LaunchTuning::default();
        // 30px over 1000ms = 0.03 px/ms, not strictly above the gate
        assert_eq!(
            validate_flick(&gesture(0.0, 30.0, 1000.0), &t),
            Err(ThrowRejection::TooSlow)
        );
    }

    #[test]
    fn test_downward_flick_rejected() {
        let t = LaunchTuning::default();
        assert_eq!(
            validate_flick(&gesture(0.0, -80.0, 50.0), &t),
            Err(ThrowRejection::TooShort)
        );
    }

    #[test]
    fn test_zero_elapsed_uses_one_ms() {
        let g = gesture(0.0, 30.0, 0.0);
        assert_eq!(g.flick_speed(), 30.0);
    }

    #[test]
    fn test_straight_flick_velocity() {
        let t = LaunchTuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        // 50px up over 500ms = 0.1 px/ms, below the over-flick threshold
        let launch = compute_launch(&gesture(0.0, 50.0, 500.0), 100.0, 1, &calm(), &t, &mut rng)
            .unwrap();
        assert!(!launch.over_flick);
        // (180 + ~0) * 0.9
        assert!((launch.velocity.x - 162.0).abs() < 0.01);
        // -(420 + 16 + 160) * 0.9
        assert!((launch.velocity.y + 536.4).abs() < 0.01);
        // spin in [150, 300] * 0.6
        assert!(launch.angular_velocity >= 90.0 && launch.angular_velocity <= 180.0);
    }

    #[test]
    fn test_over_flick_penalty() {
        let t = LaunchTuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        // 100px up over 200ms = 0.5 px/ms
        let launch = compute_launch(&gesture(0.0, 100.0, 200.0), 100.0, 1, &calm(), &t, &mut rng)
            .unwrap();
        assert!(launch.over_flick);
        // -(420 + 80 + 160) * 0.9 * (1.5 + 0.25 * 3)
        assert!((launch.velocity.y + 1336.5).abs() < 0.05);
        // spin in [150, 300] * 1.0 * 3.0
        assert!(launch.angular_velocity >= 450.0 && launch.angular_velocity <= 900.0);
    }

    #[test]
    fn test_wind_pushes_sideways() {
        let t = LaunchTuning::default();
        let g = gesture(0.0, 50.0, 500.0);
        let left = WindState {
            speed: 4.0,
            direction: WindDirection::Left,
            intensity: 0.5,
        };
        let mut rng = Pcg32::seed_from_u64(3);
        let calm_launch = compute_launch(&g, 50.0, 1, &calm(), &t, &mut rng).unwrap();
        let windy = compute_launch(&g, 50.0, 1, &left, &t, &mut rng).unwrap();
        assert!((calm_launch.velocity.x - windy.velocity.x - 28.0).abs() < 0.01);
        assert_eq!(calm_launch.velocity.y, windy.velocity.y);
    }

    #[test]
    fn test_level_multiplier() {
        let t = LaunchTuning::default();
        assert!((level_multiplier(1, &t) - 0.9).abs() < 1e-6);
        assert!((level_multiplier(3, &t) - 1.0).abs() < 1e-6);
    }
}
