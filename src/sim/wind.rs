//! Wind field generator
//!
//! Intensity follows a slow sinusoid anchored to elapsed time, with a range
//! and period that tighten as the level grows. Direction flips at random,
//! more often on later levels.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::WIND_TICK_MS;
use crate::tuning::WindTuning;

/// Which way the wind blows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindDirection {
    Left,
    Right,
}

impl WindDirection {
    /// -1 for left, +1 for right
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            WindDirection::Left => -1.0,
            WindDirection::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            WindDirection::Left => WindDirection::Right,
            WindDirection::Right => WindDirection::Left,
        }
    }
}

/// Current wind vector as seen by the launch model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindState {
    /// Display units, never negative
    pub speed: f32,
    pub direction: WindDirection,
    /// Always within [0, 1]
    pub intensity: f32,
}

impl WindState {
    /// Signed horizontal wind (speed × direction)
    #[inline]
    pub fn signed_speed(&self) -> f32 {
        self.speed * self.direction.sign()
    }
}

/// Lower and upper intensity for a level
pub fn intensity_range(level: u32, tuning: &WindTuning) -> (f32, f32) {
    let level_difficulty = level.saturating_sub(1) as f32 * tuning.difficulty_per_level;
    let min = (tuning.min_intensity_base + level_difficulty).min(tuning.min_intensity_cap);
    let max = (tuning.max_intensity_base + level_difficulty).min(tuning.max_intensity_cap);
    (min, max)
}

/// Oscillation divisor (ms); shrinks with level down to the floor
pub fn oscillation_speed(level: u32, tuning: &WindTuning) -> f32 {
    (tuning.oscillation_base_ms - level as f32 * tuning.oscillation_step_ms)
        .max(tuning.oscillation_floor_ms)
}

/// Intensity at a point in time
pub fn intensity_at(time_ms: f64, level: u32, tuning: &WindTuning) -> f32 {
    let (min, max) = intensity_range(level, tuning);
    let range = (max - min) / 2.0;
    let center = min + range;
    let phase = (time_ms / oscillation_speed(level, tuning) as f64) as f32;
    (center + phase.sin() * range).clamp(0.0, 1.0)
}

/// Wind speed for an intensity. Monotonic in both intensity and level.
pub fn speed_for(intensity: f32, level: u32) -> f32 {
    let level = level as f32;
    (0.5 + level * 1.5).max(1.0) + intensity * (4.0 + level * 2.0)
}

/// Probability the direction is kept on a recompute
pub fn direction_chance(level: u32, tuning: &WindTuning) -> f32 {
    (tuning.direction_chance_base - level.saturating_sub(1) as f32 * tuning.direction_chance_step)
        .max(tuning.direction_chance_floor)
}

/// Time-driven wind generator
#[derive(Debug, Clone)]
pub struct WindField {
    pub state: WindState,
    /// Monotonic clock (ms)
    pub time_ms: f64,
    accumulator_ms: f32,
    tuning: WindTuning,
}

impl WindField {
    pub fn new(level: u32, direction: WindDirection, tuning: WindTuning) -> Self {
        let intensity = intensity_at(0.0, level, &tuning);
        Self {
            state: WindState {
                speed: speed_for(intensity, level),
                direction,
                intensity,
            },
            time_ms: 0.0,
            accumulator_ms: 0.0,
            tuning,
        }
    }

    /// Advance the clock; recomputes on every elapsed wind period.
    /// Returns the new direction if a gust flipped it.
    pub fn advance<R: Rng>(&mut self, dt_ms: f32, level: u32, rng: &mut R) -> Option<WindDirection> {
        self.time_ms += dt_ms as f64;
        self.accumulator_ms += dt_ms;

        let mut gust = None;
        while self.accumulator_ms >= WIND_TICK_MS {
            self.accumulator_ms -= WIND_TICK_MS;
            if let Some(dir) = self.recompute(level, rng) {
                gust = Some(dir);
            }
        }
        gust
    }

    /// One fixed wind tick
    pub fn recompute<R: Rng>(&mut self, level: u32, rng: &mut R) -> Option<WindDirection> {
        let intensity = intensity_at(self.time_ms, level, &self.tuning);
        self.state.intensity = intensity;
        self.state.speed = speed_for(intensity, level);

        let roll: f32 = rng.random();
        if roll > direction_chance(level, &self.tuning) {
            self.state.direction = self.state.direction.flipped();
            log::debug!(
                "Wind gust: now blowing {:?} at {:.1}",
                self.state.direction,
                self.state.speed
            );
            return Some(self.state.direction);
        }
        None
    }

    /// Milestone feedback from progression: re-roll direction and
    /// recompute immediately for the new level.
    pub fn on_level_up<R: Rng>(&mut self, level: u32, rng: &mut R) -> WindDirection {
        self.state.direction = if rng.random_bool(0.5) {
            WindDirection::Right
        } else {
            WindDirection::Left
        };
        let intensity = intensity_at(self.time_ms, level, &self.tuning);
        self.state.intensity = intensity;
        self.state.speed = speed_for(intensity, level);
        log::info!(
            "Wind picks up for level {}: {:?} {:.1}",
            level,
            self.state.direction,
            self.state.speed
        );
        self.state.direction
    }
}
