//! Data-driven game balance
//!
//! Every gameplay number lives here so it can be overridden from JSON
//! without touching the simulation. Missing fields keep their defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::zone::Zone;

/// Failure to read a tuning override
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("invalid tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value: {0}")]
    Invalid(&'static str),
}

/// Wind field balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindTuning {
    /// Difficulty added per level above 1
    pub difficulty_per_level: f32,
    pub min_intensity_base: f32,
    pub min_intensity_cap: f32,
    pub max_intensity_base: f32,
    pub max_intensity_cap: f32,
    /// Oscillation period divisor at level 0 (ms)
    pub oscillation_base_ms: f32,
    /// Divisor shrink per level (ms)
    pub oscillation_step_ms: f32,
    /// Divisor never drops below this (ms)
    pub oscillation_floor_ms: f32,
    /// Chance the direction is kept on a recompute, at level 1
    pub direction_chance_base: f32,
    pub direction_chance_step: f32,
    pub direction_chance_floor: f32,
}

impl Default for WindTuning {
    fn default() -> Self {
        Self {
            difficulty_per_level: 0.15,
            min_intensity_base: 0.1,
            min_intensity_cap: 0.6,
            max_intensity_base: 0.5,
            max_intensity_cap: 0.95,
            oscillation_base_ms: 3500.0,
            oscillation_step_ms: 200.0,
            oscillation_floor_ms: 1000.0,
            direction_chance_base: 0.99,
            direction_chance_step: 0.005,
            direction_chance_floor: 0.95,
        }
    }
}

/// Gesture and launch balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchTuning {
    /// Power gained per tick while holding
    pub power_per_tick: f32,
    pub max_power: f32,
    /// Minimum upward flick distance (px), strict
    pub min_flick_distance: f32,
    /// Minimum flick speed (px/ms), strict
    pub min_flick_speed: f32,
    pub power_x: f32,
    pub power_y: f32,
    pub flick_gain: f32,
    pub base_lift: f32,
    pub level_multiplier_base: f32,
    pub level_multiplier_step: f32,
    pub wind_gain: f32,
    /// Flick speed above which the throw goes comically wild
    pub over_flick_speed: f32,
    /// Base spin range (deg/s)
    pub spin_min: f32,
    pub spin_max: f32,
}

impl Default for LaunchTuning {
    fn default() -> Self {
        Self {
            power_per_tick: 2.0,
            max_power: 100.0,
            min_flick_distance: 20.0,
            min_flick_speed: 0.03,
            power_x: 180.0,
            power_y: 420.0,
            flick_gain: 160.0,
            base_lift: 160.0,
            level_multiplier_base: 0.85,
            level_multiplier_step: 0.05,
            wind_gain: 7.0,
            over_flick_speed: 0.25,
            spin_min: 150.0,
            spin_max: 300.0,
        }
    }
}

/// Flight, zones and the physics collaborator defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightTuning {
    /// Gravity (px/s², positive is down)
    pub gravity: f32,
    /// Linear drag per axis (px/s²)
    pub drag_x: f32,
    pub drag_y: f32,
    /// Catch is only tested while 0 < vy < this
    pub catch_speed: f32,
    pub line_zone: Zone,
    pub pool_zone: Zone,
    /// Visible bounds; leaving them counts as a splash
    pub bounds_bottom: f32,
    pub bounds_left: f32,
    pub bounds_right: f32,
}

impl Default for FlightTuning {
    fn default() -> Self {
        Self {
            gravity: 600.0,
            drag_x: 10.0,
            drag_y: 5.0,
            catch_speed: 50.0,
            line_zone: Zone::centered(180.0, 280.0, 240.0, 50.0),
            pool_zone: Zone::centered(180.0, 640.0, 320.0, 120.0),
            bounds_bottom: 750.0,
            bounds_left: -50.0,
            bounds_right: 410.0,
        }
    }
}

/// Scoring and progression balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTuning {
    pub line_center_x: f32,
    /// Distance from centre below which a catch is perfect (strict)
    pub perfect_distance: f32,
    /// Distance from centre below which a catch is good (strict)
    pub good_distance: f32,
    /// Combo hangs per extra multiplier step
    pub combo_step: u32,
    /// Combo at which a broken streak is announced
    pub combo_announce: u32,
    /// Combo values that trigger the big celebration cue
    pub combo_celebrations: Vec<u32>,
    pub max_items_per_level: u32,
    pub starting_strikes: u32,
}

impl Default for ScoringTuning {
    fn default() -> Self {
        Self {
            line_center_x: 180.0,
            perfect_distance: 40.0,
            good_distance: 80.0,
            combo_step: 3,
            combo_announce: 3,
            combo_celebrations: vec![5, 10],
            max_items_per_level: 5,
            starting_strikes: 5,
        }
    }
}

/// Delays for presentation hand-offs (ms)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingTuning {
    pub popup_clear_ms: f32,
    pub achievement_stagger_ms: f32,
    pub game_over_delay_ms: f32,
}

impl Default for TimingTuning {
    fn default() -> Self {
        Self {
            popup_clear_ms: 800.0,
            achievement_stagger_ms: 2000.0,
            game_over_delay_ms: 1000.0,
        }
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub wind: WindTuning,
    pub launch: LaunchTuning,
    pub flight: FlightTuning,
    pub scoring: ScoringTuning,
    pub timing: TimingTuning,
}

impl Tuning {
    /// Parse a (possibly partial) JSON override on top of the defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values that would break simulation invariants
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.scoring.combo_step == 0 {
            return Err(TuningError::Invalid("scoring.combo_step must be positive"));
        }
        if self.scoring.max_items_per_level == 0 {
            return Err(TuningError::Invalid(
                "scoring.max_items_per_level must be positive",
            ));
        }
        if self.scoring.starting_strikes == 0 {
            return Err(TuningError::Invalid("scoring.starting_strikes must be positive"));
        }
        if self.wind.oscillation_floor_ms <= 0.0 {
            return Err(TuningError::Invalid("wind.oscillation_floor_ms must be positive"));
        }
        if self.launch.max_power <= 0.0 {
            return Err(TuningError::Invalid("launch.max_power must be positive"));
        }
        if self.launch.spin_max < self.launch.spin_min {
            return Err(TuningError::Invalid("launch.spin_max is below spin_min"));
        }
        // Without downward pull an item can hover above the screen forever
        if self.flight.gravity <= 0.0 {
            return Err(TuningError::Invalid("flight.gravity must be positive"));
        }
        if self.flight.catch_speed <= 0.0 {
            return Err(TuningError::Invalid("flight.catch_speed must be positive"));
        }
        for zone in [&self.flight.line_zone, &self.flight.pool_zone] {
            if zone.width <= 0.0 || zone.height <= 0.0 {
                return Err(TuningError::Invalid("flight zones need a positive size"));
            }
        }
        Ok(())
    }
}
