//! Outcome and progression state machine
//!
//! Turns terminal flight events into score, combo, stars, levels and
//! strikes. Everything here is deterministic; cosmetic reactions are
//! reported back to the caller rather than triggered directly.

use serde::{Deserialize, Serialize};

use super::achievements::AchievementStats;
use crate::tuning::ScoringTuning;

/// How close to the centre of the line a catch landed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatchRating {
    Perfect,
    Good,
    Ok,
}

impl CatchRating {
    /// Classify by horizontal distance from the line centre (strict bounds)
    pub fn from_distance(distance: f32, tuning: &ScoringTuning) -> Self {
        if distance < tuning.perfect_distance {
            CatchRating::Perfect
        } else if distance < tuning.good_distance {
            CatchRating::Good
        } else {
            CatchRating::Ok
        }
    }

    pub fn stars(&self) -> u32 {
        match self {
            CatchRating::Perfect => 3,
            CatchRating::Good => 2,
            CatchRating::Ok => 1,
        }
    }
}

/// Combo multiplier: one extra step per `combo_step` consecutive hangs
#[inline]
pub fn multiplier_for(combo: u32, combo_step: u32) -> u32 {
    1 + combo / combo_step.max(1)
}

/// What a catch changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatchReport {
    pub rating: CatchRating,
    pub stars: u32,
    pub points: u64,
    pub combo: u32,
    pub multiplier: u32,
    /// New level, if this catch filled the line
    pub level_up: Option<u32>,
}

/// What a splash changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplashReport {
    /// Streak length lost, if it was long enough to announce
    pub combo_broken: Option<u32>,
    pub strikes_left: u32,
    pub game_over: bool,
}

/// End-of-run summary handed to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub score: u64,
    pub max_combo: u32,
    pub perfect_throws: u32,
    pub total_throws: u32,
    pub successful_hangs: u32,
    pub high_score: u64,
    pub new_high_score: bool,
}

/// Per-session progression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameProgressState {
    pub score: u64,
    /// Lives remaining
    pub strikes: u32,
    /// Consecutive successful hangs
    pub combo: u32,
    pub max_combo: u32,
    pub multiplier: u32,
    /// Starts at 1
    pub level: u32,
    /// Hangs since the last level-up
    pub items_on_line: u32,
    /// Cumulative stars
    pub stars: u32,
    pub successful_hangs: u32,
    pub perfect_throws: u32,
    pub total_throws: u32,
    pub game_over: bool,
    /// Id of the newest item already resolved
    last_resolved: Option<u32>,
}

impl GameProgressState {
    pub fn new(tuning: &ScoringTuning) -> Self {
        Self {
            score: 0,
            strikes: tuning.starting_strikes,
            combo: 0,
            max_combo: 0,
            multiplier: 1,
            level: 1,
            items_on_line: 0,
            stars: 0,
            successful_hangs: 0,
            perfect_throws: 0,
            total_throws: 0,
            game_over: false,
            last_resolved: None,
        }
    }

    /// Count a valid throw
    pub fn record_throw(&mut self) {
        self.total_throws += 1;
    }

    /// True if this item was already resolved (or the run is over)
    pub fn is_stale(&self, item_id: u32) -> bool {
        self.game_over || self.last_resolved.is_some_and(|last| item_id <= last)
    }

    fn mark_resolved(&mut self, item_id: u32) {
        self.last_resolved = Some(item_id);
    }

    /// Apply a catch at horizontal position `x`. Stale items are ignored.
    pub fn apply_catch(&mut self, item_id: u32, x: f32, tuning: &ScoringTuning) -> Option<CatchReport> {
        if self.is_stale(item_id) {
            log::debug!("Ignoring catch for already-resolved item {}", item_id);
            return None;
        }
        self.mark_resolved(item_id);

        let distance = (x - tuning.line_center_x).abs();
        let rating = CatchRating::from_distance(distance, tuning);
        let stars = rating.stars();
        if rating == CatchRating::Perfect {
            self.perfect_throws += 1;
        }

        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
        self.multiplier = multiplier_for(self.combo, tuning.combo_step);

        let base = if rating == CatchRating::Perfect { 2 } else { 1 };
        let points = self.multiplier as u64 * base;
        self.score += points;
        self.stars += stars;
        self.successful_hangs += 1;
        self.items_on_line += 1;

        let level_up = if self.items_on_line >= tuning.max_items_per_level {
            self.level += 1;
            self.items_on_line = 0;
            log::info!("Level up! Now on level {}", self.level);
            Some(self.level)
        } else {
            None
        };

        Some(CatchReport {
            rating,
            stars,
            points,
            combo: self.combo,
            multiplier: self.multiplier,
            level_up,
        })
    }

    /// Apply a splash. Stale items are ignored.
    pub fn apply_splash(&mut self, item_id: u32, tuning: &ScoringTuning) -> Option<SplashReport> {
        if self.is_stale(item_id) {
            log::debug!("Ignoring splash for already-resolved item {}", item_id);
            return None;
        }
        self.mark_resolved(item_id);

        let combo_broken = (self.combo >= tuning.combo_announce).then_some(self.combo);
        self.combo = 0;
        self.multiplier = 1;

        self.strikes = self.strikes.saturating_sub(1);
        if self.strikes == 0 {
            self.game_over = true;
            log::info!(
                "Game over: score {}, max combo {}, {} / {} hung",
                self.score,
                self.max_combo,
                self.successful_hangs,
                self.total_throws
            );
        }

        Some(SplashReport {
            combo_broken,
            strikes_left: self.strikes,
            game_over: self.game_over,
        })
    }

    pub fn achievement_stats(&self) -> AchievementStats {
        AchievementStats {
            successful_hangs: self.successful_hangs,
            combo: self.combo,
            perfect_throws: self.perfect_throws,
            score: self.score,
        }
    }

    /// `previous_best` is the high score as it stood when the run began
    pub fn summary(&self, previous_best: u64) -> GameSummary {
        GameSummary {
            score: self.score,
            max_combo: self.max_combo,
            perfect_throws: self.perfect_throws,
            total_throws: self.total_throws,
            successful_hangs: self.successful_hangs,
            high_score: previous_best.max(self.score),
            new_high_score: self.score > previous_best,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fresh() -> (GameProgressState, ScoringTuning) {
        let tuning = ScoringTuning::default();
        (GameProgressState::new(&tuning), tuning)
    }

    #[test]
    fn test_star_assignment() {
        let t = ScoringTuning::default();
        assert_eq!(CatchRating::from_distance(10.0, &t).stars(), 3);
        assert_eq!(CatchRating::from_distance(50.0, &t).stars(), 2);
        assert_eq!(CatchRating::from_distance(100.0, &t).stars(), 1);
        // Strict boundaries
        assert_eq!(CatchRating::from_distance(40.0, &t), CatchRating::Good);
        assert_eq!(CatchRating::from_distance(80.0, &t), CatchRating::Ok);
    }

    #[test]
    fn test_perfect_catch_scores_double() {
        let (mut p, t) = fresh();
        let report = p.apply_catch(1, 180.0, &t).unwrap();
        assert_eq!(report.rating, CatchRating::Perfect);
        assert_eq!(report.points, 2);
        assert_eq!(p.score, 2);
        assert_eq!(p.stars, 3);
        assert_eq!(p.perfect_throws, 1);
        assert_eq!(p.successful_hangs, 1);
    }

    #[test]
    fn test_multiplier_kicks_in_at_three() {
        let (mut p, t) = fresh();
        p.apply_catch(1, 300.0, &t);
        p.apply_catch(2, 300.0, &t);
        let third = p.apply_catch(3, 300.0, &t).unwrap();
        assert_eq!(third.multiplier, 2);
        assert_eq!(third.points, 2);
        assert_eq!(p.score, 4);
    }

    #[test]
    fn test_level_up_after_five() {
        let (mut p, t) = fresh();
        for id in 1..=4 {
            assert_eq!(p.apply_catch(id, 180.0, &t).unwrap().level_up, None);
        }
        assert_eq!(p.items_on_line, 4);
        let fifth = p.apply_catch(5, 180.0, &t).unwrap();
        assert_eq!(fifth.level_up, Some(2));
        assert_eq!(p.level, 2);
        assert_eq!(p.items_on_line, 0);
    }

    #[test]
    fn test_splash_breaks_combo() {
        let (mut p, t) = fresh();
        for id in 1..=4 {
            p.apply_catch(id, 180.0, &t);
        }
        let report = p.apply_splash(5, &t).unwrap();
        assert_eq!(report.combo_broken, Some(4));
        assert_eq!(p.combo, 0);
        assert_eq!(p.multiplier, 1);
        assert_eq!(p.max_combo, 4);
        assert_eq!(report.strikes_left, 4);

        // Short streaks break silently
        p.apply_catch(6, 180.0, &t);
        assert_eq!(p.apply_splash(7, &t).unwrap().combo_broken, None);
    }

    #[test]
    fn test_game_over_after_five_splashes() {
        let (mut p, t) = fresh();
        assert_eq!(p.strikes, 5);
        let mut game_overs = 0;
        for id in 1..=5 {
            if p.apply_splash(id, &t).unwrap().game_over {
                game_overs += 1;
            }
        }
        assert_eq!(game_overs, 1);
        assert!(p.game_over);
        // Nothing more is accepted
        assert!(p.apply_splash(6, &t).is_none());
        assert!(p.apply_catch(7, 180.0, &t).is_none());
    }

    #[test]
    fn test_double_resolution_is_noop() {
        let (mut p, t) = fresh();
        assert!(p.apply_catch(3, 180.0, &t).is_some());
        assert!(p.apply_catch(3, 180.0, &t).is_none());
        assert!(p.apply_splash(3, &t).is_none());
        assert!(p.apply_splash(2, &t).is_none());
        assert_eq!(p.score, 2);
        assert_eq!(p.strikes, 5);
    }

    #[test]
    fn test_summary() {
        let (mut p, t) = fresh();
        p.record_throw();
        p.record_throw();
        p.apply_catch(1, 180.0, &t);
        p.apply_splash(2, &t);
        let s = p.summary(10);
        assert_eq!(s.score, 2);
        assert_eq!(s.total_throws, 2);
        assert_eq!(s.successful_hangs, 1);
        assert_eq!(s.high_score, 10);
        assert!(!s.new_high_score);
    }

    proptest! {
        #[test]
        fn prop_multiplier_formula(combo in 0u32..10_000) {
            prop_assert_eq!(multiplier_for(combo, 3), 1 + combo / 3);
        }

        #[test]
        fn prop_combo_monotonicity(outcomes in proptest::collection::vec((any::<bool>(), 0.0f32..360.0), 0..60)) {
            let tuning = ScoringTuning {
                starting_strikes: 1000,
                ..Default::default()
            };
            let mut p = GameProgressState::new(&tuning);
            let mut last_max = 0;
            for (id, (caught, x)) in outcomes.into_iter().enumerate() {
                let id = id as u32 + 1;
                if caught {
                    p.apply_catch(id, x, &tuning);
                } else {
                    p.apply_splash(id, &tuning);
                }
                prop_assert!(p.max_combo >= last_max);
                prop_assert!(p.max_combo >= p.combo);
                prop_assert_eq!(p.multiplier, 1 + p.combo / 3);
                prop_assert!(p.items_on_line < tuning.max_items_per_level);
                last_max = p.max_combo;
            }
        }
    }
}
