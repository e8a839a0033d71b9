//! Game session aggregate and core simulation types
//!
//! One `GameSession` holds everything a run needs. Components operate on it
//! explicitly; presentation reads it and drains the event list.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::achievements::{self, Achievement};
use super::flight::{
    FlightOutcome, FlightResolver, ItemKind, Landing, LaundryItem, Physics, SplashCause,
};
use super::launch::{LaunchGesture, PowerMeter, ThrowRejection, compute_launch};
use super::progress::{CatchRating, GameProgressState, GameSummary};
use super::timers::Scheduler;
use super::wind::{WindDirection, WindField};
use crate::consts::LINE_PEG_Y;
use crate::persistence::Profile;
use crate::tuning::Tuning;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// First-run overlay; throws are ignored until dismissed
    Tutorial,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Run ended
    GameOver,
}

/// Cosmetic notifications for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Release did not count as a throw ("flick harder")
    ThrowRejected(ThrowRejection),
    Thrown {
        item_id: u32,
        kind: ItemKind,
        over_flick: bool,
    },
    Caught {
        item_id: u32,
        x: f32,
        rating: CatchRating,
        stars: u32,
        points: u64,
        multiplier: u32,
    },
    /// Streak of 3 or more is running
    Combo(u32),
    /// Big streak milestone (camera flash)
    ComboCelebration(u32),
    ComboBroken(u32),
    Splashed {
        item_id: u32,
        x: f32,
        cause: SplashCause,
        strikes_left: u32,
    },
    /// Line filled; the listed items are taken down
    LevelUp { level: u32, cleared: Vec<u32> },
    WindGust(WindDirection),
    NewHighScore(u64),
    /// Fired staggered, after the unlock itself
    AchievementUnlocked(Achievement),
    /// Score popup for this item can go
    PopupCleared(u32),
    TutorialDismissed,
    /// Fired once, shortly after the final splash
    GameOver(GameSummary),
}

/// Delayed work queued on the session's scheduler
#[derive(Debug, Clone, PartialEq)]
pub enum Deferred {
    ClearPopup(u32),
    Announce(Achievement),
    GameOverHandoff(GameSummary),
}

/// An item pegged on the line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HungItem {
    pub id: u32,
    pub kind: ItemKind,
    pub x: f32,
    /// Pegged height, the same for every item
    pub y: f32,
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct GameSession {
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub wind: WindField,
    pub power: PowerMeter,
    /// Gesture in progress (pointer down)
    pub gesture: Option<LaunchGesture>,
    pub flight: FlightResolver,
    pub progress: GameProgressState,
    /// Items hanging on the line this level
    pub line: Vec<HungItem>,
    pub profile: Profile,
    /// High score when the run started
    pub previous_best: u64,
    pub timers: Scheduler<Deferred>,
    /// Simulation tick counter
    pub time_ticks: u64,
    events: Vec<GameEvent>,
    next_id: u32,
}

impl GameSession {
    /// Start a run with the given seed, balance and loaded profile
    pub fn new(seed: u64, tuning: Tuning, profile: Profile) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let direction = if rng.random_bool(0.5) {
            WindDirection::Right
        } else {
            WindDirection::Left
        };
        let progress = GameProgressState::new(&tuning.scoring);
        let phase = if profile.tutorial_seen {
            GamePhase::Playing
        } else {
            GamePhase::Tutorial
        };

        log::info!("New session: seed {}, starting in {:?}", seed, phase);

        Self {
            seed,
            rng,
            wind: WindField::new(progress.level, direction, tuning.wind.clone()),
            power: PowerMeter::default(),
            gesture: None,
            flight: FlightResolver::new(tuning.flight.clone()),
            previous_best: profile.high_score,
            profile,
            progress,
            line: Vec::new(),
            timers: Scheduler::new(),
            time_ticks: 0,
            events: Vec::new(),
            next_id: 1,
            phase,
            tuning,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all pending notifications
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn summary(&self) -> GameSummary {
        self.progress.summary(self.previous_best)
    }

    pub fn dismiss_tutorial(&mut self) {
        if self.phase == GamePhase::Tutorial {
            self.profile.mark_tutorial_seen();
            self.phase = GamePhase::Playing;
            self.push_event(GameEvent::TutorialDismissed);
        }
    }

    /// Pointer down: start charging unless an item is already airborne
    pub fn press(&mut self, position: Vec2, time_ms: f64) {
        if self.phase != GamePhase::Playing || self.flight.is_airborne() {
            self.power.reset();
            return;
        }
        self.gesture = Some(LaunchGesture::begin(position, time_ms));
        self.power.start();
    }

    pub fn pointer_move(&mut self, position: Vec2) {
        if let Some(gesture) = self.gesture.as_mut() {
            gesture.track(position);
        }
    }

    /// Pointer up: turn the gesture into a throw, or reject it
    pub fn release(&mut self, position: Vec2, time_ms: f64) {
        let Some(gesture) = self.gesture.take() else {
            return;
        };
        let power = self.power.power;
        self.power.reset();

        if self.phase != GamePhase::Playing || self.flight.is_airborne() {
            return;
        }

        let gesture = gesture.finish(position, time_ms);
        let launch = match compute_launch(
            &gesture,
            power,
            self.progress.level,
            &self.wind.state,
            &self.tuning.launch,
            &mut self.rng,
        ) {
            Ok(launch) => launch,
            Err(reason) => {
                log::debug!("Throw rejected: {:?}", reason);
                self.push_event(GameEvent::ThrowRejected(reason));
                return;
            }
        };

        let id = self.next_entity_id();
        let kind = ItemKind::ALL[self.rng.random_range(0..ItemKind::ALL.len())];
        let item = LaundryItem::new(id, kind, launch.velocity, launch.angular_velocity);
        if self.flight.launch(item).is_err() {
            return;
        }

        self.progress.record_throw();
        log::info!(
            "Throw #{}: power {:.0}, velocity ({:.0}, {:.0}){}",
            self.progress.total_throws,
            power,
            launch.velocity.x,
            launch.velocity.y,
            if launch.over_flick { ", over-flicked!" } else { "" }
        );
        self.push_event(GameEvent::Thrown {
            item_id: id,
            kind,
            over_flick: launch.over_flick,
        });
    }

    /// Step the wind clock; gusts become events
    pub fn advance_wind(&mut self, dt_ms: f32) {
        if let Some(direction) = self.wind.advance(dt_ms, self.progress.level, &mut self.rng) {
            self.push_event(GameEvent::WindGust(direction));
        }
    }

    /// Step the airborne item and resolve it if it landed
    pub fn advance_flight<P: Physics + ?Sized>(&mut self, physics: &P, dt: f32) {
        if let Some(outcome) = self.flight.step(physics, dt) {
            self.resolve(outcome);
        }
    }

    /// Apply a terminal flight event to progression and fan out its effects
    pub fn resolve(&mut self, outcome: FlightOutcome) {
        let FlightOutcome { item, landing } = outcome;
        match landing {
            Landing::Caught => self.on_caught(&item),
            Landing::Splashed(cause) => self.on_splashed(&item, cause),
        }
    }

    fn on_caught(&mut self, item: &LaundryItem) {
        let Some(report) = self
            .progress
            .apply_catch(item.id, item.position.x, &self.tuning.scoring)
        else {
            return;
        };

        self.line.push(HungItem {
            id: item.id,
            kind: item.kind,
            x: item.position.x,
            y: LINE_PEG_Y,
        });
        self.push_event(GameEvent::Caught {
            item_id: item.id,
            x: item.position.x,
            rating: report.rating,
            stars: report.stars,
            points: report.points,
            multiplier: report.multiplier,
        });
        self.timers.schedule(
            Some(item.id),
            self.tuning.timing.popup_clear_ms,
            Deferred::ClearPopup(item.id),
        );

        if report.combo >= self.tuning.scoring.combo_announce {
            self.push_event(GameEvent::Combo(report.combo));
        }
        if self.tuning.scoring.combo_celebrations.contains(&report.combo) {
            self.push_event(GameEvent::ComboCelebration(report.combo));
        }

        if let Some(level) = report.level_up {
            let cleared: Vec<u32> = self.line.drain(..).map(|h| h.id).collect();
            for id in &cleared {
                self.timers.cancel_entity(*id);
            }
            let direction = self.wind.on_level_up(level, &mut self.rng);
            self.push_event(GameEvent::LevelUp { level, cleared });
            self.push_event(GameEvent::WindGust(direction));
        }

        if self.profile.record_score(self.progress.score) {
            self.push_event(GameEvent::NewHighScore(self.progress.score));
        }

        let unlocked = achievements::evaluate(
            &self.progress.achievement_stats(),
            &self.profile.achievements,
        );
        for (i, achievement) in unlocked.into_iter().enumerate() {
            if self.profile.unlock(achievement) {
                log::info!("Achievement unlocked: {}", achievement.title());
                self.timers.schedule(
                    None,
                    i as f32 * self.tuning.timing.achievement_stagger_ms,
                    Deferred::Announce(achievement),
                );
            }
        }
    }

    fn on_splashed(&mut self, item: &LaundryItem, cause: SplashCause) {
        let Some(report) = self.progress.apply_splash(item.id, &self.tuning.scoring) else {
            return;
        };

        if let Some(combo) = report.combo_broken {
            self.push_event(GameEvent::ComboBroken(combo));
        }
        self.push_event(GameEvent::Splashed {
            item_id: item.id,
            x: item.position.x,
            cause,
            strikes_left: report.strikes_left,
        });

        if report.game_over {
            self.phase = GamePhase::GameOver;
            self.gesture = None;
            self.power.reset();
            let summary = self.summary();
            self.timers.schedule(
                None,
                self.tuning.timing.game_over_delay_ms,
                Deferred::GameOverHandoff(summary),
            );
        }
    }

    /// Turn due timers into events
    pub fn fire_deferred(&mut self, dt_ms: f32) {
        for task in self.timers.advance(dt_ms) {
            let event = match task {
                Deferred::ClearPopup(id) => GameEvent::PopupCleared(id),
                Deferred::Announce(achievement) => GameEvent::AchievementUnlocked(achievement),
                Deferred::GameOverHandoff(summary) => GameEvent::GameOver(summary),
            };
            self.events.push(event);
        }
    }
}
