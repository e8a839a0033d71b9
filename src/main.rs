//! Laundry Fling entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

use laundry_fling::consts::{MAX_SUBSTEPS, SIM_DT};
use laundry_fling::sim::{ArcadePhysics, GameEvent, GameSession, TickInput, tick};
use laundry_fling::{KeyValueStore, Profile, Tuning};

/// Game instance holding the session and its host-side plumbing
struct Game<S: KeyValueStore> {
    session: GameSession,
    physics: ArcadePhysics,
    store: S,
    accumulator: f32,
    input: TickInput,
}

impl<S: KeyValueStore> Game<S> {
    fn new(seed: u64, tuning: Tuning, store: S) -> Self {
        let profile = Profile::load(&store);
        let physics = ArcadePhysics::from_tuning(&tuning.flight);
        Self {
            session: GameSession::new(seed, tuning, profile),
            physics,
            store,
            accumulator: 0.0,
            input: TickInput::default(),
        }
    }

    /// Run simulation ticks for `dt` seconds of wall time
    fn update(&mut self, dt: f32) -> Vec<GameEvent> {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            // Queued input is consumed by the first substep only
            let input = std::mem::take(&mut self.input);
            tick(&mut self.session, &input, &self.physics, &mut self.store, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }

        self.session.drain_events()
    }

    /// Host clock for pointer timestamps, derived from the tick counter
    fn now_ms(&self) -> f64 {
        self.session.time_ticks as f64 * laundry_fling::dt_to_ms(SIM_DT) as f64
    }

    #[cfg(target_arch = "wasm32")]
    fn restart(&mut self, seed: u64) {
        let tuning = self.session.tuning.clone();
        let profile = self.session.profile.clone();
        self.session = GameSession::new(seed, tuning, profile);
        self.accumulator = 0.0;
        self.input = TickInput::default();
        log::info!("Started new game with seed: {}", seed);
    }
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::Caught {
            rating, points, multiplier, ..
        } => log::info!("{:?}! +{} (x{})", rating, points, multiplier),
        GameEvent::Splashed {
            cause, strikes_left, ..
        } => log::info!("Splash ({:?}), {} strikes left", cause, strikes_left),
        GameEvent::ComboBroken(combo) => log::info!("Combo of {} broken", combo),
        GameEvent::ComboCelebration(combo) => log::info!("{} in a row!", combo),
        GameEvent::LevelUp { level, cleared } => {
            log::info!("Level {} - {} items taken down", level, cleared.len())
        }
        GameEvent::WindGust(direction) => log::info!("Wind gust! Now blowing {:?}", direction),
        GameEvent::NewHighScore(score) => log::info!("New high score: {}", score),
        GameEvent::AchievementUnlocked(achievement) => {
            log::info!("{} - {}", achievement.title(), achievement.description())
        }
        GameEvent::ThrowRejected(reason) => log::debug!("Flick harder ({:?})", reason),
        other => log::debug!("{:?}", other),
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod autoplay {
    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use laundry_fling::consts::{SPAWN_X, SPAWN_Y};
    use laundry_fling::sim::{GamePhase, PointerEvent};
    use laundry_fling::KeyValueStore;

    use super::Game;

    /// Scripted player for the headless build: hold, then flick upward
    pub struct Bot {
        rng: Pcg32,
        hold_ticks: u32,
        held: u32,
        holding: bool,
        flick: Vec2,
    }

    impl Bot {
        pub fn new(seed: u64) -> Self {
            Self {
                rng: Pcg32::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15),
                hold_ticks: 0,
                held: 0,
                holding: false,
                flick: Vec2::ZERO,
            }
        }

        /// Queue pointer events for the next frame
        pub fn play<S: KeyValueStore>(&mut self, game: &mut Game<S>, ticks_per_frame: u32) {
            if game.session.phase != GamePhase::Playing {
                return;
            }
            let now = game.now_ms();
            let start = Vec2::new(SPAWN_X, SPAWN_Y + 20.0);

            if !self.holding {
                if game.session.flight.is_airborne() {
                    return;
                }
                self.hold_ticks = self.rng.random_range(25..=50);
                self.flick = Vec2::new(self.rng.random_range(-10.0..30.0), self.rng.random_range(30.0..90.0));
                self.held = 0;
                self.holding = true;
                game.input.pointer.push(PointerEvent::Press { pos: start, time_ms: now });
                return;
            }

            self.held += ticks_per_frame;
            if self.held >= self.hold_ticks {
                let release = Vec2::new(start.x + self.flick.x, start.y - self.flick.y);
                game.input.pointer.push(PointerEvent::Move { pos: release, time_ms: now });
                game.input.pointer.push(PointerEvent::Release { pos: release, time_ms: now });
                self.holding = false;
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use laundry_fling::MemoryStore;
    use laundry_fling::sim::GamePhase;

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or_else(rand::random);
    let tuning = match args.next() {
        Some(path) => std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| Tuning::from_json(&json).map_err(|e| e.to_string()))
            .unwrap_or_else(|e| {
                log::error!("Could not load tuning from {}: {}, using defaults", path, e);
                Tuning::default()
            }),
        None => Tuning::default(),
    };

    log::info!("Laundry Fling (native) starting with seed {}", seed);
    log::info!("Native mode runs a headless autoplay demo - build for wasm32 to play");

    let mut game = Game::new(seed, tuning, MemoryStore::new());
    game.input.dismiss_tutorial = true;
    let mut bot = autoplay::Bot::new(seed);

    // Two ticks per frame, ten minutes of game time at most
    const FRAME_DT: f32 = 2.0 * SIM_DT;
    let mut summary = None;
    for _ in 0..(30 * 600) {
        bot.play(&mut game, 2);
        for event in game.update(FRAME_DT) {
            log_event(&event);
            if let GameEvent::GameOver(s) = event {
                summary = Some(s);
            }
        }
        if summary.is_some() {
            break;
        }
    }

    let summary = summary.unwrap_or_else(|| game.session.summary());
    println!("\nSeed {} finished on level {}", seed, game.session.progress.level);
    println!(
        "Score {} (best {}{}), max combo {}, {} perfect, {}/{} hung",
        summary.score,
        summary.high_score,
        if summary.new_high_score { ", new!" } else { "" },
        summary.max_combo,
        summary.perfect_throws,
        summary.successful_hangs,
        summary.total_throws
    );
    if game.session.phase != GamePhase::GameOver {
        println!("Time ran out with {} strikes left", game.session.progress.strikes);
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use glam::Vec2;
    use wasm_bindgen::prelude::*;

    use laundry_fling::consts::{WORLD_HEIGHT, WORLD_WIDTH};
    use laundry_fling::persistence::LocalStore;
    use laundry_fling::sim::{GameEvent, GamePhase, PointerEvent};
    use laundry_fling::Tuning;

    use super::{Game, log_event};

    /// Game handle owned by the page script, which renders from `hud_json`
    #[wasm_bindgen]
    pub struct LaundryFling {
        game: Game<LocalStore>,
        last_time: f64,
        /// Canvas pixels to world units
        scale: Vec2,
        game_over_json: Option<String>,
    }

    impl LaundryFling {
        fn to_world(&self, x: f32, y: f32) -> Vec2 {
            Vec2::new(x, y) * self.scale
        }
    }

    #[wasm_bindgen]
    impl LaundryFling {
        /// `tuning_json` overrides the default balance; invalid input is logged and ignored
        #[wasm_bindgen(constructor)]
        pub fn new(seed: f64, tuning_json: Option<String>) -> LaundryFling {
            let tuning = tuning_json
                .map(|json| {
                    Tuning::from_json(&json).unwrap_or_else(|e| {
                        log::error!("Bad tuning: {}, using defaults", e);
                        Tuning::default()
                    })
                })
                .unwrap_or_default();
            let seed = seed as u64;
            log::info!("Started new game with seed: {}", seed);
            LaundryFling {
                game: Game::new(seed, tuning, LocalStore::new()),
                last_time: 0.0,
                scale: Vec2::ONE,
                game_over_json: None,
            }
        }

        pub fn resize(&mut self, canvas_width: f32, canvas_height: f32) {
            self.scale = Vec2::new(
                WORLD_WIDTH / canvas_width.max(1.0),
                WORLD_HEIGHT / canvas_height.max(1.0),
            );
        }

        pub fn pointer_down(&mut self, x: f32, y: f32, time_ms: f64) {
            if self.game.session.phase == GamePhase::Tutorial {
                self.game.input.dismiss_tutorial = true;
                return;
            }
            let pos = self.to_world(x, y);
            self.game.input.pointer.push(PointerEvent::Press { pos, time_ms });
        }

        pub fn pointer_move(&mut self, x: f32, y: f32, time_ms: f64) {
            let pos = self.to_world(x, y);
            self.game.input.pointer.push(PointerEvent::Move { pos, time_ms });
        }

        pub fn pointer_up(&mut self, x: f32, y: f32, time_ms: f64) {
            let pos = self.to_world(x, y);
            self.game.input.pointer.push(PointerEvent::Release { pos, time_ms });
        }

        /// Pause toggle (also used for auto-pause on tab switch)
        pub fn toggle_pause(&mut self) {
            self.game.input.pause = true;
        }

        pub fn restart(&mut self, seed: f64) {
            self.game.restart(seed as u64);
            self.game_over_json = None;
        }

        /// Advance to `time` (requestAnimationFrame timestamp, ms)
        pub fn frame(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                ((time - self.last_time) / 1000.0) as f32
            } else {
                0.0
            };
            self.last_time = time;

            for event in self.game.update(dt) {
                log_event(&event);
                if let GameEvent::GameOver(summary) = event {
                    self.game_over_json = serde_json::to_string(&summary).ok();
                }
            }
        }

        /// Everything the page needs to draw this frame
        pub fn hud_json(&self) -> String {
            let s = &self.game.session;
            let item = s.flight.item().map(|i| {
                serde_json::json!({
                    "kind": i.kind,
                    "x": i.position.x,
                    "y": i.position.y,
                    "rotation": i.rotation,
                })
            });
            serde_json::json!({
                "phase": s.phase,
                "score": s.progress.score,
                "high_score": s.profile.high_score,
                "strikes": s.progress.strikes,
                "combo": s.progress.combo,
                "multiplier": s.progress.multiplier,
                "level": s.progress.level,
                "stars": s.progress.stars,
                "power": s.power.power,
                "wind": s.wind.state,
                "item": item,
                "line": s.line,
            })
            .to_string()
        }

        /// Summary JSON once the game-over screen should show
        pub fn game_over_json(&self) -> Option<String> {
            self.game_over_json.clone()
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::error_1(&format!("Failed to init logger: {}", e).into());
    }
    log::info!("Laundry Fling starting...");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
