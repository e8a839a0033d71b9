//! Fixed timestep simulation tick
//!
//! Core game loop that advances a session deterministically. Pointer
//! callbacks from the host are queued into `TickInput` and applied in order
//! at the start of the tick.

use glam::Vec2;

use super::flight::Physics;
use super::state::{GamePhase, GameSession};
use crate::dt_to_ms;
use crate::persistence::KeyValueStore;

/// A single-pointer input sample (host clock, ms)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Press { pos: Vec2, time_ms: f64 },
    Move { pos: Vec2, time_ms: f64 },
    Release { pos: Vec2, time_ms: f64 },
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer events since the last tick, oldest first
    pub pointer: Vec<PointerEvent>,
    /// Pause toggle
    pub pause: bool,
    /// Close the tutorial overlay
    pub dismiss_tutorial: bool,
}

/// Advance the session by one fixed timestep
pub fn tick<P, S>(session: &mut GameSession, input: &TickInput, physics: &P, store: &mut S, dt: f32)
where
    P: Physics + ?Sized,
    S: KeyValueStore + ?Sized,
{
    // Handle pause toggle
    if input.pause {
        match session.phase {
            GamePhase::Playing => {
                session.phase = GamePhase::Paused;
                session.gesture = None;
                session.power.reset();
                log::info!("Paused");
                return;
            }
            GamePhase::Paused => {
                session.phase = GamePhase::Playing;
                log::info!("Resumed");
            }
            _ => {}
        }
    }

    if session.phase == GamePhase::Paused {
        return;
    }

    if input.dismiss_tutorial {
        session.dismiss_tutorial();
    }

    session.time_ticks += 1;
    let dt_ms = dt_to_ms(dt);

    if session.phase != GamePhase::GameOver {
        for event in &input.pointer {
            match *event {
                PointerEvent::Press { pos, time_ms } => session.press(pos, time_ms),
                PointerEvent::Move { pos, .. } => session.pointer_move(pos),
                PointerEvent::Release { pos, time_ms } => session.release(pos, time_ms),
            }
        }

        // Charge while held; input is ignored while something is airborne
        if session.power.charging {
            if session.flight.is_airborne() {
                session.power.reset();
                session.gesture = None;
            } else {
                session.power.charge(&session.tuning.launch);
            }
        }

        session.advance_wind(dt_ms);
        session.advance_flight(physics, dt);
    }

    session.fire_deferred(dt_ms);

    // Write back anything progression changed
    if session.profile.needs_flush() {
        if let Err(e) = session.profile.flush(store) {
            log::warn!("Failed to save progress: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::persistence::{MemoryStore, Profile};
    use crate::sim::flight::{ArcadePhysics, LaundryItem};
    use crate::sim::state::GameEvent;
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    /// Physics stub that drops the item straight onto a spot
    struct Teleport {
        pos: Vec2,
        vel: Vec2,
    }

    impl Physics for Teleport {
        fn integrate(&self, item: &mut LaundryItem, _dt: f32) {
            item.position = self.pos;
            item.velocity = self.vel;
        }
    }

    fn onto_line() -> Teleport {
        Teleport {
            pos: Vec2::new(180.0, 280.0),
            vel: Vec2::new(0.0, 20.0),
        }
    }

    fn into_pool() -> Teleport {
        Teleport {
            pos: Vec2::new(180.0, 620.0),
            vel: Vec2::new(0.0, 400.0),
        }
    }

    fn new_session(seed: u64) -> GameSession {
        let mut profile = Profile::default();
        profile.tutorial_seen = true;
        GameSession::new(seed, Tuning::default(), profile)
    }

    fn press(t: f64) -> PointerEvent {
        PointerEvent::Press {
            pos: Vec2::new(100.0, 500.0),
            time_ms: t,
        }
    }

    fn flick(t: f64) -> PointerEvent {
        PointerEvent::Release {
            pos: Vec2::new(110.0, 440.0),
            time_ms: t,
        }
    }

    fn input(pointer: Vec<PointerEvent>) -> TickInput {
        TickInput {
            pointer,
            ..Default::default()
        }
    }

    #[test]
    fn test_power_charges_while_held() {
        let mut session = new_session(1);
        let mut store = MemoryStore::new();
        let physics = ArcadePhysics::default();

        tick(&mut session, &input(vec![press(0.0)]), &physics, &mut store, SIM_DT);
        for _ in 0..9 {
            tick(&mut session, &TickInput::default(), &physics, &mut store, SIM_DT);
        }
        assert_eq!(session.power.power, 20.0);

        for _ in 0..100 {
            tick(&mut session, &TickInput::default(), &physics, &mut store, SIM_DT);
        }
        assert_eq!(session.power.power, 100.0);
    }

    #[test]
    fn test_tick_pause() {
        let mut session = new_session(2);
        let mut store = MemoryStore::new();
        let physics = ArcadePhysics::default();
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };

        tick(&mut session, &pause, &physics, &mut store, SIM_DT);
        assert_eq!(session.phase, GamePhase::Paused);
        let wind_clock = session.wind.time_ms;
        tick(&mut session, &TickInput::default(), &physics, &mut store, SIM_DT);
        assert_eq!(session.wind.time_ms, wind_clock);

        tick(&mut session, &pause, &physics, &mut store, SIM_DT);
        assert_eq!(session.phase, GamePhase::Playing);
        assert!(session.wind.time_ms > wind_clock);
    }

    #[test]
    fn test_catch_is_saved() {
        let mut session = new_session(3);
        let mut store = MemoryStore::new();

        tick(&mut session, &input(vec![press(0.0)]), &onto_line(), &mut store, SIM_DT);
        tick(&mut session, &input(vec![flick(200.0)]), &onto_line(), &mut store, SIM_DT);

        assert!(!session.flight.is_airborne());
        assert_eq!(session.progress.successful_hangs, 1);
        assert_eq!(session.progress.total_throws, 1);

        let reloaded = Profile::load(&store);
        assert_eq!(reloaded.high_score, 2);
        assert_eq!(reloaded.achievements.ids(), ["first_hang".to_string()]);
    }

    #[test]
    fn test_five_splashes_end_the_run() {
        let mut session = new_session(4);
        let mut store = MemoryStore::new();
        let mut t = 0.0;

        for _ in 0..5 {
            tick(&mut session, &input(vec![press(t)]), &into_pool(), &mut store, SIM_DT);
            t += 200.0;
            tick(&mut session, &input(vec![flick(t)]), &into_pool(), &mut store, SIM_DT);
            t += 200.0;
        }
        assert_eq!(session.phase, GamePhase::GameOver);
        assert_eq!(session.progress.strikes, 0);

        // Further input is ignored
        tick(&mut session, &input(vec![press(t)]), &into_pool(), &mut store, SIM_DT);
        assert!(session.gesture.is_none());

        let mut game_overs = 0;
        for _ in 0..120 {
            tick(&mut session, &TickInput::default(), &into_pool(), &mut store, SIM_DT);
            game_overs += session
                .drain_events()
                .iter()
                .filter(|e| matches!(e, GameEvent::GameOver(_)))
                .count();
        }
        assert_eq!(game_overs, 1);
    }

    #[test]
    fn test_real_flight_resolves() {
        let mut session = new_session(5);
        let mut store = MemoryStore::new();
        let physics = ArcadePhysics::default();

        tick(&mut session, &input(vec![press(0.0)]), &physics, &mut store, SIM_DT);
        for _ in 0..49 {
            tick(&mut session, &TickInput::default(), &physics, &mut store, SIM_DT);
        }
        tick(&mut session, &input(vec![flick(850.0)]), &physics, &mut store, SIM_DT);
        assert!(session.flight.is_airborne());

        let mut resolved = 0;
        for _ in 0..(60 * 10) {
            tick(&mut session, &TickInput::default(), &physics, &mut store, SIM_DT);
            resolved += session
                .drain_events()
                .iter()
                .filter(|e| matches!(e, GameEvent::Caught { .. } | GameEvent::Splashed { .. }))
                .count();
        }
        assert_eq!(resolved, 1);
        assert!(!session.flight.is_airborne());
    }

    #[test]
    fn test_determinism() {
        // Two sessions with the same seed and inputs end up identical
        let mut a = new_session(99999);
        let mut b = new_session(99999);
        let mut store_a = MemoryStore::new();
        let mut store_b = MemoryStore::new();
        let physics = ArcadePhysics::default();

        let mut inputs = vec![input(vec![press(0.0)])];
        inputs.extend((0..30).map(|_| TickInput::default()));
        inputs.push(input(vec![flick(600.0)]));
        inputs.extend((0..300).map(|_| TickInput::default()));

        for i in &inputs {
            tick(&mut a, i, &physics, &mut store_a, SIM_DT);
            tick(&mut b, i, &physics, &mut store_b, SIM_DT);
        }

        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.wind.state, b.wind.state);
        assert_eq!(a.progress.score, b.progress.score);
        assert_eq!(a.progress.strikes, b.progress.strikes);
        assert_eq!(a.drain_events(), b.drain_events());
    }

    fn arb_pointer() -> impl Strategy<Value = Option<(u8, f32, f32)>> {
        proptest::option::of((0u8..3, 0.0f32..360.0, 0.0f32..740.0))
    }

    proptest! {
        #[test]
        fn prop_single_flight(seed in any::<u64>(), script in proptest::collection::vec(arb_pointer(), 1..400)) {
            let mut session = new_session(seed);
            let mut store = MemoryStore::new();
            let physics = ArcadePhysics::default();
            let mut airborne: i64 = 0;

            for (i, step) in script.into_iter().enumerate() {
                let t = i as f64 * 16.0;
                let pointer = match step {
                    Some((0, x, y)) => vec![PointerEvent::Press { pos: Vec2::new(x, y), time_ms: t }],
                    Some((1, x, y)) => vec![PointerEvent::Move { pos: Vec2::new(x, y), time_ms: t }],
                    Some((_, x, y)) => vec![PointerEvent::Release { pos: Vec2::new(x, y), time_ms: t }],
                    None => Vec::new(),
                };
                tick(&mut session, &input(pointer), &physics, &mut store, SIM_DT);

                for event in session.drain_events() {
                    match event {
                        GameEvent::Thrown { .. } => airborne += 1,
                        GameEvent::Caught { .. } | GameEvent::Splashed { .. } => airborne -= 1,
                        _ => {}
                    }
                }
                prop_assert!((0..=1).contains(&airborne));
                prop_assert_eq!(airborne == 1, session.flight.is_airborne());
            }
        }
    }
}
