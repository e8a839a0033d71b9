//! Laundry Fling - A one-screen clothesline arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (wind, launch, flight, scoring)
//! - `persistence`: Key-value storage for high score, achievements, tutorial flag
//! - `tuning`: Data-driven game balance

pub mod persistence;
pub mod sim;
pub mod tuning;

pub use persistence::{KeyValueStore, MemoryStore, Profile};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one power step per tick)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// World dimensions (portrait phone screen)
    pub const WORLD_WIDTH: f32 = 360.0;
    pub const WORLD_HEIGHT: f32 = 740.0;

    /// Wind field recompute period (ms)
    pub const WIND_TICK_MS: f32 = 100.0;

    /// Where a freshly thrown item appears (the laundry basket)
    pub const SPAWN_X: f32 = 70.0;
    pub const SPAWN_Y: f32 = 540.0;

    /// Item hitbox, offset from the item's position
    pub const ITEM_HITBOX_OFFSET_X: f32 = -15.0;
    pub const ITEM_HITBOX_OFFSET_Y: f32 = -20.0;
    pub const ITEM_HITBOX_WIDTH: f32 = 30.0;
    pub const ITEM_HITBOX_HEIGHT: f32 = 35.0;

    /// Caught items are pegged at this height
    pub const LINE_PEG_Y: f32 = 290.0;
}

/// Milliseconds in one fixed tick
#[inline]
pub fn dt_to_ms(dt: f32) -> f32 {
    dt * 1000.0
}

/// Vector from `from` to `to` with screen-space Y flipped so "up" is positive
#[inline]
pub fn flick_vector(from: Vec2, to: Vec2) -> Vec2 {
    Vec2::new(to.x - from.x, from.y - to.y)
}
