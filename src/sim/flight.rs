//! Flight and collision resolver
//!
//! Owns the single in-flight item. Motion integration is delegated to a
//! [`Physics`] collaborator; this module only decides when a flight ends
//! and how.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::zone::Zone;
use crate::consts::*;
use crate::tuning::FlightTuning;

/// What kind of laundry is flying (cosmetic only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Shirt,
    Shorts,
    Towel,
}

impl ItemKind {
    pub const ALL: [ItemKind; 3] = [ItemKind::Shirt, ItemKind::Shorts, ItemKind::Towel];
}

/// A thrown laundry item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaundryItem {
    pub id: u32,
    pub kind: ItemKind,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Degrees per second
    pub angular_velocity: f32,
    /// Degrees
    pub rotation: f32,
}

impl LaundryItem {
    /// Spawn at the basket
    pub fn new(id: u32, kind: ItemKind, velocity: Vec2, angular_velocity: f32) -> Self {
        Self {
            id,
            kind,
            position: Vec2::new(SPAWN_X, SPAWN_Y),
            velocity,
            angular_velocity,
            rotation: 0.0,
        }
    }

    pub fn hitbox(&self) -> Zone {
        Zone::new(
            self.position.x + ITEM_HITBOX_OFFSET_X,
            self.position.y + ITEM_HITBOX_OFFSET_Y,
            ITEM_HITBOX_WIDTH,
            ITEM_HITBOX_HEIGHT,
        )
    }
}

/// The rigid-body collaborator: integrates motion and answers overlap queries
pub trait Physics {
    /// Advance one item by `dt` seconds
    fn integrate(&self, item: &mut LaundryItem, dt: f32);

    /// Axis-aligned overlap test
    fn overlaps(&self, a: &Zone, b: &Zone) -> bool {
        a.intersects(b)
    }
}

/// Arcade-style integrator: constant gravity plus linear drag toward zero
#[derive(Debug, Clone, Copy)]
pub struct ArcadePhysics {
    pub gravity: Vec2,
    pub drag: Vec2,
}

impl ArcadePhysics {
    pub fn from_tuning(tuning: &FlightTuning) -> Self {
        Self {
            gravity: Vec2::new(0.0, tuning.gravity),
            drag: Vec2::new(tuning.drag_x, tuning.drag_y),
        }
    }
}

impl Default for ArcadePhysics {
    fn default() -> Self {
        Self::from_tuning(&FlightTuning::default())
    }
}

/// Move `v` toward zero by `amount` without overshooting
#[inline]
fn apply_drag(v: f32, amount: f32) -> f32 {
    if v > 0.0 {
        (v - amount).max(0.0)
    } else {
        (v + amount).min(0.0)
    }
}

impl Physics for ArcadePhysics {
    fn integrate(&self, item: &mut LaundryItem, dt: f32) {
        item.velocity += self.gravity * dt;
        item.velocity.x = apply_drag(item.velocity.x, self.drag.x * dt);
        item.velocity.y = apply_drag(item.velocity.y, self.drag.y * dt);
        item.position += item.velocity * dt;
        item.rotation = (item.rotation + item.angular_velocity * dt) % 360.0;
    }
}

/// How a splash happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplashCause {
    /// Landed in the pool
    Pool,
    /// Left the screen without touching anything
    OutOfBounds,
}

/// Terminal classification of a flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Landing {
    Caught,
    Splashed(SplashCause),
}

/// A finished flight, handed to progression exactly once
#[derive(Debug, Clone)]
pub struct FlightOutcome {
    pub item: LaundryItem,
    pub landing: Landing,
}

/// A throw was attempted while another item was airborne
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlightBusy;

/// Classify an item's current state; `None` while still flying
pub fn classify<P: Physics + ?Sized>(
    item: &LaundryItem,
    physics: &P,
    tuning: &FlightTuning,
) -> Option<Landing> {
    let hitbox = item.hitbox();
    let vy = item.velocity.y;

    // Only on the way down near the apex; rising items pass through the line
    if vy.abs() < tuning.catch_speed && vy > 0.0 && physics.overlaps(&hitbox, &tuning.line_zone) {
        return Some(Landing::Caught);
    }

    if item.position.y > tuning.pool_zone.top() && physics.overlaps(&hitbox, &tuning.pool_zone) {
        return Some(Landing::Splashed(SplashCause::Pool));
    }

    if item.position.y > tuning.bounds_bottom
        || item.position.x < tuning.bounds_left
        || item.position.x > tuning.bounds_right
    {
        return Some(Landing::Splashed(SplashCause::OutOfBounds));
    }

    None
}

/// Idle -> InFlight -> {Caught, Splashed} -> Idle
#[derive(Debug, Clone)]
pub struct FlightResolver {
    slot: Option<LaundryItem>,
    tuning: FlightTuning,
}

impl FlightResolver {
    pub fn new(tuning: FlightTuning) -> Self {
        Self { slot: None, tuning }
    }

    pub fn is_airborne(&self) -> bool {
        self.slot.is_some()
    }

    pub fn item(&self) -> Option<&LaundryItem> {
        self.slot.as_ref()
    }

    /// Put an item in the air. Rejected while one is already flying.
    pub fn launch(&mut self, item: LaundryItem) -> Result<(), FlightBusy> {
        if self.slot.is_some() {
            return Err(FlightBusy);
        }
        log::debug!(
            "Item {} ({:?}) launched at ({:.0}, {:.0})",
            item.id,
            item.kind,
            item.velocity.x,
            item.velocity.y
        );
        self.slot = Some(item);
        Ok(())
    }

    /// Integrate and classify. The slot is emptied by the same call that
    /// reports the outcome, so a flight resolves at most once.
    pub fn step<P: Physics + ?Sized>(&mut self, physics: &P, dt: f32) -> Option<FlightOutcome> {
        let item = self.slot.as_mut()?;
        physics.integrate(item, dt);

        let landing = classify(item, physics, &self.tuning)?;
        let item = self.slot.take()?;
        log::debug!(
            "Item {} resolved as {:?} at ({:.0}, {:.0})",
            item.id,
            landing,
            item.position.x,
            item.position.y
        );
        Some(FlightOutcome { item, landing })
    }
}
