//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Host timestamps arrive through `TickInput`, never read from a clock
//! - No rendering or platform dependencies

pub mod achievements;
pub mod flight;
pub mod launch;
pub mod progress;
pub mod state;
pub mod tick;
pub mod timers;
pub mod wind;
pub mod zone;

pub use achievements::{Achievement, AchievementSet, AchievementStats, evaluate};
pub use flight::{
    ArcadePhysics, FlightOutcome, FlightResolver, ItemKind, Landing, LaundryItem, Physics,
    SplashCause,
};
pub use launch::{Launch, LaunchGesture, PowerMeter, ThrowRejection, compute_launch};
pub use progress::{CatchRating, GameProgressState, GameSummary};
pub use state::{GameEvent, GamePhase, GameSession, HungItem};
pub use tick::{PointerEvent, TickInput, tick};
pub use timers::Scheduler;
pub use wind::{WindDirection, WindField, WindState};
pub use zone::Zone;
