//! Player profile: the persisted bits that survive between runs

use super::store::{KeyValueStore, StorageError};
use crate::sim::achievements::{Achievement, AchievementSet};

const HIGH_SCORE_KEY: &str = "laundry_fling_high_score";
const ACHIEVEMENTS_KEY: &str = "laundry_fling_achievements";
const TUTORIAL_KEY: &str = "laundry_fling_tutorial_seen";

/// Persisted player data with write-back tracking
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub high_score: u64,
    pub achievements: AchievementSet,
    pub tutorial_seen: bool,
    high_score_dirty: bool,
    achievements_dirty: bool,
    tutorial_dirty: bool,
    /// Last flush failed; wait for the next change before retrying
    write_failed: bool,
}

impl Profile {
    /// Read all keys. Anything missing or unparseable becomes its default.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let high_score = match store.get(HIGH_SCORE_KEY) {
            Some(raw) => raw.trim().parse::<u64>().unwrap_or_else(|_| {
                log::warn!("Corrupt high score {:?}, resetting to 0", raw);
                0
            }),
            None => 0,
        };

        let achievements = match store.get(ACHIEVEMENTS_KEY) {
            Some(raw) => serde_json::from_str::<AchievementSet>(&raw).unwrap_or_else(|e| {
                log::warn!("Corrupt achievement list ({}), starting empty", e);
                AchievementSet::new()
            }),
            None => AchievementSet::new(),
        };

        let tutorial_seen = store
            .get(TUTORIAL_KEY)
            .is_some_and(|v| !v.trim().is_empty());

        log::info!(
            "Loaded profile: best {}, {} achievements, tutorial seen: {}",
            high_score,
            achievements.len(),
            tutorial_seen
        );

        Self {
            high_score,
            achievements,
            tutorial_seen,
            ..Default::default()
        }
    }

    /// Raise the high score if `score` beats it
    pub fn record_score(&mut self, score: u64) -> bool {
        if score > self.high_score {
            self.high_score = score;
            self.high_score_dirty = true;
            self.write_failed = false;
            true
        } else {
            false
        }
    }

    /// Append an achievement; false if it was already unlocked
    pub fn unlock(&mut self, achievement: Achievement) -> bool {
        let added = self.achievements.insert(achievement);
        if added {
            self.achievements_dirty = true;
            self.write_failed = false;
        }
        added
    }

    pub fn mark_tutorial_seen(&mut self) {
        if !self.tutorial_seen {
            self.tutorial_seen = true;
            self.tutorial_dirty = true;
            self.write_failed = false;
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.high_score_dirty || self.achievements_dirty || self.tutorial_dirty
    }

    /// Dirty and not waiting out a failed write
    pub fn needs_flush(&self) -> bool {
        self.is_dirty() && !self.write_failed
    }

    /// Write changed keys. A key stays dirty until its write succeeds;
    /// after a failure `needs_flush` is false until something changes again.
    pub fn flush<S: KeyValueStore + ?Sized>(&mut self, store: &mut S) -> Result<(), StorageError> {
        let mut result = Ok(());

        if self.high_score_dirty {
            let value = self.high_score.to_string();
            result = result.and(write_key(store, HIGH_SCORE_KEY, &value, &mut self.high_score_dirty));
        }
        if self.achievements_dirty {
            match serde_json::to_string(&self.achievements) {
                Ok(json) => {
                    result = result.and(write_key(
                        store,
                        ACHIEVEMENTS_KEY,
                        &json,
                        &mut self.achievements_dirty,
                    ))
                }
                Err(e) => {
                    log::warn!("Could not serialize achievements: {}", e);
                    self.achievements_dirty = false;
                }
            }
        }
        if self.tutorial_dirty {
            result = result.and(write_key(store, TUTORIAL_KEY, "true", &mut self.tutorial_dirty));
        }

        self.write_failed = result.is_err();
        result
    }
}

fn write_key<S: KeyValueStore + ?Sized>(
    store: &mut S,
    key: &str,
    value: &str,
    dirty: &mut bool,
) -> Result<(), StorageError> {
    store.set(key, value)?;
    *dirty = false;
    Ok(())
}
