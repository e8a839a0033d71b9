//! Achievement evaluation
//!
//! Pure threshold checks over cumulative stats. Each achievement has a
//! stable string id; the unlocked set only ever grows.

use serde::{Deserialize, Serialize};

/// Known achievements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Achievement {
    FirstHang,
    ComboMaster,
    Perfectionist,
    LaundryPro,
}

impl Achievement {
    pub const ALL: [Achievement; 4] = [
        Achievement::FirstHang,
        Achievement::ComboMaster,
        Achievement::Perfectionist,
        Achievement::LaundryPro,
    ];

    /// Stable storage id
    pub fn id(&self) -> &'static str {
        match self {
            Achievement::FirstHang => "first_hang",
            Achievement::ComboMaster => "combo_10",
            Achievement::Perfectionist => "perfect_5",
            Achievement::LaundryPro => "score_50",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Achievement::FirstHang => "First Hang!",
            Achievement::ComboMaster => "Combo Master!",
            Achievement::Perfectionist => "Perfectionist",
            Achievement::LaundryPro => "Laundry Pro",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Achievement::FirstHang => "Hang your first item",
            Achievement::ComboMaster => "10 in a row!",
            Achievement::Perfectionist => "5 perfect throws",
            Achievement::LaundryPro => "Score 50 points",
        }
    }

    fn is_met(&self, stats: &AchievementStats) -> bool {
        match self {
            Achievement::FirstHang => stats.successful_hangs >= 1,
            Achievement::ComboMaster => stats.combo >= 10,
            Achievement::Perfectionist => stats.perfect_throws >= 5,
            Achievement::LaundryPro => stats.score >= 50,
        }
    }
}

/// The stats achievements are judged on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AchievementStats {
    pub successful_hangs: u32,
    pub combo: u32,
    pub perfect_throws: u32,
    pub score: u64,
}

/// Previously unlocked ids, in unlock order. Unknown ids from storage are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AchievementSet {
    ids: Vec<String>,
}

impl AchievementSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, achievement: Achievement) -> bool {
        self.ids.iter().any(|id| id == achievement.id())
    }

    /// Append an id; returns false if it was already there
    pub fn insert(&mut self, achievement: Achievement) -> bool {
        if self.contains(achievement) {
            return false;
        }
        self.ids.push(achievement.id().to_string());
        true
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Achievements whose threshold is met but which are not yet unlocked
pub fn evaluate(stats: &AchievementStats, unlocked: &AchievementSet) -> Vec<Achievement> {
    Achievement::ALL
        .into_iter()
        .filter(|a| a.is_met(stats) && !unlocked.contains(*a))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_hang() {
        let stats = AchievementStats {
            successful_hangs: 1,
            ..Default::default()
        };
        assert_eq!(evaluate(&stats, &AchievementSet::new()), vec![Achievement::FirstHang]);
    }

    #[test]
    fn test_thresholds() {
        let below = AchievementStats {
            successful_hangs: 0,
            combo: 9,
            perfect_throws: 4,
            score: 49,
        };
        assert!(evaluate(&below, &AchievementSet::new()).is_empty());

        let at = AchievementStats {
            successful_hangs: 1,
            combo: 10,
            perfect_throws: 5,
            score: 50,
        };
        assert_eq!(evaluate(&at, &AchievementSet::new()), Achievement::ALL.to_vec());
    }

    #[test]
    fn test_idempotent() {
        let stats = AchievementStats {
            successful_hangs: 12,
            combo: 11,
            perfect_throws: 6,
            score: 70,
        };
        let mut unlocked = AchievementSet::new();
        for a in evaluate(&stats, &unlocked) {
            assert!(unlocked.insert(a));
        }
        assert!(evaluate(&stats, &unlocked).is_empty());
        assert!(!unlocked.insert(Achievement::FirstHang));
        assert_eq!(unlocked.len(), 4);
    }

    #[test]
    fn test_serializes_as_id_list() {
        let mut unlocked = AchievementSet::new();
        unlocked.insert(Achievement::FirstHang);
        unlocked.insert(Achievement::LaundryPro);
        let json = serde_json::to_string(&unlocked).unwrap();
        assert_eq!(json, r#"["first_hang","score_50"]"#);

        let back: AchievementSet = serde_json::from_str(r#"["first_hang","legacy_id"]"#).unwrap();
        assert!(back.contains(Achievement::FirstHang));
        assert_eq!(back.ids().len(), 2);
    }
}
