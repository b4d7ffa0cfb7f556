use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::{Mode, ModeStats};

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    QuickThinker,
    Perfectionist,
    ZenMaster,
    SpeedDemon,
    DailyWarrior,
    PatternMaster,
}

impl AchievementId {
    pub const ALL: [AchievementId; 6] = [
        Self::QuickThinker,
        Self::Perfectionist,
        Self::ZenMaster,
        Self::SpeedDemon,
        Self::DailyWarrior,
        Self::PatternMaster,
    ];

    pub const fn name(self) -> &'static str {
        use AchievementId::*;
        match self {
            QuickThinker => "Quick Thinker",
            Perfectionist => "Perfectionist",
            ZenMaster => "Zen Master",
            SpeedDemon => "Speed Demon",
            DailyWarrior => "Daily Warrior",
            PatternMaster => "Pattern Master",
        }
    }

    pub const fn description(self) -> &'static str {
        use AchievementId::*;
        match self {
            QuickThinker => "Complete a level in under 5 seconds",
            Perfectionist => "Get 5 correct answers in a row",
            ZenMaster => "Score 1000 points in Zen mode",
            SpeedDemon => "Score 2000 points in Speed mode",
            DailyWarrior => "Complete 5 daily challenges",
            PatternMaster => "Solve a level 10 sequence",
        }
    }

    pub const fn icon(self) -> &'static str {
        use AchievementId::*;
        match self {
            QuickThinker => "⚡",
            Perfectionist => "🎯",
            ZenMaster => "🧘",
            SpeedDemon => "🏃",
            DailyWarrior => "📅",
            PatternMaster => "🧩",
        }
    }
}

impl FromStr for AchievementId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use AchievementId::*;
        Ok(match s {
            "quick_thinker" => QuickThinker,
            "perfectionist" => Perfectionist,
            "zen_master" => ZenMaster,
            "speed_demon" => SpeedDemon,
            "daily_warrior" => DailyWarrior,
            "pattern_master" => PatternMaster,
            _ => return Err(()),
        })
    }
}

/// Earned achievements, persisted locally.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AchievementSet(BTreeSet<AchievementId>);

impl AchievementSet {
    pub fn contains(&self, id: AchievementId) -> bool {
        self.0.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Marks `id` as earned, returning whether it is new.
    pub fn award(&mut self, id: AchievementId) -> bool {
        self.0.insert(id)
    }

    /// Merges ids reported by the service. Unknown ids are logged and skipped.
    pub fn merge_ids<S: AsRef<str>>(&mut self, ids: &[S]) -> Vec<AchievementId> {
        let mut earned = Vec::new();
        for raw in ids {
            let raw = raw.as_ref();
            match raw.parse::<AchievementId>() {
                Ok(id) => {
                    if self.award(id) {
                        earned.push(id);
                    }
                }
                Err(()) => log::warn!("Unknown achievement id received from server: {}", raw),
            }
        }
        earned
    }

    /// Applies the achievements that can be judged from local stats alone.
    pub fn check_local(&mut self, stats: &ModeStats) -> Vec<AchievementId> {
        let mut earned = Vec::new();
        if stats.get(Mode::Zen).best_score >= 1000 && self.award(AchievementId::ZenMaster) {
            earned.push(AchievementId::ZenMaster);
        }
        if stats.get(Mode::Speed).best_score >= 2000 && self.award(AchievementId::SpeedDemon) {
            earned.push(AchievementId::SpeedDemon);
        }
        earned
    }
}
