use crate::utils::*;
use rand::Rng;
use seqmaster_core::{self as game, AchievementId, AchievementSet, ModeStats, ScoreEntry, ScoreHistory};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct Username(pub String);

impl Username {
    /// Stored name, or a freshly generated nickname when none was ever saved.
    pub(crate) fn load_or_generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let Username(name) = LocalOrDefault::local_or_default();
        let username = Self(game::username_or_nickname(&name, rng));
        if username.0 != name {
            username.local_save();
        }
        username
    }
}

impl StorageKey for Username {
    const KEY: &'static str = "seqmaster:username";
}

impl StorageKey for ScoreHistory {
    const KEY: &'static str = "seqmaster:scoreHistory";
}

impl StorageKey for ModeStats {
    const KEY: &'static str = "seqmaster:modeStats";
}

impl StorageKey for AchievementSet {
    const KEY: &'static str = "seqmaster:achievements";
}

/// Everything the player accumulates locally across games.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Records {
    pub history: ScoreHistory,
    pub stats: ModeStats,
    pub achievements: AchievementSet,
}

impl Records {
    pub(crate) fn load() -> Self {
        Self {
            history: LocalOrDefault::local_or_default(),
            stats: LocalOrDefault::local_or_default(),
            achievements: LocalOrDefault::local_or_default(),
        }
    }

    /// Records a finished game and returns the achievements it unlocked.
    pub(crate) fn record_score(&mut self, entry: ScoreEntry) -> Vec<AchievementId> {
        self.stats.record(entry.mode, entry.score);
        self.history.record(entry);
        let earned = self.achievements.check_local(&self.stats);

        self.history.local_save();
        self.stats.local_save();
        if !earned.is_empty() {
            self.achievements.local_save();
        }
        earned
    }

    /// Merges ids awarded by the service; unknown ids are skipped.
    pub(crate) fn merge_achievements(&mut self, ids: &[String]) -> Vec<AchievementId> {
        let earned = self.achievements.merge_ids(ids);
        if !earned.is_empty() {
            self.achievements.local_save();
        }
        earned
    }
}
