use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::Mode;

/// Number of entries kept in the local score history.
pub const HISTORY_LIMIT: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u64,
    pub mode: Mode,
    #[serde(alias = "date", default)]
    pub timestamp: String,
}

/// Most recent scores, newest first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreHistory(Vec<ScoreEntry>);

impl ScoreHistory {
    pub fn record(&mut self, entry: ScoreEntry) {
        self.0.insert(0, entry);
        self.0.truncate(HISTORY_LIMIT);
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.0
    }

    pub fn latest(&self) -> Option<&ScoreEntry> {
        self.0.first()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModeRecord {
    pub best_score: u64,
    pub games_played: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModeStats(BTreeMap<Mode, ModeRecord>);

impl ModeStats {
    pub fn record(&mut self, mode: Mode, score: u64) -> ModeRecord {
        let record = self.0.entry(mode).or_default();
        record.best_score = record.best_score.max(score);
        record.games_played = record.games_played.saturating_add(1);
        *record
    }

    pub fn get(&self, mode: Mode) -> ModeRecord {
        self.0.get(&mode).copied().unwrap_or_default()
    }

    pub fn total_games(&self) -> u32 {
        self.0
            .values()
            .fold(0u32, |sum, record| sum.saturating_add(record.games_played))
    }
}
