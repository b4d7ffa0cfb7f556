use alloc::string::String;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::Timings;

/// Rounds per battle match.
pub const BATTLE_ROUNDS: u32 = 5;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleType {
    Ai,
    Multiplayer,
}

impl BattleType {
    pub const fn opponent_name(self) -> &'static str {
        match self {
            Self::Ai => "Computer",
            Self::Multiplayer => "Opponent",
        }
    }

    /// Chance that the simulated opponent solves a round. Multiplayer has no
    /// peer sync, so it is simulated too, just with worse odds.
    pub const fn success_probability(self) -> f64 {
        match self {
            Self::Ai => 0.7,
            Self::Multiplayer => 0.5,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleOutcome {
    Win,
    Loss,
    Draw,
}

impl BattleOutcome {
    pub fn from_scores(player: u64, opponent: u64) -> Self {
        use core::cmp::Ordering::*;
        match player.cmp(&opponent) {
            Greater => Self::Win,
            Less => Self::Loss,
            Equal => Self::Draw,
        }
    }

    pub const fn headline(self) -> &'static str {
        match self {
            Self::Win => "🏆 You Win!",
            Self::Loss => "😢 You Lose!",
            Self::Draw => "🤝 It's a Draw!",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BattleReport {
    pub outcome: BattleOutcome,
    pub player_score: u64,
    pub opponent_score: u64,
    pub opponent_name: String,
}

/// Points for one solved battle round, in `100..=199`.
pub fn roll_points<R: Rng + ?Sized>(rng: &mut R) -> u64 {
    rng.random_range(100..200)
}

/// Pre-rolled behaviour of the simulated opponent for one round.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OpponentRoll {
    pub correct: bool,
    pub delay_ms: u32,
    pub points: u64,
}

impl OpponentRoll {
    pub fn roll<R: Rng + ?Sized>(battle_type: BattleType, timings: &Timings, rng: &mut R) -> Self {
        let correct = rng.random_bool(battle_type.success_probability());
        let delay_ms = rng.random_range(timings.opponent_min_ms..=timings.opponent_max_ms);
        let points = if correct { roll_points(rng) } else { 0 };
        Self {
            correct,
            delay_ms,
            points,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BattleState {
    pub battle_type: BattleType,
    pub player_score: u64,
    pub opponent_score: u64,
    pub opponent_name: String,
    pub round: u32,
    pub total_rounds: u32,
    player_settled: bool,
    opponent_settled: bool,
    finished: bool,
    reported: bool,
}

impl BattleState {
    pub fn new(battle_type: BattleType) -> Self {
        Self {
            battle_type,
            player_score: 0,
            opponent_score: 0,
            opponent_name: battle_type.opponent_name().into(),
            round: 0,
            total_rounds: BATTLE_ROUNDS,
            player_settled: false,
            opponent_settled: false,
            finished: false,
            reported: false,
        }
    }

    /// Moves to the next round, or marks the match finished once every round was played.
    pub fn begin_round(&mut self) -> Option<u32> {
        if self.finished {
            return None;
        }
        if self.round >= self.total_rounds {
            self.finished = true;
            return None;
        }
        self.round += 1;
        self.player_settled = false;
        self.opponent_settled = false;
        Some(self.round)
    }

    pub fn award_player(&mut self, points: u64) {
        self.player_score = self.player_score.saturating_add(points);
    }

    pub fn settle_player(&mut self) {
        self.player_settled = true;
    }

    pub fn settle_opponent(&mut self, roll: OpponentRoll) {
        if self.opponent_settled {
            return;
        }
        self.opponent_settled = true;
        if roll.correct {
            self.opponent_score = self.opponent_score.saturating_add(roll.points);
        }
    }

    pub fn round_settled(&self) -> bool {
        self.player_settled && self.opponent_settled
    }

    /// Produces the match result exactly once, after the last round.
    pub fn report(&mut self) -> Option<BattleReport> {
        if !self.finished || self.reported {
            return None;
        }
        self.reported = true;
        Some(BattleReport {
            outcome: BattleOutcome::from_scores(self.player_score, self.opponent_score),
            player_score: self.player_score,
            opponent_score: self.opponent_score,
            opponent_name: self.opponent_name.clone(),
        })
    }
}
