use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::{ControlError, ShopState};

/// Game mode, as named by the game service.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Classic,
    Speed,
    Zen,
    Daily,
    CodeBreaker,
    Battle,
    Boss,
}

impl Mode {
    /// Modes a player can pick from the start screen.
    pub const PLAYABLE: [Mode; 5] = [
        Mode::Classic,
        Mode::Speed,
        Mode::Zen,
        Mode::Daily,
        Mode::CodeBreaker,
    ];

    /// Countdown length for a single round, `None` when the round is untimed.
    pub const fn timer_seconds(self) -> Option<u32> {
        use Mode::*;
        match self {
            Classic => Some(20),
            Speed => Some(10),
            Zen => None,
            Daily => Some(30),
            CodeBreaker => Some(25),
            Battle => None,
            Boss => Some(crate::BOSS_SECONDS),
        }
    }

    pub const fn is_playable(self) -> bool {
        !matches!(self, Self::Battle | Self::Boss)
    }

    pub const fn as_str(self) -> &'static str {
        use Mode::*;
        match self {
            Classic => "classic",
            Speed => "speed",
            Zen => "zen",
            Daily => "daily",
            CodeBreaker => "code_breaker",
            Battle => "battle",
            Boss => "boss",
        }
    }

    pub const fn name(self) -> &'static str {
        use Mode::*;
        match self {
            Classic => "Classic Mode",
            Speed => "Speed Mode",
            Zen => "Zen Mode",
            Daily => "Daily Challenge",
            CodeBreaker => "Code Breaker",
            Battle => "Battle",
            Boss => "Boss Battle",
        }
    }

    pub const fn description(self) -> &'static str {
        use Mode::*;
        match self {
            Classic => "Original sequence challenge",
            Speed => "10s timer but 2x points!",
            Zen => "No timer, complex patterns",
            Daily => "One attempt at today's sequence",
            CodeBreaker => "Visual & logic patterns!",
            Battle => "Five rounds against an opponent",
            Boss => "Three sequences in 30 seconds",
        }
    }
}

impl Default for Mode {
    fn default() -> Self {
        Self::Classic
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use Mode::*;
        Ok(match s {
            "classic" => Classic,
            "speed" => Speed,
            "zen" => Zen,
            "daily" => Daily,
            "code_breaker" => CodeBreaker,
            "battle" => Battle,
            "boss" => Boss,
            other => return Err(ControlError::UnknownMode(other.into())),
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    Loading,
    Active,
    Submitting,
    Resolved,
    GameOver,
}

impl Phase {
    pub const fn is_playing(self) -> bool {
        matches!(self, Self::Active | Self::Submitting)
    }
}

impl Default for Phase {
    fn default() -> Self {
        Self::Idle
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    WrongAnswer,
    TimeUp,
    Quit,
    BossFailed,
    BattleComplete,
    /// The service refused further challenges, e.g. a finished daily challenge.
    ChallengesExhausted,
}

/// Identity of one round; responses carrying an older token are discarded.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoundToken(u32);

impl RoundToken {
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Client-side view of the round in progress.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundState {
    pub mode: Mode,
    pub level: u32,
    pub score: u64,
    pub sequence_display: String,
    pub hint_text: String,
    pub feedback: String,
    pub phase: Phase,
    pub timer_seconds_left: Option<u32>,
}

impl RoundState {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            level: 1,
            score: 0,
            sequence_display: String::new(),
            hint_text: String::new(),
            feedback: String::new(),
            phase: Phase::Idle,
            timer_seconds_left: None,
        }
    }
}

impl Default for RoundState {
    fn default() -> Self {
        Self::new(Mode::default())
    }
}

/// Puzzle handed out by `/api/challenge`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub level: u32,
    pub score: u64,
    pub sequence: Vec<String>,
    pub hint: String,
    pub mode: Option<Mode>,
    pub is_boss: bool,
}

impl Challenge {
    pub fn sequence_display(&self) -> String {
        self.sequence.join(" ")
    }
}

/// Result of `/api/answer`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnswerVerdict {
    pub message: String,
    pub game_over: bool,
    pub correct_answer: Option<String>,
    pub new_achievements: Vec<String>,
    pub shop: Option<ShopState>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossSequence {
    pub sequence: Vec<String>,
    pub hint: String,
}

impl BossSequence {
    pub fn sequence_display(&self) -> String {
        self.sequence.join(" ")
    }
}

/// Result of `/api/boss/answer`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BossVerdict {
    pub correct: bool,
    pub boss_defeated: bool,
    pub message: String,
    pub correct_answer: Option<String>,
}

/// Fixed UI delays, in milliseconds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timings {
    pub next_challenge_ms: u32,
    pub skip_ms: u32,
    pub battle_next_round_ms: u32,
    pub opponent_min_ms: u32,
    pub opponent_max_ms: u32,
    pub boss_advance_ms: u32,
    pub boss_victory_ms: u32,
    pub boss_failure_ms: u32,
    pub request_timeout_ms: u32,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            next_challenge_ms: 900,
            skip_ms: 800,
            battle_next_round_ms: 1200,
            opponent_min_ms: 1200,
            opponent_max_ms: 3000,
            boss_advance_ms: 800,
            boss_victory_ms: 2500,
            boss_failure_ms: 2000,
            request_timeout_ms: 10_000,
        }
    }
}
