use alloc::string::String;
use alloc::vec::Vec;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::*;

/// Why the last known answer is being fetched.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Reveal {
    TimeUp,
    Debugger,
}

/// Calls the controller asks its driver to make against the game service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiRequest {
    SetMode(Mode),
    Challenge,
    Answer(String),
    LastAnswer(Reveal),
    Reset,
    ShopStatus,
    Purchase(PowerUpId),
    BossStart,
    BossAnswer(String),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RequestKind {
    SetMode,
    Challenge,
    Answer,
    LastAnswer,
    Reset,
    ShopStatus,
    Purchase,
    BossStart,
    BossAnswer,
}

impl RequestKind {
    /// Shop traffic is not tied to a round; everything else is.
    pub const fn is_round_scoped(self) -> bool {
        !matches!(self, Self::ShopStatus | Self::Purchase)
    }
}

impl ApiRequest {
    pub const fn kind(&self) -> RequestKind {
        match self {
            Self::SetMode(_) => RequestKind::SetMode,
            Self::Challenge => RequestKind::Challenge,
            Self::Answer(_) => RequestKind::Answer,
            Self::LastAnswer(_) => RequestKind::LastAnswer,
            Self::Reset => RequestKind::Reset,
            Self::ShopStatus => RequestKind::ShopStatus,
            Self::Purchase(_) => RequestKind::Purchase,
            Self::BossStart => RequestKind::BossStart,
            Self::BossAnswer(_) => RequestKind::BossAnswer,
        }
    }
}

/// Results fed back into the controller, one per issued request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    ModeSet,
    Challenge(Challenge),
    Answer(AnswerVerdict),
    LastAnswer {
        reveal: Reveal,
        answer: Option<String>,
    },
    Reset,
    Shop(ShopState),
    BossStarted(Vec<BossSequence>),
    BossAnswer(BossVerdict),
    Failed(RequestKind, RequestFailure),
}

impl Response {
    pub const fn kind(&self) -> RequestKind {
        match self {
            Self::ModeSet => RequestKind::SetMode,
            Self::Challenge(_) => RequestKind::Challenge,
            Self::Answer(_) => RequestKind::Answer,
            Self::LastAnswer { .. } => RequestKind::LastAnswer,
            Self::Reset => RequestKind::Reset,
            Self::Shop(_) => RequestKind::ShopStatus,
            Self::BossStarted(_) => RequestKind::BossStart,
            Self::BossAnswer(_) => RequestKind::BossAnswer,
            Self::Failed(kind, _) => *kind,
        }
    }
}

/// Delayed continuations; the driver hands them back after `delay_ms`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Wakeup {
    NextChallenge(RoundToken),
    NextBattleRound(RoundToken),
    OpponentAnswered(RoundToken, OpponentRoll),
    BossAdvance(RoundToken),
    BossVictory(RoundToken),
    BossFailure(RoundToken),
}

impl Wakeup {
    pub const fn token(self) -> RoundToken {
        match self {
            Self::NextChallenge(token)
            | Self::NextBattleRound(token)
            | Self::OpponentAnswered(token, _)
            | Self::BossAdvance(token)
            | Self::BossVictory(token)
            | Self::BossFailure(token) => token,
        }
    }
}

/// Sound and animation hints for the presentation layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cue {
    Correct,
    Wrong,
    Warning,
    Timeout,
    Achievement,
    Celebrate,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
    pub icon: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    Request {
        token: RoundToken,
        request: ApiRequest,
    },
    /// Start a one second ticker for `TimerId`, replacing any previous one.
    StartTicker(TimerId),
    StopTicker,
    Schedule {
        delay_ms: u32,
        wakeup: Wakeup,
    },
    Cue(Cue),
    Notify(Notice),
    /// Append a score to the history; emitted at most once per round.
    PersistScore {
        score: u64,
        mode: Mode,
    },
    /// Achievement ids reported by the service, still unvalidated.
    AchievementsEarned(Vec<String>),
    BattleFinished(BattleReport),
}

bitflags! {
    /// Controls the presentation layer may enable.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Affordances: u8 {
        const ANSWER    = 1;
        const QUIT      = 1 << 1;
        const RESTART   = 1 << 2;
        const POWER_UPS = 1 << 3;
        const RETRY     = 1 << 4;
    }
}
