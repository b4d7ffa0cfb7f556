use alloc::string::String;
use thiserror::Error;

use crate::PowerUpId;

/// User actions the controller refuses in its current state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    #[error("Answer is empty")]
    EmptyAnswer,
    #[error("No round is accepting input right now")]
    NotActive,
    #[error("An answer is already being checked")]
    SubmissionPending,
    #[error("Game already ended, no new answers are accepted")]
    AlreadyEnded,
    #[error("Only a finished game can be restarted")]
    NotFinished,
    #[error("Nothing to retry")]
    NothingToRetry,
    #[error("Mode {0} cannot be started directly")]
    NotPlayable(crate::Mode),
    #[error("Unknown mode: {0}")]
    UnknownMode(String),
    #[error("No {0} left")]
    PowerUpUnavailable(PowerUpId),
    #[error("No countdown is running")]
    NoCountdown,
}

pub type Result<T> = core::result::Result<T, ControlError>;

/// Why a request to the game service did not produce a usable response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestFailure {
    /// Transport failure or a non-OK status without a server message.
    #[error("Network failure: {0}")]
    Network(String),
    /// The server answered with an `error` field.
    #[error("{0}")]
    Validation(String),
    #[error("Request timed out")]
    TimedOut,
}
