use alloc::vec::Vec;

use crate::{BossSequence, BossVerdict, ControlError, Result};

/// Seconds shared by all sequences of one boss encounter.
pub const BOSS_SECONDS: u32 = 30;

/// Sequences the service hands out per encounter.
pub const BOSS_SEQUENCE_COUNT: usize = 3;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BossPhase {
    /// Waiting for `/api/boss/start`.
    Starting,
    Presenting(usize),
    Submitting(usize),
    /// Solved sequence `n - 1`, showing feedback before presenting `n`.
    Advancing(usize),
    Failed,
    Victorious,
}

impl BossPhase {
    pub const fn is_resolved(self) -> bool {
        matches!(self, Self::Failed | Self::Victorious)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BossStep {
    Advance(usize),
    Victory,
    Failure,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BossState {
    pub level: u32,
    pub sequences: Vec<BossSequence>,
    pub current_index: usize,
    pub seconds_left: u32,
    /// Score before the encounter; this is what a failed boss persists.
    pub score_before: u64,
    pub feedback: alloc::string::String,
    phase: BossPhase,
}

impl BossState {
    pub fn new(level: u32, score_before: u64) -> Self {
        Self {
            level,
            sequences: Vec::new(),
            current_index: 0,
            seconds_left: BOSS_SECONDS,
            score_before,
            feedback: Default::default(),
            phase: BossPhase::Starting,
        }
    }

    pub fn phase(&self) -> BossPhase {
        self.phase
    }

    pub fn load(&mut self, sequences: Vec<BossSequence>) {
        self.sequences = sequences;
        self.current_index = 0;
        self.phase = if self.sequences.is_empty() {
            BossPhase::Victorious
        } else {
            BossPhase::Presenting(0)
        };
    }

    pub fn current(&self) -> Option<&BossSequence> {
        match self.phase {
            BossPhase::Presenting(index) | BossPhase::Submitting(index) => {
                self.sequences.get(index)
            }
            _ => None,
        }
    }

    /// Progress label such as `1/3`.
    pub fn progress(&self) -> (usize, usize) {
        (self.current_index, self.sequences.len())
    }

    pub fn begin_submit(&mut self) -> Result<usize> {
        match self.phase {
            BossPhase::Presenting(index) => {
                self.phase = BossPhase::Submitting(index);
                Ok(index)
            }
            BossPhase::Submitting(_) => Err(ControlError::SubmissionPending),
            BossPhase::Failed | BossPhase::Victorious => Err(ControlError::AlreadyEnded),
            BossPhase::Starting | BossPhase::Advancing(_) => Err(ControlError::NotActive),
        }
    }

    /// Re-enables the current sequence after a failed request.
    pub fn cancel_submit(&mut self) {
        if let BossPhase::Submitting(index) = self.phase {
            self.phase = BossPhase::Presenting(index);
        }
    }

    /// Applies a service verdict. `None` when no submission was pending.
    pub fn apply(&mut self, verdict: &BossVerdict) -> Option<BossStep> {
        let BossPhase::Submitting(index) = self.phase else {
            return None;
        };

        if !verdict.correct {
            self.phase = BossPhase::Failed;
            return Some(BossStep::Failure);
        }

        self.current_index = index + 1;
        if verdict.boss_defeated || self.current_index >= self.sequences.len() {
            self.phase = BossPhase::Victorious;
            Some(BossStep::Victory)
        } else {
            self.phase = BossPhase::Advancing(self.current_index);
            Some(BossStep::Advance(self.current_index))
        }
    }

    /// Presents the next sequence after the advance delay.
    pub fn advance(&mut self) -> bool {
        match self.phase {
            BossPhase::Advancing(index) => {
                self.phase = BossPhase::Presenting(index);
                true
            }
            _ => false,
        }
    }

    /// Fails the encounter unless it already resolved. Returns whether this call failed it.
    pub fn fail(&mut self) -> bool {
        if self.phase.is_resolved() {
            return false;
        }
        self.phase = BossPhase::Failed;
        true
    }
}
