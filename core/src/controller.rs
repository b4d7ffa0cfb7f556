use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::mem;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::*;

/// What a restart resumes once the service acknowledged the reset.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Resume {
    Round(Mode),
    Battle(BattleType),
}

/// Owns the client-side round lifecycle.
///
/// The controller never performs I/O. User actions and service results go in
/// through its methods; everything it wants done comes out of
/// [`RoundController::drain_effects`].
#[derive(Clone, Debug)]
pub struct RoundController {
    state: RoundState,
    token: RoundToken,
    countdown: Countdown,
    timings: Timings,
    shop: ShopState,
    battle: Option<BattleState>,
    boss: Option<BossState>,
    game_over: Option<GameOverReason>,
    score_persisted: bool,
    stalled: Option<RequestKind>,
    resume: Option<Resume>,
    rng: SmallRng,
    effects: Vec<Effect>,
}

impl RoundController {
    pub fn new(seed: u64) -> Self {
        Self::with_timings(seed, Timings::default())
    }

    pub fn with_timings(seed: u64, timings: Timings) -> Self {
        Self {
            state: RoundState::default(),
            token: RoundToken::default(),
            countdown: Countdown::new(),
            timings,
            shop: ShopState::default(),
            battle: None,
            boss: None,
            game_over: None,
            score_persisted: false,
            stalled: None,
            resume: None,
            rng: SmallRng::seed_from_u64(seed),
            effects: Vec::new(),
        }
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn token(&self) -> RoundToken {
        self.token
    }

    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    pub fn shop(&self) -> &ShopState {
        &self.shop
    }

    pub fn battle(&self) -> Option<&BattleState> {
        self.battle.as_ref()
    }

    pub fn boss(&self) -> Option<&BossState> {
        self.boss.as_ref()
    }

    pub fn game_over_reason(&self) -> Option<GameOverReason> {
        self.game_over
    }

    pub fn is_stalled(&self) -> bool {
        self.stalled.is_some()
    }

    pub fn timer_fraction(&self) -> f32 {
        self.countdown.fraction_left()
    }

    pub fn drain_effects(&mut self) -> Vec<Effect> {
        mem::take(&mut self.effects)
    }

    pub fn affordances(&self) -> Affordances {
        let mut affordances = Affordances::empty();
        match self.state.phase {
            Phase::Idle => {}
            Phase::Loading => {
                affordances |= Affordances::QUIT;
                if self.stalled.is_some() {
                    affordances |= Affordances::RETRY;
                }
            }
            Phase::Active => {
                affordances |= Affordances::QUIT;
                let answerable = self
                    .boss
                    .as_ref()
                    .is_none_or(|boss| matches!(boss.phase(), BossPhase::Presenting(_)));
                if answerable {
                    affordances |= Affordances::ANSWER;
                }
                if self.boss.is_none() && self.battle.is_none() {
                    affordances |= Affordances::POWER_UPS;
                }
            }
            Phase::Submitting | Phase::Resolved => affordances |= Affordances::QUIT,
            Phase::GameOver => affordances |= Affordances::RESTART,
        }
        affordances
    }

    /// Begins a single player game in `mode`, abandoning whatever ran before.
    pub fn start_round(&mut self, mode: Mode) -> Result<()> {
        if !mode.is_playable() {
            return Err(ControlError::NotPlayable(mode));
        }

        log::debug!("starting {} game", mode);
        self.reset_session(mode);
        self.resume = Some(Resume::Round(mode));
        self.state.phase = Phase::Loading;
        self.request(ApiRequest::SetMode(mode));
        Ok(())
    }

    pub fn start_battle(&mut self, battle_type: BattleType) {
        log::debug!("starting {:?} battle", battle_type);
        self.reset_session(Mode::Battle);
        let battle = BattleState::new(battle_type);
        self.state.feedback = format!("Battle: You vs {}", battle.opponent_name);
        self.battle = Some(battle);
        self.resume = Some(Resume::Battle(battle_type));
        self.state.phase = Phase::Loading;
        // battles are played on classic sequences
        self.request(ApiRequest::SetMode(Mode::Classic));
    }

    /// Tears down the current game; anything still in flight becomes stale.
    pub fn dispose(&mut self) {
        let mode = self.state.mode;
        self.reset_session(mode);
        self.resume = None;
    }

    pub fn restart(&mut self) -> Result<()> {
        if self.state.phase != Phase::GameOver {
            return Err(ControlError::NotFinished);
        }

        let mode = self.state.mode;
        self.reset_session(mode);
        self.request(ApiRequest::Reset);
        Ok(())
    }

    /// Ends the game from any phase. Quitting a battle forfeits the whole match.
    pub fn quit(&mut self) {
        if matches!(self.state.phase, Phase::Idle | Phase::GameOver) {
            return;
        }

        let score = if let Some(boss) = self.boss.take() {
            boss.score_before
        } else if let Some(battle) = self.battle.take() {
            battle.player_score
        } else {
            self.state.score
        };

        self.state.score = score;
        self.state.feedback = "Game Over!".into();
        self.finish_game(GameOverReason::Quit, score);
        self.token = self.token.next();
    }

    pub fn retry(&mut self) -> Result<()> {
        let kind = self.stalled.take().ok_or(ControlError::NothingToRetry)?;
        self.state.feedback.clear();
        match kind {
            RequestKind::SetMode => {
                let mode = if self.battle.is_some() {
                    Mode::Classic
                } else {
                    self.state.mode
                };
                self.request(ApiRequest::SetMode(mode));
            }
            _ => {
                self.boss = None;
                self.state.phase = Phase::Loading;
                self.request(ApiRequest::Challenge);
            }
        }
        Ok(())
    }

    pub fn refresh_shop(&mut self) {
        self.request(ApiRequest::ShopStatus);
    }

    pub fn purchase(&mut self, id: PowerUpId) {
        self.request(ApiRequest::Purchase(id));
    }

    pub fn submit_answer(&mut self, text: &str) -> Result<()> {
        let answer = text.trim();
        if answer.is_empty() {
            return Err(ControlError::EmptyAnswer);
        }

        if let Some(boss) = self.boss.as_mut() {
            boss.begin_submit()?;
            self.request(ApiRequest::BossAnswer(answer.into()));
            return Ok(());
        }

        match self.state.phase {
            Phase::Active => {}
            Phase::Submitting => return Err(ControlError::SubmissionPending),
            Phase::GameOver => return Err(ControlError::AlreadyEnded),
            Phase::Idle | Phase::Loading | Phase::Resolved => return Err(ControlError::NotActive),
        }

        self.state.phase = Phase::Submitting;
        self.state.feedback = "Checking answer...".into();
        self.request(ApiRequest::Answer(answer.into()));
        Ok(())
    }

    pub fn use_power_up(&mut self, id: PowerUpId) -> Result<()> {
        if self.state.phase != Phase::Active || self.boss.is_some() || self.battle.is_some() {
            return Err(ControlError::NotActive);
        }
        if self.shop.count(id) == 0 {
            return Err(ControlError::PowerUpUnavailable(id));
        }

        match id {
            PowerUpId::TimeFreeze => {
                if !self.countdown.is_running() {
                    return Err(ControlError::NoCountdown);
                }
                self.shop.consume(id)?;
                self.state.timer_seconds_left = self.countdown.extend(TIME_FREEZE_SECONDS);
                self.state.feedback = format!("⏱️ +{TIME_FREEZE_SECONDS} seconds added!");
                self.emit(Effect::Cue(Cue::Achievement));
            }
            PowerUpId::Debugger => {
                self.shop.consume(id)?;
                self.request(ApiRequest::LastAnswer(Reveal::Debugger));
            }
            PowerUpId::Skip => {
                self.shop.consume(id)?;
                self.stop_countdown();
                self.state.phase = Phase::Resolved;
                self.state.feedback = "⏭️ Skipping level...".into();
                self.emit(Effect::Cue(Cue::Achievement));
                self.schedule(self.timings.skip_ms, Wakeup::NextChallenge(self.token));
            }
        }
        Ok(())
    }

    pub fn on_tick(&mut self, id: TimerId) {
        match self.countdown.tick(id) {
            Tick::Ignored => log::trace!("ignoring tick of replaced countdown"),
            Tick::Running { left, low_time } => {
                match self.boss.as_mut() {
                    Some(boss) => boss.seconds_left = left,
                    None => self.state.timer_seconds_left = Some(left),
                }
                if low_time {
                    self.emit(Effect::Cue(Cue::Warning));
                }
            }
            Tick::Expired => {
                self.emit(Effect::StopTicker);
                self.emit(Effect::Cue(Cue::Timeout));
                if let Some(boss) = self.boss.as_mut() {
                    boss.seconds_left = 0;
                    self.fail_boss("⏰ Time's up! Boss Battle Failed!".into());
                } else {
                    self.state.timer_seconds_left = Some(0);
                    self.state.feedback = "⏰ Time is up! Game Over.".into();
                    self.finish_game(GameOverReason::TimeUp, self.state.score);
                    self.request(ApiRequest::LastAnswer(Reveal::TimeUp));
                }
            }
        }
    }

    pub fn on_wakeup(&mut self, wakeup: Wakeup) {
        if wakeup.token() != self.token {
            log::debug!("discarding stale wakeup {:?}", wakeup);
            return;
        }

        match wakeup {
            Wakeup::NextChallenge(_) => {
                if self.state.phase == Phase::Resolved && self.battle.is_none() {
                    self.load_next_challenge();
                }
            }
            Wakeup::NextBattleRound(_) => {
                if let Some(battle) = self.battle.as_mut() {
                    battle.settle_player();
                }
                self.advance_battle_if_settled();
            }
            Wakeup::OpponentAnswered(_, roll) => {
                if let Some(battle) = self.battle.as_mut() {
                    battle.settle_opponent(roll);
                }
                self.advance_battle_if_settled();
            }
            Wakeup::BossAdvance(_) => {
                if let Some(boss) = self.boss.as_mut() {
                    if boss.advance() {
                        boss.feedback.clear();
                    }
                }
            }
            Wakeup::BossVictory(_) => {
                if self
                    .boss
                    .take_if(|boss| boss.phase() == BossPhase::Victorious)
                    .is_some()
                {
                    self.refresh_shop();
                    self.load_next_challenge();
                }
            }
            Wakeup::BossFailure(_) => {
                if let Some(boss) = self
                    .boss
                    .take_if(|boss| boss.phase() == BossPhase::Failed)
                {
                    self.state.score = boss.score_before;
                    self.state.feedback = boss.feedback;
                    self.finish_game(GameOverReason::BossFailed, boss.score_before);
                }
            }
        }
    }

    /// Feeds back the result of a request issued under `token`.
    pub fn handle(&mut self, token: RoundToken, response: Response) {
        let kind = response.kind();
        if kind.is_round_scoped() && token != self.token {
            log::debug!(
                "discarding stale {:?} response for round {}",
                kind,
                token.get()
            );
            return;
        }

        match response {
            Response::ModeSet => self.on_mode_set(),
            Response::Challenge(challenge) => self.on_challenge(challenge),
            Response::Answer(verdict) => self.on_answer(verdict),
            Response::LastAnswer { reveal, answer } => self.on_last_answer(reveal, answer),
            Response::Reset => self.on_reset(),
            Response::Shop(shop) => self.shop = shop,
            Response::BossStarted(sequences) => self.on_boss_started(sequences),
            Response::BossAnswer(verdict) => self.on_boss_answer(verdict),
            Response::Failed(kind, failure) => self.on_failure(kind, failure),
        }
    }

    fn on_mode_set(&mut self) {
        if self.state.phase != Phase::Loading {
            return;
        }
        match &self.battle {
            Some(battle) if battle.round == 0 => self.next_battle_round(),
            _ => self.request(ApiRequest::Challenge),
        }
    }

    fn on_challenge(&mut self, challenge: Challenge) {
        if self.state.phase != Phase::Loading {
            log::debug!("challenge arrived outside of loading, ignoring");
            return;
        }

        if let Some(battle) = self.battle.as_ref() {
            if challenge.is_boss {
                log::debug!("boss level reached during battle, resetting service level");
                self.request(ApiRequest::SetMode(Mode::Classic));
                return;
            }
            let battle_type = battle.battle_type;
            self.present(&challenge);
            self.state.timer_seconds_left = None;
            let roll = OpponentRoll::roll(battle_type, &self.timings, &mut self.rng);
            self.schedule(roll.delay_ms, Wakeup::OpponentAnswered(self.token, roll));
            return;
        }

        if challenge.is_boss {
            self.enter_boss(challenge.level);
            return;
        }

        if let Some(mode) = challenge.mode.filter(|mode| mode.is_playable()) {
            self.state.mode = mode;
        }
        self.present(&challenge);
        self.state.feedback.clear();
        self.state.timer_seconds_left = self.state.mode.timer_seconds().map(|seconds| {
            let id = self.countdown.start(seconds);
            self.effects.push(Effect::StartTicker(id));
            seconds
        });
    }

    fn on_answer(&mut self, verdict: AnswerVerdict) {
        if self.state.phase != Phase::Submitting {
            log::debug!("answer arrived after the round closed, ignoring");
            return;
        }

        if self.battle.is_some() {
            self.on_battle_answer(verdict);
            return;
        }

        self.stop_countdown();
        if verdict.game_over {
            let score = extract_score(&verdict.message).unwrap_or(self.state.score);
            self.state.score = score;
            self.state.feedback = match verdict.correct_answer {
                Some(answer) => format!("{}\nCorrect answer: {}", verdict.message, answer),
                None => verdict.message,
            };
            self.emit(Effect::Cue(Cue::Wrong));
            self.finish_game(GameOverReason::WrongAnswer, score);
            return;
        }

        if let Some(score) = extract_score(&verdict.message) {
            self.state.score = score;
        }
        if let Some(shop) = verdict.shop {
            self.shop = shop;
        }
        if !verdict.new_achievements.is_empty() {
            self.emit(Effect::AchievementsEarned(verdict.new_achievements));
        }
        self.emit(Effect::Cue(Cue::Correct));
        self.emit(Effect::Cue(Cue::Celebrate));
        self.state.feedback = verdict.message;
        self.state.phase = Phase::Resolved;
        self.schedule(
            self.timings.next_challenge_ms,
            Wakeup::NextChallenge(self.token),
        );
    }

    fn on_battle_answer(&mut self, verdict: AnswerVerdict) {
        let points = (!verdict.game_over).then(|| roll_points(&mut self.rng));
        if let Some(battle) = self.battle.as_mut() {
            battle.award_player(points.unwrap_or(0));
        }

        match points {
            Some(_) => {
                self.emit(Effect::Cue(Cue::Correct));
                self.emit(Effect::Cue(Cue::Celebrate));
            }
            None => self.emit(Effect::Cue(Cue::Wrong)),
        }
        self.state.feedback = verdict.message;
        self.state.phase = Phase::Resolved;
        self.schedule(
            self.timings.battle_next_round_ms,
            Wakeup::NextBattleRound(self.token),
        );
    }

    fn on_last_answer(&mut self, reveal: Reveal, answer: Option<String>) {
        match reveal {
            Reveal::TimeUp => {
                if self.game_over == Some(GameOverReason::TimeUp) {
                    self.state.feedback = match answer {
                        Some(answer) => {
                            format!("⏰ Time is up! Game Over. The correct answer was: {answer}")
                        }
                        None => "⏰ Time is up! Game Over.".into(),
                    };
                }
            }
            Reveal::Debugger => {
                if !self.state.phase.is_playing() {
                    return;
                }
                let chars: Vec<char> = answer
                    .iter()
                    .flat_map(|answer| answer.chars())
                    .filter(|c| !c.is_whitespace())
                    .collect();
                if chars.is_empty() {
                    self.state.feedback = "🔍 No hint available for this sequence".into();
                    return;
                }
                let hint = chars[self.rng.random_range(0..chars.len())];
                self.state.feedback = format!("🔍 Hint: The answer contains \"{hint}\"");
                self.emit(Effect::Cue(Cue::Achievement));
            }
        }
    }

    fn on_reset(&mut self) {
        if self.state.phase != Phase::Idle {
            return;
        }
        match self.resume {
            Some(Resume::Round(mode)) => {
                if let Err(err) = self.start_round(mode) {
                    log::error!("could not resume after reset: {}", err);
                }
            }
            Some(Resume::Battle(battle_type)) => self.start_battle(battle_type),
            None => {}
        }
    }

    fn on_boss_started(&mut self, sequences: Vec<BossSequence>) {
        let Some(boss) = self
            .boss
            .as_mut()
            .filter(|boss| boss.phase() == BossPhase::Starting)
        else {
            return;
        };

        boss.load(sequences);
        if boss.phase() == BossPhase::Victorious {
            self.schedule(self.timings.boss_victory_ms, Wakeup::BossVictory(self.token));
            return;
        }
        boss.seconds_left = BOSS_SECONDS;
        let id = self.countdown.start(BOSS_SECONDS);
        self.emit(Effect::StartTicker(id));
    }

    fn on_boss_answer(&mut self, verdict: BossVerdict) {
        let Some(boss) = self.boss.as_mut() else {
            return;
        };
        let Some(step) = boss.apply(&verdict) else {
            log::debug!("boss verdict without a pending answer, ignoring");
            return;
        };

        match step {
            BossStep::Advance(_) => {
                boss.feedback = verdict.message;
                self.emit(Effect::Cue(Cue::Correct));
                self.schedule(self.timings.boss_advance_ms, Wakeup::BossAdvance(self.token));
            }
            BossStep::Victory => {
                boss.feedback = if verdict.message.is_empty() {
                    "🎉 BOSS DEFEATED! 🎉".into()
                } else {
                    verdict.message
                };
                self.stop_countdown();
                self.emit(Effect::Cue(Cue::Achievement));
                self.emit(Effect::Cue(Cue::Celebrate));
                self.schedule(self.timings.boss_victory_ms, Wakeup::BossVictory(self.token));
            }
            BossStep::Failure => {
                boss.feedback = match verdict.correct_answer {
                    Some(answer) => format!("{}\nCorrect answer: {}", verdict.message, answer),
                    None => verdict.message,
                };
                self.after_boss_failure();
            }
        }
    }

    fn on_failure(&mut self, kind: RequestKind, failure: RequestFailure) {
        log::warn!("{:?} request failed: {}", kind, failure);
        match kind {
            RequestKind::SetMode | RequestKind::Challenge => {
                if self.state.phase != Phase::Loading {
                    return;
                }
                self.fail_loading(kind, failure);
            }
            RequestKind::BossStart => {
                if self
                    .boss
                    .as_ref()
                    .is_some_and(|boss| boss.phase() == BossPhase::Starting)
                {
                    self.boss = None;
                    self.state.phase = Phase::Loading;
                    self.fail_loading(RequestKind::Challenge, failure);
                }
            }
            RequestKind::Answer => {
                if self.state.phase != Phase::Submitting {
                    return;
                }
                self.state.phase = Phase::Active;
                self.state.feedback = submission_message(failure);
            }
            RequestKind::BossAnswer => {
                if let Some(boss) = self.boss.as_mut() {
                    boss.cancel_submit();
                    boss.feedback = submission_message(failure);
                }
            }
            RequestKind::LastAnswer => {
                if self.state.phase.is_playing() && self.boss.is_none() {
                    self.state.feedback = "🔍 Hint unavailable right now".into();
                }
            }
            RequestKind::Reset => {
                if self.state.phase == Phase::Idle {
                    self.state.feedback = "Failed to reset the game. Please try again.".into();
                }
            }
            RequestKind::ShopStatus => {}
            RequestKind::Purchase => {
                let message = match failure {
                    RequestFailure::Validation(message) => message,
                    other => other.to_string(),
                };
                self.emit(Effect::Notify(Notice {
                    title: "Shop".into(),
                    message,
                    icon: "🛒",
                }));
            }
        }
    }

    fn fail_loading(&mut self, kind: RequestKind, failure: RequestFailure) {
        match failure {
            RequestFailure::Validation(message) => {
                // e.g. the daily challenge was already played today
                // a battle counts as played once its first round is over
                let played = match &self.battle {
                    Some(battle) => battle.round > 1,
                    None => self.state.score > 0,
                };
                if played {
                    let score = self
                        .battle
                        .take()
                        .map_or(self.state.score, |battle| battle.player_score);
                    self.state.score = score;
                    self.finish_game(GameOverReason::ChallengesExhausted, score);
                } else {
                    self.stop_countdown();
                    self.battle = None;
                    self.state.phase = Phase::Idle;
                }
                self.state.feedback = message.clone();
                self.emit(Effect::Notify(Notice {
                    title: "Error".into(),
                    message,
                    icon: "⚠️",
                }));
            }
            _ => {
                self.stalled = Some(kind);
                self.state.feedback = "Failed to load challenge. Please try again.".into();
                self.emit(Effect::Notify(Notice {
                    title: "Error".into(),
                    message: "Failed to load challenge. Please try again.".into(),
                    icon: "⚠️",
                }));
            }
        }
    }

    fn present(&mut self, challenge: &Challenge) {
        self.state.level = challenge.level;
        self.state.score = challenge.score;
        self.state.sequence_display = challenge.sequence_display();
        self.state.hint_text = challenge.hint.clone();
        self.state.phase = Phase::Active;
    }

    fn enter_boss(&mut self, level: u32) {
        log::debug!("boss encounter at level {}", level);
        self.stop_countdown();
        self.state.level = level;
        self.state.timer_seconds_left = None;
        self.state.phase = Phase::Active;
        self.state.feedback = format!(
            "🔥 BOSS BATTLE - Level {level}! Complete {BOSS_SEQUENCE_COUNT} sequences in {BOSS_SECONDS} seconds!"
        );
        self.boss = Some(BossState::new(level, self.state.score));
        self.emit(Effect::Cue(Cue::Warning));
        self.request(ApiRequest::BossStart);
    }

    fn fail_boss(&mut self, message: String) {
        let Some(boss) = self.boss.as_mut() else {
            return;
        };
        if !boss.fail() {
            return;
        }
        boss.feedback = message;
        self.after_boss_failure();
    }

    fn after_boss_failure(&mut self) {
        self.stop_countdown();
        self.emit(Effect::Cue(Cue::Wrong));
        self.schedule(self.timings.boss_failure_ms, Wakeup::BossFailure(self.token));
    }

    fn next_battle_round(&mut self) {
        let Some(battle) = self.battle.as_mut() else {
            return;
        };

        match battle.begin_round() {
            Some(round) => {
                let total = battle.total_rounds;
                self.token = self.token.next();
                self.state.phase = Phase::Loading;
                self.state.feedback = format!("Round {round} of {total}");
                self.request(ApiRequest::Challenge);
            }
            None => {
                let score = battle.player_score;
                if let Some(report) = battle.report() {
                    self.state.feedback = format!(
                        "{} You {} - {} {}",
                        report.outcome.headline(),
                        report.player_score,
                        report.opponent_score,
                        report.opponent_name
                    );
                    self.emit(Effect::BattleFinished(report));
                }
                self.state.score = score;
                self.finish_game(GameOverReason::BattleComplete, score);
            }
        }
    }

    fn advance_battle_if_settled(&mut self) {
        if self.battle.as_ref().is_some_and(BattleState::round_settled) {
            self.next_battle_round();
        }
    }

    fn load_next_challenge(&mut self) {
        self.token = self.token.next();
        self.state.phase = Phase::Loading;
        self.request(ApiRequest::Challenge);
    }

    /// Moves to the terminal phase. Only the first call per round has any effect.
    fn finish_game(&mut self, reason: GameOverReason, score: u64) {
        if self.game_over.is_some() {
            return;
        }

        log::debug!("game over ({:?}) with score {}", reason, score);
        self.stop_countdown();
        self.game_over = Some(reason);
        self.state.phase = Phase::GameOver;
        if !mem::replace(&mut self.score_persisted, true) {
            self.emit(Effect::PersistScore {
                score,
                mode: self.state.mode,
            });
        }
    }

    fn reset_session(&mut self, mode: Mode) {
        self.stop_countdown();
        self.battle = None;
        self.boss = None;
        self.game_over = None;
        self.score_persisted = false;
        self.stalled = None;
        self.token = self.token.next();
        self.state = RoundState::new(mode);
    }

    fn stop_countdown(&mut self) {
        if self.countdown.stop() {
            self.emit(Effect::StopTicker);
        }
    }

    fn request(&mut self, request: ApiRequest) {
        self.emit(Effect::Request {
            token: self.token,
            request,
        });
    }

    fn schedule(&mut self, delay_ms: u32, wakeup: Wakeup) {
        self.emit(Effect::Schedule { delay_ms, wakeup });
    }

    fn emit(&mut self, effect: Effect) {
        self.effects.push(effect);
    }
}

fn submission_message(failure: RequestFailure) -> String {
    match failure {
        RequestFailure::Validation(message) => message,
        RequestFailure::Network(_) => "Error submitting answer. Please try again.".into(),
        RequestFailure::TimedOut => "The server took too long to answer. Please try again.".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn challenge(level: u32, score: u64) -> Challenge {
        Challenge {
            level,
            score,
            sequence: vec!["2".into(), "4".into(), "6".into(), "8".into()],
            hint: "Even numbers".into(),
            mode: None,
            is_boss: false,
        }
    }

    fn correct(score: u64) -> AnswerVerdict {
        AnswerVerdict {
            message: format!("Correct! Score: {score}"),
            ..Default::default()
        }
    }

    fn requests(effects: &[Effect]) -> Vec<ApiRequest> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Request { request, .. } => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    fn ticker(effects: &[Effect]) -> Option<TimerId> {
        effects.iter().find_map(|effect| match effect {
            Effect::StartTicker(id) => Some(*id),
            _ => None,
        })
    }

    fn wakeups(effects: &[Effect]) -> Vec<(u32, Wakeup)> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Schedule { delay_ms, wakeup } => Some((*delay_ms, *wakeup)),
                _ => None,
            })
            .collect()
    }

    fn persisted(effects: &[Effect]) -> Vec<(u64, Mode)> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::PersistScore { score, mode } => Some((*score, *mode)),
                _ => None,
            })
            .collect()
    }

    /// Starts `mode` and answers the mode switch and first challenge.
    fn playing(mode: Mode, first: Challenge) -> (RoundController, Vec<Effect>) {
        let mut ctl = RoundController::new(42);
        ctl.start_round(mode).unwrap();
        assert_eq!(requests(&ctl.drain_effects()), vec![ApiRequest::SetMode(mode)]);
        ctl.handle(ctl.token(), Response::ModeSet);
        assert_eq!(requests(&ctl.drain_effects()), vec![ApiRequest::Challenge]);
        ctl.handle(ctl.token(), Response::Challenge(first));
        let effects = ctl.drain_effects();
        (ctl, effects)
    }

    #[test]
    fn classic_correct_answer_schedules_next_challenge() {
        let (mut ctl, effects) = playing(Mode::Classic, challenge(1, 0));
        assert!(ticker(&effects).is_some());
        assert_eq!(ctl.phase(), Phase::Active);
        assert_eq!(ctl.state().sequence_display, "2 4 6 8");
        assert_eq!(ctl.state().timer_seconds_left, Some(20));

        ctl.submit_answer(" 10 ").unwrap();
        let effects = ctl.drain_effects();
        assert_eq!(requests(&effects), vec![ApiRequest::Answer("10".into())]);
        assert_eq!(ctl.phase(), Phase::Submitting);
        assert_eq!(ctl.submit_answer("10"), Err(ControlError::SubmissionPending));

        ctl.handle(ctl.token(), Response::Answer(correct(100)));
        let effects = ctl.drain_effects();
        assert_eq!(ctl.state().score, 100);
        assert_eq!(ctl.phase(), Phase::Resolved);
        assert!(effects.contains(&Effect::StopTicker));
        assert_eq!(
            wakeups(&effects),
            vec![(900, Wakeup::NextChallenge(ctl.token()))]
        );

        let (_, wakeup) = wakeups(&effects)[0];
        ctl.on_wakeup(wakeup);
        assert_eq!(requests(&ctl.drain_effects()), vec![ApiRequest::Challenge]);
        assert_eq!(ctl.phase(), Phase::Loading);
    }

    #[test]
    fn speed_timeout_ends_game_and_reveals_answer() {
        let (mut ctl, effects) = playing(Mode::Speed, challenge(1, 0));
        let id = ticker(&effects).unwrap();

        for left in (1..10).rev() {
            ctl.on_tick(id);
            assert_eq!(ctl.state().timer_seconds_left, Some(left));
        }
        let effects = ctl.drain_effects();
        let warnings = effects
            .iter()
            .filter(|effect| **effect == Effect::Cue(Cue::Warning))
            .count();
        assert_eq!(warnings, 5);

        ctl.on_tick(id);
        let effects = ctl.drain_effects();
        assert_eq!(ctl.phase(), Phase::GameOver);
        assert_eq!(ctl.game_over_reason(), Some(GameOverReason::TimeUp));
        assert_eq!(persisted(&effects), vec![(0, Mode::Speed)]);
        assert_eq!(
            requests(&effects),
            vec![ApiRequest::LastAnswer(Reveal::TimeUp)]
        );
        assert!(ctl.affordances().contains(Affordances::RESTART));
        assert!(!ctl.affordances().contains(Affordances::ANSWER));

        ctl.handle(
            ctl.token(),
            Response::LastAnswer {
                reveal: Reveal::TimeUp,
                answer: Some("42".into()),
            },
        );
        assert!(ctl.state().feedback.contains("42"));
        assert_eq!(ctl.submit_answer("42"), Err(ControlError::AlreadyEnded));
    }

    #[test]
    fn late_answer_after_timeout_persists_once() {
        let (mut ctl, effects) = playing(Mode::Speed, challenge(2, 30));
        let id = ticker(&effects).unwrap();
        ctl.submit_answer("10").unwrap();
        let token = ctl.token();

        for _ in 0..10 {
            ctl.on_tick(id);
        }
        ctl.handle(
            token,
            Response::Answer(AnswerVerdict {
                message: "Wrong! Game Over! Final Score: 30".into(),
                game_over: true,
                ..Default::default()
            }),
        );
        ctl.quit();

        let effects = ctl.drain_effects();
        assert_eq!(persisted(&effects), vec![(30, Mode::Speed)]);
        assert_eq!(ctl.game_over_reason(), Some(GameOverReason::TimeUp));
    }

    #[test]
    fn wrong_answer_persists_final_score_and_shows_answer() {
        let (mut ctl, _) = playing(Mode::Classic, challenge(3, 200));
        ctl.submit_answer("11").unwrap();
        ctl.handle(
            ctl.token(),
            Response::Answer(AnswerVerdict {
                message: "Wrong! Game Over! Final Score: 200".into(),
                game_over: true,
                correct_answer: Some("10".into()),
                ..Default::default()
            }),
        );

        let effects = ctl.drain_effects();
        assert_eq!(persisted(&effects), vec![(200, Mode::Classic)]);
        assert!(effects.contains(&Effect::Cue(Cue::Wrong)));
        assert!(ctl.state().feedback.contains("Correct answer: 10"));
        assert_eq!(ctl.phase(), Phase::GameOver);
    }

    #[test]
    fn restart_mid_timer_orphans_old_ticks() {
        let (mut ctl, effects) = playing(Mode::Classic, challenge(1, 0));
        let old = ticker(&effects).unwrap();
        let old_token = ctl.token();

        ctl.start_round(Mode::Speed).unwrap();
        let effects = ctl.drain_effects();
        assert!(effects.contains(&Effect::StopTicker));

        for _ in 0..30 {
            ctl.on_tick(old);
        }
        ctl.handle(old_token, Response::Challenge(challenge(9, 900)));
        ctl.handle(old_token, Response::Answer(correct(900)));

        let effects = ctl.drain_effects();
        assert!(persisted(&effects).is_empty());
        assert_eq!(ctl.phase(), Phase::Loading);
        assert_eq!(ctl.state().mode, Mode::Speed);
        assert_eq!(ctl.state().score, 0);
    }

    #[test]
    fn quit_persists_once_and_drops_in_flight_work() {
        let (mut ctl, _) = playing(Mode::Classic, challenge(4, 300));
        ctl.submit_answer("10").unwrap();
        let token = ctl.token();

        ctl.quit();
        ctl.quit();
        ctl.handle(token, Response::Answer(correct(400)));

        let effects = ctl.drain_effects();
        assert_eq!(persisted(&effects), vec![(300, Mode::Classic)]);
        assert_eq!(ctl.game_over_reason(), Some(GameOverReason::Quit));
        assert_eq!(ctl.state().score, 300);
    }

    #[test]
    fn zen_rounds_have_no_countdown() {
        let (ctl, effects) = playing(Mode::Zen, challenge(1, 0));

        assert_eq!(ticker(&effects), None);
        assert_eq!(ctl.state().timer_seconds_left, None);
        assert!(ctl.affordances().contains(Affordances::ANSWER));
    }

    #[test]
    fn empty_answer_is_rejected_without_a_request() {
        let (mut ctl, _) = playing(Mode::Classic, challenge(1, 0));

        assert_eq!(ctl.submit_answer("   "), Err(ControlError::EmptyAnswer));
        assert!(requests(&ctl.drain_effects()).is_empty());
        assert_eq!(ctl.phase(), Phase::Active);
    }

    #[test]
    fn failed_submission_reenables_input() {
        let (mut ctl, _) = playing(Mode::Classic, challenge(1, 0));
        ctl.submit_answer("7").unwrap();
        ctl.handle(
            ctl.token(),
            Response::Failed(RequestKind::Answer, RequestFailure::TimedOut),
        );
        assert_eq!(ctl.phase(), Phase::Active);

        ctl.submit_answer("7").unwrap();
        ctl.handle(
            ctl.token(),
            Response::Failed(
                RequestKind::Answer,
                RequestFailure::Validation("No active challenge".into()),
            ),
        );
        assert_eq!(ctl.phase(), Phase::Active);
        assert_eq!(ctl.state().feedback, "No active challenge");
    }

    #[test]
    fn stalled_challenge_can_be_retried() {
        let mut ctl = RoundController::new(1);
        ctl.start_round(Mode::Classic).unwrap();
        ctl.handle(ctl.token(), Response::ModeSet);
        ctl.handle(
            ctl.token(),
            Response::Failed(RequestKind::Challenge, RequestFailure::Network("offline".into())),
        );
        ctl.drain_effects();

        assert!(ctl.affordances().contains(Affordances::RETRY));
        ctl.retry().unwrap();
        assert_eq!(requests(&ctl.drain_effects()), vec![ApiRequest::Challenge]);
        assert_eq!(ctl.retry(), Err(ControlError::NothingToRetry));
    }

    #[test]
    fn daily_already_played_returns_to_idle() {
        let mut ctl = RoundController::new(1);
        ctl.start_round(Mode::Daily).unwrap();
        ctl.handle(ctl.token(), Response::ModeSet);
        ctl.handle(
            ctl.token(),
            Response::Failed(
                RequestKind::Challenge,
                RequestFailure::Validation("Daily challenge already completed".into()),
            ),
        );

        assert_eq!(ctl.phase(), Phase::Idle);
        assert!(!ctl.is_stalled());
        assert!(ctl.drain_effects().iter().any(|e| matches!(e, Effect::Notify(_))));
    }

    #[test]
    fn restart_resets_then_resumes_mode() {
        let (mut ctl, _) = playing(Mode::CodeBreaker, challenge(1, 0));
        assert_eq!(ctl.restart(), Err(ControlError::NotFinished));
        ctl.quit();
        ctl.drain_effects();

        ctl.restart().unwrap();
        assert_eq!(requests(&ctl.drain_effects()), vec![ApiRequest::Reset]);
        assert_eq!(ctl.phase(), Phase::Idle);

        ctl.handle(ctl.token(), Response::Reset);
        assert_eq!(
            requests(&ctl.drain_effects()),
            vec![ApiRequest::SetMode(Mode::CodeBreaker)]
        );
        assert_eq!(ctl.phase(), Phase::Loading);
    }

    /// Plays one classic round to 400 and lands on a boss level.
    fn boss_intro() -> RoundController {
        let (mut ctl, _) = playing(Mode::Classic, challenge(4, 300));
        ctl.submit_answer("10").unwrap();
        ctl.handle(ctl.token(), Response::Answer(correct(400)));
        for (_, wakeup) in wakeups(&ctl.drain_effects()) {
            ctl.on_wakeup(wakeup);
        }
        assert_eq!(requests(&ctl.drain_effects()), vec![ApiRequest::Challenge]);

        // boss payloads carry no sequence or score
        ctl.handle(
            ctl.token(),
            Response::Challenge(Challenge {
                level: 5,
                is_boss: true,
                ..Default::default()
            }),
        );
        let effects = ctl.drain_effects();
        assert_eq!(requests(&effects), vec![ApiRequest::BossStart]);
        assert!(effects.contains(&Effect::Cue(Cue::Warning)));
        assert_eq!(ctl.boss().map(|boss| boss.score_before), Some(400));
        ctl
    }

    fn boss_round() -> (RoundController, TimerId) {
        let mut ctl = boss_intro();
        ctl.handle(
            ctl.token(),
            Response::BossStarted(vec![BossSequence::default(); BOSS_SEQUENCE_COUNT]),
        );
        let id = ticker(&ctl.drain_effects()).unwrap();
        assert_eq!(ctl.boss().unwrap().seconds_left, BOSS_SECONDS);
        (ctl, id)
    }

    #[test]
    fn boss_victory_refreshes_shop_and_continues() {
        let (mut ctl, _) = boss_round();

        for _ in 0..BOSS_SEQUENCE_COUNT {
            ctl.submit_answer("1").unwrap();
            ctl.handle(
                ctl.token(),
                Response::BossAnswer(BossVerdict {
                    correct: true,
                    message: "Correct!".into(),
                    ..Default::default()
                }),
            );
            for (_, wakeup) in wakeups(&ctl.drain_effects()) {
                ctl.on_wakeup(wakeup);
            }
        }

        let effects = ctl.drain_effects();
        assert!(ctl.boss().is_none());
        assert_eq!(
            requests(&effects),
            vec![ApiRequest::ShopStatus, ApiRequest::Challenge]
        );
        assert!(persisted(&effects).is_empty());
        assert_eq!(ctl.phase(), Phase::Loading);
    }

    #[test]
    fn boss_timeout_persists_score_before_encounter() {
        let (mut ctl, id) = boss_round();

        for _ in 0..BOSS_SECONDS {
            ctl.on_tick(id);
        }
        let effects = ctl.drain_effects();
        assert_eq!(ctl.boss().unwrap().phase(), BossPhase::Failed);
        let (delay, wakeup) = wakeups(&effects)[0];
        assert_eq!(delay, 2000);

        // late verdict after expiry changes nothing
        ctl.handle(ctl.token(), Response::BossAnswer(BossVerdict::default()));
        ctl.on_wakeup(wakeup);

        let effects = ctl.drain_effects();
        assert_eq!(persisted(&effects), vec![(400, Mode::Classic)]);
        assert_eq!(ctl.game_over_reason(), Some(GameOverReason::BossFailed));
    }

    #[test]
    fn battle_runs_five_rounds_and_reports_once() {
        let mut ctl = RoundController::new(7);
        ctl.start_battle(BattleType::Ai);
        assert_eq!(
            requests(&ctl.drain_effects()),
            vec![ApiRequest::SetMode(Mode::Classic)]
        );
        ctl.handle(ctl.token(), Response::ModeSet);

        for round in 1..=BATTLE_ROUNDS {
            assert_eq!(ctl.battle().unwrap().round, round);
            assert_eq!(requests(&ctl.drain_effects()), vec![ApiRequest::Challenge]);
            ctl.handle(ctl.token(), Response::Challenge(challenge(round, 0)));
            assert_eq!(ctl.state().timer_seconds_left, None);
            let mut pending = wakeups(&ctl.drain_effects());

            ctl.submit_answer("10").unwrap();
            ctl.handle(ctl.token(), Response::Answer(correct(100)));
            pending.extend(wakeups(&ctl.drain_effects()));

            assert_eq!(pending.len(), 2);
            for (_, wakeup) in pending {
                ctl.on_wakeup(wakeup);
            }
        }

        let effects = ctl.drain_effects();
        let reports: Vec<_> = effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::BattleFinished(report) => Some(report.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert!((500..1000).contains(&report.player_score));
        assert_eq!(
            report.outcome,
            BattleOutcome::from_scores(report.player_score, report.opponent_score)
        );
        assert_eq!(persisted(&effects), vec![(report.player_score, Mode::Battle)]);
        assert_eq!(ctl.phase(), Phase::GameOver);
    }

    #[test]
    fn boss_payload_during_battle_resets_service_level() {
        let mut ctl = RoundController::new(7);
        ctl.start_battle(BattleType::Multiplayer);
        ctl.handle(ctl.token(), Response::ModeSet);
        ctl.drain_effects();

        ctl.handle(
            ctl.token(),
            Response::Challenge(Challenge {
                is_boss: true,
                ..challenge(5, 0)
            }),
        );
        assert_eq!(
            requests(&ctl.drain_effects()),
            vec![ApiRequest::SetMode(Mode::Classic)]
        );
        assert!(ctl.boss().is_none());
    }

    #[test]
    fn power_ups_consume_inventory() {
        let (mut ctl, _) = playing(Mode::Classic, challenge(1, 0));
        assert_eq!(
            ctl.use_power_up(PowerUpId::Skip),
            Err(ControlError::PowerUpUnavailable(PowerUpId::Skip))
        );

        ctl.handle(
            ctl.token(),
            Response::Shop(ShopState {
                bytes: 0,
                power_ups: PowerUps {
                    time_freeze: 1,
                    debugger: 0,
                    skip: 1,
                },
            }),
        );

        ctl.use_power_up(PowerUpId::TimeFreeze).unwrap();
        assert_eq!(ctl.state().timer_seconds_left, Some(30));
        assert_eq!(ctl.shop().count(PowerUpId::TimeFreeze), 0);

        ctl.use_power_up(PowerUpId::Skip).unwrap();
        let effects = ctl.drain_effects();
        assert_eq!(ctl.phase(), Phase::Resolved);
        assert_eq!(
            wakeups(&effects),
            vec![(800, Wakeup::NextChallenge(ctl.token()))]
        );
    }

    #[test]
    fn shop_responses_survive_round_changes() {
        let (mut ctl, _) = playing(Mode::Classic, challenge(1, 0));
        let token = ctl.token();
        ctl.start_round(Mode::Zen).unwrap();

        ctl.handle(
            token,
            Response::Shop(ShopState {
                bytes: 125,
                ..Default::default()
            }),
        );
        assert_eq!(ctl.shop().bytes, 125);
    }

    fn stock(time_freeze: u32, debugger: u32, skip: u32) -> Response {
        Response::Shop(ShopState {
            bytes: 0,
            power_ups: PowerUps {
                time_freeze,
                debugger,
                skip,
            },
        })
    }

    fn notices(effects: &[Effect]) -> Vec<String> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Notify(notice) => Some(notice.message.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn finished_daily_keeps_its_score() {
        let (mut ctl, _) = playing(Mode::Daily, challenge(1, 0));
        ctl.submit_answer("10").unwrap();
        ctl.handle(ctl.token(), Response::Answer(correct(180)));
        for (_, wakeup) in wakeups(&ctl.drain_effects()) {
            ctl.on_wakeup(wakeup);
        }
        assert_eq!(requests(&ctl.drain_effects()), vec![ApiRequest::Challenge]);

        ctl.handle(
            ctl.token(),
            Response::Failed(
                RequestKind::Challenge,
                RequestFailure::Validation("Daily challenge already completed".into()),
            ),
        );

        let effects = ctl.drain_effects();
        assert_eq!(persisted(&effects), vec![(180, Mode::Daily)]);
        assert_eq!(notices(&effects), vec!["Daily challenge already completed"]);
        assert_eq!(ctl.phase(), Phase::GameOver);
        assert_eq!(
            ctl.game_over_reason(),
            Some(GameOverReason::ChallengesExhausted)
        );
        assert_eq!(ctl.state().score, 180);
        assert!(ctl.affordances().contains(Affordances::RESTART));
    }

    #[test]
    fn refused_challenge_mid_battle_keeps_battle_score() {
        let mut ctl = RoundController::new(3);
        ctl.start_battle(BattleType::Ai);
        ctl.handle(ctl.token(), Response::ModeSet);
        ctl.drain_effects();
        ctl.handle(ctl.token(), Response::Challenge(challenge(1, 0)));
        let mut pending = wakeups(&ctl.drain_effects());
        ctl.submit_answer("10").unwrap();
        ctl.handle(ctl.token(), Response::Answer(correct(100)));
        pending.extend(wakeups(&ctl.drain_effects()));
        for (_, wakeup) in pending {
            ctl.on_wakeup(wakeup);
        }
        let player_score = ctl.battle().unwrap().player_score;
        assert!((100..200).contains(&player_score));
        assert_eq!(requests(&ctl.drain_effects()), vec![ApiRequest::Challenge]);

        ctl.handle(
            ctl.token(),
            Response::Failed(
                RequestKind::Challenge,
                RequestFailure::Validation("No more challenges".into()),
            ),
        );

        let effects = ctl.drain_effects();
        assert_eq!(persisted(&effects), vec![(player_score, Mode::Battle)]);
        assert_eq!(ctl.phase(), Phase::GameOver);
        assert!(ctl.battle().is_none());
    }

    #[test]
    fn refused_first_battle_round_returns_to_menu() {
        let mut ctl = RoundController::new(3);
        ctl.start_battle(BattleType::Ai);
        ctl.handle(ctl.token(), Response::ModeSet);
        assert_eq!(requests(&ctl.drain_effects()), vec![ApiRequest::Challenge]);

        ctl.handle(
            ctl.token(),
            Response::Failed(
                RequestKind::Challenge,
                RequestFailure::Validation("No more challenges".into()),
            ),
        );

        assert!(persisted(&ctl.drain_effects()).is_empty());
        assert_eq!(ctl.phase(), Phase::Idle);
        assert!(ctl.battle().is_none());
    }

    #[test]
    fn debugger_reveals_one_character_of_the_answer() {
        let (mut ctl, _) = playing(Mode::Classic, challenge(1, 0));
        ctl.handle(ctl.token(), stock(0, 2, 0));

        ctl.use_power_up(PowerUpId::Debugger).unwrap();
        assert_eq!(
            requests(&ctl.drain_effects()),
            vec![ApiRequest::LastAnswer(Reveal::Debugger)]
        );
        ctl.handle(
            ctl.token(),
            Response::LastAnswer {
                reveal: Reveal::Debugger,
                answer: Some("42".into()),
            },
        );
        let feedback = ctl.state().feedback.clone();
        assert!(
            feedback == "🔍 Hint: The answer contains \"4\""
                || feedback == "🔍 Hint: The answer contains \"2\"",
            "{feedback}"
        );
        assert!(ctl.drain_effects().contains(&Effect::Cue(Cue::Achievement)));
        assert_eq!(ctl.phase(), Phase::Active);

        ctl.use_power_up(PowerUpId::Debugger).unwrap();
        ctl.handle(
            ctl.token(),
            Response::LastAnswer {
                reveal: Reveal::Debugger,
                answer: None,
            },
        );
        assert_eq!(
            ctl.state().feedback,
            "🔍 No hint available for this sequence"
        );
        assert_eq!(ctl.shop().count(PowerUpId::Debugger), 0);
    }

    #[test]
    fn time_freeze_needs_a_running_countdown() {
        let (mut ctl, _) = playing(Mode::Zen, challenge(1, 0));
        ctl.handle(ctl.token(), stock(1, 0, 0));

        assert_eq!(
            ctl.use_power_up(PowerUpId::TimeFreeze),
            Err(ControlError::NoCountdown)
        );
        assert_eq!(ctl.shop().count(PowerUpId::TimeFreeze), 1);
        assert_eq!(ctl.state().timer_seconds_left, None);
    }

    #[test]
    fn refused_purchase_is_reported() {
        let mut ctl = RoundController::new(5);
        ctl.purchase(PowerUpId::Skip);
        assert_eq!(
            requests(&ctl.drain_effects()),
            vec![ApiRequest::Purchase(PowerUpId::Skip)]
        );

        ctl.handle(
            ctl.token(),
            Response::Failed(
                RequestKind::Purchase,
                RequestFailure::Validation("Not enough bytes".into()),
            ),
        );
        assert_eq!(notices(&ctl.drain_effects()), vec!["Not enough bytes"]);
        assert_eq!(ctl.shop(), &ShopState::default());
    }

    #[test]
    fn quitting_a_battle_forfeits_the_match() {
        let mut ctl = RoundController::new(11);
        ctl.start_battle(BattleType::Multiplayer);
        ctl.handle(ctl.token(), Response::ModeSet);
        ctl.handle(ctl.token(), Response::Challenge(challenge(1, 0)));
        ctl.submit_answer("10").unwrap();
        ctl.handle(ctl.token(), Response::Answer(correct(100)));
        let player_score = ctl.battle().unwrap().player_score;
        let token = ctl.token();
        ctl.drain_effects();

        ctl.quit();
        ctl.on_wakeup(Wakeup::NextBattleRound(token));

        let effects = ctl.drain_effects();
        assert_eq!(persisted(&effects), vec![(player_score, Mode::Battle)]);
        assert!(
            !effects
                .iter()
                .any(|effect| matches!(effect, Effect::BattleFinished(_)))
        );
        assert!(requests(&effects).is_empty());
        assert!(ctl.battle().is_none());
        assert_eq!(ctl.game_over_reason(), Some(GameOverReason::Quit));
    }

    #[test]
    fn wrong_boss_answer_ends_the_game() {
        let (mut ctl, id) = boss_round();
        ctl.submit_answer("1").unwrap();
        ctl.handle(
            ctl.token(),
            Response::BossAnswer(BossVerdict {
                correct: false,
                message: "Wrong answer!".into(),
                correct_answer: Some("7".into()),
                ..Default::default()
            }),
        );

        let effects = ctl.drain_effects();
        assert_eq!(ctl.boss().unwrap().phase(), BossPhase::Failed);
        assert!(effects.contains(&Effect::StopTicker));
        assert!(effects.contains(&Effect::Cue(Cue::Wrong)));
        let pending = wakeups(&effects);
        assert_eq!(pending, vec![(2000, Wakeup::BossFailure(ctl.token()))]);

        // the stopped countdown no longer fails the encounter
        for _ in 0..BOSS_SECONDS {
            ctl.on_tick(id);
        }
        assert!(wakeups(&ctl.drain_effects()).is_empty());

        ctl.on_wakeup(pending[0].1);
        let effects = ctl.drain_effects();
        assert_eq!(persisted(&effects), vec![(400, Mode::Classic)]);
        assert_eq!(ctl.game_over_reason(), Some(GameOverReason::BossFailed));
        assert!(ctl.state().feedback.contains("Correct answer: 7"));
        assert!(ctl.boss().is_none());
    }

    #[test]
    fn failed_boss_start_stalls_until_retried() {
        let mut ctl = boss_intro();
        ctl.handle(
            ctl.token(),
            Response::Failed(RequestKind::BossStart, RequestFailure::Network("offline".into())),
        );

        assert!(ctl.boss().is_none());
        assert!(ctl.is_stalled());
        assert_eq!(ctl.phase(), Phase::Loading);
        assert!(ctl.affordances().contains(Affordances::RETRY));
        assert!(persisted(&ctl.drain_effects()).is_empty());

        ctl.retry().unwrap();
        assert_eq!(requests(&ctl.drain_effects()), vec![ApiRequest::Challenge]);
        assert!(!ctl.is_stalled());
        assert_eq!(ctl.state().score, 400);
    }
}
