use std::collections::HashMap;
use std::mem;

use crate::api::ApiClient;
use crate::settings::{Settings, SettingsView};
use crate::sound::Sound;
use crate::storage::{Records, Username};
use crate::utils::*;
use clap::Args;
use gloo::timers::callback::{Interval, Timeout};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use seqmaster_core::{self as game, Affordances, Effect, Notice, Phase};
use seqmaster_protocol::{AchievementCatalog, LeaderboardEntry};
use web_sys::HtmlInputElement;
use yew::prelude::*;

const NOTICE_MS: u32 = 3000;
const CELEBRATION_MS: u32 = 1500;
const LEADERBOARD_ROWS: usize = 10;

#[derive(Debug)]
pub(crate) enum Msg {
    Play(game::Mode),
    Battle(game::BattleType),
    Input(String),
    Submit,
    Quit,
    Restart,
    Retry,
    Menu,
    UsePowerUp(game::PowerUpId),
    Purchase(game::PowerUpId),
    ToggleShop,
    ToggleSettings,
    OpenTutorial,
    TutorialBack,
    TutorialNext,
    FunFact(&'static str),
    DismissFunFact,
    UpdateSettings(Settings),
    EditUsername(String),
    SaveUsername,
    DismissBattleResult,
    DismissNotice(u64),
    EndCelebration,
    Tick(game::TimerId),
    Wakeup(game::Wakeup),
    Responded {
        id: u64,
        token: game::RoundToken,
        response: game::Response,
    },
    TimedOut {
        id: u64,
        token: game::RoundToken,
        kind: game::RequestKind,
    },
    Leaderboard(Vec<LeaderboardEntry>),
    ServerAchievements(AchievementCatalog),
    ServerStats(serde_json::Value),
}

#[derive(Args, Properties, Debug, Clone, PartialEq)]
pub(crate) struct GameProps {
    /// Base URL of the game service, empty for the page's own origin
    #[arg(long, default_value = "")]
    api: String,

    /// Give up on a service request after this many milliseconds
    #[arg(long, default_value_t = 10_000)]
    request_timeout_ms: u32,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,
}

pub(crate) struct GameView {
    controller: game::RoundController,
    api: ApiClient,
    rng: SmallRng,
    settings: Settings,
    sound: Sound,
    username: Username,
    username_draft: String,
    records: Records,
    answer: String,
    leaderboard: Vec<LeaderboardEntry>,
    server_stats: Option<serde_json::Value>,
    notices: Vec<(u64, Notice)>,
    next_notice_id: u64,
    battle_result: Option<game::BattleReport>,
    celebrating: bool,
    shop_open: bool,
    settings_open: bool,
    tutorial: Option<game::Tutorial>,
    fun_fact: Option<&'static str>,
    /// In-flight requests by id, each with its timeout guard.
    pending: HashMap<u64, Timeout>,
    next_request_id: u64,
    ticker: Option<Interval>,
}

fn desktop_notify(notice: &Notice) {
    use web_sys::{Notification, NotificationOptions, NotificationPermission};

    if Notification::permission() != NotificationPermission::Granted {
        return;
    }
    let options = NotificationOptions::new();
    options.set_body(&notice.message);
    let title = format!("{} {}", notice.icon, notice.title);
    if let Err(err) = Notification::new_with_options(&title, &options) {
        log::warn!("could not show notification: {:?}", err);
    }
}

fn request_notification_permission() {
    use web_sys::Notification;

    match Notification::request_permission() {
        Ok(promise) => wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = wasm_bindgen_futures::JsFuture::from(promise).await {
                log::warn!("notification permission request failed: {:?}", err);
            }
        }),
        Err(err) => log::warn!("notifications unavailable: {:?}", err),
    }
}

fn achievement_notice(id: game::AchievementId) -> Notice {
    Notice {
        title: "Achievement Unlocked!".into(),
        message: format!("{}: {}", id.name(), id.description()),
        icon: id.icon(),
    }
}

impl GameView {
    fn send(&mut self, ctx: &Context<Self>, token: game::RoundToken, request: game::ApiRequest) {
        let id = self.next_request_id;
        self.next_request_id += 1;
        let kind = request.kind();
        log::debug!("request {} {:?} for round {}", id, request, token.get());

        let link = ctx.link().clone();
        let timeout = Timeout::new(self.api.timeout_ms(), move || {
            link.send_message(Msg::TimedOut { id, token, kind })
        });
        self.pending.insert(id, timeout);

        let api = self.api.clone();
        ctx.link().send_future(async move {
            let response = api.send(&request).await;
            Msg::Responded {
                id,
                token,
                response,
            }
        });
    }

    fn run_effects(&mut self, ctx: &Context<Self>) {
        for effect in self.controller.drain_effects() {
            match effect {
                Effect::Request { token, request } => {
                    if request == game::ApiRequest::Challenge {
                        self.schedule_fun_fact(ctx);
                    }
                    self.send(ctx, token, request);
                }
                Effect::StartTicker(id) => {
                    let link = ctx.link().clone();
                    self.ticker = Some(Interval::new(1000, move || {
                        link.send_message(Msg::Tick(id))
                    }));
                }
                Effect::StopTicker => self.ticker = None,
                Effect::Schedule { delay_ms, wakeup } => {
                    let link = ctx.link().clone();
                    // stale wakeups are rejected by the controller
                    Timeout::new(delay_ms, move || link.send_message(Msg::Wakeup(wakeup))).forget();
                }
                Effect::Cue(game::Cue::Celebrate) => {
                    self.celebrating = true;
                    let link = ctx.link().clone();
                    Timeout::new(CELEBRATION_MS, move || link.send_message(Msg::EndCelebration))
                        .forget();
                }
                Effect::Cue(cue) => {
                    if self.settings.sound_enabled {
                        self.sound.play(cue);
                    }
                }
                Effect::Notify(notice) => self.push_notice(ctx, notice),
                Effect::PersistScore { score, mode } => self.persist_score(ctx, score, mode),
                Effect::AchievementsEarned(ids) => {
                    for id in self.records.merge_achievements(&ids) {
                        self.push_notice(ctx, achievement_notice(id));
                    }
                }
                Effect::BattleFinished(report) => self.battle_result = Some(report),
            }
        }
    }

    fn schedule_fun_fact(&mut self, ctx: &Context<Self>) {
        let Some(fact) = game::roll_fun_fact(&mut self.rng) else {
            return;
        };
        let link = ctx.link().clone();
        Timeout::new(game::FUN_FACT_DELAY_MS, move || {
            link.send_message(Msg::FunFact(fact))
        })
        .forget();
    }

    fn push_notice(&mut self, ctx: &Context<Self>, notice: Notice) {
        let id = self.next_notice_id;
        self.next_notice_id += 1;
        if self.settings.notifications_enabled {
            desktop_notify(&notice);
        }
        self.notices.push((id, notice));

        let link = ctx.link().clone();
        Timeout::new(NOTICE_MS, move || link.send_message(Msg::DismissNotice(id))).forget();
    }

    fn reject(&mut self, ctx: &Context<Self>, err: game::ControlError) {
        log::debug!("action rejected: {}", err);
        self.push_notice(
            ctx,
            Notice {
                title: "Not now".into(),
                message: err.to_string(),
                icon: "⚠️",
            },
        );
    }

    fn persist_score(&mut self, ctx: &Context<Self>, score: u64, mode: game::Mode) {
        let entry = game::ScoreEntry {
            name: self.username.0.clone(),
            score,
            mode,
            timestamp: utc_now().to_rfc3339(),
        };
        for id in self.records.record_score(entry) {
            if self.settings.sound_enabled {
                self.sound.play(game::Cue::Achievement);
            }
            self.push_notice(ctx, achievement_notice(id));
        }

        let api = self.api.clone();
        let name = self.username.0.clone();
        ctx.link().send_future_batch(async move {
            if let Err(err) = api.submit_score(&name, score, mode).await {
                log::warn!("could not submit score: {}", err);
            }
            match api.leaderboard().await {
                Ok(entries) => vec![Msg::Leaderboard(entries)],
                Err(err) => {
                    log::warn!("could not load leaderboard: {}", err);
                    Vec::new()
                }
            }
        });
    }

    fn refresh_server_records(&self, ctx: &Context<Self>) {
        let api = self.api.clone();
        ctx.link().send_future_batch(async move {
            let mut messages = Vec::new();
            match api.leaderboard().await {
                Ok(entries) => messages.push(Msg::Leaderboard(entries)),
                Err(err) => log::warn!("could not load leaderboard: {}", err),
            }
            match api.achievements().await {
                Ok(catalog) => messages.push(Msg::ServerAchievements(catalog)),
                Err(err) => log::warn!("could not load achievements: {}", err),
            }
            match api.stats().await {
                Ok(stats) => messages.push(Msg::ServerStats(stats)),
                Err(err) => log::warn!("could not load stats: {}", err),
            }
            messages
        });
    }

    fn view_header(&self, ctx: &Context<Self>) -> Html {
        use Msg::*;

        let shop = self.controller.shop();
        html! {
            <nav>
                <strong>{"🧠 Sequence Master"}</strong>
                <span class="player">{format!("👤 {}", self.username.0)}</span>
                <button class="outline" onclick={ctx.link().callback(|_| ToggleShop)}>
                    {format!("💾 {} bytes", shop.bytes)}
                </button>
                <small title="How to play" onclick={ctx.link().callback(|_| OpenTutorial)}>{"❓"}</small>
                <small onclick={ctx.link().callback(|_| ToggleSettings)}>{"···"}</small>
            </nav>
        }
    }

    fn view_start(&self, ctx: &Context<Self>) -> Html {
        use Msg::*;

        let feedback = &self.controller.state().feedback;
        html! {
            <section class="start-screen">
                if !feedback.is_empty() {
                    <p class="feedback">{feedback}</p>
                }
                <div class="modes">
                    { for game::Mode::PLAYABLE.into_iter().map(|mode| {
                        let timer = mode
                            .timer_seconds()
                            .map_or_else(|| "No timer".to_string(), |seconds| format!("⏱️ {seconds}s"));
                        html! {
                            <article class="mode-card" onclick={ctx.link().callback(move |_| Play(mode))}>
                                <h3>{mode.name()}</h3>
                                <p>{mode.description()}</p>
                                <small>{timer}</small>
                            </article>
                        }
                    }) }
                </div>
                <div class="battle">
                    <button onclick={ctx.link().callback(|_| Battle(game::BattleType::Ai))}>
                        {"⚔️ Battle vs AI"}
                    </button>
                    <button class="secondary" onclick={ctx.link().callback(|_| Battle(game::BattleType::Multiplayer))}>
                        {"👥 Multiplayer Battle"}
                    </button>
                </div>
                {self.view_profile(ctx)}
                {self.view_records()}
                {self.view_leaderboard()}
            </section>
        }
    }

    fn view_profile(&self, ctx: &Context<Self>) -> Html {
        use Msg::*;

        let oninput = ctx.link().callback(|e: InputEvent| {
            EditUsername(e.target_unchecked_into::<HtmlInputElement>().value())
        });
        let onsubmit = ctx.link().callback(|e: SubmitEvent| {
            e.prevent_default();
            SaveUsername
        });
        html! {
            <form class="profile" {onsubmit}>
                <input type="text" placeholder="Your name" value={self.username_draft.clone()} {oninput}/>
                <button type="submit">{"Save"}</button>
            </form>
        }
    }

    fn view_records(&self) -> Html {
        let Records {
            history,
            stats,
            achievements,
        } = &self.records;
        let modes = game::Mode::PLAYABLE.into_iter().chain([game::Mode::Battle]);

        html! {
            <div class="records">
                <article>
                    <h3>{"Recent scores"}</h3>
                    if history.is_empty() {
                        <p>{"No games played yet"}</p>
                    } else {
                        <ol>
                            { for history.entries().iter().map(|entry| html! {
                                <li>
                                    {format!("{} · {} · {}", entry.score, entry.mode.name(), entry.name)}
                                    <small>{entry.timestamp.get(..10).unwrap_or(entry.timestamp.as_str())}</small>
                                </li>
                            }) }
                        </ol>
                    }
                </article>
                <article>
                    <h3>{format!("Stats ({} games)", stats.total_games())}</h3>
                    <table>
                        <tr><th>{"Mode"}</th><th>{"Best"}</th><th>{"Played"}</th></tr>
                        { for modes.map(|mode| {
                            let record = stats.get(mode);
                            html! {
                                <tr><td>{mode.name()}</td><td>{record.best_score}</td><td>{record.games_played}</td></tr>
                            }
                        }) }
                    </table>
                    if let Some(server_stats) = self.server_stats.as_ref().filter(|value| value.as_object().is_some_and(|map| !map.is_empty())) {
                        <details>
                            <summary>{"Server stats"}</summary>
                            <pre>{serde_json::to_string_pretty(server_stats).unwrap_or_default()}</pre>
                        </details>
                    }
                </article>
                <article>
                    <h3>{format!("Achievements {}/{}", achievements.len(), game::AchievementId::ALL.len())}</h3>
                    <div class="achievements">
                        { for game::AchievementId::ALL.into_iter().map(|id| {
                            let class = classes!(
                                "achievement-icon",
                                if achievements.contains(id) { "earned" } else { "locked" }
                            );
                            html! {
                                <span {class} title={format!("{}: {}", id.name(), id.description())}>{id.icon()}</span>
                            }
                        }) }
                    </div>
                </article>
            </div>
        }
    }

    fn view_leaderboard(&self) -> Html {
        html! {
            <article class="leaderboard">
                <h3>{"🏆 Leaderboard"}</h3>
                <ol>
                    { for self.leaderboard.iter().take(LEADERBOARD_ROWS).map(|entry| html! {
                        <li>{format!("{} · {} · {}", entry.name, entry.score, entry.mode)}</li>
                    }) }
                </ol>
            </article>
        }
    }

    fn view_answer_form(&self, ctx: &Context<Self>) -> Html {
        use Msg::*;

        let disabled = !self.controller.affordances().contains(Affordances::ANSWER);
        let oninput = ctx.link().callback(|e: InputEvent| {
            Input(e.target_unchecked_into::<HtmlInputElement>().value())
        });
        let onsubmit = ctx.link().callback(|e: SubmitEvent| {
            e.prevent_default();
            Submit
        });
        html! {
            <form class="answer" {onsubmit}>
                <input type="text" placeholder="Next in sequence" autocomplete="off"
                    value={self.answer.clone()} {oninput} {disabled}/>
                <button type="submit" {disabled}>{"Submit"}</button>
            </form>
        }
    }

    fn view_timer(&self) -> Html {
        let Some(left) = self.controller.state().timer_seconds_left else {
            return html! {};
        };
        let class = classes!("timer", (left <= game::LOW_TIME_THRESHOLD).then_some("low"));
        html! {
            <div {class}>
                <progress value={self.controller.timer_fraction().to_string()} max="1"/>
                <span>{format!("⏱️ {left}s")}</span>
            </div>
        }
    }

    fn view_game(&self, ctx: &Context<Self>) -> Html {
        use Msg::*;

        let state = self.controller.state();
        let affordances = self.controller.affordances();
        let shop = self.controller.shop();
        let power_ups_enabled = affordances.contains(Affordances::POWER_UPS);
        let class = classes!(
            "game-card",
            self.celebrating.then_some("celebrate"),
            (state.phase == Phase::GameOver).then_some("game-over")
        );

        html! {
            <article {class}>
                <header>
                    <span>{state.mode.name()}</span>
                    <span>{format!("Level {}", state.level)}</span>
                    <span>{format!("Score {}", state.score)}</span>
                </header>
                if let Some(battle) = self.controller.battle() {
                    <p class="battle-score">
                        {format!(
                            "Round {}/{} · You {} - {} {}",
                            battle.round,
                            battle.total_rounds,
                            battle.player_score,
                            battle.opponent_score,
                            battle.opponent_name
                        )}
                    </p>
                }
                {self.view_timer()}
                if state.phase == Phase::Loading && !self.controller.is_stalled() {
                    <p aria-busy="true">{"Loading..."}</p>
                } else {
                    <p class="sequence">{&state.sequence_display}</p>
                    <p class="hint">{format!("💡 {}", state.hint_text)}</p>
                }
                <p class="feedback">{&state.feedback}</p>
                {self.view_answer_form(ctx)}
                <div class="power-ups">
                    { for game::PowerUpId::ALL.into_iter().map(|id| {
                        let count = shop.count(id);
                        html! {
                            <button class="outline" title={id.description()}
                                disabled={!power_ups_enabled || count == 0}
                                onclick={ctx.link().callback(move |_| UsePowerUp(id))}>
                                {format!("{} {}", id.icon(), count)}
                            </button>
                        }
                    }) }
                </div>
                <footer>
                    if affordances.contains(Affordances::RETRY) {
                        <button onclick={ctx.link().callback(|_| Retry)}>{"Retry"}</button>
                    }
                    if affordances.contains(Affordances::QUIT) {
                        <button class="secondary" onclick={ctx.link().callback(|_| Quit)}>{"Quit"}</button>
                    }
                    if affordances.contains(Affordances::RESTART) {
                        <button onclick={ctx.link().callback(|_| Restart)}>{"Play again"}</button>
                        <button class="secondary" onclick={ctx.link().callback(|_| Menu)}>{"Menu"}</button>
                    }
                </footer>
            </article>
        }
    }

    fn view_boss(&self, ctx: &Context<Self>) -> Html {
        let Some(boss) = self.controller.boss() else {
            return html! {};
        };
        let (solved, total) = boss.progress();
        let low = boss.seconds_left <= game::LOW_TIME_THRESHOLD;

        html! {
            <Modal>
                <dialog open={true} class="boss">
                    <article>
                        <h2>{format!("🔥 Boss Battle · Level {}", boss.level)}</h2>
                        <p>
                            <span>{format!("{solved}/{total}")}</span>
                            <span class={classes!("timer", low.then_some("low"))}>{format!(" ⏱️ {}s", boss.seconds_left)}</span>
                        </p>
                        if let Some(current) = boss.current() {
                            <p class="sequence">{current.sequence_display()}</p>
                            <p class="hint">{format!("💡 {}", current.hint)}</p>
                        } else if boss.phase() == game::BossPhase::Starting {
                            <p aria-busy="true">{"Summoning the boss..."}</p>
                        }
                        <p class="feedback">{&boss.feedback}</p>
                        {self.view_answer_form(ctx)}
                    </article>
                </dialog>
            </Modal>
        }
    }

    fn view_battle_result(&self, ctx: &Context<Self>) -> Html {
        use Msg::*;

        let Some(report) = &self.battle_result else {
            return html! {};
        };
        let rematch = self.controller.battle().map(|battle| battle.battle_type);

        html! {
            <Modal>
                <dialog open={true} class="battle-result">
                    <article>
                        <h2>{report.outcome.headline()}</h2>
                        <p>{format!("You {} - {} {}", report.player_score, report.opponent_score, report.opponent_name)}</p>
                        <footer>
                            if let Some(battle_type) = rematch {
                                <button onclick={ctx.link().callback(move |_| Battle(battle_type))}>{"Rematch"}</button>
                            }
                            <button class="secondary" onclick={ctx.link().callback(|_| DismissBattleResult)}>{"Close"}</button>
                        </footer>
                    </article>
                </dialog>
            </Modal>
        }
    }

    fn view_shop(&self, ctx: &Context<Self>) -> Html {
        use Msg::*;

        if !self.shop_open {
            return html! {};
        }
        let shop = self.controller.shop();

        html! {
            <Modal>
                <dialog open={true} class="shop">
                    <article>
                        <h2>{format!("🛒 Shop · 💾 {} bytes", shop.bytes)}</h2>
                        { for game::PowerUpId::ALL.into_iter().map(|id| html! {
                            <div class="power-up">
                                <strong>{format!("{} {}", id.icon(), id.name())}</strong>
                                <p>{id.description()}</p>
                                <small>{format!("Owned: {}", shop.count(id))}</small>
                                <button disabled={!shop.can_afford(id)}
                                    onclick={ctx.link().callback(move |_| Purchase(id))}>
                                    {format!("Buy for {}", id.price())}
                                </button>
                            </div>
                        }) }
                        <footer>
                            <button class="secondary" onclick={ctx.link().callback(|_| ToggleShop)}>{"Close"}</button>
                        </footer>
                    </article>
                </dialog>
            </Modal>
        }
    }

    fn view_tutorial(&self, ctx: &Context<Self>) -> Html {
        use Msg::*;

        let Some(tutorial) = self.tutorial else {
            return html! {};
        };
        let step = tutorial.step();
        let next_label = if tutorial.is_last() { "Finish" } else { "Next" };

        html! {
            <Modal>
                <dialog open={true} class="tutorial">
                    <article>
                        <h3>{step.title}</h3>
                        <p>{step.content}</p>
                        <footer>
                            <button class="secondary" disabled={tutorial.is_first()}
                                onclick={ctx.link().callback(|_| TutorialBack)}>{"Previous"}</button>
                            <small>{tutorial.indicator()}</small>
                            <button onclick={ctx.link().callback(|_| TutorialNext)}>
                                {next_label}
                            </button>
                        </footer>
                    </article>
                </dialog>
            </Modal>
        }
    }

    fn view_fun_fact(&self, ctx: &Context<Self>) -> Html {
        let Some(fact) = self.fun_fact else {
            return html! {};
        };

        html! {
            <Modal>
                <dialog open={true} class="fun-fact">
                    <article>
                        <h3>{"💡 Fun Fact"}</h3>
                        <p>{fact}</p>
                        <footer>
                            <button class="secondary" onclick={ctx.link().callback(|_| Msg::DismissFunFact)}>{"Close"}</button>
                        </footer>
                    </article>
                </dialog>
            </Modal>
        }
    }

    fn view_notices(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="notifications">
                { for self.notices.iter().map(|(id, notice)| {
                    let id = *id;
                    html! {
                        <div class="notification" onclick={ctx.link().callback(move |_| Msg::DismissNotice(id))}>
                            <span>{notice.icon}</span>
                            <strong>{&notice.title}</strong>
                            <p>{&notice.message}</p>
                        </div>
                    }
                }) }
            </div>
        }
    }
}

impl Component for GameView {
    type Message = Msg;
    type Properties = GameProps;

    fn create(ctx: &Context<Self>) -> Self {
        let props = ctx.props();
        let seed = props.seed.unwrap_or_else(js_random_seed);
        log::debug!("seed: {}", seed);

        let timings = game::Timings {
            request_timeout_ms: props.request_timeout_ms,
            ..Default::default()
        };
        let mut rng = SmallRng::seed_from_u64(seed);
        let username = Username::load_or_generate(&mut rng);

        let mut view = Self {
            controller: game::RoundController::with_timings(seed, timings),
            api: ApiClient::new(&props.api, timings.request_timeout_ms),
            rng,
            settings: LocalOrDefault::local_or_default(),
            sound: Sound::new(),
            username_draft: username.0.clone(),
            username,
            records: Records::load(),
            answer: String::new(),
            leaderboard: Vec::new(),
            server_stats: None,
            notices: Vec::new(),
            next_notice_id: 0,
            battle_result: None,
            celebrating: false,
            shop_open: false,
            settings_open: false,
            tutorial: None,
            fun_fact: None,
            pending: HashMap::new(),
            next_request_id: 0,
            ticker: None,
        };

        view.controller.refresh_shop();
        view.run_effects(ctx);
        view.refresh_server_records(ctx);
        view
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        let updated = match msg {
            Play(mode) => {
                self.answer.clear();
                self.battle_result = None;
                if let Err(err) = self.controller.start_round(mode) {
                    self.reject(ctx, err);
                }
                true
            }
            Battle(battle_type) => {
                self.answer.clear();
                self.battle_result = None;
                self.controller.start_battle(battle_type);
                true
            }
            Input(text) => {
                self.answer = text;
                false
            }
            Submit => {
                let answer = mem::take(&mut self.answer);
                if let Err(err) = self.controller.submit_answer(&answer) {
                    self.answer = answer;
                    self.reject(ctx, err);
                }
                true
            }
            Quit => {
                self.controller.quit();
                true
            }
            Restart => {
                self.battle_result = None;
                if let Err(err) = self.controller.restart() {
                    self.reject(ctx, err);
                }
                true
            }
            Retry => {
                if let Err(err) = self.controller.retry() {
                    self.reject(ctx, err);
                }
                true
            }
            Menu => {
                self.battle_result = None;
                self.controller.dispose();
                true
            }
            UsePowerUp(id) => {
                if let Err(err) = self.controller.use_power_up(id) {
                    self.reject(ctx, err);
                }
                true
            }
            Purchase(id) => {
                self.controller.purchase(id);
                false
            }
            ToggleShop => {
                self.shop_open = !self.shop_open;
                if self.shop_open {
                    self.controller.refresh_shop();
                }
                true
            }
            ToggleSettings => {
                self.settings_open = !self.settings_open;
                true
            }
            OpenTutorial => {
                self.tutorial = Some(game::Tutorial::default());
                true
            }
            TutorialBack => {
                if let Some(tutorial) = self.tutorial.as_mut() {
                    tutorial.back();
                }
                true
            }
            TutorialNext => {
                self.tutorial = self.tutorial.and_then(game::Tutorial::advance);
                true
            }
            FunFact(fact) => {
                self.fun_fact = Some(fact);
                true
            }
            DismissFunFact => self.fun_fact.take().is_some(),
            UpdateSettings(settings) => {
                if settings.notifications_enabled && !self.settings.notifications_enabled {
                    request_notification_permission();
                }
                if settings.theme != self.settings.theme {
                    settings.apply_theme();
                }
                self.settings = settings;
                self.settings.local_save();
                true
            }
            EditUsername(text) => {
                self.username_draft = text;
                false
            }
            SaveUsername => {
                self.username = Username(game::username_or_nickname(
                    &self.username_draft,
                    &mut self.rng,
                ));
                self.username.local_save();
                self.username_draft = self.username.0.clone();
                true
            }
            DismissBattleResult => self.battle_result.take().is_some(),
            DismissNotice(id) => {
                let before = self.notices.len();
                self.notices.retain(|(notice_id, _)| *notice_id != id);
                self.notices.len() != before
            }
            EndCelebration => mem::replace(&mut self.celebrating, false),
            Tick(id) => {
                self.controller.on_tick(id);
                true
            }
            Wakeup(wakeup) => {
                self.controller.on_wakeup(wakeup);
                true
            }
            Responded {
                id,
                token,
                response,
            } => {
                if self.pending.remove(&id).is_none() {
                    log::debug!("request {} already timed out, dropping response", id);
                    false
                } else {
                    self.controller.handle(token, response);
                    true
                }
            }
            TimedOut { id, token, kind } => {
                if self.pending.remove(&id).is_some() {
                    log::warn!("request {} ({:?}) timed out", id, kind);
                    self.controller.handle(
                        token,
                        game::Response::Failed(kind, game::RequestFailure::TimedOut),
                    );
                    true
                } else {
                    false
                }
            }
            Leaderboard(entries) => {
                self.leaderboard = entries;
                true
            }
            ServerAchievements(catalog) => {
                let earned: Vec<String> = catalog
                    .into_iter()
                    .filter_map(|(id, info)| info.earned.then_some(id))
                    .collect();
                !self.records.merge_achievements(&earned).is_empty()
            }
            ServerStats(stats) => {
                self.server_stats = Some(stats);
                true
            }
        };

        self.run_effects(ctx);
        updated
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        use Msg::*;

        let playing = self.controller.phase() != Phase::Idle;
        html! {
            <div class="seqmaster">
                {self.view_header(ctx)}
                if playing {
                    {self.view_game(ctx)}
                } else {
                    {self.view_start(ctx)}
                }
                {self.view_boss(ctx)}
                {self.view_battle_result(ctx)}
                {self.view_shop(ctx)}
                {self.view_tutorial(ctx)}
                {self.view_fun_fact(ctx)}
                {self.view_notices(ctx)}
                <SettingsView
                    open={self.settings_open}
                    settings={self.settings}
                    on_change={ctx.link().callback(UpdateSettings)}
                    on_close={ctx.link().callback(|_| ToggleSettings)}
                />
            </div>
        }
    }
}
