use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use crate::catalog::{BadgeInfo, Catalog, Mode, Tier};
use crate::config::Config;
use crate::engine::countdown::CountdownTick;
use crate::engine::evaluator::{self, WordDiff};
use crate::event::AppEvent;
use crate::narration::{ACCENTS, NarrationEvent, NarrationRequest, NarrationSignal, Narrator};
use crate::session::result::LevelResult;
use crate::session::state::{SessionSettings, WrongAnswer};
use crate::session::{GameSession, SessionError, SessionSummary, TickOutcome};
use crate::store::kv::KeyValueStore;
use crate::store::progress::ProgressStore;
use crate::store::schema::PersistedProgress;
use crate::ui::components::challenge_panel::Playback;
use crate::ui::components::menu::MenuItem;
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

pub type AppStore = Box<dyn KeyValueStore>;

const STATUS_TTL: Duration = Duration::from_secs(4);
const SPEED_CHOICES: [Option<f32>; 6] = [None, Some(0.5), Some(0.75), Some(1.0), Some(1.25), Some(1.5)];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    Playing,
    Feedback,
    Review,
    Stats,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuRow {
    Tier,
    Mode,
    Accent,
    Speed,
    Theme,
    Start,
    Stats,
    Review,
    Quit,
}

impl MenuRow {
    pub const ALL: [MenuRow; 9] = [
        MenuRow::Tier,
        MenuRow::Mode,
        MenuRow::Accent,
        MenuRow::Speed,
        MenuRow::Theme,
        MenuRow::Start,
        MenuRow::Stats,
        MenuRow::Review,
        MenuRow::Quit,
    ];

    pub fn is_setting(self) -> bool {
        matches!(
            self,
            MenuRow::Tier | MenuRow::Mode | MenuRow::Accent | MenuRow::Speed | MenuRow::Theme
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Warning,
    Error,
}

#[derive(Clone, Debug)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    pub since: Instant,
}

/// Choices on the setup screen, applied when a session starts.
#[derive(Clone, Debug, PartialEq)]
pub struct SetupChoices {
    pub tier: Tier,
    pub mode: Mode,
    pub accent: String,
    pub speed: Option<f32>,
}

impl SetupChoices {
    fn from_config(config: &Config) -> Self {
        Self {
            tier: config.tier,
            mode: config.mode,
            accent: config.accent.clone(),
            speed: config.speed,
        }
    }
}

pub struct App {
    pub screen: AppScreen,
    pub config: Config,
    config_path: Option<PathBuf>,
    pub theme: Theme,
    pub catalog: Arc<Catalog>,
    pub setup: SetupChoices,
    pub menu_selected: usize,
    pub session: Option<GameSession<AppStore>>,
    /// Held here between sessions; a running session owns it.
    store: Option<ProgressStore<AppStore>>,
    pub lifetime: PersistedProgress,
    pub high_score: u32,
    pub input: LineInput,
    pub playback: Playback,
    pub last_result: Option<LevelResult>,
    pub last_diff: Vec<WordDiff>,
    pub feedback_until: Option<Instant>,
    pub status: Option<StatusMessage>,
    pub confirm_quit: bool,
    pub last_summary: Option<SessionSummary>,
    pub review_scroll: usize,
    /// Set while the live session's mistakes are shown mid-game; the screen
    /// to go back to when the review closes.
    review_return: Option<AppScreen>,
    narrator: Box<dyn Narrator>,
    narration_id: u64,
    events: Sender<AppEvent>,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        config: Config,
        theme: Theme,
        catalog: Arc<Catalog>,
        store: AppStore,
        narrator: Box<dyn Narrator>,
        events: Sender<AppEvent>,
    ) -> Self {
        let store = ProgressStore::new(store);
        let lifetime = store.load();
        let high_score = store.high_score();
        Self {
            screen: AppScreen::Menu,
            setup: SetupChoices::from_config(&config),
            config,
            config_path: None,
            theme,
            catalog,
            menu_selected: MenuRow::ALL
                .iter()
                .position(|r| *r == MenuRow::Start)
                .unwrap_or(0),
            session: None,
            store: Some(store),
            lifetime,
            high_score,
            input: LineInput::default(),
            playback: Playback::Speaking,
            last_result: None,
            last_diff: Vec::new(),
            feedback_until: None,
            status: None,
            confirm_quit: false,
            last_summary: None,
            review_scroll: 0,
            review_return: None,
            narrator,
            narration_id: 0,
            events,
            should_quit: false,
        }
    }

    /// Remember setup choices in this config file when a session starts.
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    pub fn narrator_name(&self) -> &str {
        self.narrator.name()
    }

    pub fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
            since: Instant::now(),
        });
    }

    // --- setup menu ---

    pub fn selected_row(&self) -> MenuRow {
        MenuRow::ALL[self.menu_selected.min(MenuRow::ALL.len() - 1)]
    }

    pub fn menu_next(&mut self) {
        self.menu_selected = (self.menu_selected + 1) % MenuRow::ALL.len();
    }

    pub fn menu_prev(&mut self) {
        self.menu_selected = (self.menu_selected + MenuRow::ALL.len() - 1) % MenuRow::ALL.len();
    }

    pub fn menu_items(&self) -> Vec<MenuItem> {
        MenuRow::ALL
            .iter()
            .map(|row| match row {
                MenuRow::Tier => MenuItem::setting(
                    "Tier",
                    self.setup.tier.label().to_string(),
                    "Vocabulary difficulty",
                ),
                MenuRow::Mode => MenuItem::setting(
                    "Mode",
                    self.setup.mode.label().to_string(),
                    "Single words or whole sentences",
                ),
                MenuRow::Accent => {
                    MenuItem::setting("Accent", self.setup.accent.clone(), "Narrator voice")
                }
                MenuRow::Speed => MenuItem::setting(
                    "Speed",
                    match self.setup.speed {
                        Some(speed) => format!("{speed:.2}x"),
                        None => format!("Auto ({:.2}x)", self.catalog.default_speed(self.setup.tier)),
                    },
                    "Narration speed",
                ),
                MenuRow::Theme => {
                    MenuItem::setting("Theme", self.theme.name.clone(), "Color scheme")
                }
                MenuRow::Start => MenuItem::action("Start", "Begin a session with these settings"),
                MenuRow::Stats => MenuItem::action("Stats", "High score, levels and badges"),
                MenuRow::Review => {
                    let misses = self
                        .last_summary
                        .as_ref()
                        .map_or(0, |s| s.wrong_answers.len());
                    MenuItem::action("Review", &format!("{misses} mistakes from last session"))
                }
                MenuRow::Quit => MenuItem::action("Quit", "Exit dictum"),
            })
            .collect()
    }

    pub fn cycle_setting(&mut self, forward: bool) {
        match self.selected_row() {
            MenuRow::Tier => {
                self.setup.tier = if forward {
                    self.setup.tier.next()
                } else {
                    self.setup.tier.prev()
                };
            }
            MenuRow::Mode => self.setup.mode = self.setup.mode.toggle(),
            MenuRow::Accent => {
                let idx = ACCENTS
                    .iter()
                    .position(|a| *a == self.setup.accent)
                    .unwrap_or(0);
                self.setup.accent = ACCENTS[step(idx, ACCENTS.len(), forward)].to_string();
            }
            MenuRow::Speed => {
                let idx = SPEED_CHOICES
                    .iter()
                    .position(|s| *s == self.setup.speed)
                    .unwrap_or(0);
                self.setup.speed = SPEED_CHOICES[step(idx, SPEED_CHOICES.len(), forward)];
            }
            MenuRow::Theme => {
                let themes = Theme::available_themes();
                if themes.is_empty() {
                    return;
                }
                let idx = themes
                    .iter()
                    .position(|t| *t == self.theme.name)
                    .unwrap_or(0);
                let name = &themes[step(idx, themes.len(), forward)];
                if let Some(theme) = Theme::load(name) {
                    self.theme = theme;
                }
            }
            _ => {}
        }
    }

    pub fn activate_menu_row(&mut self) {
        match self.selected_row() {
            row if row.is_setting() => self.cycle_setting(true),
            MenuRow::Start => self.start_session(),
            MenuRow::Stats => self.go_to_stats(),
            MenuRow::Review => self.go_to_review(),
            MenuRow::Quit => self.should_quit = true,
            _ => {}
        }
    }

    fn remember_setup(&mut self) {
        self.config.tier = self.setup.tier;
        self.config.mode = self.setup.mode;
        self.config.accent = self.setup.accent.clone();
        self.config.speed = self.setup.speed;
        self.config.theme = self.theme.name.clone();
        if let Some(ref path) = self.config_path {
            if let Err(err) = self.config.save_to(path) {
                tracing::warn!(%err, "failed to save config");
            }
        }
    }

    // --- session lifecycle ---

    pub fn start_session(&mut self) {
        let Some(store) = self.store.take() else {
            tracing::error!("progress store missing, cannot start a session");
            return;
        };
        self.remember_setup();

        let settings = SessionSettings::new(
            &self.catalog,
            self.setup.tier,
            self.setup.mode,
            &self.setup.accent,
            self.setup.speed,
        );
        self.session = Some(GameSession::new(Arc::clone(&self.catalog), store, settings));
        self.status = None;
        self.start_level();
    }

    pub fn start_level(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let started = session.start_new_level().map(|_| ());
        if let Err(err) = started {
            tracing::error!(%err, "cannot start level");
            self.set_status(StatusKind::Error, err.to_string());
            self.end_session();
            return;
        }

        self.input.clear();
        self.last_result = None;
        self.last_diff.clear();
        self.feedback_until = None;
        self.screen = AppScreen::Playing;
        self.narrate_current();
    }

    /// Speak the active challenge. Also used for replays; a replay never
    /// re-arms a running countdown.
    pub fn narrate_current(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let state = session.state();
        let Some(text) = state.current_challenge.clone() else {
            return;
        };
        let accent = state.settings.accent.clone();
        let speed = state.settings.speed;

        self.narration_id += 1;
        let request = NarrationRequest {
            id: self.narration_id,
            text,
            accent,
            speed,
        };
        if self.playback != Playback::Answering {
            self.playback = Playback::Speaking;
        }
        let tx = self.events.clone();
        self.narrator.narrate(
            request,
            Box::new(move |signal| {
                let _ = tx.send(AppEvent::Narration(signal));
            }),
        );
    }

    pub fn replay(&mut self) {
        if self.screen == AppScreen::Playing {
            self.narrate_current();
        }
    }

    /// The game screen underneath a mid-game review, otherwise the current one.
    pub fn active_screen(&self) -> AppScreen {
        self.review_return.unwrap_or(self.screen)
    }

    pub fn on_narration(&mut self, signal: NarrationSignal) {
        if signal.id != self.narration_id || self.active_screen() != AppScreen::Playing {
            return;
        }
        match signal.event {
            NarrationEvent::Started => {}
            NarrationEvent::Finished => {
                self.playback = Playback::Answering;
                self.arm_countdown();
            }
            NarrationEvent::Failed(reason) => {
                tracing::warn!(%reason, "narration failed");
                self.set_status(StatusKind::Warning, format!("Audio unavailable: {reason}"));
                self.playback = Playback::Silent;
                self.arm_countdown();
            }
        }
    }

    fn arm_countdown(&mut self) {
        let tx = self.events.clone();
        if let Some(session) = self.session.as_mut() {
            session.playback_finished(move |tick| tx.send(AppEvent::Countdown(tick)).is_ok());
        }
    }

    pub fn on_countdown(&mut self, tick: CountdownTick) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.on_tick(tick) == TickOutcome::Expired {
            let result = session.time_out();
            self.after_evaluation(result);
        }
    }

    pub fn submit_answer(&mut self) {
        if self.input.is_blank() {
            self.set_status(StatusKind::Warning, "Please type your answer!");
            return;
        }
        let answer = self.input.value().trim().to_string();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let result = session.submit_answer(&answer);
        self.after_evaluation(result);
    }

    fn after_evaluation(&mut self, result: Result<LevelResult, SessionError>) {
        let result = match result {
            Ok(result) => result,
            Err(err) => {
                tracing::debug!(%err, "evaluation ignored");
                return;
            }
        };
        self.narrator.cancel();
        self.checkpoint();

        if let Some(badge) = result.new_badges.first() {
            let info = self.catalog.badge(*badge);
            self.set_status(StatusKind::Info, format!("Badge unlocked: {}", info.name));
        }
        self.last_diff = evaluator::compare_words(&result.user_answer, &result.correct_answer);
        self.last_result = Some(result);
        self.feedback_until =
            Some(Instant::now() + Duration::from_millis(self.config.feedback_delay_ms));
        if self.review_return.is_some() {
            self.review_return = Some(AppScreen::Feedback);
        } else {
            self.screen = AppScreen::Feedback;
        }
    }

    fn checkpoint(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.save_progress() {
            Ok(progress) => {
                self.high_score = progress.high_score;
                self.lifetime = progress;
            }
            Err(err) => {
                tracing::error!(%err, "failed to save progress");
                self.set_status(StatusKind::Error, "Could not save progress");
            }
        }
    }

    pub fn new_badge_infos(&self) -> Vec<BadgeInfo> {
        self.last_result
            .as_ref()
            .map(|r| r.new_badges.iter().map(|id| self.catalog.badge(*id)).collect())
            .unwrap_or_default()
    }

    pub fn feedback_remaining_ms(&self, now: Instant) -> Option<u64> {
        self.feedback_until
            .map(|until| until.saturating_duration_since(now).as_millis() as u64)
    }

    /// Periodic housekeeping: expire the status line and auto-advance past
    /// the feedback screen.
    pub fn on_tick(&mut self, now: Instant) {
        if self
            .status
            .as_ref()
            .is_some_and(|s| now.duration_since(s.since) >= STATUS_TTL)
        {
            self.status = None;
        }
        if self.screen == AppScreen::Feedback
            && !self.confirm_quit
            && self.feedback_until.is_some_and(|until| now >= until)
        {
            self.start_level();
        }
    }

    pub fn continue_now(&mut self) {
        if self.screen == AppScreen::Feedback {
            self.start_level();
        }
    }

    pub fn request_quit(&mut self) {
        if self.session.is_some() {
            self.confirm_quit = true;
        } else {
            self.go_to_menu();
        }
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    /// Stop the session, checkpoint, and show what was missed.
    pub fn end_session(&mut self) {
        self.narrator.cancel();
        self.confirm_quit = false;
        self.feedback_until = None;
        self.review_return = None;
        let Some(session) = self.session.take() else {
            return;
        };

        let (summary, store) = session.quit();
        self.lifetime = summary.progress.clone().unwrap_or_else(|| store.load());
        self.high_score = store.high_score();
        self.store = Some(store);
        self.review_scroll = 0;
        self.screen = if summary.wrong_answers.is_empty() {
            AppScreen::Stats
        } else {
            AppScreen::Review
        };
        self.last_summary = Some(summary);
    }

    /// Leave the app, saving any running session first.
    pub fn shutdown(&mut self) {
        self.end_session();
        self.should_quit = true;
    }

    // --- navigation ---

    pub fn go_to_menu(&mut self) {
        self.screen = AppScreen::Menu;
    }

    pub fn go_to_stats(&mut self) {
        self.screen = AppScreen::Stats;
    }

    pub fn go_to_review(&mut self) {
        self.review_scroll = 0;
        self.review_return = None;
        self.screen = AppScreen::Review;
    }

    /// Show this session's mistakes without leaving the game. The countdown
    /// keeps running underneath.
    pub fn open_live_review(&mut self) {
        if !matches!(self.screen, AppScreen::Playing | AppScreen::Feedback) {
            return;
        }
        let misses = self
            .session
            .as_ref()
            .map_or(0, |s| s.state().wrong_answers.len());
        if misses == 0 {
            self.set_status(StatusKind::Info, "No mistakes yet! Keep up the good work!");
            return;
        }
        self.review_scroll = 0;
        self.review_return = Some(self.screen);
        self.screen = AppScreen::Review;
    }

    pub fn is_live_review(&self) -> bool {
        self.review_return.is_some()
    }

    pub fn close_review(&mut self) {
        match self.review_return.take() {
            Some(screen) => self.screen = screen,
            None => self.go_to_stats(),
        }
    }

    pub fn review_entries(&self) -> &[WrongAnswer] {
        let live = self
            .review_return
            .and(self.session.as_ref())
            .map(|s| s.state().wrong_answers.as_slice());
        live.or_else(|| {
            self.last_summary
                .as_ref()
                .map(|s| s.wrong_answers.as_slice())
        })
        .unwrap_or(&[])
    }
}

fn step(idx: usize, len: usize, forward: bool) -> usize {
    if forward {
        (idx + 1) % len
    } else {
        (idx + len - 1) % len
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::{self, Receiver};

    use super::*;
    use crate::narration::SilentNarrator;
    use crate::store::kv::MemoryStore;
    use crate::store::schema::HIGH_SCORE_KEY;

    fn make_app(store: MemoryStore) -> (App, Receiver<AppEvent>) {
        let (tx, rx) = mpsc::channel();
        let catalog = Arc::new(Catalog::builtin().unwrap());
        let app = App::new(
            Config::default(),
            Theme::default(),
            catalog,
            Box::new(store),
            Box::new(SilentNarrator),
            tx,
        );
        (app, rx)
    }

    /// Feed pending narration signals back into the app, as the UI loop does.
    fn pump_narration(app: &mut App, rx: &Receiver<AppEvent>) {
        while let Ok(event) = rx.try_recv() {
            if let AppEvent::Narration(signal) = event {
                app.on_narration(signal);
            }
        }
    }

    fn current_challenge(app: &App) -> String {
        app.session
            .as_ref()
            .and_then(|s| s.state().current_challenge.clone())
            .unwrap()
    }

    #[test]
    fn start_session_narrates_then_arms_countdown() {
        let (mut app, rx) = make_app(MemoryStore::new());
        app.start_session();
        assert_eq!(app.screen, AppScreen::Playing);
        assert_eq!(app.playback, Playback::Speaking);
        assert!(!app.session.as_ref().unwrap().state().is_playing);

        pump_narration(&mut app, &rx);
        assert_eq!(app.playback, Playback::Answering);
        assert!(app.session.as_ref().unwrap().state().is_playing);
    }

    #[test]
    fn stale_narration_signals_are_ignored() {
        let (mut app, rx) = make_app(MemoryStore::new());
        app.start_session();
        while rx.try_recv().is_ok() {}

        app.on_narration(NarrationSignal {
            id: app.narration_id + 7,
            event: NarrationEvent::Finished,
        });
        assert!(!app.session.as_ref().unwrap().state().is_playing);
    }

    #[test]
    fn blank_answer_keeps_playing() {
        let (mut app, rx) = make_app(MemoryStore::new());
        app.start_session();
        pump_narration(&mut app, &rx);

        app.input = LineInput::new("   ");
        app.submit_answer();
        assert_eq!(app.screen, AppScreen::Playing);
        assert_eq!(app.status.as_ref().map(|s| s.kind), Some(StatusKind::Warning));
    }

    #[test]
    fn correct_answer_checkpoints_and_shows_feedback() {
        let (mut app, rx) = make_app(MemoryStore::new());
        app.start_session();
        pump_narration(&mut app, &rx);

        app.input = LineInput::new(&current_challenge(&app));
        app.submit_answer();
        assert_eq!(app.screen, AppScreen::Feedback);
        let result = app.last_result.as_ref().unwrap();
        assert!(result.is_correct);
        assert_eq!(result.points, 15);
        assert_eq!(app.lifetime.levels_completed, 1);
        assert_eq!(app.high_score, 15);
    }

    #[test]
    fn feedback_auto_advances_after_delay() {
        let (mut app, rx) = make_app(MemoryStore::new());
        app.config.feedback_delay_ms = 0;
        app.start_session();
        pump_narration(&mut app, &rx);

        app.input = LineInput::new("surely not this");
        app.submit_answer();
        assert_eq!(app.screen, AppScreen::Feedback);
        assert!(!app.last_diff.is_empty());

        app.on_tick(Instant::now());
        assert_eq!(app.screen, AppScreen::Playing);
        assert_eq!(app.session.as_ref().unwrap().state().level, 2);
        assert!(app.input.value().is_empty());
    }

    #[test]
    fn quit_confirmation_then_review() {
        let (mut app, rx) = make_app(MemoryStore::new());
        app.start_session();
        pump_narration(&mut app, &rx);
        app.input = LineInput::new("wrong answer here");
        app.submit_answer();

        app.request_quit();
        assert!(app.confirm_quit);
        app.cancel_quit();
        assert!(app.session.is_some());

        app.request_quit();
        app.end_session();
        assert!(app.session.is_none());
        assert_eq!(app.screen, AppScreen::Review);
        assert_eq!(app.review_entries().len(), 1);
        assert_eq!(app.lifetime.levels_completed, 1);
    }

    #[test]
    fn second_session_reuses_store_and_keeps_high_score() {
        let mut kv = MemoryStore::new();
        kv.set(HIGH_SCORE_KEY, "50").unwrap();
        let (mut app, rx) = make_app(kv);
        assert_eq!(app.high_score, 50);

        app.start_session();
        pump_narration(&mut app, &rx);
        app.input = LineInput::new(&current_challenge(&app));
        app.submit_answer();
        app.end_session();
        assert_eq!(app.screen, AppScreen::Stats);
        assert_eq!(app.high_score, 50);

        app.start_session();
        assert_eq!(app.screen, AppScreen::Playing);
        assert_eq!(app.session.as_ref().unwrap().state().levels_completed, 1);
    }

    #[test]
    fn menu_cycles_settings() {
        let (mut app, _rx) = make_app(MemoryStore::new());
        app.menu_selected = 0;
        assert_eq!(app.selected_row(), MenuRow::Tier);
        app.cycle_setting(false);
        assert_eq!(app.setup.tier, Tier::VeryHard);

        app.menu_next();
        app.activate_menu_row();
        assert_eq!(app.setup.mode, Mode::Sentence);

        app.menu_next();
        app.cycle_setting(true);
        assert_eq!(app.setup.accent, "en-GB");

        app.menu_next();
        app.cycle_setting(true);
        assert_eq!(app.setup.speed, Some(0.5));
        app.cycle_setting(false);
        app.cycle_setting(false);
        assert_eq!(app.setup.speed, Some(1.5));

        app.menu_prev();
        app.menu_prev();
        app.menu_prev();
        app.menu_prev();
        assert_eq!(app.selected_row(), MenuRow::Quit);
        app.activate_menu_row();
        assert!(app.should_quit);
    }

    #[test]
    fn mistakes_can_be_reviewed_mid_game() {
        let (mut app, rx) = make_app(MemoryStore::new());
        app.start_session();
        pump_narration(&mut app, &rx);

        app.open_live_review();
        assert_eq!(app.screen, AppScreen::Playing);
        assert_eq!(
            app.status.as_ref().map(|s| s.text.as_str()),
            Some("No mistakes yet! Keep up the good work!")
        );

        app.input = LineInput::new("not even close");
        app.submit_answer();
        assert_eq!(app.screen, AppScreen::Feedback);

        app.open_live_review();
        assert_eq!(app.screen, AppScreen::Review);
        assert!(app.is_live_review());
        assert_eq!(app.review_entries().len(), 1);
        assert_eq!(app.review_entries()[0].submitted, "not even close");

        app.close_review();
        assert_eq!(app.screen, AppScreen::Feedback);
        assert!(app.session.is_some());
        assert!(!app.is_live_review());
    }

    #[test]
    fn level_ending_during_review_returns_to_feedback() {
        let (mut app, rx) = make_app(MemoryStore::new());
        app.config.feedback_delay_ms = 0;
        app.start_session();
        pump_narration(&mut app, &rx);
        app.input = LineInput::new("wrong again");
        app.submit_answer();
        app.continue_now();
        pump_narration(&mut app, &rx);
        assert_eq!(app.screen, AppScreen::Playing);

        app.open_live_review();
        assert_eq!(app.screen, AppScreen::Review);
        app.input = LineInput::new("still wrong");
        app.submit_answer();
        assert_eq!(app.screen, AppScreen::Review);
        assert_eq!(app.review_entries().len(), 2);

        // No auto-advance while the review is open.
        app.on_tick(Instant::now());
        assert_eq!(app.session.as_ref().unwrap().state().level, 2);

        app.close_review();
        assert_eq!(app.screen, AppScreen::Feedback);
    }

    #[test]
    fn shutdown_saves_running_session() {
        let (mut app, rx) = make_app(MemoryStore::new());
        app.start_session();
        pump_narration(&mut app, &rx);
        app.shutdown();
        assert!(app.should_quit);
        assert!(app.session.is_none());
        assert_eq!(app.lifetime.levels_completed, 1);
    }
}
