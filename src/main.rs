mod app;
mod catalog;
mod config;
mod engine;
mod event;
mod logging;
mod narration;
mod session;
mod store;
mod ui;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph};

use app::{App, AppScreen, AppStore, StatusKind};
use catalog::{Catalog, Mode, Tier};
use config::Config;
use event::{AppEvent, EventHandler};
use narration::NarratorKind;
use store::kv::{FileStore, MemoryStore};
use ui::components::challenge_panel::ChallengePanel;
use ui::components::dashboard::Dashboard;
use ui::components::feedback_panel::FeedbackPanel;
use ui::components::menu::Menu;
use ui::components::progress_bar::ProgressBar;
use ui::components::review_list::{ENTRY_HEIGHT, ReviewList};
use ui::components::stats_sidebar::StatsSidebar;
use ui::layout::{AppLayout, pack_hint_lines};
use ui::line_input::InputResult;
use ui::theme::Theme;

/// Seconds left at which the timer bar turns to the warning color.
const TIMER_WARNING_SECS: u32 = 5;

#[derive(Parser)]
#[command(name = "dictum", version, about = "Terminal vocabulary dictation game")]
struct Cli {
    #[arg(long, value_enum, help = "Difficulty tier")]
    tier: Option<Tier>,

    #[arg(short, long, value_enum, help = "Word or sentence challenges")]
    mode: Option<Mode>,

    #[arg(short, long, help = "Narrator accent (en-US, en-GB, en-IN)")]
    accent: Option<String>,

    #[arg(short, long, help = "Narration speed multiplier")]
    speed: Option<f32>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Disable narration")]
    mute: bool,

    #[arg(long, help = "Directory for saved progress and logs")]
    data_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|err| {
        eprintln!("warning: {err:#}; using default settings");
        Config::default()
    });
    if let Some(tier) = cli.tier {
        config.tier = tier;
    }
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    if let Some(accent) = cli.accent {
        config.accent = accent;
    }
    if cli.speed.is_some() {
        config.speed = cli.speed;
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    config.validate();

    let log_dir = cli
        .data_dir
        .as_ref()
        .map(|dir| dir.join("logs"))
        .unwrap_or_else(logging::default_log_dir);
    let _log_guard = match logging::init(&log_dir, &config.log_level) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("warning: logging disabled: {err:#}");
            None
        }
    };
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "dictum starting");

    let catalog = match config.catalog_path {
        Some(ref path) => Catalog::from_path(path).or_else(|err| {
            tracing::warn!(%err, path = %path.display(), "custom catalog rejected, using builtin");
            Catalog::builtin()
        })?,
        None => Catalog::builtin()?,
    };

    let file_store = match cli.data_dir {
        Some(ref dir) => FileStore::with_base_dir(dir.clone()),
        None => FileStore::new(),
    };
    let store: AppStore = match file_store {
        Ok(store) => Box::new(store),
        Err(err) => {
            tracing::warn!(%err, "progress will not be saved this run");
            Box::new(MemoryStore::new())
        }
    };

    let narrator = if cli.mute {
        narration::build(NarratorKind::None, None)
    } else {
        narration::build(config.narrator, config.narrator_program.as_deref())
    };
    let theme = Theme::load(&config.theme).unwrap_or_default();

    let events = EventHandler::new(Duration::from_millis(100));
    let mut app = App::new(
        config,
        theme,
        Arc::new(catalog),
        store,
        narrator,
        events.sender(),
    )
    .with_config_path(Config::config_path());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &events);
    app.shutdown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(%err, "ui loop failed");
        eprintln!("Error: {err:?}");
    }
    tracing::info!("dictum exiting");

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick => app.on_tick(Instant::now()),
            AppEvent::Resize(_, _) => {}
            AppEvent::Countdown(tick) => app.on_countdown(tick),
            AppEvent::Narration(signal) => app.on_narration(signal),
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.shutdown();
        return;
    }

    if app.confirm_quit {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => app.end_session(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_quit(),
            _ => {}
        }
        return;
    }

    match app.screen {
        AppScreen::Menu => handle_menu_key(app, key),
        AppScreen::Playing => handle_playing_key(app, key),
        AppScreen::Feedback => handle_feedback_key(app, key),
        AppScreen::Review => handle_review_key(app, key),
        AppScreen::Stats => handle_stats_key(app, key),
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('s') => app.start_session(),
        KeyCode::Up | KeyCode::Char('k') => app.menu_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu_next(),
        KeyCode::Left | KeyCode::Char('h') => app.cycle_setting(false),
        KeyCode::Right | KeyCode::Char('l') => app.cycle_setting(true),
        KeyCode::Enter => app.activate_menu_row(),
        _ => {}
    }
}

fn handle_playing_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if key.code == KeyCode::Tab || (ctrl && key.code == KeyCode::Char('r')) {
        app.replay();
        return;
    }
    if ctrl && key.code == KeyCode::Char('l') {
        app.open_live_review();
        return;
    }
    match app.input.handle(key) {
        InputResult::Submit => app.submit_answer(),
        InputResult::Cancel => app.request_quit(),
        InputResult::Continue => {}
    }
}

fn handle_feedback_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') => app.continue_now(),
        KeyCode::Char('l') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.open_live_review()
        }
        KeyCode::Esc | KeyCode::Char('q') => app.request_quit(),
        _ => {}
    }
}

fn handle_review_key(app: &mut App, key: KeyEvent) {
    let max_scroll = app.review_entries().len().saturating_sub(1) * ENTRY_HEIGHT;
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter => app.close_review(),
        KeyCode::Down | KeyCode::Char('j') => {
            app.review_scroll = (app.review_scroll + ENTRY_HEIGHT).min(max_scroll);
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.review_scroll = app.review_scroll.saturating_sub(ENTRY_HEIGHT);
        }
        _ => {}
    }
}

fn handle_stats_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => app.go_to_menu(),
        KeyCode::Char('r') if !app.review_entries().is_empty() => app.go_to_review(),
        KeyCode::Char('s') => app.start_session(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Menu => render_menu(frame, app),
        AppScreen::Playing | AppScreen::Feedback => render_game(frame, app),
        AppScreen::Review => render_review(frame, app),
        AppScreen::Stats => render_stats(frame, app),
    }

    if app.confirm_quit {
        render_quit_confirm(frame, app);
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: Rect, info: &str) {
    let colors = &app.theme.colors;
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " dictum ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            info,
            Style::default().fg(colors.text_dim()).bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, area: Rect, hints: &[&str]) {
    let lines: Vec<Line> = pack_hint_lines(hints, area.width as usize)
        .into_iter()
        .take(area.height.max(1) as usize)
        .map(|line| {
            Line::from(Span::styled(
                line,
                Style::default().fg(app.theme.colors.text_dim()),
            ))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_status(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let Some(ref status) = app.status else {
        return;
    };
    let colors = &app.theme.colors;
    let color = match status.kind {
        StatusKind::Info => colors.success(),
        StatusKind::Warning => colors.warning(),
        StatusKind::Error => colors.error(),
    };
    let line = Paragraph::new(Line::from(Span::styled(
        status.text.as_str(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(line, area);
}

fn render_menu(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let header_info = format!(
        " High score {} | {} levels | {} badges | narrator: {}",
        app.high_score,
        app.lifetime.levels_completed,
        app.lifetime.earned_badges.len(),
        app.narrator_name(),
    );
    render_header(frame, app, layout[0], &header_info);

    let menu_area = ui::layout::centered_rect(50, 70, layout[1]);
    let menu = Menu::new(app.menu_items(), app.menu_selected, &app.theme);
    frame.render_widget(menu, menu_area);

    render_status(frame, app, layout[2]);
    render_footer(
        frame,
        app,
        layout[3],
        &[
            "[\u{2191}\u{2193}] Select",
            "[\u{2190}\u{2192}] Change",
            "[Enter] Activate",
            "[s] Start",
            "[q] Quit",
        ],
    );
}

fn render_game(frame: &mut ratatui::Frame, app: &App) {
    let Some(ref session) = app.session else {
        return;
    };
    let area = frame.area();
    let colors = &app.theme.colors;
    let state = session.state();
    let app_layout = AppLayout::new(area);

    let mut header_info = format!(
        " {} | {} | Score {}",
        state.settings.tier, state.settings.mode, state.score
    );
    if !app_layout.tier.show_sidebar() {
        header_info.push_str(&format!(
            " | Streak {} | Best {}",
            state.streak,
            app.high_score.max(state.score)
        ));
    }
    render_header(frame, app, app_layout.header, &header_info);

    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(app_layout.main);

    let limit = session.time_limit();
    let remaining = state.time_remaining;
    let ratio = if limit == 0 {
        0.0
    } else {
        remaining as f64 / limit as f64
    };
    let fill = if remaining <= TIMER_WARNING_SECS {
        colors.warning()
    } else {
        colors.bar_filled()
    };
    let timer = ProgressBar::new("Time", ratio, &app.theme)
        .caption(format!("{remaining}s"))
        .fill(fill);
    frame.render_widget(timer, main[0]);

    let hints: &[&str] = match app.screen {
        AppScreen::Feedback => {
            if let Some(ref result) = app.last_result {
                let panel = FeedbackPanel::new(
                    result,
                    &app.last_diff,
                    app.new_badge_infos(),
                    app.feedback_remaining_ms(Instant::now()),
                    &app.theme,
                );
                frame.render_widget(panel, main[1]);
            }
            &["[Enter] Next level", "[Ctrl-L] Mistakes", "[Esc] End session"]
        }
        _ => {
            let panel = ChallengePanel::new(
                state.level,
                state.settings.mode,
                app.playback,
                &app.input,
                &app.theme,
            );
            frame.render_widget(panel, main[1]);
            &["[Enter] Submit", "[Tab] Replay", "[Ctrl-L] Mistakes", "[Esc] End session"]
        }
    };

    render_status(frame, app, main[2]);

    if let Some(sidebar_area) = app_layout.sidebar {
        let sidebar = StatsSidebar::new(state, app.high_score, &app.catalog, &app.theme);
        frame.render_widget(sidebar, sidebar_area);
    }

    render_footer(frame, app, app_layout.footer, hints);
}

fn render_review(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let centered = ui::layout::centered_rect(70, 90, layout[0]);
    let list = ReviewList::new(app.review_entries(), app.review_scroll, &app.theme);
    frame.render_widget(list, centered);

    if app.is_live_review() {
        let clock = app
            .session
            .as_ref()
            .map(|s| format!("{}s left", s.state().time_remaining))
            .unwrap_or_default();
        render_footer(
            frame,
            app,
            layout[1],
            &["[\u{2191}\u{2193}] Scroll", "[Enter/Esc] Back to game", &clock],
        );
    } else {
        render_footer(
            frame,
            app,
            layout[1],
            &["[\u{2191}\u{2193}] Scroll", "[Enter/Esc] Statistics"],
        );
    }
}

fn render_stats(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let centered = ui::layout::centered_rect(70, 85, layout[0]);
    let dashboard = Dashboard::new(
        app.last_summary.as_ref(),
        &app.lifetime,
        &app.catalog,
        &app.theme,
    );
    frame.render_widget(dashboard, centered);
    render_status(frame, app, layout[1]);
}

fn render_quit_confirm(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let popup = ui::layout::centered_rect(40, 20, frame.area());
    frame.render_widget(Clear, popup);

    let block = Block::bordered()
        .title(" End session? ")
        .border_style(Style::default().fg(colors.warning()))
        .style(Style::default().bg(colors.bg()));
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Your progress will be saved.",
            Style::default().fg(colors.fg()),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "[y] End session   [n] Keep playing",
            Style::default().fg(colors.accent()),
        )),
    ];
    frame.render_widget(
        Paragraph::new(text).alignment(Alignment::Center).block(block),
        popup,
    );
}
