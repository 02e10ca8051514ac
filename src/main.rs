mod app;
mod event;
mod ui;

use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use tracing::{info, warn};

use mathadv::config::Config;
use mathadv::engine::DifficultyLevel;
use mathadv::engine::predictor::load_predictor;
use mathadv::logging;
use mathadv::store::json_store::JsonStore;

use app::{App, AppScreen, NAME_MAX_LEN};
use event::{AppEvent, EventHandler};
use ui::components::menu::{WelcomeFocus, WelcomeView};
use ui::components::puzzle_view::PuzzleView;
use ui::components::summary::SummaryView;
use ui::layout::{ScreenLayout, centered_rect, pack_hint_lines};
use ui::line_input::{InputKind, InputResult, LineInput};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LevelArg {
    Easy,
    Medium,
    Hard,
}

impl From<LevelArg> for DifficultyLevel {
    fn from(arg: LevelArg) -> Self {
        match arg {
            LevelArg::Easy => DifficultyLevel::Easy,
            LevelArg::Medium => DifficultyLevel::Medium,
            LevelArg::Hard => DifficultyLevel::Hard,
        }
    }
}

#[derive(Parser)]
#[command(
    name = "mathadv",
    version,
    about = "Terminal arithmetic practice with adaptive difficulty"
)]
struct Cli {
    #[arg(short, long, value_enum, help = "Starting difficulty level")]
    level: Option<LevelArg>,

    #[arg(short, long, help = "Number of puzzles per session")]
    puzzles: Option<usize>,

    #[arg(short, long, help = "Player name")]
    name: Option<String>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Seed for reproducible puzzle sequences")]
    seed: Option<u64>,

    #[arg(long, help = "Path to a difficulty predictor model (JSON)")]
    model: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = JsonStore::default_dir();
    if let Err(err) = logging::init(&data_dir) {
        eprintln!("warning: {err}");
    }

    let mut config = Config::load().unwrap_or_else(|err| {
        warn!(error = %err, "could not read config, using defaults");
        Config::default()
    });
    if let Some(puzzles) = cli.puzzles {
        config.session_length = puzzles;
    }
    if let Some(level) = cli.level {
        config.starting_level = level.into();
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if let Some(model) = cli.model {
        config.predictor_model = Some(model);
    }
    config.validate().context("invalid configuration")?;

    let predictor = load_predictor(
        config.predictor_model.as_deref().map(Path::new),
        config.predictor_init_timeout(),
    );
    let store = match JsonStore::new() {
        Ok(store) => Some(store),
        Err(err) => {
            warn!(error = %err, "progress will not be saved");
            None
        }
    };

    let mut app = App::new(config, store, predictor).with_seed(cli.seed);
    if let Some(level) = cli.level {
        app.level_menu.selected = level.into();
    }
    if let Some(name) = cli.name {
        app.name_input = LineInput::new(&name, InputKind::Text { max_len: NAME_MAX_LEN });
        app.level_menu.focus = WelcomeFocus::Level;
    }
    info!("mathadv started");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(250));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

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
            AppEvent::Tick | AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Welcome => handle_welcome_key(app, key),
        AppScreen::Puzzle => handle_puzzle_key(app, key),
        AppScreen::Summary => handle_summary_key(app, key),
    }
}

fn handle_welcome_key(app: &mut App, key: KeyEvent) {
    if matches!(key.code, KeyCode::Tab | KeyCode::BackTab) {
        app.level_menu.toggle_focus();
        return;
    }

    match app.level_menu.focus {
        WelcomeFocus::Name => match app.name_input.handle(key) {
            InputResult::Submit => app.level_menu.toggle_focus(),
            InputResult::Cancel => app.should_quit = true,
            InputResult::Continue => {}
        },
        WelcomeFocus::Level => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => app.level_menu.prev(),
            KeyCode::Down | KeyCode::Char('j') => app.level_menu.next(),
            KeyCode::Char(ch @ '1'..='3') => {
                let index = ch as usize - '1' as usize;
                if let Some(level) = DifficultyLevel::from_index(index) {
                    app.level_menu.selected = level;
                    app.start_session();
                }
            }
            KeyCode::Enter => app.start_session(),
            _ => {}
        },
    }
}

fn handle_puzzle_key(app: &mut App, key: KeyEvent) {
    match app.answer.handle(key) {
        InputResult::Submit => app.submit_answer(),
        InputResult::Cancel => app.end_session(),
        InputResult::Continue => {}
    }
}

fn handle_summary_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char('r') => app.play_again(),
        KeyCode::Char('m') | KeyCode::Esc => app.go_to_welcome(),
        KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let layout = ScreenLayout::new(area);
    render_header(frame, app, layout.header);

    let hints: &[&str] = match app.screen {
        AppScreen::Welcome => {
            render_welcome(frame, app, layout.main);
            match app.level_menu.focus {
                WelcomeFocus::Name => &["[Enter/Tab] Choose level", "[Esc] Quit"],
                WelcomeFocus::Level => &[
                    "[1-3/Enter] Start",
                    "[Up/Down] Level",
                    "[Tab] Edit name",
                    "[q] Quit",
                ],
            }
        }
        AppScreen::Puzzle => {
            render_puzzle(frame, app, layout.main);
            &["[Enter] Submit", "[Backspace] Delete", "[Esc] End session"]
        }
        AppScreen::Summary => {
            render_summary(frame, app, layout.main);
            &["[Enter] Play again", "[m] Menu", "[q] Quit"]
        }
    };

    let footer_text = pack_hint_lines(hints, layout.footer.width as usize)
        .into_iter()
        .next()
        .unwrap_or_default();
    let footer = Paragraph::new(Line::from(Span::styled(
        footer_text,
        Style::default().fg(colors.muted()),
    )));
    frame.render_widget(footer, layout.footer);
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    let colors = &app.theme.colors;
    let info = format!(
        " {} | rating {} | {} sessions",
        app.player_name(),
        app.profile.rating,
        app.profile.games_played
    );
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " mathadv ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            info,
            Style::default().fg(colors.muted()).bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn render_welcome(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    let menu_area = centered_rect(50, 80, area);
    let view = WelcomeView {
        menu: &app.level_menu,
        name: &app.name_input,
        levels: &app.config.levels,
        profile: &app.profile,
        theme: app.theme,
    };
    frame.render_widget(view, menu_area);

    if let Some(ref err) = app.start_error {
        let colors = &app.theme.colors;
        let line = Paragraph::new(Line::from(Span::styled(
            format!(" {err}"),
            Style::default().fg(colors.error()),
        )));
        let bottom = ratatui::layout::Rect::new(
            area.x,
            area.y + area.height.saturating_sub(1),
            area.width,
            1,
        );
        frame.render_widget(line, bottom);
    }
}

fn render_puzzle(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    if let Some(ref session) = app.session {
        let view = PuzzleView {
            session,
            answer: &app.answer,
            feedback: app.feedback.as_ref(),
            elapsed_secs: app.seconds_on_puzzle(),
            theme: app.theme,
        };
        frame.render_widget(view, centered_rect(60, 70, area));
    }
}

fn render_summary(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    if let Some(ref report) = app.report {
        let centered = centered_rect(60, 80, area);
        let view = SummaryView::new(report, app.save_error.as_deref(), app.theme);
        frame.render_widget(view, centered);
    }
}
