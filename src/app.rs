use std::sync::Arc;
use std::time::Instant;

use tracing::warn;

use mathadv::config::Config;
use mathadv::engine::predictor::DifficultyPredictor;
use mathadv::generator::PuzzleGenerator;
use mathadv::session::{Session, SessionContext, SessionReport};
use mathadv::store::json_store::JsonStore;
use mathadv::store::schema::ProfileData;

use crate::ui::components::menu::{LevelMenu, WelcomeFocus};
use crate::ui::components::puzzle_view::Feedback;
use crate::ui::line_input::{InputKind, LineInput};
use crate::ui::theme::Theme;

pub const NAME_MAX_LEN: usize = 24;
const DEFAULT_PLAYER: &str = "Player";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Welcome,
    Puzzle,
    Summary,
}

pub struct App {
    pub screen: AppScreen,
    pub theme: &'static Theme,
    pub config: Config,
    pub profile: ProfileData,
    pub name_input: LineInput,
    pub level_menu: LevelMenu,
    pub session: Option<Session>,
    pub answer: LineInput,
    pub feedback: Option<Feedback>,
    pub report: Option<SessionReport>,
    pub save_error: Option<String>,
    pub start_error: Option<String>,
    pub should_quit: bool,
    puzzle_started: Instant,
    store: Option<JsonStore>,
    predictor: Arc<dyn DifficultyPredictor>,
    seed: Option<u64>,
    sessions_started: u64,
}

impl App {
    pub fn new(
        config: Config,
        store: Option<JsonStore>,
        predictor: Arc<dyn DifficultyPredictor>,
    ) -> Self {
        let loaded_theme = Theme::load(&config.theme).unwrap_or_else(|| {
            warn!(theme = %config.theme, available = ?Theme::available_themes(), "unknown theme");
            Theme::default()
        });
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));

        let profile = store
            .as_ref()
            .map(JsonStore::load_profile)
            .unwrap_or_default();

        let name = if config.player_name.is_empty() {
            profile.player_name.clone()
        } else {
            config.player_name.clone()
        };
        let level_menu = LevelMenu::new(profile.last_level.unwrap_or(config.starting_level));

        Self {
            screen: AppScreen::Welcome,
            theme,
            config,
            profile,
            name_input: LineInput::new(&name, InputKind::Text { max_len: NAME_MAX_LEN }),
            level_menu,
            session: None,
            answer: LineInput::answer(),
            feedback: None,
            report: None,
            save_error: None,
            start_error: None,
            should_quit: false,
            puzzle_started: Instant::now(),
            store,
            predictor,
            seed: None,
            sessions_started: 0,
        }
    }

    /// Makes every session's puzzle sequence reproducible.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn player_name(&self) -> String {
        let name = self.name_input.value().trim();
        if name.is_empty() {
            DEFAULT_PLAYER.to_string()
        } else {
            name.to_string()
        }
    }

    pub fn start_session(&mut self) {
        let context = SessionContext {
            player_name: self.player_name(),
            starting_level: self.level_menu.selected,
            prior_rating: self.profile.rating,
            games_played: self.profile.games_played,
        };

        let result = match self.seed {
            Some(seed) => {
                let generator = PuzzleGenerator::with_seed(
                    self.config.levels.clone(),
                    seed.wrapping_add(self.sessions_started),
                );
                Session::with_generator(&self.config, context, generator, self.predictor.clone())
            }
            None => Session::new(&self.config, context, self.predictor.clone()),
        };

        match result {
            Ok(session) => {
                self.sessions_started += 1;
                self.session = Some(session);
                self.report = None;
                self.save_error = None;
                self.start_error = None;
                self.feedback = None;
                self.answer.clear();
                self.puzzle_started = Instant::now();
                self.screen = AppScreen::Puzzle;
            }
            Err(err) => {
                warn!(error = %err, "cannot start session");
                self.start_error = Some(err.to_string());
                self.screen = AppScreen::Welcome;
            }
        }
    }

    pub fn submit_answer(&mut self) {
        if self.answer.is_empty() {
            return;
        }
        let Some(submitted) = self.answer.parse_answer() else {
            self.feedback = Some(Feedback::NotANumber);
            return;
        };
        let elapsed = self.puzzle_started.elapsed();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(round) = session.submit_answer(submitted, elapsed) else {
            return;
        };

        self.feedback = Some(Feedback::from_round(&round));
        self.answer.clear();
        if round.finished {
            self.finish_session();
        } else {
            self.puzzle_started = Instant::now();
        }
    }

    /// Ends the current session. With no answers recorded there is nothing
    /// to score, so the player goes back to the welcome screen instead.
    pub fn end_session(&mut self) {
        let answered = self
            .session
            .as_ref()
            .is_some_and(|s| !s.tracker().is_empty());
        if answered {
            self.finish_session();
        } else {
            self.session = None;
            self.go_to_welcome();
        }
    }

    fn finish_session(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        let report = session.finish();

        if let Some(store) = self.store.as_ref() {
            match store.record_session(&report) {
                Ok(profile) => self.profile = profile,
                Err(err) => {
                    warn!(error = %err, "failed to save session");
                    self.save_error = Some(err.to_string());
                }
            }
        } else {
            self.profile.rating = report.rating.new_rating;
            self.profile.games_played += 1;
            self.profile.best_score = self.profile.best_score.max(report.rating.score);
        }

        self.level_menu.selected = report.recommended_level;
        self.report = Some(report);
        self.screen = AppScreen::Summary;
    }

    pub fn play_again(&mut self) {
        self.start_session();
    }

    pub fn go_to_welcome(&mut self) {
        self.level_menu.focus = WelcomeFocus::Level;
        self.feedback = None;
        self.screen = AppScreen::Welcome;
    }

    pub fn seconds_on_puzzle(&self) -> f64 {
        self.puzzle_started.elapsed().as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathadv::engine::DifficultyLevel;
    use mathadv::engine::predictor::NullPredictor;
    use tempfile::TempDir;

    fn app(length: usize) -> App {
        let config = Config {
            session_length: length,
            ..Config::default()
        };
        App::new(config, None, Arc::new(NullPredictor)).with_seed(Some(7))
    }

    fn type_answer(app: &mut App, answer: i64) {
        app.answer = LineInput::new(&answer.to_string(), InputKind::Answer);
        app.submit_answer();
    }

    fn answer_current(app: &mut App) {
        let answer = i64::from(app.session.as_ref().unwrap().current_puzzle().answer);
        type_answer(app, answer);
    }

    #[test]
    fn starts_on_welcome_with_configured_level() {
        let app = app(3);
        assert_eq!(app.screen, AppScreen::Welcome);
        assert_eq!(app.level_menu.selected, DifficultyLevel::Medium);
        assert_eq!(app.player_name(), DEFAULT_PLAYER);
    }

    #[test]
    fn non_numeric_answer_is_not_recorded() {
        let mut app = app(3);
        app.start_session();
        app.submit_answer();
        assert_eq!(app.feedback, None);
        app.answer = LineInput::new("-", InputKind::Answer);
        app.submit_answer();
        assert_eq!(app.feedback, Some(Feedback::NotANumber));
        assert!(app.session.as_ref().unwrap().tracker().is_empty());
    }

    #[test]
    fn full_session_reaches_summary() {
        let mut app = app(2);
        app.start_session();
        assert_eq!(app.screen, AppScreen::Puzzle);
        answer_current(&mut app);
        answer_current(&mut app);
        assert_eq!(app.screen, AppScreen::Summary);
        let report = app.report.as_ref().unwrap();
        assert_eq!(report.summary.correct, 2);
        assert_eq!(app.profile.games_played, 1);
        assert_eq!(app.level_menu.selected, report.recommended_level);
    }

    #[test]
    fn ending_without_answers_returns_to_welcome() {
        let mut app = app(5);
        app.start_session();
        app.end_session();
        assert_eq!(app.screen, AppScreen::Welcome);
        assert!(app.report.is_none());
    }

    #[test]
    fn ending_early_scores_partial_session() {
        let mut app = app(5);
        app.start_session();
        type_answer(&mut app, -1);
        app.end_session();
        assert_eq!(app.screen, AppScreen::Summary);
        assert_eq!(app.report.as_ref().unwrap().summary.total, 1);
    }

    #[test]
    fn invalid_config_stays_on_welcome() {
        let config = Config {
            session_length: 0,
            ..Config::default()
        };
        let mut app = App::new(config, None, Arc::new(NullPredictor));
        app.start_session();
        assert_eq!(app.screen, AppScreen::Welcome);
        assert!(app.start_error.is_some());
    }

    #[test]
    fn finished_session_is_persisted() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let config = Config {
            session_length: 1,
            ..Config::default()
        };
        let mut app = App::new(config, Some(store), Arc::new(NullPredictor)).with_seed(Some(1));
        app.name_input = LineInput::new("Grace", InputKind::Text { max_len: NAME_MAX_LEN });
        app.start_session();
        answer_current(&mut app);

        let reloaded = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let profile = reloaded.load_profile();
        assert_eq!(profile.player_name, "Grace");
        assert_eq!(profile.games_played, 1);
        assert_eq!(reloaded.load_history().sessions.len(), 1);
    }
}
