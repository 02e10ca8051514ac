use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use mathadv::config::Config;
use mathadv::engine::DifficultyLevel;
use mathadv::engine::predictor::NullPredictor;
use mathadv::engine::rating::{RATING_FLOOR, RatingUpdate, rating_delta, session_score};
use mathadv::generator::PuzzleGenerator;
use mathadv::session::{Session, SessionContext};
use mathadv::store::json_store::JsonStore;

fn new_session(store: &JsonStore, level: DifficultyLevel, length: usize, seed: u64) -> Session {
    let profile = store.load_profile();
    let config = Config {
        session_length: length,
        ..Config::default()
    };
    let context = SessionContext {
        player_name: "Robin".to_string(),
        starting_level: level,
        prior_rating: profile.rating,
        games_played: profile.games_played,
    };
    let generator = PuzzleGenerator::with_seed(config.levels.clone(), seed);
    Session::with_generator(&config, context, generator, Arc::new(NullPredictor)).unwrap()
}

#[test]
fn hard_session_score_scenario() {
    assert_eq!(session_score(100.0, 3000.0, DifficultyLevel::Hard), 1580);
}

#[test]
fn rating_delta_scenario() {
    assert_eq!(rating_delta(1000, 1580, 5), 38);
}

#[test]
fn rating_never_drops_below_floor() {
    for prior in (-500..4000).step_by(37) {
        for score in (0..2500).step_by(113) {
            for games in [0, 9, 10, 50] {
                let update = RatingUpdate::compute(prior, score, games);
                assert!(update.new_rating >= RATING_FLOOR, "{update:?}");
            }
        }
    }
}

#[test]
fn perfect_session_climbs_and_is_recorded() {
    let dir = TempDir::new().unwrap();
    let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    let mut session = new_session(&store, DifficultyLevel::Easy, 10, 21);

    let mut levels = vec![session.current_level()];
    while !session.is_finished() {
        let answer = i64::from(session.current_puzzle().answer);
        let round = session
            .submit_answer(answer, Duration::from_millis(1500))
            .unwrap();
        assert!(round.attempt.correct);
        levels.push(round.next_level);
    }
    for pair in levels.windows(2) {
        assert!(pair[0].index().abs_diff(pair[1].index()) <= 1);
    }

    let report = session.finish();
    assert_eq!(report.summary.total, 10);
    assert_eq!(report.summary.accuracy, 100.0);
    assert_eq!(report.final_level, DifficultyLevel::Hard);
    assert_eq!(report.recommended_level, DifficultyLevel::Hard);
    assert_eq!(report.transitions.len(), 2);
    assert!(report.rating.delta > 0);

    let profile = store.record_session(&report).unwrap();
    assert_eq!(profile.rating, report.rating.new_rating);
    assert_eq!(profile.games_played, 1);
    assert_eq!(profile.last_level, Some(DifficultyLevel::Hard));

    let history = store.load_history();
    assert_eq!(history.sessions.len(), 1);
    assert_eq!(history.sessions[0].summary, report.summary);
}

#[test]
fn struggling_session_steps_down_and_rating_feeds_next_session() {
    let dir = TempDir::new().unwrap();
    let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();

    let mut first = new_session(&store, DifficultyLevel::Hard, 6, 4);
    while !first.is_finished() {
        first.submit_answer(-1, Duration::from_millis(16_000));
    }
    let report = first.finish();
    assert_eq!(report.summary.correct, 0);
    assert_eq!(report.final_level, DifficultyLevel::Easy);
    assert!(report.rating.delta < 0);
    store.record_session(&report).unwrap();

    let second = new_session(&store, report.recommended_level, 6, 5);
    assert_eq!(second.context().prior_rating, report.rating.new_rating);
    assert_eq!(second.context().games_played, 1);
    assert_eq!(second.current_puzzle().level, DifficultyLevel::Easy);
}
