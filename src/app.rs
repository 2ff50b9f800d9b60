use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::bank::{ALL_CATEGORIES, Category, Question, load_catalog};
use crate::config::Config;
use crate::session::report::SessionReport;
use crate::session::shuffle::shuffle_questions;
use crate::session::state::{Session, SessionState, Step, TickOutcome};
use crate::store::json_store::JsonStore;
use crate::store::schema::{CompletedAttempt, SnapshotData};
use crate::ui::components::menu::Menu;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    Question,
    Report,
    Scores,
}

pub struct App {
    pub screen: AppScreen,
    pub state: SessionState,
    pub menu: Menu<'static>,
    pub theme: &'static Theme,
    pub config: Config,
    pub store: Option<JsonStore>,
    pub attempts: Vec<CompletedAttempt>,
    pub option_cursor: usize,
    pub report_scroll: usize,
    pub should_quit: bool,
    banks: HashMap<Category, Vec<Question>>,
    last_second: Instant,
    rng: SmallRng,
}

impl App {
    /// The config must carry its final profile and theme here: the profile
    /// keys the attempt guard, the menu's completed set and the snapshot
    /// restore, so changing it after construction reads the wrong owner.
    pub fn new(config: Config) -> Result<Self> {
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));
        let store = JsonStore::new().ok();
        Self::from_parts(config, theme, store)
    }

    /// Shared by `new` and the tests, which inject a tempdir-backed store.
    pub fn from_parts(
        config: Config,
        theme: &'static Theme,
        store: Option<JsonStore>,
    ) -> Result<Self> {
        let mut banks = HashMap::new();
        for category in ALL_CATEGORIES {
            let questions = load_catalog(category)
                .with_context(|| format!("loading catalog '{}'", category.as_str()))?;
            banks.insert(category, questions);
        }

        let attempts = store
            .as_ref()
            .map(|s| s.attempts_for(&config.profile))
            .unwrap_or_default();

        let mut app = Self {
            screen: AppScreen::Menu,
            state: SessionState::Idle,
            menu: Self::build_menu(&attempts, theme),
            theme,
            config,
            store,
            attempts,
            option_cursor: 0,
            report_scroll: 0,
            should_quit: false,
            banks,
            last_second: Instant::now(),
            rng: SmallRng::from_entropy(),
        };
        app.restore_snapshot();
        Ok(app)
    }

    fn build_menu(attempts: &[CompletedAttempt], theme: &'static Theme) -> Menu<'static> {
        let completed = attempts.iter().map(|a| a.category).collect();
        Menu::new(
            &completed,
            |category| {
                attempts
                    .iter()
                    .filter(|a| a.category == category)
                    .map(|a| a.percentage)
                    .max()
            },
            theme,
        )
    }

    /// Pick up an interrupted session from the device snapshot. The snapshot
    /// is only honored for the current profile; once a completion record
    /// exists for its category it is no longer a source of truth and gets
    /// discarded. A snapshot without its question list restarts the saved
    /// category with a fresh shuffle. Anything malformed starts fresh.
    fn restore_snapshot(&mut self) {
        let Some(ref store) = self.store else { return };
        let Some(mut snapshot) = store.load_snapshot() else {
            return;
        };
        if snapshot.owner_id != self.config.profile {
            return;
        }
        if self
            .attempts
            .iter()
            .any(|a| a.category == snapshot.category)
        {
            store.clear_snapshot();
            return;
        }
        if snapshot.questions.is_empty() {
            // The old progress refers to orderings this shuffle never shows,
            // so the attempt restarts from question one.
            let bank = &self.banks[&snapshot.category];
            snapshot.questions = shuffle_questions(bank, &mut self.rng);
            snapshot.current_index = 0;
            snapshot.answers.clear();
            snapshot.running_score = 0;
            snapshot.remaining_secs = snapshot.questions[0].time_limit_secs;
        }
        if !snapshot.is_consistent() {
            store.clear_snapshot();
            return;
        }
        self.state = SessionState::InProgress(snapshot.into_session());
        self.option_cursor = 0;
        self.last_second = Instant::now();
        self.screen = AppScreen::Question;
    }

    pub fn has_session_in_progress(&self) -> bool {
        self.state.session().is_some()
    }

    /// One attempt per category per profile: a completed category is refused
    /// here even if a caller bypasses the menu (e.g. --category). Starting a
    /// fresh category while another session is stored overwrites it.
    pub fn start_session(&mut self, category: Category) {
        if self.attempts.iter().any(|a| a.category == category) {
            return;
        }
        let bank = &self.banks[&category];
        let questions = shuffle_questions(bank, &mut self.rng);
        let session = match Session::start(self.config.profile.clone(), category, questions) {
            Ok(session) => session,
            Err(_) => return, // empty catalog is rejected at load time
        };
        self.state = SessionState::InProgress(session);
        self.option_cursor = 0;
        self.last_second = Instant::now();
        self.screen = AppScreen::Question;
        self.persist_snapshot();
    }

    pub fn resume_session(&mut self) {
        if self.has_session_in_progress() {
            self.option_cursor = 0;
            self.last_second = Instant::now();
            self.screen = AppScreen::Question;
        }
    }

    pub fn cursor_up(&mut self) {
        self.option_cursor = self.option_cursor.saturating_sub(1);
    }

    pub fn cursor_down(&mut self) {
        if let Some(session) = self.state.session() {
            let last = session.current_question().options.len() - 1;
            self.option_cursor = (self.option_cursor + 1).min(last);
        }
    }

    /// Lock the option under the cursor. First write wins; the key handler
    /// only routes here, the guard lives in the session.
    pub fn lock_selection(&mut self) {
        let cursor = self.option_cursor;
        let locked = match self.state.session_mut() {
            Some(session) if session.pending.is_none() => session.select_option(cursor).is_ok(),
            _ => false,
        };
        if locked {
            self.persist_snapshot();
        }
    }

    pub fn submit_answer(&mut self) {
        let Some(session) = self.state.session_mut() else {
            return;
        };
        if session.pending.is_none() {
            return; // the submit control is disabled without a selection
        }
        match session.submit_answer() {
            Ok(Step::Continued) => {
                self.option_cursor = 0;
                self.last_second = Instant::now();
                self.persist_snapshot();
            }
            Ok(Step::Finished(report)) => self.finish(report),
            Err(_) => {}
        }
    }

    /// Forward whole elapsed seconds to the countdown. Only runs while the
    /// question screen is visible, so backing out to the menu (or a machine
    /// suspend) does not charge time against the current question.
    pub fn on_tick(&mut self) {
        if self.screen != AppScreen::Question {
            return;
        }
        while self.last_second.elapsed() >= Duration::from_secs(1) {
            self.last_second += Duration::from_secs(1);
            let Some(session) = self.state.session_mut() else {
                return;
            };
            match session.tick() {
                TickOutcome::Running => self.persist_snapshot(),
                TickOutcome::TimedOut(Step::Continued) => {
                    self.option_cursor = 0;
                    self.persist_snapshot();
                }
                TickOutcome::TimedOut(Step::Finished(report)) => {
                    self.finish(report);
                    return;
                }
            }
        }
    }

    /// Entering Finished is synchronous; the attempt record write is
    /// best-effort and a storage failure never blocks the results screen.
    fn finish(&mut self, report: SessionReport) {
        if let Some(ref store) = self.store {
            let _ = store.append_attempt(&CompletedAttempt::from(&report));
            store.clear_snapshot();
        }
        self.attempts = self
            .store
            .as_ref()
            .map(|s| s.attempts_for(&self.config.profile))
            .unwrap_or_default();
        self.menu = Self::build_menu(&self.attempts, self.theme);
        self.state = SessionState::Finished(report);
        self.report_scroll = 0;
        self.screen = AppScreen::Report;
    }

    fn persist_snapshot(&self) {
        if let (Some(store), Some(session)) = (self.store.as_ref(), self.state.session()) {
            let _ = store.save_snapshot(&SnapshotData::from_session(session));
        }
    }

    pub fn go_to_menu(&mut self) {
        // An in-progress session stays resumable; its snapshot is already on
        // disk and the countdown freezes until the question screen returns.
        self.screen = AppScreen::Menu;
    }

    pub fn go_to_scores(&mut self) {
        self.attempts = self
            .store
            .as_ref()
            .map(|s| s.attempts_for(&self.config.profile))
            .unwrap_or_default();
        self.screen = AppScreen::Scores;
    }

    pub fn scroll_report_up(&mut self) {
        self.report_scroll = self.report_scroll.saturating_sub(1);
    }

    pub fn scroll_report_down(&mut self) {
        if let Some(report) = self.state.report() {
            // 4 rendered lines per review row is the upper bound.
            let max = report.rows.len() * 4;
            self.report_scroll = (self.report_scroll + 1).min(max);
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn static_theme() -> &'static Theme {
        Box::leak(Box::new(Theme {
            name: "test".to_string(),
            colors: Default::default(),
        }))
    }

    fn test_app(dir: &TempDir) -> App {
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        App::from_parts(Config::default(), static_theme(), Some(store)).unwrap()
    }

    fn answer_current(app: &mut App, index: usize) {
        app.option_cursor = index;
        app.lock_selection();
        app.submit_answer();
    }

    fn complete_session(app: &mut App) {
        while let Some(session) = app.state.session() {
            let correct = session.current_question().correct_index;
            answer_current(app, correct);
        }
    }

    #[test]
    fn start_session_enters_question_screen_with_snapshot() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.start_session(Category::Info);

        assert_eq!(app.screen, AppScreen::Question);
        assert!(app.has_session_in_progress());
        let store = app.store.as_ref().unwrap();
        assert!(store.load_snapshot().is_some());
    }

    #[test]
    fn completing_a_session_records_attempt_and_clears_snapshot() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.start_session(Category::Info);
        complete_session(&mut app);

        assert_eq!(app.screen, AppScreen::Report);
        let report = app.state.report().unwrap();
        assert_eq!(report.percentage, 100);

        let store = app.store.as_ref().unwrap();
        assert!(store.load_snapshot().is_none());
        assert_eq!(app.attempts.len(), 1);
        assert_eq!(app.attempts[0].category, Category::Info);
    }

    #[test]
    fn completed_category_cannot_be_restarted() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.start_session(Category::Info);
        complete_session(&mut app);

        app.go_to_menu();
        app.start_session(Category::Info);
        assert_eq!(app.screen, AppScreen::Menu);
        assert!(!app.has_session_in_progress());
    }

    #[test]
    fn reload_mid_session_restores_progress() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.start_session(Category::Proba);
        let correct = app
            .state
            .session()
            .unwrap()
            .current_question()
            .correct_index;
        answer_current(&mut app, correct);
        let ids_before: Vec<u32> = app
            .state
            .session()
            .unwrap()
            .questions
            .iter()
            .map(|q| q.id)
            .collect();

        // Fresh App over the same base dir simulates a restart.
        let mut restarted = test_app(&dir);
        assert_eq!(restarted.screen, AppScreen::Question);
        let session = restarted.state.session_mut().unwrap();
        assert_eq!(session.current_index, 1);
        assert_eq!(session.answers.len(), 1);
        assert_eq!(session.running_score, 1);
        let ids_after: Vec<u32> = session.questions.iter().map(|q| q.id).collect();
        assert_eq!(ids_before, ids_after);
    }

    #[test]
    fn profile_set_at_construction_drives_the_attempt_guard() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.profile = "alice".to_string();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut alice = App::from_parts(config.clone(), static_theme(), Some(store)).unwrap();
        alice.start_session(Category::Info);
        complete_session(&mut alice);

        // A relaunch selecting the same profile sees her completion.
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut again = App::from_parts(config, static_theme(), Some(store)).unwrap();
        again.start_session(Category::Info);
        assert_eq!(again.screen, AppScreen::Menu);
        assert!(!again.has_session_in_progress());

        // A different profile on the same device is not blocked by it.
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut other = App::from_parts(Config::default(), static_theme(), Some(store)).unwrap();
        other.start_session(Category::Info);
        assert_eq!(other.screen, AppScreen::Question);
    }

    #[test]
    fn snapshot_for_other_profile_is_ignored() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.start_session(Category::Info);

        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut config = Config::default();
        config.profile = "someone-else".to_string();
        let other = App::from_parts(config, static_theme(), Some(store)).unwrap();
        assert_eq!(other.screen, AppScreen::Menu);
        assert!(!other.has_session_in_progress());
    }

    #[test]
    fn snapshot_without_questions_restarts_the_attempt() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.start_session(Category::MathGen);
        let correct = app
            .state
            .session()
            .unwrap()
            .current_question()
            .correct_index;
        answer_current(&mut app, correct);
        {
            let store = app.store.as_ref().unwrap();
            let mut snapshot = store.load_snapshot().unwrap();
            snapshot.questions.clear();
            store.save_snapshot(&snapshot).unwrap();
        }

        let restarted = test_app(&dir);
        assert_eq!(restarted.screen, AppScreen::Question);
        let session = restarted.state.session().unwrap();
        assert_eq!(session.category, Category::MathGen);
        assert_eq!(session.questions.len(), 7);
        // Progress recorded against the lost ordering does not carry over.
        assert_eq!(session.current_index, 0);
        assert!(session.answers.is_empty());
        assert_eq!(session.running_score, 0);
        assert_eq!(session.remaining_secs, session.questions[0].time_limit_secs);
    }

    #[test]
    fn starting_a_new_category_overwrites_the_stored_session() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.start_session(Category::Info);
        app.go_to_menu();
        app.start_session(Category::Proba);

        let store = app.store.as_ref().unwrap();
        let snapshot = store.load_snapshot().unwrap();
        assert_eq!(snapshot.category, Category::Proba);
    }

    #[test]
    fn timeout_path_still_finishes_and_persists() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.start_session(Category::Info);

        // Burn down every question via the timeout transition, backdating the
        // tick clock so on_tick sees a full elapsed second each round.
        while app.state.session().is_some() {
            if let Some(session) = app.state.session_mut() {
                session.remaining_secs = 1;
            }
            app.last_second = Instant::now() - Duration::from_secs(1);
            app.on_tick();
        }

        assert_eq!(app.screen, AppScreen::Report);
        let report = app.state.report().unwrap();
        assert_eq!(report.score, 0);
        assert!(
            report
                .rows
                .iter()
                .all(|r| r.outcome == crate::session::report::Outcome::Unanswered)
        );
        assert_eq!(app.attempts.len(), 1);
        assert_eq!(app.attempts[0].percentage, 0);

        let store = app.store.as_ref().unwrap();
        assert!(store.load_snapshot().is_none());
    }
}
