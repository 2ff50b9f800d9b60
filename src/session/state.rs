use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::bank::{Category, Question};
use crate::session::report::SessionReport;

/// Calling a transition outside its valid state is a programming error: the
/// UI disables the affected control, so these are never retried at runtime.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid transition: {0}")]
    InvalidTransition(&'static str),
    #[error("option index out of range for the current question")]
    OptionOutOfBounds,
    #[error("cannot start a session without questions")]
    EmptyBank,
}

/// Tagged session lifecycle. There is no reachable combination of flags
/// outside these three states.
#[derive(Debug)]
pub enum SessionState {
    Idle,
    InProgress(Session),
    Finished(SessionReport),
}

impl SessionState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::InProgress(session) => Some(session),
            _ => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        match self {
            SessionState::InProgress(session) => Some(session),
            _ => None,
        }
    }

    pub fn report(&self) -> Option<&SessionReport> {
        match self {
            SessionState::Finished(report) => Some(report),
            _ => None,
        }
    }
}

/// Outcome of a transition that may end the session.
#[derive(Debug)]
pub enum Step {
    Continued,
    Finished(SessionReport),
}

/// What a single countdown second produced.
#[derive(Debug)]
pub enum TickOutcome {
    Running,
    TimedOut(Step),
}

/// A live attempt. `questions` is the post-shuffle order and is fixed for the
/// session's lifetime; `answers` has exactly one slot per question already
/// left behind, so `answers.len() == current_index` while in progress.
#[derive(Debug)]
pub struct Session {
    pub owner_id: String,
    pub category: Category,
    pub questions: Vec<Question>,
    pub current_index: usize,
    pub remaining_secs: u32,
    pub pending: Option<usize>,
    pub answers: Vec<Option<usize>>,
    pub running_score: u32,
    pub started_at: DateTime<Utc>,
}

impl Session {
    pub fn start(
        owner_id: String,
        category: Category,
        questions: Vec<Question>,
    ) -> Result<Self, EngineError> {
        let first_limit = questions.first().map(|q| q.time_limit_secs);
        match first_limit {
            Some(limit) => Ok(Self {
                owner_id,
                category,
                questions,
                current_index: 0,
                remaining_secs: limit,
                pending: None,
                answers: Vec::new(),
                running_score: 0,
                started_at: Utc::now(),
            }),
            None => Err(EngineError::EmptyBank),
        }
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current_index]
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// Fraction of the quiz represented by the question on screen, for the
    /// progress bar (question 1 of 7 shows as 1/7, not 0).
    pub fn progress(&self) -> f64 {
        (self.current_index + 1) as f64 / self.questions.len() as f64
    }

    /// First write wins: once an option is locked for the current question it
    /// stays locked until submit or timeout clears it.
    pub fn select_option(&mut self, index: usize) -> Result<(), EngineError> {
        if self.pending.is_some() {
            return Err(EngineError::InvalidTransition(
                "an option is already selected for this question",
            ));
        }
        if index >= self.current_question().options.len() {
            return Err(EngineError::OptionOutOfBounds);
        }
        self.pending = Some(index);
        Ok(())
    }

    pub fn submit_answer(&mut self) -> Result<Step, EngineError> {
        let Some(choice) = self.pending.take() else {
            return Err(EngineError::InvalidTransition(
                "submit requires a pending selection",
            ));
        };
        if choice == self.current_question().correct_index {
            self.running_score += 1;
        }
        self.answers.push(Some(choice));
        Ok(self.advance())
    }

    /// One countdown second. Reaching zero fires exactly one timeout, which
    /// records "no answer" (never scored as incorrect) and advances. A submit
    /// event already in the queue is handled before the tick, so a
    /// last-instant submission beats a simultaneous timeout.
    pub fn tick(&mut self) -> TickOutcome {
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return TickOutcome::Running;
        }
        self.pending = None;
        self.answers.push(None);
        TickOutcome::TimedOut(self.advance())
    }

    fn advance(&mut self) -> Step {
        debug_assert_eq!(self.answers.len(), self.current_index + 1);
        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
            self.remaining_secs = self.current_question().time_limit_secs;
            self.pending = None;
            Step::Continued
        } else {
            self.current_index += 1;
            Step::Finished(SessionReport::compile(self))
        }
    }
}
