use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bank::{Category, Question};
use crate::session::report::SessionReport;
use crate::session::state::Session;

pub const SCHEMA_VERSION: u32 = 1;

/// One completed attempt. Append-only; never mutated after creation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompletedAttempt {
    pub owner_id: String,
    pub category: Category,
    pub raw_score: u32,
    pub total_questions: u32,
    pub percentage: u32,
    pub completed_at: DateTime<Utc>,
}

impl From<&SessionReport> for CompletedAttempt {
    fn from(report: &SessionReport) -> Self {
        Self {
            owner_id: report.owner_id.clone(),
            category: report.category,
            raw_score: report.score,
            total_questions: report.total,
            percentage: report.percentage,
            completed_at: report.completed_at,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AttemptsData {
    pub schema_version: u32,
    pub attempts: Vec<CompletedAttempt>,
}

impl Default for AttemptsData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            attempts: Vec::new(),
        }
    }
}

/// Durable projection of an in-progress session, overwritten wholesale on
/// every transition and deleted at finish. One snapshot per device; it is not
/// a source of truth once a completion record exists.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SnapshotData {
    pub schema_version: u32,
    pub owner_id: String,
    pub category: Category,
    /// May be empty in an old/foreign-shaped snapshot; the caller regenerates
    /// a fresh shuffle for `category` in that case instead of failing.
    #[serde(default)]
    pub questions: Vec<Question>,
    pub current_index: usize,
    pub answers: Vec<Option<usize>>,
    pub running_score: u32,
    pub remaining_secs: u32,
    pub started_at: DateTime<Utc>,
}

impl SnapshotData {
    pub fn from_session(session: &Session) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            owner_id: session.owner_id.clone(),
            category: session.category,
            questions: session.questions.clone(),
            current_index: session.current_index,
            answers: session.answers.clone(),
            running_score: session.running_score,
            remaining_secs: session.remaining_secs,
            started_at: session.started_at,
        }
    }

    pub fn is_stale(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }

    /// Structural sanity against the session invariants. A snapshot that
    /// fails this is treated as corrupt and discarded.
    pub fn is_consistent(&self) -> bool {
        !self.questions.is_empty()
            && self.current_index < self.questions.len()
            && self.answers.len() == self.current_index
            && self.remaining_secs > 0
            && self
                .answers
                .iter()
                .zip(&self.questions)
                .all(|(a, q)| a.map_or(true, |i| i < q.options.len()))
            && self.running_score as usize <= self.answers.len()
    }

    /// Rebuild the live session. Only call after `is_consistent` holds.
    pub fn into_session(self) -> Session {
        Session {
            owner_id: self.owner_id,
            category: self.category,
            questions: self.questions,
            current_index: self.current_index,
            remaining_secs: self.remaining_secs,
            pending: None,
            answers: self.answers,
            running_score: self.running_score,
            started_at: self.started_at,
        }
    }
}
