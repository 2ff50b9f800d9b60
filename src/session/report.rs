use chrono::{DateTime, Utc};

use crate::bank::Category;
use crate::session::state::Session;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
    Unanswered,
}

/// One line of the reviewable answer sheet. Carries the shuffled option text
/// actually shown during the session, not the bank order.
#[derive(Clone, Debug)]
pub struct ReviewRow {
    pub prompt: String,
    pub options: Vec<String>,
    pub chosen: Option<usize>,
    pub correct_index: usize,
    pub outcome: Outcome,
    pub explanation: Option<String>,
}

impl ReviewRow {
    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_index]
    }

    pub fn chosen_option(&self) -> Option<&str> {
        self.chosen.map(|i| self.options[i].as_str())
    }
}

#[derive(Clone, Debug)]
pub struct SessionReport {
    pub owner_id: String,
    pub category: Category,
    pub score: u32,
    pub total: u32,
    pub percentage: u32,
    pub rows: Vec<ReviewRow>,
    pub completed_at: DateTime<Utc>,
}

impl SessionReport {
    /// Snapshot the final state of a session whose last question was just
    /// answered or timed out. `answers` has one slot per question by then.
    pub fn compile(session: &Session) -> Self {
        debug_assert_eq!(session.answers.len(), session.questions.len());
        let total = session.questions.len() as u32;
        let score = session.running_score;
        let rows = session
            .questions
            .iter()
            .zip(&session.answers)
            .map(|(q, answer)| {
                let outcome = match answer {
                    None => Outcome::Unanswered,
                    Some(i) if *i == q.correct_index => Outcome::Correct,
                    Some(_) => Outcome::Incorrect,
                };
                ReviewRow {
                    prompt: q.prompt.clone(),
                    options: q.options.clone(),
                    chosen: *answer,
                    correct_index: q.correct_index,
                    outcome,
                    explanation: q.explanation.clone(),
                }
            })
            .collect();

        Self {
            owner_id: session.owner_id.clone(),
            category: session.category,
            score,
            total,
            percentage: percentage(score, total),
            rows,
            completed_at: Utc::now(),
        }
    }

    pub fn verdict(&self) -> &'static str {
        if self.percentage >= 80 {
            "Excellent ! Vous maîtrisez bien les bases !"
        } else if self.percentage >= 60 {
            "Bon travail ! Continuez à vous entraîner."
        } else if self.percentage >= 40 {
            "Pas mal, mais il faut réviser encore."
        } else {
            "Continuez vos efforts, la pratique fait la perfection !"
        }
    }
}

pub fn percentage(score: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (100.0 * score as f64 / total as f64).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::Question;
    use crate::session::state::{Session, Step};

    fn question(id: u32, correct: usize) -> Question {
        Question {
            id,
            prompt: format!("q{id}"),
            options: vec!["a".into(), "b".into(), "c".into()],
            correct_index: correct,
            time_limit_secs: 15,
            explanation: Some(format!("because {id}")),
        }
    }

    fn finished_report(picks: &[Option<usize>]) -> SessionReport {
        let questions: Vec<Question> = (0..picks.len()).map(|i| question(i as u32, 1)).collect();
        let mut session =
            Session::start("tester".to_string(), Category::Proba, questions).unwrap();
        let mut report = None;
        for pick in picks {
            let step = match pick {
                Some(i) => {
                    session.select_option(*i).unwrap();
                    session.submit_answer().unwrap()
                }
                None => {
                    session.remaining_secs = 1;
                    match session.tick() {
                        crate::session::state::TickOutcome::TimedOut(step) => step,
                        _ => panic!("expected a timeout"),
                    }
                }
            };
            if let Step::Finished(r) = step {
                report = Some(r);
            }
        }
        report.expect("session did not finish")
    }

    #[test]
    fn percentage_rounds_to_nearest() {
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(0, 7), 0);
        assert_eq!(percentage(7, 7), 100);
        assert_eq!(percentage(0, 0), 0);
    }

    #[test]
    fn tri_state_outcomes() {
        let report = finished_report(&[Some(1), Some(0), None]);
        assert_eq!(report.rows[0].outcome, Outcome::Correct);
        assert_eq!(report.rows[1].outcome, Outcome::Incorrect);
        assert_eq!(report.rows[2].outcome, Outcome::Unanswered);
        assert_eq!(report.score, 1);
        assert_eq!(report.percentage, 33);
    }

    #[test]
    fn rows_carry_session_option_order() {
        let report = finished_report(&[Some(1), None, Some(1)]);
        for row in &report.rows {
            assert_eq!(row.correct_option(), "b");
            assert_eq!(row.options.len(), 3);
        }
        assert_eq!(report.rows[0].chosen_option(), Some("b"));
        assert_eq!(report.rows[1].chosen_option(), None);
    }

    #[test]
    fn verdict_thresholds() {
        assert_eq!(
            finished_report(&[Some(1), Some(1), Some(1)]).verdict(),
            "Excellent ! Vous maîtrisez bien les bases !"
        );
        assert_eq!(
            finished_report(&[Some(1), Some(1), Some(0)]).verdict(),
            "Bon travail ! Continuez à vous entraîner."
        );
        assert_eq!(
            finished_report(&[Some(0), Some(0), Some(0)]).verdict(),
            "Continuez vos efforts, la pratique fait la perfection !"
        );
    }
}
