use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::bank::ALL_CATEGORIES;
use crate::store::schema::CompletedAttempt;
use crate::ui::theme::Theme;

/// Best attempt per category plus the full attempt history for the profile.
pub struct Scoreboard<'a> {
    pub attempts: &'a [CompletedAttempt],
    pub theme: &'a Theme,
}

impl<'a> Scoreboard<'a> {
    pub fn new(attempts: &'a [CompletedAttempt], theme: &'a Theme) -> Self {
        Self { attempts, theme }
    }

    fn best_for(&self, category: crate::bank::Category) -> Option<&CompletedAttempt> {
        self.attempts
            .iter()
            .filter(|a| a.category == category)
            .max_by_key(|a| a.percentage)
    }
}

impl Widget for Scoreboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Mes scores ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(ALL_CATEGORIES.len() as u16 + 2),
                Constraint::Min(0),
            ])
            .split(inner);

        let mut best_lines = vec![Line::from(Span::styled(
            " Meilleurs scores",
            Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
        ))];
        for category in ALL_CATEGORIES {
            let line = match self.best_for(category) {
                Some(best) => Line::from(vec![
                    Span::styled(
                        format!(" {} {:<22}", category.icon(), category.display_name()),
                        Style::default().fg(colors.fg()),
                    ),
                    Span::styled(
                        format!(
                            "{}/{} ({}%)",
                            best.raw_score, best.total_questions, best.percentage
                        ),
                        Style::default().fg(colors.success()).add_modifier(Modifier::BOLD),
                    ),
                ]),
                None => Line::from(vec![
                    Span::styled(
                        format!(" {} {:<22}", category.icon(), category.display_name()),
                        Style::default().fg(colors.dim()),
                    ),
                    Span::styled("—", Style::default().fg(colors.dim())),
                ]),
            };
            best_lines.push(line);
        }
        Paragraph::new(best_lines).render(layout[0], buf);

        let mut history_lines = vec![Line::from(Span::styled(
            " Historique",
            Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
        ))];
        if self.attempts.is_empty() {
            history_lines.push(Line::from(Span::styled(
                " Aucun quiz complété pour le moment.",
                Style::default().fg(colors.dim()),
            )));
        }
        for attempt in self.attempts {
            history_lines.push(Line::from(vec![
                Span::styled(
                    format!(" {} ", attempt.completed_at.format("%Y-%m-%d %H:%M")),
                    Style::default().fg(colors.dim()),
                ),
                Span::styled(
                    format!("{:<22}", attempt.category.display_name()),
                    Style::default().fg(colors.fg()),
                ),
                Span::styled(
                    format!(
                        "{}/{} ({}%)",
                        attempt.raw_score, attempt.total_questions, attempt.percentage
                    ),
                    Style::default().fg(colors.fg()),
                ),
            ]));
        }
        Paragraph::new(history_lines).render(layout[1], buf);
    }
}
