use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::report::{Outcome, SessionReport};
use crate::ui::theme::Theme;

/// Results screen: headline score plus the reviewable answer sheet built from
/// the option order actually shown during the session.
pub struct ReportView<'a> {
    pub report: &'a SessionReport,
    pub scroll: usize,
    pub theme: &'a Theme,
}

impl<'a> ReportView<'a> {
    pub fn new(report: &'a SessionReport, scroll: usize, theme: &'a Theme) -> Self {
        Self {
            report,
            scroll,
            theme,
        }
    }
}

impl Widget for ReportView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let report = self.report;

        let title = format!(
            " {} {} — Terminé ",
            report.category.icon(),
            report.category.display_name()
        );
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let score_color = if report.percentage >= 60 {
            colors.success()
        } else if report.percentage >= 40 {
            colors.warning()
        } else {
            colors.error()
        };
        let score_text = format!("{}/{}  ({}%)", report.score, report.total, report.percentage);
        let score = Paragraph::new(Line::from(Span::styled(
            &*score_text,
            Style::default().fg(score_color).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center);
        score.render(layout[0], buf);

        let verdict = Paragraph::new(Line::from(Span::styled(
            report.verdict(),
            Style::default().fg(colors.fg()),
        )))
        .alignment(Alignment::Center);
        verdict.render(layout[1], buf);

        let sheet_header = Paragraph::new(Line::from(Span::styled(
            " Corrigé",
            Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
        )));
        sheet_header.render(layout[2], buf);

        let mut lines: Vec<Line> = Vec::new();
        for (i, row) in report.rows.iter().enumerate() {
            let (mark, mark_color) = match row.outcome {
                Outcome::Correct => ("✓", colors.success()),
                Outcome::Incorrect => ("✗", colors.error()),
                Outcome::Unanswered => ("–", colors.dim()),
            };
            lines.push(Line::from(vec![
                Span::styled(
                    format!(" {mark} "),
                    Style::default().fg(mark_color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("{}. {}", i + 1, row.prompt),
                    Style::default().fg(colors.fg()),
                ),
            ]));

            let mut detail = vec![
                Span::styled("     Réponse : ", Style::default().fg(colors.dim())),
                Span::styled(
                    row.correct_option().to_string(),
                    Style::default().fg(colors.success()),
                ),
            ];
            match row.outcome {
                Outcome::Incorrect => {
                    if let Some(chosen) = row.chosen_option() {
                        detail.push(Span::styled(
                            format!("  (Vous : {chosen})"),
                            Style::default().fg(colors.error()),
                        ));
                    }
                }
                Outcome::Unanswered => {
                    detail.push(Span::styled(
                        "  (Pas de réponse)",
                        Style::default().fg(colors.dim()),
                    ));
                }
                Outcome::Correct => {}
            }
            lines.push(Line::from(detail));

            if let Some(ref explanation) = row.explanation {
                lines.push(Line::from(Span::styled(
                    format!("     {explanation}"),
                    Style::default().fg(colors.dim()),
                )));
            }
            lines.push(Line::from(""));
        }

        let sheet = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll as u16, 0));
        sheet.render(layout[3], buf);
    }
}
