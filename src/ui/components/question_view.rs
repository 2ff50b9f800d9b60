use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::state::Session;
use crate::ui::theme::Theme;

/// The question screen body: prompt, lettered options, cursor highlight and
/// the locked selection. The countdown and progress live outside this widget.
pub struct QuestionView<'a> {
    pub session: &'a Session,
    pub cursor: usize,
    pub theme: &'a Theme,
}

impl<'a> QuestionView<'a> {
    pub fn new(session: &'a Session, cursor: usize, theme: &'a Theme) -> Self {
        Self {
            session,
            cursor,
            theme,
        }
    }
}

impl Widget for QuestionView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let question = self.session.current_question();

        let title = format!(
            " Question {}/{} ",
            self.session.current_index + 1,
            self.session.total_questions()
        );
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let option_rows = question.options.len() as u16 * 2;
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(4),
                Constraint::Length(option_rows),
                Constraint::Length(1),
            ])
            .split(inner);

        let prompt = Paragraph::new(Line::from(Span::styled(
            &*question.prompt,
            Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
        )))
        .wrap(Wrap { trim: true });
        prompt.render(layout[0], buf);

        let option_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                question
                    .options
                    .iter()
                    .map(|_| Constraint::Length(2))
                    .collect::<Vec<_>>(),
            )
            .split(layout[1]);

        for (i, option) in question.options.iter().enumerate() {
            let letter = (b'A' + i as u8) as char;
            let at_cursor = i == self.cursor;
            let locked = self.session.pending == Some(i);

            let indicator = if at_cursor { ">" } else { " " };
            let marker = if locked { "●" } else { "○" };
            let text = format!(" {indicator} {marker} {letter}. {option}");

            let style = if locked {
                Style::default()
                    .fg(colors.selected_fg())
                    .bg(colors.selected_bg())
                    .add_modifier(Modifier::BOLD)
            } else if at_cursor {
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };

            let p = Paragraph::new(Line::from(Span::styled(&*text, style)))
                .wrap(Wrap { trim: false });
            if i < option_layout.len() {
                p.render(option_layout[i], buf);
            }
        }

        let hint = if self.session.pending.is_some() {
            " [Entrée] Valider "
        } else {
            " [Espace] Sélectionner "
        };
        let hint_line = Paragraph::new(Line::from(Span::styled(
            hint,
            Style::default().fg(colors.dim()),
        )));
        hint_line.render(layout[2], buf);
    }
}
