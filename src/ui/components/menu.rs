use std::collections::HashSet;

use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::bank::{ALL_CATEGORIES, Category};
use crate::ui::theme::Theme;

pub struct MenuEntry {
    pub category: Category,
    pub completed: bool,
    pub best_percentage: Option<u32>,
}

/// Category selection. Completed categories stay visible (with their best
/// score) but cannot be selected: one attempt per category per profile.
pub struct Menu<'a> {
    pub entries: Vec<MenuEntry>,
    pub selected: usize,
    pub theme: &'a Theme,
}

impl<'a> Menu<'a> {
    pub fn new(
        completed: &HashSet<Category>,
        best: impl Fn(Category) -> Option<u32>,
        theme: &'a Theme,
    ) -> Self {
        let entries = ALL_CATEGORIES
            .iter()
            .map(|&category| MenuEntry {
                category,
                completed: completed.contains(&category),
                best_percentage: best(category),
            })
            .collect();
        let mut menu = Self {
            entries,
            selected: 0,
            theme,
        };
        if !menu.current_offerable() {
            menu.next();
        }
        menu
    }

    pub fn all_completed(&self) -> bool {
        self.entries.iter().all(|e| e.completed)
    }

    pub fn selected_category(&self) -> Option<Category> {
        let entry = &self.entries[self.selected];
        (!entry.completed).then_some(entry.category)
    }

    fn current_offerable(&self) -> bool {
        !self.entries[self.selected].completed
    }

    pub fn next(&mut self) {
        if self.all_completed() {
            return;
        }
        loop {
            self.selected = (self.selected + 1) % self.entries.len();
            if self.current_offerable() {
                return;
            }
        }
    }

    pub fn prev(&mut self) {
        if self.all_completed() {
            return;
        }
        loop {
            self.selected = if self.selected == 0 {
                self.entries.len() - 1
            } else {
                self.selected - 1
            };
            if self.current_offerable() {
                return;
            }
        }
    }
}

impl Widget for &Menu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let subtitle = if self.all_completed() {
            "Félicitations ! Tous les quiz sont complétés."
        } else {
            "Choisissez votre quiz"
        };
        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "quizr",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(subtitle, Style::default().fg(colors.fg()))),
            Line::from(""),
        ];
        let title = Paragraph::new(title_lines).alignment(Alignment::Center);
        title.render(layout[0], buf);

        let menu_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                self.entries
                    .iter()
                    .map(|_| Constraint::Length(3))
                    .collect::<Vec<_>>(),
            )
            .split(layout[2]);

        for (i, entry) in self.entries.iter().enumerate() {
            let is_selected = i == self.selected && !entry.completed;
            let indicator = if is_selected { ">" } else { " " };

            let status = if entry.completed {
                match entry.best_percentage {
                    Some(p) => format!("  ✓ Complété ({p}%)"),
                    None => "  ✓ Complété".to_string(),
                }
            } else {
                String::new()
            };
            let label_text = format!(
                " {indicator} {} {}{status}",
                entry.category.icon(),
                entry.category.display_name()
            );
            let desc_text = format!("      {}", entry.category.description());

            let label_color = if entry.completed {
                colors.dim()
            } else if is_selected {
                colors.accent()
            } else {
                colors.fg()
            };
            let lines = vec![
                Line::from(Span::styled(
                    &*label_text,
                    Style::default().fg(label_color).add_modifier(if is_selected {
                        Modifier::BOLD
                    } else {
                        Modifier::empty()
                    }),
                )),
                Line::from(Span::styled(
                    &*desc_text,
                    Style::default().fg(colors.dim()),
                )),
            ];

            let p = Paragraph::new(lines);
            if i < menu_layout.len() {
                p.render(menu_layout[i], buf);
            }
        }
    }
}
