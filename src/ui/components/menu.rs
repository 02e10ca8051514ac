use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use mathadv::engine::{DifficultyLevel, LevelTable};
use mathadv::store::schema::ProfileData;

use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

/// Which part of the welcome screen receives typed keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WelcomeFocus {
    Name,
    Level,
}

pub struct LevelMenu {
    pub selected: DifficultyLevel,
    pub focus: WelcomeFocus,
}

impl LevelMenu {
    pub fn new(selected: DifficultyLevel) -> Self {
        Self {
            selected,
            focus: WelcomeFocus::Name,
        }
    }

    pub fn next(&mut self) {
        let next = (self.selected.index() + 1) % DifficultyLevel::ALL.len();
        self.selected = DifficultyLevel::ALL[next];
    }

    pub fn prev(&mut self) {
        let count = DifficultyLevel::ALL.len();
        let prev = (self.selected.index() + count - 1) % count;
        self.selected = DifficultyLevel::ALL[prev];
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            WelcomeFocus::Name => WelcomeFocus::Level,
            WelcomeFocus::Level => WelcomeFocus::Name,
        };
    }
}

pub struct WelcomeView<'a> {
    pub menu: &'a LevelMenu,
    pub name: &'a LineInput,
    pub levels: &'a LevelTable,
    pub profile: &'a ProfileData,
    pub theme: &'a Theme,
}

impl Widget for WelcomeView<'_> {
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
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "mathadv",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Arithmetic practice that keeps up with you",
                Style::default().fg(colors.fg()),
            )),
        ];
        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        let name_focused = self.menu.focus == WelcomeFocus::Name;
        let (before, cursor, after) = self.name.render_parts();
        let mut name_spans = vec![
            Span::styled(
                "  Name: ",
                Style::default().fg(if name_focused {
                    colors.accent()
                } else {
                    colors.fg()
                }),
            ),
            Span::styled(before, Style::default().fg(colors.fg())),
        ];
        if name_focused {
            let ch = cursor.map(String::from).unwrap_or_else(|| " ".to_string());
            name_spans.push(Span::styled(
                ch,
                Style::default().fg(colors.cursor_fg()).bg(colors.cursor_bg()),
            ));
        } else if let Some(ch) = cursor {
            name_spans.push(Span::styled(ch.to_string(), Style::default().fg(colors.fg())));
        }
        name_spans.push(Span::styled(after, Style::default().fg(colors.fg())));

        let record = if self.profile.games_played > 0 {
            format!(
                "  Rating {}  |  {} sessions  |  best score {}",
                self.profile.rating, self.profile.games_played, self.profile.best_score
            )
        } else {
            "  First session: rating starts at 1000".to_string()
        };
        Paragraph::new(vec![
            Line::from(name_spans),
            Line::from(Span::styled(record, Style::default().fg(colors.muted()))),
        ])
        .render(layout[1], buf);

        Paragraph::new(Line::from(Span::styled(
            "  Starting level",
            Style::default()
                .fg(colors.fg())
                .add_modifier(Modifier::UNDERLINED),
        )))
        .render(layout[2], buf);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                DifficultyLevel::ALL
                    .iter()
                    .map(|_| Constraint::Length(3))
                    .collect::<Vec<_>>(),
            )
            .split(layout[3]);

        for (i, level) in DifficultyLevel::ALL.into_iter().enumerate() {
            let is_selected = level == self.menu.selected;
            let indicator = if is_selected { ">" } else { " " };
            let label = format!("  {indicator} [{}] {}", i + 1, level.name());
            let desc = format!("       {}", self.levels.get(level).describe());

            let label_style = Style::default()
                .fg(if is_selected {
                    colors.level(level)
                } else {
                    colors.fg()
                })
                .add_modifier(if is_selected && !name_focused {
                    Modifier::BOLD
                } else {
                    Modifier::empty()
                });

            let p = Paragraph::new(vec![
                Line::from(Span::styled(label, label_style)),
                Line::from(Span::styled(desc, Style::default().fg(colors.muted()))),
            ]);
            if i < rows.len() {
                p.render(rows[i], buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_wraps_both_ways() {
        let mut menu = LevelMenu::new(DifficultyLevel::Hard);
        menu.next();
        assert_eq!(menu.selected, DifficultyLevel::Easy);
        menu.prev();
        assert_eq!(menu.selected, DifficultyLevel::Hard);
        menu.prev();
        assert_eq!(menu.selected, DifficultyLevel::Medium);
    }

    #[test]
    fn focus_toggles() {
        let mut menu = LevelMenu::new(DifficultyLevel::Medium);
        assert_eq!(menu.focus, WelcomeFocus::Name);
        menu.toggle_focus();
        assert_eq!(menu.focus, WelcomeFocus::Level);
    }
}
