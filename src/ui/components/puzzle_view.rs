use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use mathadv::engine::{DifficultyLevel, Transition};
use mathadv::session::{RoundResult, Session};

use crate::ui::components::progress_bar::ProgressBar;
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

/// What the player sees about their previous answer.
#[derive(Clone, Debug, PartialEq)]
pub enum Feedback {
    Correct {
        elapsed_secs: f64,
        level_change: Option<(Transition, DifficultyLevel)>,
    },
    Incorrect {
        expected: u32,
        elapsed_secs: f64,
        level_change: Option<(Transition, DifficultyLevel)>,
    },
    NotANumber,
}

impl Feedback {
    pub fn from_round(round: &RoundResult) -> Self {
        let level_change = round
            .level_changed()
            .then_some((round.transition, round.next_level));
        let elapsed_secs = round.attempt.elapsed_secs();
        if round.attempt.correct {
            Feedback::Correct {
                elapsed_secs,
                level_change,
            }
        } else {
            Feedback::Incorrect {
                expected: round.attempt.correct_answer,
                elapsed_secs,
                level_change,
            }
        }
    }

    fn level_change(&self) -> Option<(Transition, DifficultyLevel)> {
        match self {
            Feedback::Correct { level_change, .. } | Feedback::Incorrect { level_change, .. } => {
                *level_change
            }
            Feedback::NotANumber => None,
        }
    }
}

pub struct PuzzleView<'a> {
    pub session: &'a Session,
    pub answer: &'a LineInput,
    pub feedback: Option<&'a Feedback>,
    pub elapsed_secs: f64,
    pub theme: &'a Theme,
}

impl Widget for PuzzleView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let level = self.session.current_level();

        let title = format!(
            " Puzzle {} of {} ",
            self.session.puzzle_number(),
            self.session.length()
        );
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(colors.level(level)))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(inner);

        let level_line = Line::from(vec![
            Span::styled("  Level: ", Style::default().fg(colors.muted())),
            Span::styled(
                level.name(),
                Style::default()
                    .fg(colors.level(level))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("   {:.0}s", self.elapsed_secs),
                Style::default().fg(colors.muted()),
            ),
        ]);
        Paragraph::new(level_line).render(layout[0], buf);

        let expression = format!("{} = ?", self.session.current_puzzle());
        Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                expression,
                Style::default()
                    .fg(colors.expression())
                    .add_modifier(Modifier::BOLD),
            )),
        ])
        .alignment(Alignment::Center)
        .render(layout[1], buf);

        let (before, cursor, after) = self.answer.render_parts();
        let cursor_text = cursor.map(String::from).unwrap_or_else(|| " ".to_string());
        Paragraph::new(Line::from(vec![
            Span::styled("Answer: ", Style::default().fg(colors.fg())),
            Span::styled(before, Style::default().fg(colors.accent())),
            Span::styled(
                cursor_text,
                Style::default().fg(colors.cursor_fg()).bg(colors.cursor_bg()),
            ),
            Span::styled(after, Style::default().fg(colors.accent())),
        ]))
        .alignment(Alignment::Center)
        .render(layout[2], buf);

        if let Some(feedback) = self.feedback {
            render_feedback(feedback, self.theme, layout[3], buf);
        }

        let running = self.session.tracker().session_summary();
        let stats = if running.total == 0 {
            "  No answers yet".to_string()
        } else {
            format!(
                "  {}/{} correct  |  accuracy {:.0}%  |  avg {:.1}s",
                running.correct,
                running.total,
                running.accuracy,
                running.avg_time_ms / 1000.0
            )
        };
        let acc_color = if running.total == 0 {
            colors.muted()
        } else {
            colors.accuracy(running.accuracy)
        };
        Paragraph::new(Line::from(Span::styled(stats, Style::default().fg(acc_color))))
            .render(layout[4], buf);

        ProgressBar::new(
            "Session",
            self.session.tracker().len(),
            self.session.length(),
            self.theme,
        )
        .render(layout[5], buf);
    }
}

fn render_feedback(feedback: &Feedback, theme: &Theme, area: Rect, buf: &mut Buffer) {
    let colors = &theme.colors;
    let mut lines = Vec::new();
    match feedback {
        Feedback::Correct { elapsed_secs, .. } => lines.push(Line::from(Span::styled(
            format!("Correct! ({elapsed_secs:.1}s)"),
            Style::default()
                .fg(colors.success())
                .add_modifier(Modifier::BOLD),
        ))),
        Feedback::Incorrect {
            expected,
            elapsed_secs,
            ..
        } => lines.push(Line::from(Span::styled(
            format!("Not quite. The answer was {expected}. ({elapsed_secs:.1}s)"),
            Style::default().fg(colors.error()),
        ))),
        Feedback::NotANumber => lines.push(Line::from(Span::styled(
            "Please enter a whole number",
            Style::default().fg(colors.warning()),
        ))),
    }

    match feedback.level_change() {
        Some((Transition::Increase, level)) => lines.push(Line::from(Span::styled(
            format!("Level up! Now at {level}"),
            Style::default().fg(colors.level(level)),
        ))),
        Some((Transition::Decrease, level)) => lines.push(Line::from(Span::styled(
            format!("Stepping back to {level} for now"),
            Style::default().fg(colors.level(level)),
        ))),
        _ => {}
    }

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(area, buf);
}
