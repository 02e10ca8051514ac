use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use mathadv::session::SessionReport;
use mathadv::session::result::{DifficultyTransition, Direction as LevelDirection};

use crate::ui::theme::Theme;

pub struct SummaryView<'a> {
    pub report: &'a SessionReport,
    pub save_error: Option<&'a str>,
    pub theme: &'a Theme,
}

impl<'a> SummaryView<'a> {
    pub fn new(report: &'a SessionReport, save_error: Option<&'a str>, theme: &'a Theme) -> Self {
        Self {
            report,
            save_error,
            theme,
        }
    }
}

impl Widget for SummaryView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let report = self.report;
        let summary = &report.summary;

        let block = Block::bordered()
            .title(" Session Complete ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(2),
            ])
            .split(inner);

        let name = if report.player_name.is_empty() {
            "Results".to_string()
        } else {
            format!("Results for {}", report.player_name)
        };
        Paragraph::new(Line::from(Span::styled(
            name,
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(layout[0], buf);

        let acc_text = format!("{:.1}%", summary.accuracy);
        let acc_detail = format!("  ({}/{} correct)", summary.correct, summary.total);
        Paragraph::new(Line::from(vec![
            Span::styled("  Accuracy:   ", Style::default().fg(colors.fg())),
            Span::styled(
                acc_text,
                Style::default()
                    .fg(colors.accuracy(summary.accuracy))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(acc_detail, Style::default().fg(colors.muted())),
        ]))
        .render(layout[1], buf);

        Paragraph::new(Line::from(vec![
            Span::styled("  Avg time:   ", Style::default().fg(colors.fg())),
            Span::styled(
                format!("{:.1}s", summary.avg_time_ms / 1000.0),
                Style::default().fg(colors.fg()),
            ),
        ]))
        .render(layout[2], buf);

        let start = summary.starting_level.unwrap_or(report.final_level);
        Paragraph::new(Line::from(vec![
            Span::styled("  Level:      ", Style::default().fg(colors.fg())),
            Span::styled(start.name(), Style::default().fg(colors.level(start))),
            Span::styled(" -> ", Style::default().fg(colors.muted())),
            Span::styled(
                report.final_level.name(),
                Style::default()
                    .fg(colors.level(report.final_level))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ({} changes)", report.transitions.len()),
                Style::default().fg(colors.muted()),
            ),
        ]))
        .render(layout[3], buf);

        let rating = &report.rating;
        let (delta_text, delta_color) = if rating.delta >= 0 {
            (format!("+{}", rating.delta), colors.success())
        } else {
            (rating.delta.to_string(), colors.error())
        };
        Paragraph::new(Line::from(vec![
            Span::styled("  Score:      ", Style::default().fg(colors.fg())),
            Span::styled(
                rating.score.to_string(),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("   Rating: ", Style::default().fg(colors.fg())),
            Span::styled(
                format!("{} ", rating.new_rating),
                Style::default().fg(colors.fg()),
            ),
            Span::styled(
                format!("({delta_text})"),
                Style::default().fg(delta_color),
            ),
        ]))
        .render(layout[4], buf);

        Paragraph::new(vec![
            Line::from(Span::styled(
                format!("  {}", report.assessment.verdict),
                Style::default().fg(colors.fg()),
            )),
            Line::from(Span::styled(
                format!("  {}", report.assessment.recommendation),
                Style::default().fg(colors.muted()),
            )),
            Line::from(Span::styled(
                format!(
                    "  Start your next session at {}",
                    report.recommended_level
                ),
                Style::default().fg(colors.level(report.recommended_level)),
            )),
        ])
        .render(layout[5], buf);

        let history: Vec<Line> = report
            .transitions
            .iter()
            .map(|t| {
                Line::from(Span::styled(
                    format!("    {}", transition_label(t)),
                    Style::default().fg(colors.muted()),
                ))
            })
            .collect();
        Paragraph::new(history).render(layout[6], buf);

        let help = match self.save_error {
            Some(err) => Line::from(Span::styled(
                format!("  Could not save progress: {err}"),
                Style::default().fg(colors.warning()),
            )),
            None => Line::from(vec![
                Span::styled("  [Enter] Play again  ", Style::default().fg(colors.accent())),
                Span::styled("[m] Menu  ", Style::default().fg(colors.accent())),
                Span::styled("[q] Quit", Style::default().fg(colors.accent())),
            ]),
        };
        Paragraph::new(help).render(layout[7], buf);
    }
}

/// `at_attempt` is the first attempt played at the new level.
fn transition_label(t: &DifficultyTransition) -> String {
    let arrow = match t.direction {
        LevelDirection::Up => "up",
        LevelDirection::Down => "down",
    };
    format!("at #{}: {} -> {} ({arrow})", t.at_attempt, t.from, t.to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathadv::engine::DifficultyLevel;
    use mathadv::session::PerformanceTracker;
    use mathadv::session::result::AttemptRecord;

    #[test]
    fn label_names_first_attempt_at_new_level() {
        let mut tracker = PerformanceTracker::new();
        for level in [DifficultyLevel::Easy, DifficultyLevel::Easy, DifficultyLevel::Medium] {
            tracker.record(AttemptRecord::new("1 + 1", 2, 2, 1000, level));
        }
        let label = transition_label(&tracker.transitions()[0]);
        assert_eq!(label, "at #3: Easy -> Medium (up)");
    }
}
