use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::catalog::{BadgeId, Catalog};
use crate::engine::scoring::{self, LEVELS_PER_BAR};
use crate::session::state::SessionState;
use crate::ui::components::progress_bar::ProgressBar;
use crate::ui::theme::Theme;

/// Live session numbers plus the badge shelf.
pub struct StatsSidebar<'a> {
    state: &'a SessionState,
    high_score: u32,
    catalog: &'a Catalog,
    theme: &'a Theme,
}

impl<'a> StatsSidebar<'a> {
    pub fn new(
        state: &'a SessionState,
        high_score: u32,
        catalog: &'a Catalog,
        theme: &'a Theme,
    ) -> Self {
        Self {
            state,
            high_score,
            catalog,
            theme,
        }
    }
}

impl Widget for StatsSidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let state = self.state;

        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(9),
                Constraint::Length(3),
                Constraint::Min(3),
            ])
            .split(area);

        let value = Style::default()
            .fg(colors.accent())
            .add_modifier(Modifier::BOLD);
        let label = Style::default().fg(colors.fg());
        let best = self.high_score.max(state.score);

        let lines = vec![
            Line::from(vec![
                Span::styled("Score:     ", label),
                Span::styled(state.score.to_string(), value),
            ]),
            Line::from(vec![
                Span::styled("Best:      ", label),
                Span::styled(best.to_string(), Style::default().fg(colors.fg())),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Streak:    ", label),
                Span::styled(
                    state.streak.to_string(),
                    Style::default().fg(if state.streak > 0 {
                        colors.success()
                    } else {
                        colors.text_dim()
                    }),
                ),
            ]),
            Line::from(vec![
                Span::styled("Level:     ", label),
                Span::styled(state.level.to_string(), value),
            ]),
            Line::from(vec![
                Span::styled("All time:  ", label),
                Span::styled(
                    format!("{} levels", state.levels_completed),
                    Style::default().fg(colors.text_dim()),
                ),
            ]),
            Line::from(vec![
                Span::styled("Mistakes:  ", label),
                Span::styled(
                    state.wrong_answers.len().to_string(),
                    Style::default().fg(colors.error()),
                ),
            ]),
        ];
        let block = Block::bordered()
            .title(" Session ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        Paragraph::new(lines).block(block).render(sections[0], buf);

        ProgressBar::new(
            "Progress",
            scoring::level_progress(state.level, LEVELS_PER_BAR),
            self.theme,
        )
        .render(sections[1], buf);

        let mut badge_lines = Vec::new();
        for id in BadgeId::ALL {
            let info = self.catalog.badge(id);
            let line = if state.earned_badges.contains(&id) {
                Line::from(Span::styled(
                    format!("\u{2605} {}", info.name),
                    Style::default().fg(colors.badge()),
                ))
            } else {
                Line::from(Span::styled(
                    format!("\u{2606} {}", info.name),
                    Style::default().fg(colors.text_dim()),
                ))
            };
            badge_lines.push(line);
        }
        let block = Block::bordered()
            .title(" Badges ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        Paragraph::new(badge_lines).block(block).render(sections[2], buf);
    }
}
